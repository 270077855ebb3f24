//!
//! Preparation of instrumented class files ahead of a fuzz run.
//!
//! The coverage rewriter itself is a collaborator behind [`ClassInstrumentor`];
//! this module only moves bytes: it finds `.class` files under an input path,
//! asks the instrumentor to rewrite each one, writes the result (or the original
//! bytes, when the instrumentor passes a class through) into a cleared output
//! directory with the same relative layout, and finally hands that directory to
//! a [`CodeUnitLoader`].

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{HarnessError, HarnessResult};

const CLASS_EXTENSION: &str = "class";

/// What the instrumentor made of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instrumented {
    /// Rewritten bytes carrying coverage probes.
    Rewritten(Vec<u8>),
    /// The class uses a construct the instrumentor cannot rewrite; the original
    /// bytes are used unchanged.
    PassThrough { reason: String },
}

pub trait ClassInstrumentor {
    /// Rewrites one class. An `Err` aborts the whole pipeline.
    fn instrument(&self, class_name: &str, bytes: &[u8]) -> HarnessResult<Instrumented>;
}

/// Makes a directory of class files available to the program under test.
pub trait CodeUnitLoader {
    fn load(&mut self, dir: &Path) -> HarnessResult<()>;
}

/// Counts from one pipeline run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentReport {
    pub rewritten: usize,
    pub passed_through: usize,
}

impl InstrumentReport {
    pub fn total(&self) -> usize {
        self.rewritten + self.passed_through
    }
}

pub struct InstrumentPipeline<'a> {
    instrumentor: &'a dyn ClassInstrumentor,
}

impl<'a> InstrumentPipeline<'a> {
    pub fn new(instrumentor: &'a dyn ClassInstrumentor) -> Self {
        InstrumentPipeline { instrumentor }
    }

    /// Instruments `input` into `output` and loads the result.
    ///
    /// With no input, or an input path that does not exist, nothing is
    /// instrumented and a previously prepared `output` directory is loaded as is.
    pub fn run(
        &self,
        input: Option<&Path>,
        output: &Path,
        loader: &mut dyn CodeUnitLoader,
    ) -> HarnessResult<InstrumentReport> {
        let report = match input {
            Some(input) if input.exists() => {
                prepare_output(output)?;
                tracing::info!("Instrumenting {} into {}", input.display(), output.display());
                let report = self.instrument_path(input, output)?;
                tracing::info!(
                    "Finished instrumenting {}: {} rewritten, {} passed through",
                    input.display(),
                    report.rewritten,
                    report.passed_through
                );
                report
            }
            other => {
                if let Some(missing) = other {
                    tracing::warn!("Input {} does not exist, continuing without instrumenting", missing.display());
                }
                require_directory(output)?;
                InstrumentReport::default()
            }
        };
        tracing::info!("Loading classes from {}", output.display());
        loader.load(output)?;
        Ok(report)
    }

    /// Instruments a single class file or every class file under a directory.
    pub fn instrument_path(&self, input: &Path, output: &Path) -> HarnessResult<InstrumentReport> {
        let mut report = InstrumentReport::default();
        if input.is_dir() {
            for class in class_files(input)? {
                let relative = class.strip_prefix(input).unwrap_or(&class);
                self.instrument_file(&class, &output.join(relative), &mut report)?;
            }
            return Ok(report);
        }
        if !is_class_file(input) {
            return Err(HarnessError::Instrumentation {
                class: input.display().to_string(),
                reason: "input is neither a directory nor a class file".into(),
            });
        }
        let name = input.file_name().map(PathBuf::from).unwrap_or_default();
        self.instrument_file(input, &output.join(name), &mut report)?;
        Ok(report)
    }

    fn instrument_file(&self, class: &Path, target: &Path, report: &mut InstrumentReport) -> HarnessResult<()> {
        let original = fs::read(class)?;
        let name = class.display().to_string();
        tracing::debug!("Instrumenting {} into {}", name, target.display());
        let bytes = match self.instrumentor.instrument(&name, &original)? {
            Instrumented::Rewritten(bytes) => {
                report.rewritten += 1;
                bytes
            }
            Instrumented::PassThrough { reason } => {
                tracing::warn!("Skipping instrumentation of {}: {}", name, reason);
                report.passed_through += 1;
                original
            }
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, bytes)?;
        Ok(())
    }
}

fn is_class_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == CLASS_EXTENSION)
}

/// Class files under `dir`, recursively, in a stable order. Symlinks are not
/// followed.
fn class_files(dir: &Path) -> HarnessResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let msg = e.to_string();
            HarnessError::Io(e.into_io_error().unwrap_or_else(|| std::io::Error::other(msg)))
        })?;
        if entry.file_type().is_file() && is_class_file(entry.path()) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

fn require_directory(output: &Path) -> HarnessResult<()> {
    if !output.exists() {
        return Err(HarnessError::Instrumentation {
            class: output.display().to_string(),
            reason: "output directory does not exist".into(),
        });
    }
    if !output.is_dir() {
        return Err(not_a_directory(output));
    }
    Ok(())
}

/// Creates the output directory, or empties it if it already exists.
fn prepare_output(output: &Path) -> HarnessResult<()> {
    if !output.exists() {
        tracing::info!("Creating output directory {}", output.display());
        fs::create_dir_all(output)?;
        return Ok(());
    }
    if !output.is_dir() {
        return Err(not_a_directory(output));
    }
    tracing::info!("Clearing directory {}", output.display());
    for entry in fs::read_dir(output)? {
        let entry = entry?;
        let path = entry.path();
        let removed = if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        if let Err(err) = removed {
            tracing::warn!("Can't delete {}: {}", path.display(), err);
        }
    }
    Ok(())
}

fn not_a_directory(path: &Path) -> HarnessError {
    HarnessError::Instrumentation {
        class: path.display().to_string(),
        reason: "output path is not a directory".into(),
    }
}
