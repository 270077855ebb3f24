//! Constraint descriptors: the typed form of `{"type": ..., ...}` decoder selectors.
//!
//! Parsing happens once, when the harness is built. An absent, null or unknown
//! `type` selects the default decoder; a known type with missing or malformed
//! parameters is a configuration error.

use serde_json::{Map, Value as Json};

use crate::error::ConfigError;

/// Which decoding strategy a method's decoder uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// Natural byte width per kind, read straight from the source.
    #[default]
    Default,
    /// Integral values mapped into `[from, to]` inclusive.
    Range { from: i64, to: i64 },
    /// Composite values assembled from a chunk of exactly `size` bytes.
    Chunk { size: usize },
}

impl Constraint {
    pub fn range(from: i64, to: i64) -> Result<Self, ConfigError> {
        if from > to {
            return Err(ConfigError::InvalidRange { from, to });
        }
        Ok(Constraint::Range { from, to })
    }

    pub fn chunk(size: usize) -> Self {
        Constraint::Chunk { size }
    }

    /// Resolves a decoder kind string and its parameter map.
    ///
    /// A missing kind or a missing parameter map both yield [`Constraint::Default`].
    pub fn resolve(kind: Option<&str>, params: Option<&Map<String, Json>>) -> Result<Self, ConfigError> {
        let (kind, params) = match (kind, params) {
            (Some(kind), Some(params)) => (kind, params),
            _ => return Ok(Constraint::Default),
        };
        match kind {
            "range" => {
                let from = int_param(params, kind, "from")?;
                let to = int_param(params, kind, "to")?;
                Constraint::range(from, to)
            }
            "chunk" => {
                let size = int_param(params, kind, "size")?;
                let size = usize::try_from(size).map_err(|_| ConfigError::InvalidParameter {
                    name: "size".into(),
                    reason: format!("chunk size must be non-negative, got {}", size),
                })?;
                Ok(Constraint::chunk(size))
            }
            "default" => Ok(Constraint::Default),
            unknown => {
                tracing::warn!("Unknown constraint type '{}', using the default decoder", unknown);
                Ok(Constraint::Default)
            }
        }
    }

    /// Parses a descriptor object; `null` selects the default decoder.
    pub fn from_json(value: &Json) -> Result<Self, ConfigError> {
        match value {
            Json::Null => Ok(Constraint::Default),
            Json::Object(map) => {
                let kind = map.get("type").and_then(Json::as_str);
                Constraint::resolve(kind, Some(map))
            }
            other => Err(ConfigError::InvalidParameter {
                name: "constraint".into(),
                reason: format!("expected an object, got {}", other),
            }),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let value: Json = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    /// Re-checks invariants of a value built without the checked constructors.
    pub(crate) fn validate(self) -> Result<Self, ConfigError> {
        match self {
            Constraint::Range { from, to } => Constraint::range(from, to),
            other => Ok(other),
        }
    }
}

fn int_param(params: &Map<String, Json>, kind: &str, name: &str) -> Result<i64, ConfigError> {
    let value = params.get(name).ok_or_else(|| ConfigError::MissingParameter {
        kind: kind.into(),
        name: name.into(),
    })?;
    value.as_i64().ok_or_else(|| ConfigError::InvalidParameter {
        name: name.into(),
        reason: format!("expected an integer, got {}", value),
    })
}
