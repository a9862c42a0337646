//! Sprint field parsing.
//!
//! The sprint custom field comes in three encodings depending on the tracker
//! version and the endpoint:
//!
//! - a list of sprint objects `[{"id": 1, "name": "Sprint 1", "state": "closed"}, ..]`
//! - a single sprint object
//! - the legacy GreenHopper string form
//!   `com.atlassian.greenhopper.service.sprint.Sprint@1a2b[id=42,rapidViewId=7,state=ACTIVE,name=Sprint 7,..]`
//!
//! Lists are appended chronologically, so only the last entry is read.
//! The legacy parser is a compatibility shim and stays in this module.

use serde_json::Value;
use tracing::debug;

use crate::field_value::{non_null, normalize_json};

/// Marker identifying the legacy string encoding.
const LEGACY_MARKER: &str = "com.atlassian";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SprintState {
    Active,
    Closed,
    Future,
    /// Any other label, kept verbatim for display.
    Unknown(String),
}

impl SprintState {
    pub fn parse(label: &str) -> Self {
        match label {
            "ACTIVE" => Self::Active,
            "CLOSED" => Self::Closed,
            "FUTURE" => Self::Future,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
            Self::Future => "FUTURE",
            Self::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintDescriptor {
    pub name: String,
    pub state: Option<SprintState>,
}

impl SprintDescriptor {
    /// Decode the most recent sprint from a raw sprint field value.
    ///
    /// Returns `None` when no sprint name can be recovered.
    pub fn from_value(raw: &Value) -> Option<Self> {
        match raw {
            Value::Array(items) => items.last().and_then(Self::from_single),
            other => Self::from_single(other),
        }
    }

    fn from_single(raw: &Value) -> Option<Self> {
        match raw {
            Value::Object(map) => {
                let name = non_null(map, "name")
                    .map(normalize_json)
                    .filter(|n| !n.is_empty())
                    .or_else(|| {
                        non_null(map, "id").map(|id| format!("Sprint {}", normalize_json(id)))
                    })?;
                Some(Self { name, state: None })
            }
            Value::String(s) if s.contains(LEGACY_MARKER) => {
                let parsed = parse_legacy(s);
                if parsed.is_none() {
                    debug!(raw = %s, "legacy sprint descriptor has no name token");
                }
                parsed
            }
            Value::String(s) => {
                let name = s.trim();
                (!name.is_empty()).then(|| Self {
                    name: name.to_string(),
                    state: None,
                })
            }
            _ => None,
        }
    }

    /// Display form: `name`, or `name (STATE)` for any state other than CLOSED.
    pub fn display(&self) -> String {
        match &self.state {
            Some(state) if *state != SprintState::Closed => {
                format!("{} ({})", self.name, state.label())
            }
            _ => self.name.clone(),
        }
    }
}

/// Parse a raw sprint field into its display string; `""` when nothing usable is present.
pub fn parse_sprint(raw: &Value) -> String {
    SprintDescriptor::from_value(raw)
        .map(|s| s.display())
        .unwrap_or_default()
}

/// Decode `...[id=<n>,name=<s>,state=<s>,...]`.
fn parse_legacy(raw: &str) -> Option<SprintDescriptor> {
    let name = legacy_token(raw, "name=")?;
    let state = legacy_token(raw, "state=").map(SprintState::parse);
    Some(SprintDescriptor {
        name: name.to_string(),
        state,
    })
}

/// Value of `key` up to the next `,`, or the next `]` when no comma follows.
/// Empty values count as missing.
fn legacy_token<'a>(raw: &'a str, key: &str) -> Option<&'a str> {
    let start = raw.find(key)? + key.len();
    let rest = &raw[start..];
    let end = rest.find(',').or_else(|| rest.find(']'))?;
    let token = &rest[..end];
    (!token.is_empty()).then_some(token)
}
