//! Logical field catalog and report configuration.
//!
//! Custom field ids (`customfield_10104`, ...) are assigned per tracker
//! instance, so the mapping from business names to ids is configuration.
//! A logical field may list several candidate ids to cover instances that
//! back the same concept with different fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CoreError};
use crate::keyword::{MATCHED_COLUMN, MATCHED_KEYWORD};
use crate::record::{DESCRIPTION_COLUMN, ISSUE_COLUMNS, RELEASE_COLUMNS};

/// Logical name of the sprint field, which gets its own parser.
pub const SPRINT_FIELD: &str = "sprint";

/// Free-text columns scanned by the keyword filter unless configured otherwise.
pub const DEFAULT_SEARCH_COLUMNS: &[&str] = &[
    "version_description",
    "acceptance_criteria",
    "notes",
    "description",
];

const DEFAULT_FIELDS: &[(&str, &str)] = &[
    ("sdlc_information", "customfield_15600"),
    ("application_name", "customfield_11700"),
    ("story_points", "customfield_10106"),
    (SPRINT_FIELD, "customfield_10104"),
    ("acceptance_criteria", "customfield_10601"),
    ("feature_link", "customfield_10100"),
    ("notes", "customfield_10602"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCatalogEntry {
    pub logical_name: String,
    /// Tried in order; the first one present with a non-null value wins.
    pub candidate_ids: Vec<String>,
}

impl FieldCatalogEntry {
    pub fn new(logical_name: impl Into<String>, candidate_ids: &[&str]) -> Self {
        Self {
            logical_name: logical_name.into(),
            candidate_ids: candidate_ids.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Ordered, validated set of logical fields. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldCatalogEntry>", into = "Vec<FieldCatalogEntry>")]
pub struct FieldCatalog {
    entries: Vec<FieldCatalogEntry>,
}

impl FieldCatalog {
    pub fn new(entries: Vec<FieldCatalogEntry>) -> Result<Self, CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for entry in &entries {
            if entry.logical_name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if is_reserved(&entry.logical_name) {
                return Err(CatalogError::ReservedName(entry.logical_name.clone()));
            }
            if entry.candidate_ids.is_empty() {
                return Err(CatalogError::NoCandidates(entry.logical_name.clone()));
            }
            if !seen.insert(entry.logical_name.as_str()) {
                return Err(CatalogError::DuplicateField(entry.logical_name.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[FieldCatalogEntry] {
        &self.entries
    }

    pub fn candidates(&self, logical_name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.logical_name == logical_name)
            .map(|e| e.candidate_ids.as_slice())
    }

    pub fn logical_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.logical_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Names already taken by the fixed record and match columns.
fn is_reserved(name: &str) -> bool {
    RELEASE_COLUMNS.contains(&name)
        || ISSUE_COLUMNS.contains(&name)
        || [DESCRIPTION_COLUMN, MATCHED_KEYWORD, MATCHED_COLUMN].contains(&name)
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self {
            entries: DEFAULT_FIELDS
                .iter()
                .map(|(name, id)| FieldCatalogEntry::new(*name, &[*id]))
                .collect(),
        }
    }
}

impl TryFrom<Vec<FieldCatalogEntry>> for FieldCatalog {
    type Error = CatalogError;

    fn try_from(entries: Vec<FieldCatalogEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<FieldCatalog> for Vec<FieldCatalogEntry> {
    fn from(catalog: FieldCatalog) -> Self {
        catalog.entries
    }
}

/// Everything a report run needs besides connection details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub fields: FieldCatalog,
    pub search_columns: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            fields: FieldCatalog::default(),
            search_columns: DEFAULT_SEARCH_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ReportConfig {
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a JSON config file. Omitted keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::info!(
            path = %path.display(),
            fields = config.fields.len(),
            search_columns = config.search_columns.len(),
            "loaded report config"
        );
        Ok(config)
    }
}
