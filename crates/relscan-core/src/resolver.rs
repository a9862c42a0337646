//! Resolution of logical field names against an issue's raw `fields` object.

use serde_json::{Map, Value};

use crate::catalog::{FieldCatalog, SPRINT_FIELD};
use crate::field_value::{non_null, normalize_json};
use crate::sprint::parse_sprint;

/// Maps logical field names to normalised values using an immutable [`FieldCatalog`].
#[derive(Debug, Clone, Default)]
pub struct CustomFieldResolver {
    catalog: FieldCatalog,
}

impl CustomFieldResolver {
    pub fn new(catalog: FieldCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Resolve one logical field.
    ///
    /// Candidates are tried in declared order and the first present, non-null
    /// value is normalised. Unknown names and missing fields yield `""`.
    pub fn resolve(&self, logical_name: &str, fields: &Map<String, Value>) -> String {
        let Some(candidates) = self.catalog.candidates(logical_name) else {
            return String::new();
        };
        let Some(raw) = candidates.iter().find_map(|id| non_null(fields, id)) else {
            return String::new();
        };
        if logical_name == SPRINT_FIELD {
            parse_sprint(raw)
        } else {
            normalize_json(raw)
        }
    }

    /// Resolve every catalog field, in catalog order.
    pub fn resolve_all(&self, fields: &Map<String, Value>) -> Vec<(String, String)> {
        self.catalog
            .logical_names()
            .map(|name| (name.to_string(), self.resolve(name, fields)))
            .collect()
    }

    /// Every candidate id across the catalog, deduplicated, in first-seen order.
    ///
    /// Used to build the `fields` parameter of a search request.
    pub fn field_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for entry in self.catalog.entries() {
            for id in &entry.candidate_ids {
                if !ids.contains(&id.as_str()) {
                    ids.push(id.as_str());
                }
            }
        }
        ids
    }
}
