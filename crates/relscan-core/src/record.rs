//! Flat issue records: one row per (issue, release) pairing.

use serde_json::{Map, Value};

use crate::field_value::{non_null, normalize_json};
use crate::release::ReleaseWindow;
use crate::resolver::CustomFieldResolver;

/// Release context columns, in output order.
pub const RELEASE_COLUMNS: &[&str] = &[
    "project_key",
    "version_name",
    "version_id",
    "version_status",
    "version_start_date",
    "version_release_date",
    "version_description",
];

/// Standard issue columns placed before the custom fields.
pub const ISSUE_COLUMNS: &[&str] = &[
    "issue_key",
    "summary",
    "issue_type",
    "priority",
    "status",
    "resolution",
    "assignee",
    "reporter",
    "fix_versions",
    "labels",
];

/// Always the last column.
pub const DESCRIPTION_COLUMN: &str = "description";

/// An ordered column → value mapping. Column order is stable across records
/// built by the same [`IssueRecordBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueRecord {
    cells: Vec<(String, String)>,
}

impl IssueRecord {
    pub fn from_pairs(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn push(&mut self, column: &str, value: String) {
        self.cells.push((column.to_string(), value));
    }
}

/// Combines a raw issue payload with its release context.
#[derive(Debug, Clone, Default)]
pub struct IssueRecordBuilder {
    resolver: CustomFieldResolver,
}

impl IssueRecordBuilder {
    pub fn new(resolver: CustomFieldResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &CustomFieldResolver {
        &self.resolver
    }

    /// Full column list of every record this builder produces.
    pub fn columns(&self) -> Vec<String> {
        RELEASE_COLUMNS
            .iter()
            .chain(ISSUE_COLUMNS)
            .copied()
            .chain(self.resolver.catalog().logical_names())
            .chain(std::iter::once(DESCRIPTION_COLUMN))
            .map(str::to_string)
            .collect()
    }

    /// Standard API field names plus every catalog candidate id, for a search request.
    pub fn request_fields(&self) -> Vec<String> {
        const STANDARD: &[&str] = &[
            "summary",
            "issuetype",
            "priority",
            "status",
            "resolution",
            "assignee",
            "reporter",
            "fixVersions",
            "labels",
            "description",
        ];
        STANDARD
            .iter()
            .copied()
            .chain(self.resolver.field_ids())
            .map(str::to_string)
            .collect()
    }

    /// Build one record. Pure: identical inputs give identical records.
    pub fn build(&self, raw_issue: &Value, release: &ReleaseWindow) -> IssueRecord {
        let empty = Map::new();
        let fields = raw_issue
            .get("fields")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let mut record = IssueRecord::default();

        for (column, value) in RELEASE_COLUMNS.iter().zip(release.column_values()) {
            record.push(column, value);
        }

        record.push(
            "issue_key",
            raw_issue.get("key").map(normalize_json).unwrap_or_default(),
        );
        record.push("summary", text(fields, "summary"));
        record.push("issue_type", nested(fields, "issuetype", "name"));
        record.push("priority", nested(fields, "priority", "name"));
        record.push("status", nested(fields, "status", "name"));
        record.push("resolution", nested(fields, "resolution", "name"));
        record.push("assignee", nested(fields, "assignee", "displayName"));
        record.push("reporter", nested(fields, "reporter", "displayName"));
        record.push("fix_versions", joined(fields, "fixVersions", Some("name")));
        record.push("labels", joined(fields, "labels", None));

        for (name, value) in self.resolver.resolve_all(fields) {
            record.push(&name, value);
        }

        record.push(DESCRIPTION_COLUMN, text(fields, "description"));
        record
    }
}

fn text(fields: &Map<String, Value>, key: &str) -> String {
    non_null(fields, key).map(normalize_json).unwrap_or_default()
}

/// `fields[outer][inner]`, `""` when either level is missing or null.
fn nested(fields: &Map<String, Value>, outer: &str, inner: &str) -> String {
    non_null(fields, outer)
        .and_then(|v| v.get(inner))
        .filter(|v| !v.is_null())
        .map(normalize_json)
        .unwrap_or_default()
}

/// Join a list field with `", "`, projecting `key` out of object elements when given.
fn joined(fields: &Map<String, Value>, list: &str, key: Option<&str>) -> String {
    let Some(items) = non_null(fields, list).and_then(Value::as_array) else {
        return String::new();
    };
    items
        .iter()
        .map(|item| match key {
            Some(k) => item.get(k).map(normalize_json).unwrap_or_default(),
            None => normalize_json(item),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldCatalog;
    use serde_json::json;

    fn release() -> ReleaseWindow {
        ReleaseWindow::from_version(
            "PAY",
            &json!({
                "id": "10042",
                "name": "2024.06",
                "released": true,
                "startDate": "2024-05-01",
                "releaseDate": "2024-06-15",
                "description": "June train"
            }),
        )
    }

    fn issue() -> Value {
        json!({
            "key": "PAY-101",
            "fields": {
                "summary": "Add ledger table",
                "issuetype": {"name": "Story"},
                "priority": {"name": "High"},
                "status": {"name": "Done"},
                "resolution": null,
                "assignee": null,
                "reporter": {"displayName": "Dana Reyes"},
                "fixVersions": [{"name": "2024.06"}, {"name": "2024.07"}],
                "labels": ["db", "ledger"],
                "description": "Create Table ledger_entries",
                "customfield_10106": 5,
                "customfield_10104": [{"id": 12, "name": "Sprint 12"}],
                "customfield_11700": {"value": "Payments"},
                "customfield_10602": null
            }
        })
    }

    #[test]
    fn builds_full_record() {
        let builder = IssueRecordBuilder::default();
        let r = builder.build(&issue(), &release());
        assert_eq!(r.get("issue_key"), Some("PAY-101"));
        assert_eq!(r.get("issue_type"), Some("Story"));
        assert_eq!(r.get("reporter"), Some("Dana Reyes"));
        assert_eq!(r.get("fix_versions"), Some("2024.06, 2024.07"));
        assert_eq!(r.get("labels"), Some("db, ledger"));
        assert_eq!(r.get("story_points"), Some("5"));
        assert_eq!(r.get("sprint"), Some("Sprint 12"));
        assert_eq!(r.get("application_name"), Some("Payments"));
        assert_eq!(r.get("version_status"), Some("Released"));
        assert_eq!(r.get("version_description"), Some("June train"));
        assert_eq!(r.get("description"), Some("Create Table ledger_entries"));
    }

    #[test]
    fn null_nested_objects_are_empty() {
        let r = IssueRecordBuilder::default().build(&issue(), &release());
        assert_eq!(r.get("assignee"), Some(""));
        assert_eq!(r.get("resolution"), Some(""));
        assert_eq!(r.get("notes"), Some(""));
        assert_eq!(r.get("acceptance_criteria"), Some(""));
    }

    #[test]
    fn missing_fields_object_still_builds() {
        let r = IssueRecordBuilder::default().build(&json!({"key": "PAY-1"}), &release());
        assert_eq!(r.get("issue_key"), Some("PAY-1"));
        assert_eq!(r.get("summary"), Some(""));
        assert_eq!(r.get("fix_versions"), Some(""));
        assert_eq!(r.get("project_key"), Some("PAY"));
    }

    #[test]
    fn columns_match_record_layout() {
        let builder = IssueRecordBuilder::default();
        let r = builder.build(&issue(), &release());
        let cols: Vec<&str> = r.columns().collect();
        assert_eq!(cols, builder.columns());
        assert_eq!(cols.first(), Some(&"project_key"));
        assert_eq!(cols.last(), Some(&"description"));
        assert_eq!(cols.len(), RELEASE_COLUMNS.len() + ISSUE_COLUMNS.len() + 7 + 1);
    }

    #[test]
    fn build_is_idempotent() {
        let builder = IssueRecordBuilder::new(CustomFieldResolver::new(FieldCatalog::default()));
        assert_eq!(builder.build(&issue(), &release()), builder.build(&issue(), &release()));
    }

    #[test]
    fn same_issue_in_two_releases() {
        let builder = IssueRecordBuilder::default();
        let other = ReleaseWindow {
            version_name: "2024.07".into(),
            ..release()
        };
        let a = builder.build(&issue(), &release());
        let b = builder.build(&issue(), &other);
        assert_eq!(a.get("issue_key"), b.get("issue_key"));
        assert_ne!(a.get("version_name"), b.get("version_name"));
    }

    #[test]
    fn request_fields_include_candidates() {
        let fields = IssueRecordBuilder::default().request_fields();
        assert!(fields.iter().any(|f| f == "fixVersions"));
        assert!(fields.iter().any(|f| f == "customfield_10104"));
    }
}
