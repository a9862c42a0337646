//! Release windows: which project versions count as released in a date range.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::error::CoreError;
use crate::field_value::normalize_json;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self, CoreError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(s.to_string()))
}

/// Release context merged into every issue record of that release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseWindow {
    pub project_key: String,
    pub version_id: String,
    pub version_name: String,
    pub released: bool,
    pub release_date: String,
    pub start_date: String,
    pub description: String,
}

impl ReleaseWindow {
    /// Project a raw version payload (`{id, name, released, startDate?, releaseDate?, description?}`).
    pub fn from_version(project_key: &str, version: &Value) -> Self {
        let text = |key: &str| version.get(key).map(normalize_json).unwrap_or_default();
        Self {
            project_key: project_key.to_string(),
            version_id: text("id"),
            version_name: text("name"),
            released: version
                .get("released")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            release_date: text("releaseDate"),
            start_date: text("startDate"),
            description: text("description"),
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.released { "Released" } else { "Unreleased" }
    }

    /// Cell values in [`RELEASE_COLUMNS`](crate::record::RELEASE_COLUMNS) order.
    pub fn column_values(&self) -> [String; 7] {
        [
            self.project_key.clone(),
            self.version_name.clone(),
            self.version_id.clone(),
            self.status_label().to_string(),
            self.start_date.clone(),
            self.release_date.clone(),
            self.description.clone(),
        ]
    }

    /// Parsed release date; `None` when absent or not a calendar date.
    pub fn release_day(&self) -> Option<NaiveDate> {
        if self.release_date.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(&self.release_date, DATE_FORMAT).ok()
    }

    /// Released, dated, and dated inside `range`.
    pub fn falls_within(&self, range: &DateRange) -> bool {
        self.released && self.release_day().is_some_and(|d| range.contains(d))
    }
}

/// Select the versions of one project that were released inside `range`.
///
/// Versions without a parseable `releaseDate` are dropped regardless of
/// their `released` flag.
pub fn select_releases(project_key: &str, versions: &[Value], range: &DateRange) -> Vec<ReleaseWindow> {
    versions
        .iter()
        .map(|v| ReleaseWindow::from_version(project_key, v))
        .filter(|w| {
            let keep = w.falls_within(range);
            if !keep {
                debug!(
                    project = %w.project_key,
                    version = %w.version_name,
                    released = w.released,
                    release_date = %w.release_date,
                    "version outside release window"
                );
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse(start, end).unwrap()
    }

    fn version(released: bool, release_date: Option<&str>) -> Value {
        let mut v = json!({"id": "10042", "name": "2024.06", "released": released});
        if let Some(d) = release_date {
            v["releaseDate"] = json!(d);
        }
        v
    }

    #[test]
    fn included_inside_range() {
        let v = version(true, Some("2024-06-15"));
        let out = select_releases("PAY", &[v], &range("2024-01-01", "2024-12-31"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].version_name, "2024.06");
        assert_eq!(out[0].project_key, "PAY");
    }

    #[test]
    fn excluded_outside_range() {
        let v = version(true, Some("2024-06-15"));
        assert!(select_releases("PAY", &[v], &range("2024-07-01", "2024-12-31")).is_empty());
    }

    #[test]
    fn excluded_without_release_date() {
        let v = version(true, None);
        assert!(select_releases("PAY", &[v], &range("2000-01-01", "2099-12-31")).is_empty());
    }

    #[test]
    fn excluded_when_unreleased() {
        let v = version(false, Some("2024-06-15"));
        assert!(select_releases("PAY", &[v], &range("2024-01-01", "2024-12-31")).is_empty());
    }

    #[test]
    fn excluded_on_invalid_date() {
        let v = version(true, Some("2024-02-30"));
        assert!(select_releases("PAY", &[v], &range("2024-01-01", "2024-12-31")).is_empty());
        let v = version(true, Some("15/06/2024"));
        assert!(select_releases("PAY", &[v], &range("2024-01-01", "2024-12-31")).is_empty());
    }

    #[test]
    fn bounds_are_inclusive() {
        let r = range("2024-06-15", "2024-06-30");
        let first = version(true, Some("2024-06-15"));
        let last = version(true, Some("2024-06-30"));
        assert_eq!(select_releases("PAY", &[first, last], &r).len(), 2);
    }

    #[test]
    fn numeric_id_projected_as_text() {
        let w = ReleaseWindow::from_version(
            "PAY",
            &json!({"id": 10042, "name": "v1", "released": true, "description": null}),
        );
        assert_eq!(w.version_id, "10042");
        assert_eq!(w.description, "");
        assert_eq!(w.start_date, "");
        assert_eq!(w.status_label(), "Released");
    }

    #[test]
    fn rejects_bad_bounds() {
        assert!(matches!(
            DateRange::parse("2024-13-01", "2024-12-31"),
            Err(CoreError::InvalidDate(_))
        ));
        assert!(matches!(
            DateRange::parse("2024-12-31", "2024-01-01"),
            Err(CoreError::InvertedRange { .. })
        ));
    }
}
