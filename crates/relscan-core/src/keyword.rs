//! Keyword post-filtering over assembled issue records.
//!
//! Emission is a cross product: a record yields one row for every
//! (column, keyword) pair that matches, so a record with two matching
//! keywords in two columns appears four times. Consumers that want one row
//! per issue must deduplicate on `issue_key`.

use crate::record::IssueRecord;

pub const MATCHED_KEYWORD: &str = "matched_keyword";
pub const MATCHED_COLUMN: &str = "matched_column";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatchRow {
    pub matched_keyword: String,
    pub matched_column: String,
    pub record: IssueRecord,
}

impl KeywordMatchRow {
    /// Output columns: the two match columns, then the record's own columns.
    pub fn columns(record_columns: &[String]) -> Vec<String> {
        [MATCHED_KEYWORD, MATCHED_COLUMN]
            .into_iter()
            .map(str::to_string)
            .chain(record_columns.iter().cloned())
            .collect()
    }
}

/// Split a comma-delimited keyword list, trimming each entry.
///
/// Blank entries are dropped, so `"a,,b"` yields two keywords. Keeping an
/// empty needle would match every non-empty column.
pub fn parse_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-insensitive substring search of `keywords` across `search_columns`.
///
/// Columns absent from a record, or empty, are skipped.
pub fn filter_matches(
    records: &[IssueRecord],
    keywords: &[String],
    search_columns: &[String],
) -> Vec<KeywordMatchRow> {
    let needles: Vec<(&str, String)> = keywords
        .iter()
        .map(|k| (k.as_str(), k.to_lowercase()))
        .collect();

    let mut rows = Vec::new();
    for record in records {
        for column in search_columns {
            let Some(value) = record.get(column).filter(|v| !v.is_empty()) else {
                continue;
            };
            let haystack = value.to_lowercase();
            for (keyword, needle) in &needles {
                if haystack.contains(needle.as_str()) {
                    rows.push(KeywordMatchRow {
                        matched_keyword: (*keyword).to_string(),
                        matched_column: column.clone(),
                        record: record.clone(),
                    });
                }
            }
        }
    }

    tracing::info!(
        records = records.len(),
        keywords = keywords.len(),
        matches = rows.len(),
        "keyword filter complete"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> IssueRecord {
        IssueRecord::from_pairs(
            pairs
                .iter()
                .map(|(c, v)| (c.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_trims_and_drops_blanks() {
        assert_eq!(
            parse_keywords(" Create Table, Foo ,,New_Table, "),
            vec!["Create Table", "Foo", "New_Table"]
        );
        assert!(parse_keywords("").is_empty());
    }

    #[test]
    fn single_match() {
        let r = record(&[("issue_key", "PAY-1"), ("description", "Create Table now")]);
        let rows = filter_matches(
            &[r.clone()],
            &parse_keywords("Create Table, Foo"),
            &cols(&["notes", "description"]),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].matched_keyword, "Create Table");
        assert_eq!(rows[0].matched_column, "description");
        assert_eq!(rows[0].record, r);
    }

    #[test]
    fn case_insensitive() {
        let r = record(&[("description", "we must CREATE TABLE first")]);
        let rows = filter_matches(&[r], &parse_keywords("create table"), &cols(&["description"]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].matched_keyword, "create table");
    }

    #[test]
    fn cross_product_emission() {
        let r = record(&[
            ("notes", "new table and table creation"),
            ("description", "New Table, also Table Creation"),
        ]);
        let rows = filter_matches(
            &[r],
            &parse_keywords("New Table, Table Creation, Missing"),
            &cols(&["notes", "description"]),
        );
        let hits: Vec<(&str, &str)> = rows
            .iter()
            .map(|m| (m.matched_column.as_str(), m.matched_keyword.as_str()))
            .collect();
        assert_eq!(
            hits,
            vec![
                ("notes", "New Table"),
                ("notes", "Table Creation"),
                ("description", "New Table"),
                ("description", "Table Creation"),
            ]
        );
    }

    #[test]
    fn missing_and_empty_columns_skipped() {
        let r = record(&[("notes", ""), ("description", "nothing here")]);
        let rows = filter_matches(
            &[r],
            &parse_keywords("nothing"),
            &cols(&["acceptance_criteria", "notes", "description"]),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].matched_column, "description");
    }

    #[test]
    fn no_records_or_no_matches_is_empty() {
        assert!(filter_matches(&[], &parse_keywords("a"), &cols(&["description"])).is_empty());
        let r = record(&[("description", "abc")]);
        assert!(filter_matches(&[r], &parse_keywords("xyz"), &cols(&["description"])).is_empty());
    }

    #[test]
    fn output_columns_prefixed() {
        let out = KeywordMatchRow::columns(&cols(&["issue_key"]));
        assert_eq!(out, vec!["matched_keyword", "matched_column", "issue_key"]);
    }
}
