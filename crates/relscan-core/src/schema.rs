/// Arrow schema definitions for release reports.
pub mod report {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::error::ArrowError;
    use arrow::record_batch::RecordBatch;

    use crate::keyword::KeywordMatchRow;
    use crate::record::{IssueRecord, RELEASE_COLUMNS};
    use crate::release::ReleaseWindow;

    /// All report columns are non-null Utf8; absent values are empty strings.
    pub fn issue_schema(columns: &[String]) -> Schema {
        Schema::new(
            columns
                .iter()
                .map(|c| Field::new(c, DataType::Utf8, false))
                .collect::<Vec<_>>(),
        )
    }

    /// Schema for keyword matches: `matched_keyword`, `matched_column`, then the record columns.
    pub fn match_schema(record_columns: &[String]) -> Schema {
        issue_schema(&KeywordMatchRow::columns(record_columns))
    }

    /// Schema for the release table: the release context columns only.
    pub fn release_schema() -> Schema {
        let columns: Vec<String> = RELEASE_COLUMNS.iter().map(|c| c.to_string()).collect();
        issue_schema(&columns)
    }

    /// One row per selected release, whether or not any issue was fixed in it.
    pub fn releases_to_batch(releases: &[ReleaseWindow]) -> Result<RecordBatch, ArrowError> {
        let rows: Vec<[String; 7]> = releases.iter().map(ReleaseWindow::column_values).collect();
        let arrays: Vec<ArrayRef> = (0..RELEASE_COLUMNS.len())
            .map(|i| {
                let values: Vec<&str> = rows.iter().map(|r| r[i].as_str()).collect();
                Arc::new(StringArray::from(values)) as ArrayRef
            })
            .collect();
        RecordBatch::try_new(Arc::new(release_schema()), arrays)
    }

    /// Convert records into a batch with one Utf8 column per entry of `columns`.
    ///
    /// A column missing from a record is written as `""`.
    pub fn records_to_batch(
        columns: &[String],
        records: &[IssueRecord],
    ) -> Result<RecordBatch, ArrowError> {
        let arrays: Vec<ArrayRef> = columns
            .iter()
            .map(|c| {
                let values: Vec<&str> = records.iter().map(|r| r.get(c).unwrap_or("")).collect();
                Arc::new(StringArray::from(values)) as ArrayRef
            })
            .collect();
        RecordBatch::try_new(Arc::new(issue_schema(columns)), arrays)
    }

    pub fn matches_to_batch(
        record_columns: &[String],
        rows: &[KeywordMatchRow],
    ) -> Result<RecordBatch, ArrowError> {
        let keywords: Vec<&str> = rows.iter().map(|r| r.matched_keyword.as_str()).collect();
        let columns: Vec<&str> = rows.iter().map(|r| r.matched_column.as_str()).collect();

        let mut arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(keywords)),
            Arc::new(StringArray::from(columns)),
        ];
        for c in record_columns {
            let values: Vec<&str> = rows.iter().map(|r| r.record.get(c).unwrap_or("")).collect();
            arrays.push(Arc::new(StringArray::from(values)));
        }
        RecordBatch::try_new(Arc::new(match_schema(record_columns)), arrays)
    }
}
