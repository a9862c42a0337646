//! Report file output.
//!
//! Each report table is written as a single Arrow RecordBatch, either to
//! Parquet (default, typed and compact) or to CSV with a header row for
//! spreadsheet import.

use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use relscan_core::DateRange;
use tracing::info;

use crate::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Parquet,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "parquet" => Ok(Self::Parquet),
            "csv" => Ok(Self::Csv),
            other => Err(StoreError::UnknownFormat(other.to_string())),
        }
    }
}

/// `{prefix}_{YYYYMMDD}_{YYYYMMDD}_{YYYYMMDD_HHMMSS}.{ext}`
pub fn report_file_name(
    prefix: &str,
    range: &DateRange,
    stamp: NaiveDateTime,
    format: OutputFormat,
) -> String {
    format!(
        "{prefix}_{}_{}_{}.{}",
        range.start.format("%Y%m%d"),
        range.end.format("%Y%m%d"),
        stamp.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

pub fn write_batch(path: &Path, batch: &RecordBatch, format: OutputFormat) -> Result<(), StoreError> {
    match format {
        OutputFormat::Parquet => write_parquet(path, batch),
        OutputFormat::Csv => write_csv(path, batch),
    }
}

/// Write one batch to a Parquet file, replacing any existing file.
pub fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet report");
    Ok(())
}

/// Write one batch to a CSV file with a header row.
pub fn write_csv(path: &Path, batch: &RecordBatch) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(file);
    writer.write(batch)?;
    info!(path = %path.display(), rows = batch.num_rows(), "wrote csv report");
    Ok(())
}

/// Read a Parquet file into Arrow RecordBatches.
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    if !path.exists() {
        return Err(StoreError::ParquetNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, StringArray};
    use relscan_core::IssueRecord;
    use relscan_core::schema::report;
    use tempfile::TempDir;

    fn sample_batch() -> RecordBatch {
        let columns: Vec<String> = vec!["issue_key".into(), "summary".into()];
        let records = vec![
            IssueRecord::from_pairs(vec![
                ("issue_key".into(), "PAY-1".into()),
                ("summary".into(), "Add ledger, with comma".into()),
            ]),
            IssueRecord::from_pairs(vec![("issue_key".into(), "PAY-2".into())]),
        ];
        report::records_to_batch(&columns, &records).unwrap()
    }

    #[test]
    fn parquet_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("issues.parquet");
        write_parquet(&path, &sample_batch()).unwrap();

        let batches = read_parquet(&path).unwrap();
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 2);
        let summary = batches[0]
            .column_by_name("summary")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(summary.value(0), "Add ledger, with comma");
        assert_eq!(summary.value(1), "");
    }

    #[test]
    fn csv_has_header_and_quotes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("issues.csv");
        write_batch(&path, &sample_batch(), OutputFormat::Csv).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("issue_key,summary"));
        assert_eq!(lines.next(), Some("PAY-1,\"Add ledger, with comma\""));
        assert!(lines.next().unwrap().starts_with("PAY-2,"));
    }

    #[test]
    fn missing_parquet_errors() {
        let err = read_parquet(Path::new("/nonexistent/report.parquet")).unwrap_err();
        assert!(matches!(err, StoreError::ParquetNotFound(_)));
    }

    #[test]
    fn file_name_layout() {
        let range = DateRange::parse("2024-01-01", "2024-12-31").unwrap();
        let stamp = chrono::NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap();
        assert_eq!(
            report_file_name("release_issues", &range, stamp, OutputFormat::Parquet),
            "release_issues_20240101_20241231_20250304_050607.parquet"
        );
    }

    #[test]
    fn format_from_str() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("parquet".parse::<OutputFormat>().unwrap(), OutputFormat::Parquet);
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }
}
