//! Storage layer: Parquet and CSV report files.

mod error;
mod files;

pub use error::StoreError;
pub use files::{OutputFormat, read_parquet, report_file_name, write_batch, write_csv, write_parquet};
