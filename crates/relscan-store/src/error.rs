use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("parquet file not found: {0}")]
    ParquetNotFound(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unknown output format `{0}` (expected parquet or csv)")]
    UnknownFormat(String),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}
