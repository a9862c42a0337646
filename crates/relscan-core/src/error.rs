use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("logical field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("logical field `{0}` has no candidate field ids")]
    NoCandidates(String),

    #[error("logical field name must not be empty")]
    EmptyName,

    #[error("logical field `{0}` collides with a built-in report column")]
    ReservedName(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid date `{0}`: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("date range starts after it ends: {start} > {end}")]
    InvertedRange { start: String, end: String },

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}
