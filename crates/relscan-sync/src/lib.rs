//! Sync layer: REST client for the ticket tracker's versions, search and field endpoints.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{FieldDefinition, SearchPage, SyncError, TrackerClient, TrackerConfig};
