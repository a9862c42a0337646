pub mod catalog;
pub mod discovery;
pub mod error;
pub mod field_value;
pub mod keyword;
pub mod record;
pub mod release;
pub mod resolver;
pub mod schema;
pub mod sprint;

pub use catalog::{FieldCatalog, FieldCatalogEntry, ReportConfig};
pub use error::{CatalogError, CoreError};
pub use field_value::{RawFieldValue, Scalar, normalize, normalize_json};
pub use keyword::{KeywordMatchRow, filter_matches, parse_keywords};
pub use record::{IssueRecord, IssueRecordBuilder};
pub use release::{DateRange, ReleaseWindow, select_releases};
pub use resolver::CustomFieldResolver;
pub use sprint::{SprintDescriptor, SprintState, parse_sprint};
