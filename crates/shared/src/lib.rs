pub mod domain;
pub mod error;
pub mod protocol;

pub use domain::{identifiers_match, Record, ResourceState, ResourceStatus};
pub use error::SyncError;
