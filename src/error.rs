//! Error Types

use thiserror::Error;

use crate::storage::Handle;

/// Errors reported by store operations.
///
/// Absence is not an error for `get`, `remove` or `has`; those return
/// `Option`/`bool`. Only operations that require a live record fail, plus
/// the fallible constructors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("no live record with handle {0}")]
    NotFound(Handle),
    #[error("memdb::SharedStore requires a Tokio runtime to run its sweep task")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, StoreError>;
