//! Remote data store error types.

use thiserror::Error;

/// Failure of a single round-trip to the remote create/read/update/delete store.
///
/// Absence of a record is not an error; readers return `Ok(None)` for that.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the call.
    #[error("Data store unavailable: {0}")]
    Unavailable(String),

    /// A write violated a uniqueness constraint.
    #[error("Duplicate {entity}: {key}")]
    Duplicate { entity: &'static str, key: String },

    /// A conditional write found the record in a state that forbids it.
    #[error("Write conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Convenience constructor for transport failures.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Returns true if repeating the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
