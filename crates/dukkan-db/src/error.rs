//! # Database Error Types
//!
//! Repository-level errors for dukkan-db.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError ──► rejected before any write (never partial)         │
//! │  CoreError ───────► business rule violation (settlement guard)         │
//! │  StoreError ──────► wrapped unchanged, except:                         │
//! │       IndexUnavailable  - consumed by the job listing fallback         │
//! │       NotFound          - re-expressed with the entity name            │
//! │                                                                         │
//! │  Everything surfaces to the caller as DbError.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use dukkan_core::{CoreError, ValidationError};
use dukkan_store::StoreError;

/// Repository operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A single-entity read found nothing. Absence of a required entity is
    /// an error here, never a null placeholder.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Business rule violation from dukkan-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Input rejected before any write.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Underlying store failure, propagated unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DbError {
    /// Creates a NotFound error for an entity/id pair.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Store(StoreError::Codec(err))
    }
}

/// Result type for repository operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_the_entity() {
        let err = DbError::not_found("maintenance job", "J42");
        assert_eq!(err.to_string(), "maintenance job not found: J42");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: DbError = ValidationError::Required {
            field: "phone_number".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
