//! # Store Error Types
//!
//! Error types for document-store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Store failure (this module)                                           │
//! │       │                                                                 │
//! │       ├── IndexUnavailable ──► consumed by the job listing fallback,   │
//! │       │                        never reaches the caller                │
//! │       ├── TransientConflict ─► retried by run_transaction, surfaced    │
//! │       │                        only when retries are exhausted         │
//! │       ▼                                                                 │
//! │  DbError (dukkan-db) ← adds entity context, logs, propagates           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Document-store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document absent where one was required (e.g. merge update target).
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// The query needs a composite index that does not exist (yet).
    ///
    /// ## When This Occurs
    /// - A range predicate combined with a predicate on another field,
    ///   before the backing store finishes building the compound index
    ///
    /// Recoverable by design: callers degrade to a simpler query and
    /// filter in memory.
    #[error("query on '{collection}' requires a composite index on [{fields}]")]
    IndexUnavailable { collection: String, fields: String },

    /// Transaction contention exhausted the retry budget.
    #[error("transaction aborted after {attempts} attempts due to contention")]
    TransientConflict { attempts: u32 },

    /// Document encode/decode failure.
    #[error("document codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// A typed value did not serialize to a JSON object.
    #[error("expected a JSON object when encoding a document, got {0}")]
    NotAnObject(&'static str),
}

impl StoreError {
    /// Creates a NotFound error for a collection/id pair.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// True for the recoverable missing-index condition.
    pub fn is_index_unavailable(&self) -> bool {
        matches!(self, StoreError::IndexUnavailable { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_unavailable_detection() {
        let err = StoreError::IndexUnavailable {
            collection: "maintenanceJobs".to_string(),
            fields: "status, visitDate".to_string(),
        };
        assert!(err.is_index_unavailable());
        assert!(!StoreError::not_found("phones", "x").is_index_unavailable());
    }
}
