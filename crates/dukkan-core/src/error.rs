//! # Error Types
//!
//! Domain-specific error types for dukkan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dukkan-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures (pre-write)          │
//! │                                                                         │
//! │  dukkan-store errors (separate crate)                                  │
//! │  └── StoreError       - Document-store failures                        │
//! │                                                                         │
//! │  dukkan-db errors (separate crate)                                     │
//! │  └── DbError          - Repository-level failures                      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → Caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (barcode, ID, etc.)
//! 3. Errors are enum variants, never String
//! 4. Validation fires before any write - never partially applied

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A settlement transition that the state machine does not allow.
    ///
    /// ## When This Occurs
    /// - Marking an already-paid settlement paid again
    #[error("settlement {id} is already {status}, cannot perform transition")]
    InvalidSettlementTransition { id: String, status: String },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any document write.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Monetary value must not be negative.
    #[error("{field} must not be negative (got {value})")]
    Negative { field: String, value: f64 },

    /// Duplicate value (e.g., duplicate phone barcode).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Invalid format (e.g., unparsable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Duplicate {
            field: "phone_number".to_string(),
            value: "000042".to_string(),
        };
        assert_eq!(err.to_string(), "phone_number '000042' already exists");

        let err = ValidationError::Negative {
            field: "amountCharged".to_string(),
            value: -5.0,
        };
        assert_eq!(err.to_string(), "amountCharged must not be negative (got -5)");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "phone_number".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
