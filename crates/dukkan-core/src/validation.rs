//! # Validation Module
//!
//! Pre-write input checks and barcode normalization.
//!
//! Validation always runs BEFORE any document write, so a failing input is
//! never partially applied. Repository code calls into here; nothing in this
//! module touches the store.

use crate::error::ValidationError;
use crate::types::{NewMaintenanceJob, NewPhone};
use crate::BARCODE_WIDTH;

// =============================================================================
// Barcodes
// =============================================================================

/// Normalizes a phone barcode: trims whitespace, requires non-empty, pads
/// with leading zeros to [`BARCODE_WIDTH`].
///
/// ## Example
/// ```rust
/// use dukkan_core::validation::normalize_barcode;
///
/// assert_eq!(normalize_barcode(" 42 ").unwrap(), "000042");
/// assert_eq!(normalize_barcode("123456").unwrap(), "123456");
/// assert!(normalize_barcode("   ").is_err());
/// ```
pub fn normalize_barcode(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "phone_number".to_string(),
        });
    }
    Ok(format!("{:0>width$}", trimmed, width = BARCODE_WIDTH))
}

/// Parses the numeric value out of a stored barcode, stripping any
/// non-digit characters. Used when seeding the barcode counter from
/// existing inventory.
///
/// Returns `None` when no digits remain.
pub fn barcode_digits(raw: &str) -> Option<i64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

// =============================================================================
// Entity Inputs
// =============================================================================

/// Validates a phone registration before write. Barcode normalization is
/// separate ([`normalize_barcode`]) because the repository also needs the
/// normalized value for its duplicate check.
pub fn validate_new_phone(phone: &NewPhone) -> Result<(), ValidationError> {
    if let Some(price) = phone.price {
        if price < 0.0 {
            return Err(ValidationError::Negative {
                field: "price".to_string(),
                value: price,
            });
        }
    }
    Ok(())
}

/// Validates a job creation input before write.
pub fn validate_new_job(job: &NewMaintenanceJob) -> Result<(), ValidationError> {
    if job.amount_charged < 0.0 {
        return Err(ValidationError::Negative {
            field: "amountCharged".to_string(),
            value: job.amount_charged,
        });
    }
    if let Some(parts) = job.attribution.parts() {
        for part in parts {
            if let Some(cost) = part.part_cost {
                if cost < 0.0 {
                    return Err(ValidationError::Negative {
                        field: "partCost".to_string(),
                        value: cost,
                    });
                }
            }
        }
    }
    if let Some(cost) = job.attribution.legacy_part_cost() {
        if cost < 0.0 {
            return Err(ValidationError::Negative {
                field: "partCost".to_string(),
                value: cost,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
