//! # dukkan-core: Pure Business Logic for Dukkan
//!
//! This crate is the **heart** of Dukkan, a phone retail and repair shop
//! data layer. It contains all business logic as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dukkan Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Caller / Application                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    dukkan-db (Repositories)                     │   │
//! │  │    jobs, settlements, counters, phones, reps, technicians      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ dukkan-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  finance  │  │ validation│  │   error   │  │   │
//! │  │   │  Job      │  │  derive_  │  │  barcode  │  │ CoreError │  │   │
//! │  │   │  Part     │  │ financials│  │  checks   │  │ Validation│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (MaintenanceJob, Part, Settlement, etc.)
//! - [`finance`] - Derived financial calculations (profit, commissions)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation and barcode normalization
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Dual Schema**: Legacy single-rep jobs and multi-part jobs are a tagged
//!    union, never scattered optional fields
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod finance;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use dukkan_core::MaintenanceJob` instead of
// `use dukkan_core::types::MaintenanceJob`

pub use error::{CoreError, CoreResult, ValidationError};
pub use finance::{derive_financials, total_part_cost, Derived};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Width of generated inventory barcodes (zero-padded decimal digits).
///
/// ## Why a constant?
/// Barcodes are compared as normalized strings everywhere (duplicate checks,
/// counter seeding), so the padding width must be identical across the
/// allocator and the phone repository.
pub const BARCODE_WIDTH: usize = 6;

/// Default commission percentage for newly registered technicians.
///
/// ## Business Reason
/// Technicians earn half of the repair profit unless the shop owner sets a
/// different rate. Jobs that carry no explicit rate earn no commission at all
/// (see [`finance::derive_financials`]), so this default only applies when a
/// technician record is created.
pub const DEFAULT_TECH_COMMISSION_PERCENT: f64 = 0.5;

/// Display name used when a job references a rep or technician without a name.
pub const UNNAMED_PARTY: &str = "unspecified";
