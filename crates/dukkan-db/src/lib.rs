//! # dukkan-db: Repositories and Settlement Reports
//!
//! All collection access for Dukkan lives here. Every caller goes through
//! a typed repository; raw documents never cross this crate's boundary.
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
//! │  │               ★ dukkan-db (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │  │ Database │ │ reposit- │ │ reports  │ │ collections /    │  │   │
//! │  │  │ (facade) │ │ ories    │ │ (totals) │ │ error            │  │   │
//! │  │  └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │        dukkan-core (logic)     │     dukkan-store (documents)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`database`] - Facade wiring every repository over one store
//! - [`repository`] - One repository per collection
//! - [`reports`] - Per-rep and per-technician settlement totals
//! - [`collections`] - Wire-level collection names
//! - [`error`] - Repository error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collections;
pub mod database;
pub mod error;
pub mod reports;
pub mod repository;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use database::Database;
pub use error::{DbError, DbResult};
pub use reports::SettlementReports;
pub use repository::{
    CounterRepository, JobRepository, PaymentRepository, PhoneRepository, RepRepository,
    SettlementRepository, TechnicianRepository,
};
