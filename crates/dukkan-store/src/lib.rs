//! # dukkan-store: Document-Store Boundary
//!
//! This crate defines the contract Dukkan holds with its hosted document
//! database, plus an in-memory engine implementing that contract.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dukkan Data Flow                                 │
//! │                                                                         │
//! │  dukkan-db repositories (typed, per collection)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  dukkan-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ DocumentStore │    │   Documents   │    │  MemoryStore │  │   │
//! │  │   │   (trait)     │    │  & Queries    │    │  (engine)    │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ create/get    │◄───│ Predicate     │◄───│ RwLock state │  │   │
//! │  │   │ query/txn     │    │ OrderBy       │    │ watch chans  │  │   │
//! │  │   │ subscribe     │    │ Document      │    │ index table  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `DocumentStore` trait and transaction handle
//! - [`document`] - Document type and typed encode/decode helpers
//! - [`query`] - Predicates and ordering
//! - [`memory`] - In-memory engine
//! - [`error`] - Store error types
//!
//! ## Semantics Promised By Every Implementation
//!
//! - Per-document strong consistency; no cross-document transactions except
//!   [`store::DocumentStore::run_transaction`]
//! - Every write stamps `createdAt` / `updatedAt` server-side
//! - `update` merges top-level fields; absent fields stay untouched
//! - Queries combining a range predicate with another field fail with
//!   [`error::StoreError::IndexUnavailable`] until a matching composite
//!   index exists

// =============================================================================
// Module Declarations
// =============================================================================

pub mod document;
pub mod error;
pub mod memory;
pub mod query;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use document::{encode, Document, Fields};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use query::{Direction, OrderBy, Predicate};
pub use store::{DocumentStore, TransactionOp};
