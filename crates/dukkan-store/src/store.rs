//! # The DocumentStore Trait
//!
//! The seam between Dukkan's repositories and whichever document database
//! backs them.
//!
//! ## Why a Trait
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repositories take a store VALUE at construction (dependency           │
//! │  injection), never a process-wide handle. Tests construct them over    │
//! │  MemoryStore; production wires in a client for the hosted store.       │
//! │                                                                         │
//! │  JobRepository<S: DocumentStore> ──┐                                   │
//! │  CounterRepository<S>            ──┼──► S = MemoryStore (tests)        │
//! │  SettlementRepository<S>         ──┘    S = hosted client (prod)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//! - Per-document strong consistency; last writer wins outside transactions
//! - Writes stamp `createdAt`/`updatedAt` server-side
//! - `run_transaction` gives serializable read-modify-write with automatic
//!   retry on contention - the ONLY cross-document atomicity in the system

use async_trait::async_trait;
use tokio::sync::watch;

use crate::document::{Document, Fields};
use crate::error::StoreResult;
use crate::query::{OrderBy, Predicate};

// =============================================================================
// DocumentStore
// =============================================================================

/// Asynchronous document-store client.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates a document with a store-assigned id. Returns the id.
    async fn create(&self, collection: &str, fields: Fields) -> StoreResult<String>;

    /// Reads a document. Absence is `Ok(None)`, not an error - repositories
    /// decide whether absence is a failure for their entity.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Creates or replaces a document under a caller-chosen id
    /// (used for singleton documents such as counters).
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    /// Merges `patch` into an existing document's top-level fields.
    /// Fields absent from the patch are left untouched.
    /// Fails with `NotFound` when the document does not exist.
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> StoreResult<()>;

    /// Deletes a document. Deleting an absent document is a no-op.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Runs a query: all predicates must hold; optional result ordering.
    ///
    /// Combining a range predicate with a predicate on another field
    /// requires a composite index; without one the store fails with
    /// [`crate::StoreError::IndexUnavailable`].
    async fn query(
        &self,
        collection: &str,
        predicates: &[Predicate],
        order: Option<&OrderBy>,
    ) -> StoreResult<Vec<Document>>;

    /// Runs `f` with serializable read-modify-write semantics.
    ///
    /// Reads observe a consistent snapshot; staged writes apply atomically
    /// at commit. On contention the whole closure re-runs against a fresh
    /// snapshot; [`crate::StoreError::TransientConflict`] surfaces only
    /// when the retry budget is exhausted. A closure error aborts without
    /// applying anything and is not retried.
    async fn run_transaction<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send,
        F: FnMut(&mut TransactionOp<'_>) -> StoreResult<T> + Send;

    /// Subscribes to a collection: yields the full collection snapshot now
    /// and again after every mutation. The sequence is unbounded and
    /// restartable; ordering across snapshots is store-provided.
    async fn subscribe(&self, collection: &str) -> watch::Receiver<Vec<Document>>;
}

// =============================================================================
// Transaction Handle
// =============================================================================

/// Versioned read access to the snapshot a transaction runs against.
pub(crate) trait SnapshotReader: Sync {
    /// Returns the document and its commit version, if present.
    fn read(&self, collection: &str, id: &str) -> Option<(Document, u64)>;
}

/// A read recorded during a transaction, for commit-time validation.
/// `version: None` means the document was absent at read time.
pub(crate) struct ReadRecord {
    pub collection: String,
    pub id: String,
    pub version: Option<u64>,
}

/// A write staged during a transaction.
pub(crate) enum TxWrite {
    Set {
        collection: String,
        id: String,
        fields: Fields,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// Read/write handle passed to the transaction closure.
///
/// Reads come from the snapshot taken when the attempt started and do NOT
/// observe this transaction's own staged writes (read before you write).
pub struct TransactionOp<'a> {
    pub(crate) snapshot: &'a dyn SnapshotReader,
    pub(crate) reads: Vec<ReadRecord>,
    pub(crate) writes: Vec<TxWrite>,
}

impl<'a> TransactionOp<'a> {
    pub(crate) fn new(snapshot: &'a dyn SnapshotReader) -> Self {
        TransactionOp {
            snapshot,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Reads a document from the transaction snapshot. The read is
    /// recorded: if the document changes before commit, the transaction
    /// retries.
    pub fn get(&mut self, collection: &str, id: &str) -> Option<Document> {
        let hit = self.snapshot.read(collection, id);
        self.reads.push(ReadRecord {
            collection: collection.to_string(),
            id: id.to_string(),
            version: hit.as_ref().map(|(_, v)| *v),
        });
        hit.map(|(doc, _)| doc)
    }

    /// Stages a create-or-replace write.
    pub fn set(&mut self, collection: &str, id: &str, fields: Fields) {
        self.writes.push(TxWrite::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        });
    }

    /// Stages a delete.
    pub fn delete(&mut self, collection: &str, id: &str) {
        self.writes.push(TxWrite::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
    }
}
