//! # In-Memory Document Store
//!
//! An in-memory [`DocumentStore`] implementation that reproduces the hosted
//! store's observable semantics, including the awkward ones:
//!
//! - server-assigned `createdAt`/`updatedAt` on every write
//! - merge updates that only touch the fields present in the patch
//! - missing-index failures for range-plus-other-field queries, until a
//!   composite index is registered with [`MemoryStore::register_index`]
//! - optimistic serializable transactions: reads are version-checked at
//!   commit and the closure re-runs on contention
//!
//! ## Concurrency Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  One RwLock over all collections. Plain reads/writes take it briefly.  │
//! │                                                                         │
//! │  Transactions never hold it across the closure:                        │
//! │                                                                         │
//! │    snapshot (read lock) ──► run closure (no lock) ──► commit           │
//! │         ▲                                             (write lock,     │
//! │         │              version mismatch? retry        version check)   │
//! │         └─────────────────────────────────────────────────┘            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::document::{Document, Fields};
use crate::error::{StoreError, StoreResult};
use crate::query::{compare, Direction, OrderBy, Predicate};
use crate::store::{DocumentStore, SnapshotReader, TransactionOp, TxWrite};

// =============================================================================
// Constants
// =============================================================================

/// Retry budget for optimistic transactions before surfacing
/// [`StoreError::TransientConflict`].
const TXN_MAX_ATTEMPTS: u32 = 25;

/// Server timestamp field names stamped on every write.
const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

// =============================================================================
// Internal State
// =============================================================================

#[derive(Debug, Clone)]
struct StoredDoc {
    fields: Fields,
    /// Bumped on every committed write; transactions validate against it.
    version: u64,
}

#[derive(Debug, Default)]
struct Collection {
    docs: BTreeMap<String, StoredDoc>,
    /// Lazily created on first subscription.
    watch: Option<watch::Sender<Vec<Document>>>,
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<String, Collection>,
    /// Registered composite indexes, each an exact set of field names.
    indexes: HashSet<IndexFields>,
}

type IndexFields = std::collections::BTreeSet<String>;

/// A point-in-time copy of all documents, used by transactions.
type Snapshot = HashMap<String, BTreeMap<String, StoredDoc>>;

impl SnapshotReader for Snapshot {
    fn read(&self, collection: &str, id: &str) -> Option<(Document, u64)> {
        let doc = self.get(collection)?.get(id)?;
        Some((Document::new(id, doc.fields.clone()), doc.version))
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory document store. Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Registers a composite index over an exact set of fields, enabling
    /// queries that combine a range predicate on one of them with
    /// predicates on the others.
    pub async fn register_index(&self, fields: &[&str]) {
        let set: IndexFields = fields.iter().map(|f| f.to_string()).collect();
        self.state.write().await.indexes.insert(set);
    }

    /// Number of documents currently in a collection (test helper).
    pub async fn len(&self, collection: &str) -> usize {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map(|c| c.docs.len())
            .unwrap_or(0)
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}

/// Server timestamp value, RFC 3339.
fn server_now() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

impl State {
    /// Applies create-or-replace semantics: preserves `createdAt` when
    /// replacing, stamps both timestamps otherwise, bumps the version.
    fn apply_set(&mut self, collection: &str, id: &str, mut fields: Fields) {
        let coll = self.collections.entry(collection.to_string()).or_default();
        let (created_at, version) = match coll.docs.get(id) {
            Some(existing) => (
                existing.fields.get(CREATED_AT).cloned(),
                existing.version + 1,
            ),
            None => (None, 1),
        };
        fields.insert(
            CREATED_AT.to_string(),
            created_at.unwrap_or_else(server_now),
        );
        fields.insert(UPDATED_AT.to_string(), server_now());
        coll.docs
            .insert(id.to_string(), StoredDoc { fields, version });
    }

    fn apply_delete(&mut self, collection: &str, id: &str) -> bool {
        self.collections
            .get_mut(collection)
            .map(|c| c.docs.remove(id).is_some())
            .unwrap_or(false)
    }

    /// Pushes the current collection snapshot to subscribers, if any.
    fn notify(&self, collection: &str) {
        if let Some(coll) = self.collections.get(collection) {
            if let Some(tx) = &coll.watch {
                tx.send_replace(snapshot_docs(coll));
            }
        }
    }

    fn clone_docs(&self) -> Snapshot {
        self.collections
            .iter()
            .map(|(name, coll)| (name.clone(), coll.docs.clone()))
            .collect()
    }
}

fn snapshot_docs(coll: &Collection) -> Vec<Document> {
    coll.docs
        .iter()
        .map(|(id, doc)| Document::new(id.clone(), doc.fields.clone()))
        .collect()
}

/// The composite index a predicate set demands, if any.
///
/// A range predicate combined with predicates on other fields needs an
/// index over the exact field set; equality-only combinations and
/// single-field ranges do not.
fn required_index(predicates: &[Predicate]) -> Option<IndexFields> {
    let fields: IndexFields = predicates.iter().map(|p| p.field.clone()).collect();
    let has_range = predicates.iter().any(|p| p.op.is_range());
    if has_range && fields.len() >= 2 {
        Some(fields)
    } else {
        None
    }
}

// =============================================================================
// DocumentStore Implementation
// =============================================================================

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let mut state = self.state.write().await;
        state.apply_set(collection, &id, fields);
        state.notify(collection);
        debug!(collection, id = %id, "document created");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .and_then(|c| c.docs.get(id))
            .map(|doc| Document::new(id, doc.fields.clone())))
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.apply_set(collection, id, fields);
        state.notify(collection);
        debug!(collection, id, "document set");
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let doc = state
            .collections
            .get_mut(collection)
            .and_then(|c| c.docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        for (key, value) in patch {
            doc.fields.insert(key, value);
        }
        doc.fields.insert(UPDATED_AT.to_string(), server_now());
        doc.version += 1;
        state.notify(collection);
        debug!(collection, id, "document updated");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.apply_delete(collection, id) {
            state.notify(collection);
            debug!(collection, id, "document deleted");
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        predicates: &[Predicate],
        order: Option<&OrderBy>,
    ) -> StoreResult<Vec<Document>> {
        let state = self.state.read().await;

        if let Some(needed) = required_index(predicates) {
            if !state.indexes.contains(&needed) {
                return Err(StoreError::IndexUnavailable {
                    collection: collection.to_string(),
                    fields: needed.into_iter().collect::<Vec<_>>().join(", "),
                });
            }
        }

        let mut results: Vec<Document> = state
            .collections
            .get(collection)
            .map(|coll| {
                coll.docs
                    .iter()
                    .filter(|(_, doc)| predicates.iter().all(|p| p.matches(&doc.fields)))
                    .map(|(id, doc)| Document::new(id.clone(), doc.fields.clone()))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order {
            results.sort_by(|a, b| {
                use std::cmp::Ordering;
                match (a.fields.get(&order.field), b.fields.get(&order.field)) {
                    (Some(x), Some(y)) => {
                        let ord = compare(x, y).unwrap_or(Ordering::Equal);
                        match order.direction {
                            Direction::Asc => ord,
                            Direction::Desc => ord.reverse(),
                        }
                    }
                    // Missing field sorts last regardless of direction
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }

        Ok(results)
    }

    async fn run_transaction<T, F>(&self, mut f: F) -> StoreResult<T>
    where
        T: Send,
        F: FnMut(&mut TransactionOp<'_>) -> StoreResult<T> + Send,
    {
        for attempt in 1..=TXN_MAX_ATTEMPTS {
            let snapshot: Snapshot = self.state.read().await.clone_docs();

            let mut op = TransactionOp::new(&snapshot);
            // A closure error aborts the transaction without retry and
            // without applying anything.
            let value = f(&mut op)?;

            let mut state = self.state.write().await;
            let conflicted = op.reads.iter().any(|read| {
                let current = state
                    .collections
                    .get(&read.collection)
                    .and_then(|c| c.docs.get(&read.id))
                    .map(|doc| doc.version);
                current != read.version
            });
            if conflicted {
                drop(state);
                debug!(attempt, "transaction conflict, retrying");
                continue;
            }

            let mut touched: HashSet<String> = HashSet::new();
            for write in op.writes {
                match write {
                    TxWrite::Set {
                        collection,
                        id,
                        fields,
                    } => {
                        state.apply_set(&collection, &id, fields);
                        touched.insert(collection);
                    }
                    TxWrite::Delete { collection, id } => {
                        state.apply_delete(&collection, &id);
                        touched.insert(collection);
                    }
                }
            }
            for collection in touched {
                state.notify(&collection);
            }
            return Ok(value);
        }

        warn!(
            attempts = TXN_MAX_ATTEMPTS,
            "transaction retry budget exhausted"
        );
        Err(StoreError::TransientConflict {
            attempts: TXN_MAX_ATTEMPTS,
        })
    }

    async fn subscribe(&self, collection: &str) -> watch::Receiver<Vec<Document>> {
        let mut state = self.state.write().await;
        let coll = state
            .collections
            .entry(collection.to_string())
            .or_default();
        if let Some(tx) = &coll.watch {
            return tx.subscribe();
        }
        let (tx, rx) = watch::channel(snapshot_docs(coll));
        coll.watch = Some(tx);
        rx
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_create_stamps_timestamps() {
        let store = MemoryStore::new();
        let id = store
            .create("phones", fields(json!({"phone_number": "000001"})))
            .await
            .unwrap();

        let doc = store.get("phones", &id).await.unwrap().unwrap();
        assert_eq!(doc.field("phone_number"), Some(&json!("000001")));
        assert!(doc.field("createdAt").is_some());
        assert!(doc.field("updatedAt").is_some());
    }

    #[tokio::test]
    async fn test_update_merges_and_preserves_other_fields() {
        let store = MemoryStore::new();
        let id = store
            .create("phones", fields(json!({"brand": "Pixel", "price": 300.0})))
            .await
            .unwrap();

        store
            .update("phones", &id, fields(json!({"price": 280.0})))
            .await
            .unwrap();

        let doc = store.get("phones", &id).await.unwrap().unwrap();
        assert_eq!(doc.field("brand"), Some(&json!("Pixel")));
        assert_eq!(doc.field("price"), Some(&json!(280.0)));
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store
            .update("phones", "nope", fields(json!({"x": 1})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_preserves_created_at_on_replace() {
        let store = MemoryStore::new();
        store
            .set("counters", "phoneBarcode", fields(json!({"lastNumber": 1})))
            .await
            .unwrap();
        let first = store.get("counters", "phoneBarcode").await.unwrap().unwrap();
        let created = first.field("createdAt").cloned();

        store
            .set("counters", "phoneBarcode", fields(json!({"lastNumber": 2})))
            .await
            .unwrap();
        let second = store.get("counters", "phoneBarcode").await.unwrap().unwrap();
        assert_eq!(second.field("lastNumber"), Some(&json!(2)));
        assert_eq!(second.field("createdAt").cloned(), created);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let id = store.create("phones", Fields::new()).await.unwrap();
        store.delete("phones", &id).await.unwrap();
        store.delete("phones", &id).await.unwrap();
        assert!(store.get("phones", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_equality_and_single_field_range() {
        let store = MemoryStore::new();
        for (status, date) in [
            ("pending", "2026-01-05T00:00:00+00:00"),
            ("completed", "2026-01-10T00:00:00+00:00"),
            ("completed", "2026-02-10T00:00:00+00:00"),
        ] {
            store
                .create(
                    "maintenanceJobs",
                    fields(json!({"status": status, "visitDate": date})),
                )
                .await
                .unwrap();
        }

        let completed = store
            .query(
                "maintenanceJobs",
                &[Predicate::eq("status", "completed")],
                None,
            )
            .await
            .unwrap();
        assert_eq!(completed.len(), 2);

        // Single-field range needs no composite index
        let january = store
            .query(
                "maintenanceJobs",
                &[
                    Predicate::gte("visitDate", "2026-01-01T00:00:00+00:00"),
                    Predicate::lte("visitDate", "2026-01-31T00:00:00+00:00"),
                ],
                None,
            )
            .await
            .unwrap();
        assert_eq!(january.len(), 2);
    }

    #[tokio::test]
    async fn test_compound_query_requires_registered_index() {
        let store = MemoryStore::new();
        store
            .create(
                "maintenanceJobs",
                fields(json!({"status": "completed", "visitDate": "2026-01-10T00:00:00+00:00"})),
            )
            .await
            .unwrap();

        let predicates = [
            Predicate::eq("status", "completed"),
            Predicate::gte("visitDate", "2026-01-01T00:00:00+00:00"),
        ];

        let err = store
            .query("maintenanceJobs", &predicates, None)
            .await
            .unwrap_err();
        assert!(err.is_index_unavailable());

        store.register_index(&["status", "visitDate"]).await;
        let docs = store
            .query("maintenanceJobs", &predicates, None)
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_query_order_desc() {
        let store = MemoryStore::new();
        for date in ["2026-01-02", "2026-01-03", "2026-01-01"] {
            store
                .create("payments", fields(json!({"paymentDate": date})))
                .await
                .unwrap();
        }
        let docs = store
            .query("payments", &[], Some(&OrderBy::desc("paymentDate")))
            .await
            .unwrap();
        let dates: Vec<_> = docs
            .iter()
            .map(|d| d.field("paymentDate").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2026-01-03", "2026-01-02", "2026-01-01"]);
    }

    #[tokio::test]
    async fn test_transaction_read_modify_write() {
        let store = MemoryStore::new();
        store
            .set("counters", "c", fields(json!({"lastNumber": 41})))
            .await
            .unwrap();

        let next = store
            .run_transaction(|txn| {
                let last = txn
                    .get("counters", "c")
                    .and_then(|doc| doc.field("lastNumber").and_then(Value::as_i64))
                    .unwrap_or(0);
                let next = last + 1;
                txn.set("counters", "c", fields(json!({"lastNumber": next})));
                Ok(next)
            })
            .await
            .unwrap();

        assert_eq!(next, 42);
        let doc = store.get("counters", "c").await.unwrap().unwrap();
        assert_eq!(doc.field("lastNumber"), Some(&json!(42)));
    }

    #[tokio::test]
    async fn test_transaction_closure_error_aborts_without_writes() {
        let store = MemoryStore::new();
        let result: StoreResult<()> = store
            .run_transaction(|txn| {
                txn.set("counters", "c", fields(json!({"lastNumber": 99})));
                Err(StoreError::not_found("counters", "boom"))
            })
            .await;
        assert!(result.is_err());
        assert!(store.get("counters", "c").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transactions_serialize() {
        let store = MemoryStore::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .run_transaction(|txn| {
                        let last = txn
                            .get("counters", "c")
                            .and_then(|doc| doc.field("lastNumber").and_then(Value::as_i64))
                            .unwrap_or(0);
                        txn.set("counters", "c", fields(json!({"lastNumber": last + 1})));
                        Ok(last + 1)
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut seen: Vec<i64> = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_subscribe_sees_initial_and_updated_snapshots() {
        let store = MemoryStore::new();
        store.create("phones", Fields::new()).await.unwrap();

        let mut rx = store.subscribe("phones").await;
        assert_eq!(rx.borrow().len(), 1);

        store.create("phones", Fields::new()).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 2);
    }
}
