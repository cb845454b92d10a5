//! # Counter Repository
//!
//! Sequential identifier allocation for inventory barcodes.
//!
//! ## Allocation Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Barcode Allocation                                 │
//! │                                                                         │
//! │  1. SEED (first use only)                                              │
//! │     counter document absent?                                           │
//! │     └── scan phones, parse digits out of every phone_number,           │
//! │         seed = max (0 when inventory is empty)                         │
//! │                                                                         │
//! │  2. INCREMENT (serializable transaction)                               │
//! │     read lastNumber ──► next = last + 1 ──► write back                 │
//! │     contention re-runs the whole closure against a fresh snapshot      │
//! │                                                                         │
//! │  3. FORMAT                                                             │
//! │     next = 42 ──► "000042"  (BARCODE_WIDTH zero-padded digits)         │
//! │                                                                         │
//! │  Two concurrent callers NEVER receive the same number.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::Value;
use tracing::debug;

use dukkan_core::validation::barcode_digits;
use dukkan_core::BARCODE_WIDTH;
use dukkan_store::{DocumentStore, Fields};

use crate::collections::{COUNTERS, PHONES};
use crate::error::DbResult;

/// Field holding the last allocated number inside a counter document.
const LAST_NUMBER: &str = "lastNumber";

/// Repository for named sequential counters.
#[derive(Debug, Clone)]
pub struct CounterRepository<S> {
    store: S,
}

impl<S: DocumentStore> CounterRepository<S> {
    /// Creates a new CounterRepository.
    pub fn new(store: S) -> Self {
        CounterRepository { store }
    }

    /// Allocates the next number from `counter` and returns it as a
    /// zero-padded barcode string.
    ///
    /// Seeding from existing inventory happens lazily on first use, so a
    /// dataset that predates the counter keeps numbering from where its
    /// highest barcode left off.
    pub async fn allocate(&self, counter: &str) -> DbResult<String> {
        let seed = match self.store.get(COUNTERS, counter).await? {
            Some(_) => 0,
            None => self.seed_from_phones().await?,
        };

        let next = self
            .store
            .run_transaction(|txn| {
                let last = txn
                    .get(COUNTERS, counter)
                    .and_then(|doc| doc.field(LAST_NUMBER).and_then(Value::as_i64))
                    .unwrap_or(seed);
                let next = last + 1;
                let mut fields = Fields::new();
                fields.insert(LAST_NUMBER.to_string(), Value::from(next));
                txn.set(COUNTERS, counter, fields);
                Ok(next)
            })
            .await?;

        debug!(counter, next, "allocated sequential number");
        Ok(format!("{next:0width$}", width = BARCODE_WIDTH))
    }

    /// Highest numeric barcode already present in inventory, 0 when empty.
    async fn seed_from_phones(&self) -> DbResult<i64> {
        let docs = self.store.query(PHONES, &[], None).await?;
        let max = docs
            .iter()
            .filter_map(|doc| doc.field("phone_number").and_then(Value::as_str))
            .filter_map(barcode_digits)
            .max()
            .unwrap_or(0);
        debug!(max, "seeded counter from phone inventory");
        Ok(max)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dukkan_store::MemoryStore;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_first_allocation_starts_at_one() {
        let repo = CounterRepository::new(MemoryStore::new());
        assert_eq!(repo.allocate("phoneBarcode").await.unwrap(), "000001");
        assert_eq!(repo.allocate("phoneBarcode").await.unwrap(), "000002");
    }

    #[tokio::test]
    async fn test_seeds_from_existing_inventory() {
        let store = MemoryStore::new();
        for number in ["000041", "000007", "BC-000019"] {
            store
                .create(PHONES, fields(json!({"phone_number": number})))
                .await
                .unwrap();
        }

        let repo = CounterRepository::new(store);
        assert_eq!(repo.allocate("phoneBarcode").await.unwrap(), "000042");
    }

    #[tokio::test]
    async fn test_unparsable_barcodes_are_ignored_when_seeding() {
        let store = MemoryStore::new();
        store
            .create(PHONES, fields(json!({"phone_number": "no digits"})))
            .await
            .unwrap();

        let repo = CounterRepository::new(store);
        assert_eq!(repo.allocate("phoneBarcode").await.unwrap(), "000001");
    }

    #[tokio::test]
    async fn test_counters_are_independent_per_name() {
        let repo = CounterRepository::new(MemoryStore::new());
        assert_eq!(repo.allocate("phoneBarcode").await.unwrap(), "000001");
        assert_eq!(repo.allocate("invoice").await.unwrap(), "000001");
        assert_eq!(repo.allocate("phoneBarcode").await.unwrap(), "000002");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_allocations_never_collide() {
        let repo = CounterRepository::new(MemoryStore::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(
                async move { repo.allocate("phoneBarcode").await },
            ));
        }

        let mut barcodes = Vec::new();
        for handle in handles {
            barcodes.push(handle.await.unwrap().unwrap());
        }
        barcodes.sort();
        let expected: Vec<String> = (1..=8).map(|n| format!("{n:06}")).collect();
        assert_eq!(barcodes, expected);
    }
}
