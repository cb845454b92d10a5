//! # Phone Repository
//!
//! Inventory operations for phones.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Registering a Phone                               │
//! │                                                                         │
//! │  1. VALIDATE     barcode present, price non-negative                   │
//! │  2. NORMALIZE    trim + zero-pad to 6 digits ("42" → "000042")         │
//! │  3. DEDUPLICATE  query phone_number == normalized; any hit rejects     │
//! │  4. WRITE        only after every check passed (never partial)         │
//! │                                                                         │
//! │  The same normalization feeds the counter seed, so comparing           │
//! │  normalized strings is always apples-to-apples.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::sync::watch;
use tracing::debug;

use dukkan_core::validation::{normalize_barcode, validate_new_phone};
use dukkan_core::{NewPhone, Phone, PhonePatch, ValidationError};
use dukkan_store::{encode, DocumentStore, OrderBy, Predicate, StoreError};

use crate::collections::PHONES;
use crate::error::{DbError, DbResult};
use crate::repository::{decode_all, spawn_decoder};

/// Repository for phone inventory operations.
#[derive(Debug, Clone)]
pub struct PhoneRepository<S> {
    store: S,
}

impl<S: DocumentStore> PhoneRepository<S> {
    /// Creates a new PhoneRepository.
    pub fn new(store: S) -> Self {
        PhoneRepository { store }
    }

    /// Registers a phone. The barcode is normalized before the duplicate
    /// check and before storage.
    pub async fn add(&self, mut phone: NewPhone) -> DbResult<String> {
        validate_new_phone(&phone)?;
        let barcode = normalize_barcode(&phone.phone_number)?;
        self.ensure_unique_barcode(&barcode, None).await?;
        phone.phone_number = barcode;

        let id = self.store.create(PHONES, encode(&phone)?).await?;
        debug!(id = %id, barcode = %phone.phone_number, "phone registered");
        Ok(id)
    }

    /// Reads one phone; absence is an error.
    pub async fn get(&self, id: &str) -> DbResult<Phone> {
        let doc = self
            .store
            .get(PHONES, id)
            .await?
            .ok_or_else(|| DbError::not_found("phone", id))?;
        Ok(doc.decode()?)
    }

    /// All phones, newest first.
    pub async fn list(&self) -> DbResult<Vec<Phone>> {
        let docs = self
            .store
            .query(PHONES, &[], Some(&OrderBy::desc("createdAt")))
            .await?;
        Ok(decode_all(PHONES, &docs))
    }

    /// Applies a partial update. A changed barcode goes through the same
    /// normalize-and-deduplicate path as registration, excluding the phone
    /// itself from the duplicate check.
    pub async fn update(&self, id: &str, mut patch: PhonePatch) -> DbResult<()> {
        if let Some(raw) = &patch.phone_number {
            let barcode = normalize_barcode(raw)?;
            self.ensure_unique_barcode(&barcode, Some(id)).await?;
            patch.phone_number = Some(barcode);
        }

        self.store
            .update(PHONES, id, encode(&patch)?)
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => DbError::not_found("phone", id),
                other => other.into(),
            })?;
        debug!(id, "phone updated");
        Ok(())
    }

    /// Removes a phone from inventory.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.store.delete(PHONES, id).await?;
        debug!(id, "phone deleted");
        Ok(())
    }

    /// Live snapshots of the whole inventory.
    pub async fn subscribe(&self) -> watch::Receiver<Vec<Phone>> {
        spawn_decoder(PHONES, self.store.subscribe(PHONES).await)
    }

    async fn ensure_unique_barcode(&self, barcode: &str, exclude: Option<&str>) -> DbResult<()> {
        let hits = self
            .store
            .query(PHONES, &[Predicate::eq("phone_number", barcode)], None)
            .await?;
        if hits.iter().any(|doc| Some(doc.id.as_str()) != exclude) {
            return Err(ValidationError::Duplicate {
                field: "phone_number".to_string(),
                value: barcode.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dukkan_store::MemoryStore;

    fn new_phone(number: &str) -> NewPhone {
        NewPhone {
            phone_number: number.to_string(),
            brand: Some("Pixel".to_string()),
            model: Some("8".to_string()),
            serial_number: None,
            description: None,
            customer_name: None,
            price: Some(250.0),
        }
    }

    #[tokio::test]
    async fn test_add_normalizes_barcode() {
        let repo = PhoneRepository::new(MemoryStore::new());
        let id = repo.add(new_phone(" 42 ")).await.unwrap();

        let phone = repo.get(&id).await.unwrap();
        assert_eq!(phone.phone_number, "000042");
        assert_eq!(phone.brand.as_deref(), Some("Pixel"));
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected_before_write() {
        let repo = PhoneRepository::new(MemoryStore::new());
        repo.add(new_phone("000042")).await.unwrap();

        // Same barcode in un-normalized form still collides
        let err = repo.add(new_phone("42")).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::Duplicate { .. })
        ));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_barcode_rejected() {
        let repo = PhoneRepository::new(MemoryStore::new());
        let err = repo.add(new_phone("   ")).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let repo = PhoneRepository::new(MemoryStore::new());
        let mut phone = new_phone("000001");
        phone.price = Some(-1.0);
        let err = repo.add(phone).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::Negative { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_merges_without_clobbering() {
        let repo = PhoneRepository::new(MemoryStore::new());
        let id = repo.add(new_phone("000042")).await.unwrap();

        repo.update(
            &id,
            PhonePatch {
                price: Some(199.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let phone = repo.get(&id).await.unwrap();
        assert_eq!(phone.price, Some(199.0));
        assert_eq!(phone.brand.as_deref(), Some("Pixel"));
        assert_eq!(phone.phone_number, "000042");
    }

    #[tokio::test]
    async fn test_update_rebarcode_checks_duplicates_excluding_self() {
        let repo = PhoneRepository::new(MemoryStore::new());
        let a = repo.add(new_phone("000001")).await.unwrap();
        repo.add(new_phone("000002")).await.unwrap();

        // Re-writing a phone's own barcode is fine
        repo.update(
            &a,
            PhonePatch {
                phone_number: Some("1".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // Taking another phone's barcode is not
        let err = repo
            .update(
                &a,
                PhonePatch {
                    phone_number: Some("000002".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = PhoneRepository::new(MemoryStore::new());
        let err = repo.get("nope").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity: "phone", .. }));
    }

    #[tokio::test]
    async fn test_subscribe_tracks_inventory() {
        let repo = PhoneRepository::new(MemoryStore::new());
        repo.add(new_phone("000001")).await.unwrap();

        let mut rx = repo.subscribe().await;
        assert_eq!(rx.borrow().len(), 1);

        repo.add(new_phone("000002")).await.unwrap();
        rx.changed().await.unwrap();
        let numbers: Vec<String> = rx
            .borrow()
            .iter()
            .map(|p| p.phone_number.clone())
            .collect();
        assert!(numbers.contains(&"000002".to_string()));
    }
}
