//! # Payment Repository
//!
//! Payments recorded against a rep or technician balance, listed newest
//! first.
//!
//! Listing pushes only the equality filters (entity type/id) into the
//! store; date bounds are applied in memory because combining them with
//! the equality filters would demand a composite index the dataset never
//! had.

use tracing::debug;

use dukkan_core::{NewPayment, Payment, PaymentFilter, PaymentPatch, ValidationError};
use dukkan_store::{encode, DocumentStore, OrderBy, Predicate, StoreError};

use crate::collections::PAYMENTS;
use crate::error::{DbError, DbResult};
use crate::repository::decode_all;

/// Repository for balance payments.
#[derive(Debug, Clone)]
pub struct PaymentRepository<S> {
    store: S,
}

impl<S: DocumentStore> PaymentRepository<S> {
    /// Creates a new PaymentRepository.
    pub fn new(store: S) -> Self {
        PaymentRepository { store }
    }

    /// Records a payment.
    pub async fn add(&self, payment: NewPayment) -> DbResult<String> {
        if payment.amount < 0.0 {
            return Err(ValidationError::Negative {
                field: "amount".to_string(),
                value: payment.amount,
            }
            .into());
        }

        let id = self.store.create(PAYMENTS, encode(&payment)?).await?;
        debug!(id = %id, amount = payment.amount, "payment recorded");
        Ok(id)
    }

    /// Reads one payment; absence is an error.
    pub async fn get(&self, id: &str) -> DbResult<Payment> {
        let doc = self
            .store
            .get(PAYMENTS, id)
            .await?
            .ok_or_else(|| DbError::not_found("payment", id))?;
        Ok(doc.decode()?)
    }

    /// Lists payments matching `filter`, newest payment date first.
    pub async fn list(&self, filter: &PaymentFilter) -> DbResult<Vec<Payment>> {
        let mut predicates = Vec::new();
        if let Some(kind) = filter.entity_type {
            predicates.push(Predicate::eq("entityType", kind.as_str()));
        }
        if let Some(entity_id) = &filter.entity_id {
            predicates.push(Predicate::eq("entityId", entity_id.as_str()));
        }

        let docs = self
            .store
            .query(PAYMENTS, &predicates, Some(&OrderBy::desc("paymentDate")))
            .await?;
        let mut payments: Vec<Payment> = decode_all(PAYMENTS, &docs);

        if let Some(from) = filter.date_from {
            payments.retain(|p| p.payment_date >= from);
        }
        if let Some(to) = filter.date_to {
            payments.retain(|p| p.payment_date <= to);
        }
        Ok(payments)
    }

    /// Applies a partial update.
    pub async fn update(&self, id: &str, patch: PaymentPatch) -> DbResult<()> {
        if let Some(amount) = patch.amount {
            if amount < 0.0 {
                return Err(ValidationError::Negative {
                    field: "amount".to_string(),
                    value: amount,
                }
                .into());
            }
        }

        self.store
            .update(PAYMENTS, id, encode(&patch)?)
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => DbError::not_found("payment", id),
                other => other.into(),
            })?;
        debug!(id, "payment updated");
        Ok(())
    }

    /// Removes a payment.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.store.delete(PAYMENTS, id).await?;
        debug!(id, "payment deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use dukkan_core::SettlementType;
    use dukkan_store::MemoryStore;

    fn payment(kind: SettlementType, entity: &str, amount: f64, date: &str) -> NewPayment {
        NewPayment {
            entity_type: kind,
            entity_id: entity.to_string(),
            amount,
            payment_date: date.parse::<DateTime<Utc>>().expect("test date"),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let repo = PaymentRepository::new(MemoryStore::new());
        let id = repo
            .add(payment(SettlementType::Rep, "R1", 75.0, "2026-01-10T00:00:00Z"))
            .await
            .unwrap();

        let stored = repo.get(&id).await.unwrap();
        assert_eq!(stored.entity_id, "R1");
        assert_eq!(stored.amount, 75.0);
        assert_eq!(stored.entity_type, SettlementType::Rep);
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() {
        let repo = PaymentRepository::new(MemoryStore::new());
        let err = repo
            .add(payment(SettlementType::Rep, "R1", -5.0, "2026-01-10T00:00:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let repo = PaymentRepository::new(MemoryStore::new());
        repo.add(payment(SettlementType::Rep, "R1", 10.0, "2026-01-05T00:00:00Z"))
            .await
            .unwrap();
        repo.add(payment(SettlementType::Rep, "R1", 20.0, "2026-02-05T00:00:00Z"))
            .await
            .unwrap();
        repo.add(payment(SettlementType::Technician, "T1", 30.0, "2026-01-20T00:00:00Z"))
            .await
            .unwrap();

        let filter = PaymentFilter {
            entity_type: Some(SettlementType::Rep),
            entity_id: Some("R1".to_string()),
            ..Default::default()
        };
        let amounts: Vec<f64> = repo
            .list(&filter)
            .await
            .unwrap()
            .iter()
            .map(|p| p.amount)
            .collect();
        assert_eq!(amounts, vec![20.0, 10.0]);

        // Date bounds applied locally
        let filter = PaymentFilter {
            date_from: Some("2026-01-10T00:00:00Z".parse().unwrap()),
            date_to: Some("2026-01-31T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        let amounts: Vec<f64> = repo
            .list(&filter)
            .await
            .unwrap()
            .iter()
            .map(|p| p.amount)
            .collect();
        assert_eq!(amounts, vec![30.0]);
    }

    #[tokio::test]
    async fn test_update_amount() {
        let repo = PaymentRepository::new(MemoryStore::new());
        let id = repo
            .add(payment(SettlementType::Rep, "R1", 10.0, "2026-01-05T00:00:00Z"))
            .await
            .unwrap();

        repo.update(
            &id,
            PaymentPatch {
                amount: Some(12.5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(repo.get(&id).await.unwrap().amount, 12.5);
    }
}
