//! # Settlement Repository
//!
//! Settlement records and their one-way lifecycle.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Settlement Lifecycle                                 │
//! │                                                                         │
//! │  create() ──► { status: open }                                         │
//! │                     │                                                   │
//! │                     ▼  mark_paid(id, notes)                            │
//! │               { status: paid, paidAt: now, notes }                     │
//! │                     │                                                   │
//! │                     ▼  mark_paid again?                                │
//! │               InvalidSettlementTransition - paid is terminal           │
//! │                                                                         │
//! │  The recorded amount is a SNAPSHOT of the aggregation at creation      │
//! │  time; later job edits do not rewrite history.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use dukkan_core::{
    CoreError, NewSettlement, Settlement, SettlementFilter, SettlementStatus, ValidationError,
};
use dukkan_store::{encode, DocumentStore, Fields, OrderBy, Predicate};

use crate::collections::SETTLEMENTS;
use crate::error::{DbError, DbResult};
use crate::repository::decode_all;

/// Repository for settlement records.
#[derive(Debug, Clone)]
pub struct SettlementRepository<S> {
    store: S,
}

impl<S: DocumentStore> SettlementRepository<S> {
    /// Creates a new SettlementRepository.
    pub fn new(store: S) -> Self {
        SettlementRepository { store }
    }

    /// Opens a settlement. Status is always `open`.
    pub async fn create(&self, settlement: NewSettlement) -> DbResult<String> {
        if settlement.amount < 0.0 {
            return Err(ValidationError::Negative {
                field: "amount".to_string(),
                value: settlement.amount,
            }
            .into());
        }

        let mut fields = encode(&settlement)?;
        fields.insert(
            "status".to_string(),
            Value::from(SettlementStatus::Open.as_str()),
        );

        let id = self.store.create(SETTLEMENTS, fields).await?;
        debug!(id = %id, amount = settlement.amount, "settlement opened");
        Ok(id)
    }

    /// Reads one settlement; absence is an error.
    pub async fn get(&self, id: &str) -> DbResult<Settlement> {
        let doc = self
            .store
            .get(SETTLEMENTS, id)
            .await?
            .ok_or_else(|| DbError::not_found("settlement", id))?;
        Ok(doc.decode()?)
    }

    /// Lists settlements matching `filter`, newest first.
    pub async fn list(&self, filter: &SettlementFilter) -> DbResult<Vec<Settlement>> {
        let mut predicates = Vec::new();
        if let Some(kind) = filter.kind {
            predicates.push(Predicate::eq("type", kind.as_str()));
        }
        if let Some(status) = filter.status {
            predicates.push(Predicate::eq("status", status.as_str()));
        }

        let docs = self
            .store
            .query(SETTLEMENTS, &predicates, Some(&OrderBy::desc("createdAt")))
            .await?;
        Ok(decode_all(SETTLEMENTS, &docs))
    }

    /// Marks a settlement paid, stamping `paidAt` and optional notes.
    ///
    /// Paid is terminal: a second call fails with
    /// [`CoreError::InvalidSettlementTransition`] and changes nothing.
    pub async fn mark_paid(&self, id: &str, notes: Option<String>) -> DbResult<Settlement> {
        let settlement = self.get(id).await?;
        if settlement.status == SettlementStatus::Paid {
            return Err(CoreError::InvalidSettlementTransition {
                id: id.to_string(),
                status: settlement.status.as_str().to_string(),
            }
            .into());
        }

        let mut fields = Fields::new();
        fields.insert(
            "status".to_string(),
            Value::from(SettlementStatus::Paid.as_str()),
        );
        fields.insert("paidAt".to_string(), serde_json::to_value(Utc::now())?);
        if let Some(notes) = notes {
            fields.insert("notes".to_string(), Value::from(notes));
        }

        self.store.update(SETTLEMENTS, id, fields).await?;
        debug!(id, "settlement marked paid");
        self.get(id).await
    }

    /// Removes a settlement record.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.store.delete(SETTLEMENTS, id).await?;
        debug!(id, "settlement deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
