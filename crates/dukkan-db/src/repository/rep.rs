//! # Rep Repository
//!
//! CRUD for parts reps. Reps are referenced from job attribution (legacy
//! `repId` or `parts[].repId`) and paid out through settlements.

use serde_json::Value;
use tracing::debug;

use dukkan_core::{NewRep, Rep, RepPatch, ValidationError};
use dukkan_store::{encode, DocumentStore, OrderBy, StoreError};

use crate::collections::REPS;
use crate::error::{DbError, DbResult};
use crate::repository::decode_all;

/// Repository for parts reps.
#[derive(Debug, Clone)]
pub struct RepRepository<S> {
    store: S,
}

impl<S: DocumentStore> RepRepository<S> {
    /// Creates a new RepRepository.
    pub fn new(store: S) -> Self {
        RepRepository { store }
    }

    /// Registers a rep. New reps are always active.
    pub async fn add(&self, rep: NewRep) -> DbResult<String> {
        if rep.name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "name".to_string(),
            }
            .into());
        }

        let mut fields = encode(&rep)?;
        fields.insert("active".to_string(), Value::from(true));

        let id = self.store.create(REPS, fields).await?;
        debug!(id = %id, name = %rep.name, "rep registered");
        Ok(id)
    }

    /// Reads one rep; absence is an error.
    pub async fn get(&self, id: &str) -> DbResult<Rep> {
        let doc = self
            .store
            .get(REPS, id)
            .await?
            .ok_or_else(|| DbError::not_found("rep", id))?;
        Ok(doc.decode()?)
    }

    /// All reps, by name.
    pub async fn list(&self) -> DbResult<Vec<Rep>> {
        let docs = self
            .store
            .query(REPS, &[], Some(&OrderBy::asc("name")))
            .await?;
        Ok(decode_all(REPS, &docs))
    }

    /// Applies a partial update.
    pub async fn update(&self, id: &str, patch: RepPatch) -> DbResult<()> {
        self.store
            .update(REPS, id, encode(&patch)?)
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => DbError::not_found("rep", id),
                other => other.into(),
            })?;
        debug!(id, "rep updated");
        Ok(())
    }

    /// Removes a rep. Historical jobs keep their attribution.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.store.delete(REPS, id).await?;
        debug!(id, "rep deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
