//! # Technician Repository
//!
//! CRUD for repair technicians. The commission rate stored here is the
//! DEFAULT applied when a job doesn't carry its own `techPercent`; the
//! derived financials always use the job's rate, never this one.

use serde_json::Value;
use tracing::debug;

use dukkan_core::{
    NewTechnician, Technician, TechnicianPatch, ValidationError, DEFAULT_TECH_COMMISSION_PERCENT,
};
use dukkan_store::{encode, DocumentStore, OrderBy, StoreError};

use crate::collections::TECHNICIANS;
use crate::error::{DbError, DbResult};
use crate::repository::decode_all;

/// Repository for repair technicians.
#[derive(Debug, Clone)]
pub struct TechnicianRepository<S> {
    store: S,
}

impl<S: DocumentStore> TechnicianRepository<S> {
    /// Creates a new TechnicianRepository.
    pub fn new(store: S) -> Self {
        TechnicianRepository { store }
    }

    /// Registers a technician. New technicians are always active and get
    /// the shop default commission rate unless one is given.
    pub async fn add(&self, technician: NewTechnician) -> DbResult<String> {
        if technician.name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "name".to_string(),
            }
            .into());
        }
        let percent = technician
            .default_commission_percent
            .unwrap_or(DEFAULT_TECH_COMMISSION_PERCENT);
        if percent < 0.0 {
            return Err(ValidationError::Negative {
                field: "defaultCommissionPercent".to_string(),
                value: percent,
            }
            .into());
        }

        let mut fields = encode(&technician)?;
        fields.insert("active".to_string(), Value::from(true));
        fields.insert(
            "defaultCommissionPercent".to_string(),
            Value::from(percent),
        );

        let id = self.store.create(TECHNICIANS, fields).await?;
        debug!(id = %id, name = %technician.name, percent, "technician registered");
        Ok(id)
    }

    /// Reads one technician; absence is an error.
    pub async fn get(&self, id: &str) -> DbResult<Technician> {
        let doc = self
            .store
            .get(TECHNICIANS, id)
            .await?
            .ok_or_else(|| DbError::not_found("technician", id))?;
        Ok(doc.decode()?)
    }

    /// All technicians, by name.
    pub async fn list(&self) -> DbResult<Vec<Technician>> {
        let docs = self
            .store
            .query(TECHNICIANS, &[], Some(&OrderBy::asc("name")))
            .await?;
        Ok(decode_all(TECHNICIANS, &docs))
    }

    /// Applies a partial update.
    pub async fn update(&self, id: &str, patch: TechnicianPatch) -> DbResult<()> {
        if let Some(percent) = patch.default_commission_percent {
            if percent < 0.0 {
                return Err(ValidationError::Negative {
                    field: "defaultCommissionPercent".to_string(),
                    value: percent,
                }
                .into());
            }
        }

        self.store
            .update(TECHNICIANS, id, encode(&patch)?)
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => DbError::not_found("technician", id),
                other => other.into(),
            })?;
        debug!(id, "technician updated");
        Ok(())
    }

    /// Removes a technician. Historical jobs keep their tech reference.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.store.delete(TECHNICIANS, id).await?;
        debug!(id, "technician deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
