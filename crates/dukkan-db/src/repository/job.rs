//! # Maintenance Job Repository
//!
//! Repair-job CRUD with derived financials and resilient listing.
//!
//! ## Listing Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Listing Jobs                                       │
//! │                                                                         │
//! │  PRIMARY   query: status + techId + visitDate range                    │
//! │     │                                                                   │
//! │     ├── Ok ───────────────► decode                                     │
//! │     │                                                                   │
//! │     └── IndexUnavailable ─► FALLBACK (warn-logged, never surfaced)     │
//! │                             query status only, then filter techId      │
//! │                             and date range in memory                   │
//! │                                                                         │
//! │  ALWAYS LOCAL (both paths):                                            │
//! │    • rep filter - attribution lives inside parts[], not indexable      │
//! │    • sort: normalized visit date, newest first, undated last           │
//! │                                                                         │
//! │  Callers cannot tell which path produced their result.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived Fields
//! `totalPartCost`, `profit`, `techCommission` and `shopProfit` are written
//! ONLY here, recomputed from scratch whenever any of their inputs changes.
//! A patch that touches none of the inputs leaves them untouched.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use dukkan_core::finance::{derive_financials, total_part_cost};
use dukkan_core::validation::validate_new_job;
use dukkan_core::{JobDate, JobFilter, JobPatch, JobStatus, MaintenanceJob, NewMaintenanceJob};
use dukkan_store::{encode, DocumentStore, Predicate, StoreError};

use crate::collections::MAINTENANCE_JOBS;
use crate::error::{DbError, DbResult};
use crate::repository::{decode_all, spawn_decoder};

/// Repository for maintenance job operations.
#[derive(Debug, Clone)]
pub struct JobRepository<S> {
    store: S,
}

impl<S: DocumentStore> JobRepository<S> {
    /// Creates a new JobRepository.
    pub fn new(store: S) -> Self {
        JobRepository { store }
    }

    /// Creates a job. Status is always `pending`; the derived financials
    /// are computed here and stored alongside the inputs.
    pub async fn create(&self, job: NewMaintenanceJob) -> DbResult<String> {
        validate_new_job(&job)?;

        let resolved = total_part_cost(
            job.attribution.parts(),
            job.total_part_cost,
            job.attribution.legacy_part_cost(),
        )
        .unwrap_or(0.0);
        let derived = derive_financials(resolved, job.amount_charged, job.tech_percent.unwrap_or(0.0));

        let mut fields = encode(&job)?;
        fields.insert(
            "status".to_string(),
            Value::from(JobStatus::Pending.as_str()),
        );
        fields.insert("totalPartCost".to_string(), Value::from(resolved));
        fields.insert("profit".to_string(), Value::from(derived.profit));
        fields.insert(
            "techCommission".to_string(),
            Value::from(derived.tech_commission),
        );
        fields.insert("shopProfit".to_string(), Value::from(derived.shop_profit));

        let id = self.store.create(MAINTENANCE_JOBS, fields).await?;
        debug!(id = %id, profit = derived.profit, "maintenance job created");
        Ok(id)
    }

    /// Reads one job; absence is an error.
    pub async fn get(&self, id: &str) -> DbResult<MaintenanceJob> {
        let doc = self
            .store
            .get(MAINTENANCE_JOBS, id)
            .await?
            .ok_or_else(|| DbError::not_found("maintenance job", id))?;
        Ok(doc.decode()?)
    }

    /// Applies a partial update.
    ///
    /// When the patch touches any financial input, the total part cost is
    /// re-resolved - patch fields first, then the stored job's fields - and
    /// all three derived values are recomputed and written with the patch.
    pub async fn update(&self, id: &str, patch: JobPatch) -> DbResult<()> {
        let mut fields = encode(&patch)?;

        if patch.touches_financials() {
            let current = self.get(id).await?;

            let resolved = total_part_cost(patch.parts.as_deref(), patch.total_part_cost, patch.part_cost)
                .or_else(|| {
                    // Stored total of 0 means "not set" in historical
                    // documents, so it must not shadow the legacy cost.
                    let stored_total =
                        (current.total_part_cost != 0.0).then_some(current.total_part_cost);
                    total_part_cost(
                        current.attribution.parts(),
                        stored_total,
                        current.attribution.legacy_part_cost(),
                    )
                })
                .unwrap_or(0.0);

            let amount = patch.amount_charged.unwrap_or(current.amount_charged);
            let percent = patch
                .tech_percent
                .or(current.tech_percent)
                .unwrap_or(0.0);
            let derived = derive_financials(resolved, amount, percent);

            fields.insert("totalPartCost".to_string(), Value::from(resolved));
            fields.insert("profit".to_string(), Value::from(derived.profit));
            fields.insert(
                "techCommission".to_string(),
                Value::from(derived.tech_commission),
            );
            fields.insert("shopProfit".to_string(), Value::from(derived.shop_profit));
        }

        self.store
            .update(MAINTENANCE_JOBS, id, fields)
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => DbError::not_found("maintenance job", id),
                other => other.into(),
            })?;
        debug!(id, "maintenance job updated");
        Ok(())
    }

    /// Removes a job.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.store.delete(MAINTENANCE_JOBS, id).await?;
        debug!(id, "maintenance job deleted");
        Ok(())
    }

    /// Lists jobs matching `filter`, newest visit first.
    ///
    /// The rep filter is never pushed into the store query: attribution can
    /// live inside `parts[]`, which no index reaches. Everything else goes
    /// to the store when possible and degrades to local filtering when the
    /// compound index is missing.
    pub async fn list(&self, filter: &JobFilter) -> DbResult<Vec<MaintenanceJob>> {
        let mut predicates = Vec::new();
        if let Some(status) = filter.status {
            predicates.push(Predicate::eq("status", status.as_str()));
        }
        if let Some(tech_id) = &filter.tech_id {
            predicates.push(Predicate::eq("techId", tech_id.as_str()));
        }
        if let Some(from) = filter.date_from {
            predicates.push(Predicate::gte("visitDate", from.to_rfc3339()));
        }
        if let Some(to) = filter.date_to {
            predicates.push(Predicate::lte("visitDate", to.to_rfc3339()));
        }

        let mut jobs = match self.store.query(MAINTENANCE_JOBS, &predicates, None).await {
            Ok(docs) => decode_all(MAINTENANCE_JOBS, &docs),
            Err(err) if err.is_index_unavailable() => {
                warn!(%err, "compound job query degraded to status-only with local filtering");
                self.list_fallback(filter).await?
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(rep_id) = &filter.rep_id {
            jobs.retain(|job| job.attribution.mentions_rep(rep_id));
        }

        jobs.sort_by(|a, b| cmp_visit_desc(a, b));
        Ok(jobs)
    }

    /// Status-only query plus in-memory technician and date filtering.
    async fn list_fallback(&self, filter: &JobFilter) -> DbResult<Vec<MaintenanceJob>> {
        let predicates: Vec<Predicate> = filter
            .status
            .map(|status| vec![Predicate::eq("status", status.as_str())])
            .unwrap_or_default();
        let docs = self.store.query(MAINTENANCE_JOBS, &predicates, None).await?;
        let mut jobs: Vec<MaintenanceJob> = decode_all(MAINTENANCE_JOBS, &docs);

        if let Some(tech_id) = &filter.tech_id {
            jobs.retain(|job| job.tech_id.as_deref() == Some(tech_id.as_str()));
        }
        if filter.date_from.is_some() || filter.date_to.is_some() {
            jobs.retain(|job| visit_in_range(job, filter.date_from, filter.date_to));
        }
        Ok(jobs)
    }

    /// Live snapshots of the whole job collection.
    pub async fn subscribe(&self) -> watch::Receiver<Vec<MaintenanceJob>> {
        spawn_decoder(MAINTENANCE_JOBS, self.store.subscribe(MAINTENANCE_JOBS).await)
    }
}

/// Normalized visit date, `None` for absent or unparsable dates.
fn visit_utc(job: &MaintenanceJob) -> Option<DateTime<Utc>> {
    job.visit_date.as_ref().and_then(JobDate::to_utc)
}

/// A job with no normalizable date never matches a date-bounded filter.
fn visit_in_range(
    job: &MaintenanceJob,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> bool {
    let Some(visit) = visit_utc(job) else {
        return false;
    };
    if let Some(from) = from {
        if visit < from {
            return false;
        }
    }
    if let Some(to) = to {
        if visit > to {
            return false;
        }
    }
    true
}

/// Newest visit first; undated jobs last.
fn cmp_visit_desc(a: &MaintenanceJob, b: &MaintenanceJob) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (visit_utc(a), visit_utc(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
