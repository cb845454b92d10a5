//! # Database Facade
//!
//! One value owning every repository, all sharing the same store.
//!
//! ## Construction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Database::new(store)                                 │
//! │                                                                         │
//! │   store ──┬──► CounterRepository      (barcode allocation)             │
//! │           ├──► PhoneRepository        (inventory)                      │
//! │           ├──► JobRepository ────┬──► SettlementReports                │
//! │           ├──► RepRepository     │    (aggregation reads jobs)         │
//! │           ├──► TechnicianRepository                                    │
//! │           ├──► PaymentRepository                                       │
//! │           └──► SettlementRepository                                    │
//! │                                                                         │
//! │  Clones of the store share state, so every repository sees the same   │
//! │  documents.                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use dukkan_store::DocumentStore;

use crate::collections::PHONE_BARCODE_COUNTER;
use crate::error::DbResult;
use crate::reports::SettlementReports;
use crate::repository::{
    CounterRepository, JobRepository, PaymentRepository, PhoneRepository, RepRepository,
    SettlementRepository, TechnicianRepository,
};

/// All repositories over one shared store.
#[derive(Debug, Clone)]
pub struct Database<S> {
    counters: CounterRepository<S>,
    phones: PhoneRepository<S>,
    jobs: JobRepository<S>,
    reps: RepRepository<S>,
    technicians: TechnicianRepository<S>,
    payments: PaymentRepository<S>,
    settlements: SettlementRepository<S>,
    reports: SettlementReports<S>,
}

impl<S: DocumentStore + Clone> Database<S> {
    /// Wires every repository over clones of `store`.
    pub fn new(store: S) -> Self {
        let jobs = JobRepository::new(store.clone());
        Database {
            counters: CounterRepository::new(store.clone()),
            phones: PhoneRepository::new(store.clone()),
            reps: RepRepository::new(store.clone()),
            technicians: TechnicianRepository::new(store.clone()),
            payments: PaymentRepository::new(store.clone()),
            settlements: SettlementRepository::new(store),
            reports: SettlementReports::new(jobs.clone()),
            jobs,
        }
    }

    /// Allocates the next phone barcode.
    pub async fn next_barcode(&self) -> DbResult<String> {
        self.counters.allocate(PHONE_BARCODE_COUNTER).await
    }

    pub fn counters(&self) -> &CounterRepository<S> {
        &self.counters
    }

    pub fn phones(&self) -> &PhoneRepository<S> {
        &self.phones
    }

    pub fn jobs(&self) -> &JobRepository<S> {
        &self.jobs
    }

    pub fn reps(&self) -> &RepRepository<S> {
        &self.reps
    }

    pub fn technicians(&self) -> &TechnicianRepository<S> {
        &self.technicians
    }

    pub fn payments(&self) -> &PaymentRepository<S> {
        &self.payments
    }

    pub fn settlements(&self) -> &SettlementRepository<S> {
        &self.settlements
    }

    pub fn reports(&self) -> &SettlementReports<S> {
        &self.reports
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
