//! # Settlement Reports
//!
//! On-demand aggregation of job financials per rep and per technician.
//! Totals are recomputed from the jobs on every call and never persisted -
//! a settlement record snapshots whichever total the shop decides to pay.
//!
//! ## Rep Aggregation Across Both Schemas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              What Accrues To A Rep's Totals                             │
//! │                                                                         │
//! │  parts[] schema (per part with a repId):                               │
//! │    parts_count, part_cost_sum, one detail line                         │
//! │    jobs_count once per DISTINCT job                                    │
//! │    revenue/profit/commission: NOT accrued - amountCharged is a         │
//! │    whole-job number and cannot be split across parts                   │
//! │                                                                         │
//! │  legacy schema (top-level repId):                                      │
//! │    everything - the single rep owns the whole job, so revenue,         │
//! │    profit, commission and shop profit all accrue                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::warn;

use dukkan_core::{
    Attribution, JobDate, JobDetail, JobFilter, JobStatus, RepTotals, TechTotals, UNNAMED_PARTY,
};
use dukkan_store::DocumentStore;

use crate::error::DbResult;
use crate::repository::JobRepository;

/// Settlement aggregation over the job collection.
#[derive(Debug, Clone)]
pub struct SettlementReports<S> {
    jobs: JobRepository<S>,
}

impl<S: DocumentStore> SettlementReports<S> {
    /// Creates a new SettlementReports over a job repository.
    pub fn new(jobs: JobRepository<S>) -> Self {
        SettlementReports { jobs }
    }

    /// Totals per rep for jobs in the given window, unordered.
    pub async fn aggregate_by_rep(
        &self,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
        status: Option<JobStatus>,
    ) -> DbResult<Vec<RepTotals>> {
        let filter = JobFilter {
            status,
            date_from,
            date_to,
            ..Default::default()
        };
        let jobs = self.jobs.list(&filter).await?;

        let mut totals: HashMap<String, RepTotals> = HashMap::new();
        for job in &jobs {
            let job_date = job.visit_date.as_ref().and_then(JobDate::to_utc);

            if let Some(parts) = job.attribution.parts() {
                let mut counted: HashSet<&str> = HashSet::new();
                for part in parts {
                    let Some(rep_id) = part.rep_id.as_deref() else {
                        continue;
                    };
                    let entry = totals.entry(rep_id.to_string()).or_insert_with(|| {
                        RepTotals::new(rep_id.to_string(), display_name(part.rep_name.as_deref()))
                    });
                    entry.parts_count += 1;
                    entry.part_cost_sum += part.cost();
                    entry.jobs.push(JobDetail {
                        job_id: job.id.clone(),
                        job_date,
                        customer_name: job.customer_name.clone(),
                        device_model: job.device_model.clone(),
                        part_name: display_name(part.part_name.as_deref()),
                        part_cost: part.cost(),
                    });
                    if counted.insert(rep_id) {
                        entry.jobs_count += 1;
                    }
                }
            } else if let Attribution::Legacy {
                rep_id: Some(rep_id),
                rep_name,
                part_name,
                part_cost,
            } = &job.attribution
            {
                let entry = totals.entry(rep_id.clone()).or_insert_with(|| {
                    RepTotals::new(rep_id.clone(), display_name(rep_name.as_deref()))
                });
                let cost = part_cost.unwrap_or(0.0);
                entry.jobs_count += 1;
                entry.parts_count += 1;
                entry.part_cost_sum += cost;
                entry.profit_sum += job.profit;
                entry.tech_commission_sum += job.tech_commission;
                entry.shop_profit_sum += job.shop_profit;
                entry.revenue_sum += job.amount_charged;
                entry.jobs.push(JobDetail {
                    job_id: job.id.clone(),
                    job_date,
                    customer_name: job.customer_name.clone(),
                    device_model: job.device_model.clone(),
                    part_name: display_name(part_name.as_deref()),
                    part_cost: cost,
                });
            }
        }

        Ok(totals.into_values().collect())
    }

    /// Totals per technician for jobs in the given window, unordered.
    /// Jobs without a technician cannot be settled and are skipped.
    pub async fn aggregate_by_tech(
        &self,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
        status: Option<JobStatus>,
    ) -> DbResult<Vec<TechTotals>> {
        let filter = JobFilter {
            status,
            date_from,
            date_to,
            ..Default::default()
        };
        let jobs = self.jobs.list(&filter).await?;

        let mut totals: HashMap<String, TechTotals> = HashMap::new();
        for job in &jobs {
            let Some(tech_id) = job.tech_id.as_deref() else {
                warn!(id = %job.id, "job has no technician, skipped in settlement");
                continue;
            };
            let entry = totals.entry(tech_id.to_string()).or_insert_with(|| {
                TechTotals::new(tech_id.to_string(), display_name(job.tech_name.as_deref()))
            });
            entry.jobs_count += 1;
            entry.part_cost_sum += job.total_part_cost;
            entry.profit_sum += job.profit;
            entry.tech_commission_sum += job.tech_commission;
            entry.shop_profit_sum += job.shop_profit;
            entry.revenue_sum += job.amount_charged;
        }

        Ok(totals.into_values().collect())
    }
}

fn display_name(name: Option<&str>) -> String {
    name.filter(|n| !n.trim().is_empty())
        .unwrap_or(UNNAMED_PARTY)
        .to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dukkan_core::{JobDate, NewMaintenanceJob, Part};
    use dukkan_store::MemoryStore;

    fn part(name: &str, cost: f64, rep: Option<&str>) -> Part {
        Part {
            part_name: Some(name.to_string()),
            part_cost: Some(cost),
            rep_id: rep.map(str::to_string),
            rep_name: None,
        }
    }

    fn new_job(date: &str, amount: f64) -> NewMaintenanceJob {
        NewMaintenanceJob {
            customer_name: "Ali".to_string(),
            device_model: "Pixel 6".to_string(),
            visit_date: JobDate::Raw(date.to_string()),
            amount_charged: amount,
            tech_id: None,
            tech_name: None,
            tech_percent: None,
            attribution: Attribution::none(),
            total_part_cost: None,
        }
    }

    fn reports(store: MemoryStore) -> (JobRepository<MemoryStore>, SettlementReports<MemoryStore>) {
        let jobs = JobRepository::new(store);
        (jobs.clone(), SettlementReports::new(jobs))
    }

    #[tokio::test]
    async fn test_parts_schema_accrues_per_part_jobs_once_per_rep() {
        let (jobs, reports) = reports(MemoryStore::new());

        // One job, three parts: two from R1, one from R2
        let mut job = new_job("2026-01-10", 100.0);
        job.attribution = Attribution::Parts {
            parts: vec![
                part("screen", 30.0, Some("R1")),
                part("battery", 20.0, Some("R1")),
                part("camera", 10.0, Some("R2")),
            ],
        };
        jobs.create(job).await.unwrap();

        let mut totals = reports.aggregate_by_rep(None, None, None).await.unwrap();
        totals.sort_by(|a, b| a.rep_id.cmp(&b.rep_id));
        assert_eq!(totals.len(), 2);

        let r1 = &totals[0];
        assert_eq!(r1.rep_id, "R1");
        assert_eq!(r1.jobs_count, 1);
        assert_eq!(r1.parts_count, 2);
        assert_eq!(r1.part_cost_sum, 50.0);
        assert_eq!(r1.jobs.len(), 2);
        // Whole-job figures never accrue at part level
        assert_eq!(r1.revenue_sum, 0.0);
        assert_eq!(r1.profit_sum, 0.0);

        let r2 = &totals[1];
        assert_eq!(r2.rep_id, "R2");
        assert_eq!(r2.jobs_count, 1);
        assert_eq!(r2.parts_count, 1);
        assert_eq!(r2.part_cost_sum, 10.0);
    }

    #[tokio::test]
    async fn test_legacy_schema_accrues_whole_job_figures() {
        let (jobs, reports) = reports(MemoryStore::new());

        let mut job = new_job("2026-01-10", 200.0);
        job.tech_percent = Some(0.3);
        job.attribution = Attribution::Legacy {
            rep_id: Some("R1".to_string()),
            rep_name: Some("Parts Co".to_string()),
            part_name: Some("screen".to_string()),
            part_cost: Some(50.0),
        };
        jobs.create(job).await.unwrap();

        let totals = reports.aggregate_by_rep(None, None, None).await.unwrap();
        assert_eq!(totals.len(), 1);
        let r1 = &totals[0];
        assert_eq!(r1.rep_name, "Parts Co");
        assert_eq!(r1.jobs_count, 1);
        assert_eq!(r1.parts_count, 1);
        assert_eq!(r1.part_cost_sum, 50.0);
        assert_eq!(r1.profit_sum, 150.0);
        assert_eq!(r1.tech_commission_sum, 45.0);
        assert_eq!(r1.shop_profit_sum, 105.0);
        assert_eq!(r1.revenue_sum, 200.0);
        assert_eq!(r1.jobs[0].part_name, "screen");
    }

    #[tokio::test]
    async fn test_parts_without_rep_do_not_accrue() {
        let (jobs, reports) = reports(MemoryStore::new());

        let mut job = new_job("2026-01-10", 100.0);
        job.attribution = Attribution::Parts {
            parts: vec![part("screen", 30.0, None)],
        };
        jobs.create(job).await.unwrap();

        assert!(reports
            .aggregate_by_rep(None, None, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_tech_totals_accrue_everything() {
        let (jobs, reports) = reports(MemoryStore::new());

        for amount in [200.0, 100.0] {
            let mut job = new_job("2026-01-10", amount);
            job.tech_id = Some("T1".to_string());
            job.tech_name = Some("Hassan".to_string());
            job.tech_percent = Some(0.5);
            job.total_part_cost = Some(50.0);
            jobs.create(job).await.unwrap();
        }

        let totals = reports.aggregate_by_tech(None, None, None).await.unwrap();
        assert_eq!(totals.len(), 1);
        let t1 = &totals[0];
        assert_eq!(t1.tech_name, "Hassan");
        assert_eq!(t1.jobs_count, 2);
        assert_eq!(t1.part_cost_sum, 100.0);
        assert_eq!(t1.profit_sum, 200.0);
        assert_eq!(t1.tech_commission_sum, 100.0);
        assert_eq!(t1.shop_profit_sum, 100.0);
        assert_eq!(t1.revenue_sum, 300.0);
    }

    #[tokio::test]
    async fn test_jobs_without_technician_are_skipped() {
        let (jobs, reports) = reports(MemoryStore::new());
        jobs.create(new_job("2026-01-10", 100.0)).await.unwrap();

        assert!(reports
            .aggregate_by_tech(None, None, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_window_and_status_filtering() {
        let (jobs, reports) = reports(MemoryStore::new());

        let mut inside = new_job("2026-01-10T00:00:00+00:00", 100.0);
        inside.tech_id = Some("T1".to_string());
        jobs.create(inside).await.unwrap();

        let mut outside = new_job("2026-03-10T00:00:00+00:00", 999.0);
        outside.tech_id = Some("T1".to_string());
        jobs.create(outside).await.unwrap();

        let from = "2026-01-01T00:00:00Z".parse().unwrap();
        let to = "2026-01-31T00:00:00Z".parse().unwrap();
        let totals = reports
            .aggregate_by_tech(Some(from), Some(to), None)
            .await
            .unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].revenue_sum, 100.0);
    }

    #[tokio::test]
    async fn test_missing_rep_name_uses_placeholder() {
        let (jobs, reports) = reports(MemoryStore::new());

        let mut job = new_job("2026-01-10", 100.0);
        job.attribution = Attribution::Legacy {
            rep_id: Some("R1".to_string()),
            rep_name: None,
            part_name: None,
            part_cost: Some(10.0),
        };
        jobs.create(job).await.unwrap();

        let totals = reports.aggregate_by_rep(None, None, None).await.unwrap();
        assert_eq!(totals[0].rep_name, UNNAMED_PARTY);
        assert_eq!(totals[0].jobs[0].part_name, UNNAMED_PARTY);
    }
}
