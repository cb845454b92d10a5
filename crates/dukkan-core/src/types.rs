//! # Domain Types
//!
//! Core domain types used throughout Dukkan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ MaintenanceJob  │   │   Settlement    │   │     Phone       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  visit_date     │   │  kind (rep/tech)│   │  phone_number   │       │
//! │  │  amount_charged │   │  status         │   │  brand / model  │       │
//! │  │  attribution ◄──┼── │  paid_at        │   └─────────────────┘       │
//! │  └───────┬─────────┘   └─────────────────┘                             │
//! │          │                                                              │
//! │          ▼ tagged union (never scattered optionals)                    │
//! │  ┌──────────────────────────────────────────────┐                      │
//! │  │  Attribution::Legacy { repId, partCost }     │  old schema          │
//! │  │  Attribution::Parts  { parts: Vec<Part> }    │  new schema          │
//! │  └──────────────────────────────────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Compatibility
//! Serde renames preserve the historical document field names: jobs,
//! settlements and payments use `camelCase` (`amountCharged`, `techId`,
//! `paidAt`), phones use `snake_case` (`phone_number`, `serial_number`).
//! Changing a rename here silently orphans existing documents - don't.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Job Status
// =============================================================================

/// The status of a maintenance job.
///
/// Treated as an opaque equality filter by queries; new jobs always start
/// as [`JobStatus::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Repair accepted, not yet finished.
    #[default]
    Pending,
    /// Repair finished and handed back - the state settlements bill against.
    Completed,
    /// Repair abandoned.
    Cancelled,
}

impl JobStatus {
    /// Wire representation, used when building store predicates.
    pub const fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Job Date
// =============================================================================

/// A job visit date as it appears in stored documents.
///
/// Historical documents carry either a raw date string (RFC 3339 or bare
/// `YYYY-MM-DD`) or a structured timestamp object (`{seconds, nanoseconds}`).
/// Both representations must normalize to the same ordering - sorting and
/// date-range filtering always go through [`JobDate::to_utc`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobDate {
    /// Structured timestamp: seconds since the Unix epoch.
    Timestamp {
        seconds: i64,
        #[serde(default)]
        nanoseconds: u32,
    },
    /// Raw date string (RFC 3339, or a bare calendar date).
    Raw(String),
}

impl JobDate {
    /// Normalizes to UTC. Returns `None` for unparsable raw strings;
    /// callers sort those last rather than failing the whole listing.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            JobDate::Timestamp {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds),
            JobDate::Raw(raw) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                    return Some(dt.with_timezone(&Utc));
                }
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc())
            }
        }
    }
}

impl From<DateTime<Utc>> for JobDate {
    fn from(dt: DateTime<Utc>) -> Self {
        JobDate::Raw(dt.to_rfc3339())
    }
}

// =============================================================================
// Parts and Attribution (Dual Schema)
// =============================================================================

/// One repaired part inside a multi-part job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_cost: Option<f64>,
    /// Rep who sourced this part. `None` means no commission attribution
    /// for this part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep_name: Option<String>,
}

impl Part {
    /// Part cost with broken numeric input coerced to zero.
    pub fn cost(&self) -> f64 {
        self.part_cost.filter(|c| c.is_finite()).unwrap_or(0.0)
    }
}

/// Rep attribution for a job: either the legacy whole-job shape or the
/// newer per-part shape.
///
/// Serialized untagged so documents keep their historical field layout:
/// a `parts` array marks the new schema, top-level `repId`/`partCost`
/// mark the old one. Aggregation pattern-matches on this instead of
/// probing optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attribution {
    /// New schema: each repaired part carries its own rep attribution.
    Parts { parts: Vec<Part> },
    /// Legacy schema: at most one rep and one part cost for the whole job.
    Legacy {
        #[serde(rename = "repId", default, skip_serializing_if = "Option::is_none")]
        rep_id: Option<String>,
        #[serde(rename = "repName", default, skip_serializing_if = "Option::is_none")]
        rep_name: Option<String>,
        #[serde(rename = "partName", default, skip_serializing_if = "Option::is_none")]
        part_name: Option<String>,
        #[serde(rename = "partCost", default, skip_serializing_if = "Option::is_none")]
        part_cost: Option<f64>,
    },
}

impl Attribution {
    /// Attribution-free legacy shape (no rep, no part cost).
    pub fn none() -> Self {
        Attribution::Legacy {
            rep_id: None,
            rep_name: None,
            part_name: None,
            part_cost: None,
        }
    }

    /// The part list, only when the job genuinely uses the new schema.
    /// An empty `parts` array counts as legacy.
    pub fn parts(&self) -> Option<&[Part]> {
        match self {
            Attribution::Parts { parts } if !parts.is_empty() => Some(parts),
            _ => None,
        }
    }

    /// Legacy rep reference, if any.
    pub fn legacy_rep_id(&self) -> Option<&str> {
        match self {
            Attribution::Legacy { rep_id, .. } => rep_id.as_deref(),
            Attribution::Parts { .. } => None,
        }
    }

    /// Legacy single part cost, if any.
    pub fn legacy_part_cost(&self) -> Option<f64> {
        match self {
            Attribution::Legacy { part_cost, .. } => *part_cost,
            Attribution::Parts { .. } => None,
        }
    }

    /// True when the given rep is attributed anywhere on this job -
    /// either the legacy top-level reference or any part's reference.
    pub fn mentions_rep(&self, rep_id: &str) -> bool {
        match self {
            Attribution::Legacy { rep_id: id, .. } => id.as_deref() == Some(rep_id),
            Attribution::Parts { parts } => {
                parts.iter().any(|p| p.rep_id.as_deref() == Some(rep_id))
            }
        }
    }
}

impl Default for Attribution {
    fn default() -> Self {
        Attribution::none()
    }
}

// =============================================================================
// Maintenance Job
// =============================================================================

/// One repair visit, as stored in the `maintenanceJobs` collection.
///
/// The `profit` / `tech_commission` / `shop_profit` fields are derived -
/// always equal to `derive_financials(total_part_cost, amount_charged,
/// tech_percent)`. The job repository recomputes them whenever any input
/// changes; nothing else may write them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceJob {
    pub id: String,

    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub device_model: Option<String>,

    /// Visit date; may be a raw string or a structured timestamp.
    #[serde(default)]
    pub visit_date: Option<JobDate>,

    /// Amount charged to the customer (whole-job value).
    #[serde(default)]
    pub amount_charged: f64,

    #[serde(default)]
    pub status: JobStatus,

    #[serde(default)]
    pub tech_id: Option<String>,
    #[serde(default)]
    pub tech_name: Option<String>,
    /// Technician commission rate in `[0, 1]`. Absent means 0.
    #[serde(default)]
    pub tech_percent: Option<f64>,

    /// Dual-schema rep attribution (flattened into the document).
    #[serde(flatten)]
    pub attribution: Attribution,

    /// Derived: sum over parts, or the legacy single value.
    #[serde(default)]
    pub total_part_cost: f64,
    /// Derived, see [`crate::finance::derive_financials`].
    #[serde(default)]
    pub profit: f64,
    #[serde(default)]
    pub tech_commission: f64,
    #[serde(default)]
    pub shop_profit: f64,

    /// Store-assigned write timestamps.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a job. Status and the derived fields are assigned by
/// the repository, never by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMaintenanceJob {
    pub customer_name: String,
    pub device_model: String,
    pub visit_date: JobDate,
    pub amount_charged: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_percent: Option<f64>,
    #[serde(flatten)]
    pub attribution: Attribution,
    /// Explicit total override, honored only when no parts are given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_part_cost: Option<f64>,
}

/// Partial update for a job. `None` fields are left untouched by the
/// store's merge update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<JobDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_charged: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Part>>,
    #[serde(rename = "repId", default, skip_serializing_if = "Option::is_none")]
    pub rep_id: Option<String>,
    #[serde(rename = "repName", default, skip_serializing_if = "Option::is_none")]
    pub rep_name: Option<String>,
    #[serde(rename = "partCost", default, skip_serializing_if = "Option::is_none")]
    pub part_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_part_cost: Option<f64>,
}

impl JobPatch {
    /// True when the patch touches any input of the derived financials,
    /// which obliges the repository to recompute all three outputs.
    pub fn touches_financials(&self) -> bool {
        self.parts.is_some()
            || self.total_part_cost.is_some()
            || self.part_cost.is_some()
            || self.amount_charged.is_some()
            || self.tech_percent.is_some()
    }
}

/// Filters for listing jobs. All optional, freely combinable.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub tech_id: Option<String>,
    /// Matched locally against legacy `repId` OR any `parts[].repId`;
    /// never pushed into the store query.
    pub rep_id: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

// =============================================================================
// Settlements
// =============================================================================

/// Who a settlement pays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementType {
    /// Parts rep - revenue share, no commission percentage.
    Rep,
    /// Repair technician - percentage commission on profit.
    Technician,
}

impl SettlementType {
    /// Wire representation, used when building store predicates.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SettlementType::Rep => "rep",
            SettlementType::Technician => "technician",
        }
    }
}

/// Settlement lifecycle: created `open`, transitions once to `paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    #[default]
    Open,
    /// Terminal - never reopened.
    Paid,
}

impl SettlementStatus {
    /// Wire representation, used when building store predicates.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Open => "open",
            SettlementStatus::Paid => "paid",
        }
    }
}

/// A payout record for a rep or technician over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SettlementType,
    #[serde(default)]
    pub status: SettlementStatus,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub entity_name: Option<String>,
    /// Amount owed, as computed by the aggregation this settlement records.
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for opening a settlement. Status is always assigned `open`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSettlement {
    #[serde(rename = "type")]
    pub kind: SettlementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DateTime<Utc>>,
}

/// Filters for listing settlements.
#[derive(Debug, Clone, Default)]
pub struct SettlementFilter {
    pub kind: Option<SettlementType>,
    pub status: Option<SettlementStatus>,
}

// =============================================================================
// Aggregation Results (never persisted)
// =============================================================================

/// Detail line for one part (or one legacy job) contributing to a rep's
/// settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub job_id: String,
    pub job_date: Option<DateTime<Utc>>,
    pub customer_name: Option<String>,
    pub device_model: Option<String>,
    pub part_name: String,
    pub part_cost: f64,
}

/// Per-rep accumulator, computed fresh on every aggregation call.
///
/// For parts-schema jobs only `parts_count` / `part_cost_sum` / `jobs_count`
/// accrue: `amount_charged` is a whole-job value and cannot be divided per
/// part, so the revenue and profit sums stay at zero by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepTotals {
    pub rep_id: String,
    pub rep_name: String,
    /// Distinct jobs this rep contributed to (a job with three parts from
    /// the same rep counts once).
    pub jobs_count: u64,
    pub parts_count: u64,
    pub part_cost_sum: f64,
    pub profit_sum: f64,
    pub tech_commission_sum: f64,
    pub shop_profit_sum: f64,
    pub revenue_sum: f64,
    pub jobs: Vec<JobDetail>,
}

impl RepTotals {
    /// Empty accumulator for a rep.
    pub fn new(rep_id: String, rep_name: String) -> Self {
        RepTotals {
            rep_id,
            rep_name,
            jobs_count: 0,
            parts_count: 0,
            part_cost_sum: 0.0,
            profit_sum: 0.0,
            tech_commission_sum: 0.0,
            shop_profit_sum: 0.0,
            revenue_sum: 0.0,
            jobs: Vec::new(),
        }
    }
}

/// Per-technician accumulator, computed fresh on every aggregation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechTotals {
    pub tech_id: String,
    pub tech_name: String,
    pub jobs_count: u64,
    pub part_cost_sum: f64,
    pub profit_sum: f64,
    pub tech_commission_sum: f64,
    pub shop_profit_sum: f64,
    pub revenue_sum: f64,
}

impl TechTotals {
    /// Empty accumulator for a technician.
    pub fn new(tech_id: String, tech_name: String) -> Self {
        TechTotals {
            tech_id,
            tech_name,
            jobs_count: 0,
            part_cost_sum: 0.0,
            profit_sum: 0.0,
            tech_commission_sum: 0.0,
            shop_profit_sum: 0.0,
            revenue_sum: 0.0,
        }
    }
}

// =============================================================================
// Inventory and Parties
// =============================================================================

/// A phone in inventory. Field names stay `snake_case` on the wire - the
/// phones collection predates the camelCase convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phone {
    pub id: String,
    /// 6-digit zero-padded barcode, unique across inventory.
    pub phone_number: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for registering a phone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhone {
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Partial update for a phone. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhonePatch {
    /// A changed barcode is re-normalized and re-checked for duplicates
    /// by the repository before the write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// A parts rep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rep {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRep {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Partial update for a rep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// A repair technician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technician {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub active: bool,
    /// Default commission rate applied when a job doesn't override it.
    #[serde(default)]
    pub default_commission_percent: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTechnician {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Falls back to [`crate::DEFAULT_TECH_COMMISSION_PERCENT`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_commission_percent: Option<f64>,
}

/// Partial update for a technician.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_commission_percent: Option<f64>,
}

// =============================================================================
// Payments
// =============================================================================

/// A payment made against a rep or technician balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub entity_type: SettlementType,
    pub entity_id: String,
    #[serde(default)]
    pub amount: f64,
    pub payment_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub entity_type: SettlementType,
    pub entity_id: String,
    pub amount: f64,
    pub payment_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update for a payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Filters for listing payments.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub entity_type: Option<SettlementType>,
    pub entity_id: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_job_deserializes_to_legacy_attribution() {
        let doc = json!({
            "id": "J1",
            "customerName": "Ali",
            "deviceModel": "Pixel 6",
            "visitDate": "2026-01-10T09:00:00+00:00",
            "amountCharged": 120.0,
            "status": "completed",
            "techId": "T1",
            "repId": "R1",
            "repName": "Parts Co",
            "partCost": 40.0,
            "totalPartCost": 40.0,
            "profit": 80.0
        });

        let job: MaintenanceJob = serde_json::from_value(doc).unwrap();
        assert_eq!(job.attribution.legacy_rep_id(), Some("R1"));
        assert_eq!(job.attribution.legacy_part_cost(), Some(40.0));
        assert!(job.attribution.parts().is_none());
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[test]
    fn test_parts_job_deserializes_to_parts_attribution() {
        let doc = json!({
            "id": "J2",
            "customerName": "Sara",
            "deviceModel": "iPhone 13",
            "visitDate": "2026-01-11",
            "amountCharged": 200.0,
            "status": "pending",
            "parts": [
                {"partName": "screen", "partCost": 30.0, "repId": "R1"},
                {"partName": "battery", "partCost": 20.0}
            ]
        });

        let job: MaintenanceJob = serde_json::from_value(doc).unwrap();
        let parts = job.attribution.parts().expect("parts schema");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].rep_id.as_deref(), Some("R1"));
        assert!(parts[1].rep_id.is_none());
        assert!(job.attribution.mentions_rep("R1"));
        assert!(!job.attribution.mentions_rep("R9"));
    }

    #[test]
    fn test_empty_parts_array_counts_as_legacy() {
        let doc = json!({
            "id": "J3",
            "amountCharged": 50.0,
            "parts": []
        });
        let job: MaintenanceJob = serde_json::from_value(doc).unwrap();
        // Deserializes into the Parts variant, but the accessor treats an
        // empty list as no parts at all.
        assert!(job.attribution.parts().is_none());
        assert!(job.attribution.legacy_rep_id().is_none());
    }

    #[test]
    fn test_job_serializes_with_wire_field_names() {
        let new = NewMaintenanceJob {
            customer_name: "Omar".into(),
            device_model: "Galaxy S22".into(),
            visit_date: JobDate::Raw("2026-02-01".into()),
            amount_charged: 75.0,
            tech_id: Some("T1".into()),
            tech_name: None,
            tech_percent: Some(0.5),
            attribution: Attribution::Legacy {
                rep_id: Some("R1".into()),
                rep_name: None,
                part_name: None,
                part_cost: Some(25.0),
            },
            total_part_cost: None,
        };

        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["customerName"], "Omar");
        assert_eq!(value["amountCharged"], 75.0);
        assert_eq!(value["repId"], "R1");
        assert_eq!(value["partCost"], 25.0);
        // Skipped Nones must not appear as nulls
        assert!(value.get("techName").is_none());
        assert!(value.get("repName").is_none());
    }

    #[test]
    fn test_job_date_representations_order_identically() {
        let raw = JobDate::Raw("2026-03-01T12:00:00+00:00".into());
        let ts = JobDate::Timestamp {
            seconds: raw.to_utc().unwrap().timestamp(),
            nanoseconds: 0,
        };
        assert_eq!(raw.to_utc(), ts.to_utc());

        let bare = JobDate::Raw("2026-03-01".into());
        assert!(bare.to_utc().unwrap() < raw.to_utc().unwrap());

        assert!(JobDate::Raw("not a date".into()).to_utc().is_none());
    }

    #[test]
    fn test_job_date_structured_form_deserializes() {
        let date: JobDate = serde_json::from_value(json!({"seconds": 1767225600})).unwrap();
        assert!(matches!(date, JobDate::Timestamp { seconds: 1767225600, .. }));

        let date: JobDate = serde_json::from_value(json!("2026-01-01")).unwrap();
        assert!(matches!(date, JobDate::Raw(_)));
    }

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(
            serde_json::to_value(JobStatus::Completed).unwrap(),
            json!("completed")
        );
        assert_eq!(JobStatus::default(), JobStatus::Pending);
        assert_eq!(
            serde_json::to_value(SettlementStatus::Paid).unwrap(),
            json!("paid")
        );
        assert_eq!(serde_json::to_value(SettlementType::Rep).unwrap(), json!("rep"));
    }

    #[test]
    fn test_patch_touch_detection() {
        assert!(!JobPatch::default().touches_financials());
        assert!(JobPatch {
            amount_charged: Some(10.0),
            ..Default::default()
        }
        .touches_financials());
        assert!(JobPatch {
            parts: Some(vec![]),
            ..Default::default()
        }
        .touches_financials());
        // Status-only patches must not trigger a recompute
        assert!(!JobPatch {
            status: Some(JobStatus::Completed),
            ..Default::default()
        }
        .touches_financials());
    }
}
