//! # Collection Names
//!
//! The document collections Dukkan reads and writes. Names are wire-level
//! identifiers shared with every deployed dataset - renaming one here
//! orphans existing documents.

/// Singleton counter documents, keyed by counter name.
pub const COUNTERS: &str = "counters";

/// Phone inventory. Historically `snake_case` fields.
pub const PHONES: &str = "phones";

/// Repair jobs. `camelCase` fields, dual rep-attribution schema.
pub const MAINTENANCE_JOBS: &str = "maintenanceJobs";

/// Parts reps.
pub const REPS: &str = "reps";

/// Repair technicians.
pub const TECHNICIANS: &str = "technicians";

/// Rep/technician payout records.
pub const SETTLEMENTS: &str = "settlements";

/// Payments made against rep/technician balances.
pub const PAYMENTS: &str = "payments";

/// The counter that allocates phone barcodes.
pub const PHONE_BARCODE_COUNTER: &str = "phoneBarcode";
