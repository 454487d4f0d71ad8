//! Recurrence engine for maintenance and calibration schedules.
//!
//! Given an anchor date and a recurrence rule, maintcal generates the due
//! dates of an obligation inside a window, reconciles them against logged
//! completions and classifies each one for compliance reporting:
//! - `date` and `recurrence` for calendar arithmetic and rules
//! - `occurrence` for bounded due-date generation
//! - `ledger` for reconciliation and completion logging
//! - `report` and `ics` for the consumers of reconciled occurrences
//! - `store` for the storage seams (and an in-memory store)

pub mod config;
pub mod constants;
pub mod date;
pub mod error;
pub mod ics;
pub mod ledger;
pub mod obligation;
pub mod occurrence;
pub mod recurrence;
pub mod report;
pub mod store;
pub mod window;

pub use error::{MaintCalError, MaintCalResult};
pub use ledger::{
    ComplianceStatus, CompletionOutcome, CompletionRecord, CompletionRequest, LedgerKey,
    Occurrence, classify, last_completed, log_completion, reconcile,
};
pub use obligation::{Asset, Location, MaintenanceObligation, ObligationId, PmSchedule, SourceType};
pub use occurrence::generate_occurrences;
pub use recurrence::{ParseMode, RecurrenceRule, next_occurrence};
pub use report::{ComplianceReport, ComplianceRow, ComplianceSummary, build_compliance_report, calendar_occurrences};
pub use store::{CompletionLedger, Directory, MemoryStore, ObligationStore};
pub use window::DateWindow;
