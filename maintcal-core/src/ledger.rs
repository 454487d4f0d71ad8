//! Completion ledger reconciliation.
//!
//! Completions are recorded per `(obligation, due date)`. Reconciling an
//! obligation against a window pairs each generated due date with its
//! record (if any) and classifies it.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MaintCalError, MaintCalResult};
use crate::obligation::{MaintenanceObligation, ObligationId};
use crate::occurrence::generate_occurrences;
use crate::recurrence::next_occurrence;
use crate::store::{CompletionLedger, ObligationStore};
use crate::window::DateWindow;

/// Uniqueness key of a completion record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerKey {
    pub obligation_id: ObligationId,
    pub due_date: NaiveDate,
}

/// Completion of one cycle of an obligation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub obligation_id: ObligationId,
    pub due_date: NaiveDate,
    /// None means the cycle is recorded but not completed yet
    pub completed_at: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl CompletionRecord {
    pub fn key(&self) -> LedgerKey {
        LedgerKey {
            obligation_id: self.obligation_id,
            due_date: self.due_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    ScheduledFuture,
    CompletedOnTime,
    CompletedLate,
    Missed,
}

/// One due date of an obligation, reconciled against the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    pub obligation_id: ObligationId,
    pub due_date: NaiveDate,
    pub completed_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: ComplianceStatus,
}

/// A completion to log against one due date.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub due_date: NaiveDate,
    /// Defaults to today
    pub completed_at: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Result of logging a completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub record: CompletionRecord,
    /// The obligation's anchor after the log (unchanged unless `advanced`)
    pub next_due: Option<NaiveDate>,
    pub advanced: bool,
}

/// Compliance status of a due date.
///
/// Completion on the due date itself counts as on time. An uncompleted
/// occurrence due today is still scheduled, not missed.
pub fn classify(
    due_date: NaiveDate,
    completed_at: Option<NaiveDate>,
    today: NaiveDate,
) -> ComplianceStatus {
    match completed_at {
        Some(done) if done <= due_date => ComplianceStatus::CompletedOnTime,
        Some(_) => ComplianceStatus::CompletedLate,
        None if due_date < today => ComplianceStatus::Missed,
        None => ComplianceStatus::ScheduledFuture,
    }
}

/// Reconcile one obligation's occurrences in `window` against its records.
///
/// Records belonging to other obligations are ignored. An obligation with no
/// anchor date has no occurrences.
pub fn reconcile(
    obligation: &MaintenanceObligation,
    window: &DateWindow,
    today: NaiveDate,
    records: &[CompletionRecord],
) -> Vec<Occurrence> {
    let Some(anchor) = obligation.anchor_date else {
        return Vec::new();
    };

    let by_due: HashMap<NaiveDate, &CompletionRecord> = records
        .iter()
        .filter(|r| r.obligation_id == obligation.id)
        .map(|r| (r.due_date, r))
        .collect();

    generate_occurrences(anchor, obligation.rule, window)
        .into_iter()
        .map(|due_date| {
            let record = by_due.get(&due_date);
            let completed_at = record.and_then(|r| r.completed_at);
            Occurrence {
                obligation_id: obligation.id,
                due_date,
                completed_at,
                notes: record.and_then(|r| r.notes.clone()),
                status: classify(due_date, completed_at, today),
            }
        })
        .collect()
}

/// `reconcile`, reading the obligation's records from a ledger.
pub fn reconcile_from_ledger<L: CompletionLedger + ?Sized>(
    obligation: &MaintenanceObligation,
    window: &DateWindow,
    today: NaiveDate,
    ledger: &L,
) -> MaintCalResult<Vec<Occurrence>> {
    if obligation.anchor_date.is_none() {
        return Ok(Vec::new());
    }
    let records = ledger.records_for(obligation.id)?;
    Ok(reconcile(obligation, window, today, &records))
}

/// Latest completion date across the records, whatever order they were
/// logged in.
pub fn last_completed(records: &[CompletionRecord]) -> Option<NaiveDate> {
    records.iter().filter_map(|r| r.completed_at).max()
}

/// Whether completing `completed_due` may move an anchor currently at
/// `current`. The schedule never moves backward, and an anchor already past
/// the completed cycle is left alone.
pub fn should_advance(current: Option<NaiveDate>, completed_due: NaiveDate) -> bool {
    current.is_none_or(|anchor| anchor <= completed_due)
}

/// Record a completion and advance the obligation's schedule.
///
/// The record for `(id, due_date)` is upserted: logging the same cycle
/// twice keeps one record carrying the latest values. For recurring
/// obligations the anchor moves to the occurrence after `due_date`, subject
/// to `should_advance`, as one compare-and-set on the store.
pub fn log_completion<S, L>(
    store: &S,
    ledger: &L,
    id: ObligationId,
    request: CompletionRequest,
    today: NaiveDate,
) -> MaintCalResult<CompletionOutcome>
where
    S: ObligationStore + ?Sized,
    L: CompletionLedger + ?Sized,
{
    let obligation = store
        .obligation(id)?
        .ok_or(MaintCalError::ObligationNotFound(id))?;

    let record = ledger.upsert(CompletionRecord {
        obligation_id: id,
        due_date: request.due_date,
        completed_at: Some(request.completed_at.unwrap_or(today)),
        notes: request.notes,
    })?;

    let (next_due, advanced) = match obligation.rule {
        Some(rule) => {
            let candidate = next_occurrence(request.due_date, rule);
            let update = store.advance_anchor(id, request.due_date, candidate)?;
            (update.anchor, update.advanced)
        }
        None => (obligation.anchor_date, false),
    };

    info!(
        obligation = %id,
        due = %record.due_date,
        completed = ?record.completed_at,
        next_due = ?next_due,
        advanced,
        "logged completion"
    );

    Ok(CompletionOutcome {
        record,
        next_due,
        advanced,
    })
}
