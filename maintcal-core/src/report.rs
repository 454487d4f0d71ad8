//! Compliance report across obligations and locations.

use chrono::NaiveDate;
use serde::Serialize;

use crate::constants::UNKNOWN_LOCATION_NAME;
use crate::date::format_iso_date;
use crate::error::MaintCalResult;
use crate::ledger::{ComplianceStatus, Occurrence, reconcile_from_ledger};
use crate::obligation::{MaintenanceObligation, ObligationId, SourceType, asset_label};
use crate::store::{CompletionLedger, Directory};
use crate::window::DateWindow;

/// Window (and optional location filter) a report was built for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<u64>,
}

/// One occurrence, labelled for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRow {
    pub obligation_id: ObligationId,
    pub source_type: SourceType,
    pub location_id: u64,
    pub location_name: String,
    pub asset_id: Option<u64>,
    pub asset_label: String,
    pub title: Option<String>,
    pub due_date: NaiveDate,
    pub completed_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: ComplianceStatus,
}

/// Counts by status. `total` is always the sum of the other four.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceSummary {
    pub total: usize,
    pub completed_on_time: usize,
    pub completed_late: usize,
    pub missed: usize,
    pub scheduled: usize,
}

impl ComplianceSummary {
    pub fn from_statuses(statuses: impl IntoIterator<Item = ComplianceStatus>) -> Self {
        let mut summary = ComplianceSummary::default();
        for status in statuses {
            summary.total += 1;
            match status {
                ComplianceStatus::CompletedOnTime => summary.completed_on_time += 1,
                ComplianceStatus::CompletedLate => summary.completed_late += 1,
                ComplianceStatus::Missed => summary.missed += 1,
                ComplianceStatus::ScheduledFuture => summary.scheduled += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    pub range: ReportRange,
    pub summary: ComplianceSummary,
    pub rows: Vec<ComplianceRow>,
}

/// Reconcile every obligation over `window` and flatten into sorted rows.
///
/// Rows are ordered by due date, then location name, source type and asset
/// label, all compared as strings. Obligations without an anchor contribute
/// nothing. `location_id` filters obligations and is echoed in the range.
pub fn build_compliance_report<D, L>(
    obligations: &[MaintenanceObligation],
    window: &DateWindow,
    location_id: Option<u64>,
    today: NaiveDate,
    directory: &D,
    ledger: &L,
) -> MaintCalResult<ComplianceReport>
where
    D: Directory + ?Sized,
    L: CompletionLedger + ?Sized,
{
    let mut rows = Vec::new();

    for obligation in obligations
        .iter()
        .filter(|o| location_id.is_none_or(|id| o.location_id == id))
    {
        let occurrences = reconcile_from_ledger(obligation, window, today, ledger)?;
        if occurrences.is_empty() {
            continue;
        }

        let location_name = directory
            .location_name(obligation.location_id)?
            .unwrap_or_else(|| UNKNOWN_LOCATION_NAME.to_string());
        let asset = match obligation.asset_id {
            Some(id) => directory.asset(id)?,
            None => None,
        };
        let label = asset_label(obligation.asset_id, asset.as_ref());

        rows.extend(
            occurrences
                .into_iter()
                .map(|occurrence| make_row(obligation, occurrence, &location_name, &label)),
        );
    }

    sort_rows(&mut rows);
    let summary = ComplianceSummary::from_statuses(rows.iter().map(|r| r.status));

    Ok(ComplianceReport {
        range: ReportRange {
            start: window.start(),
            end: window.end(),
            location_id,
        },
        summary,
        rows,
    })
}

/// Reconciled occurrences for the calendar view, ordered by due date then
/// obligation. Classification matches the report exactly.
pub fn calendar_occurrences<L: CompletionLedger + ?Sized>(
    obligations: &[MaintenanceObligation],
    window: &DateWindow,
    today: NaiveDate,
    ledger: &L,
) -> MaintCalResult<Vec<Occurrence>> {
    let mut occurrences = Vec::new();
    for obligation in obligations {
        occurrences.extend(reconcile_from_ledger(obligation, window, today, ledger)?);
    }
    occurrences.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.obligation_id.cmp(&b.obligation_id))
    });
    Ok(occurrences)
}

fn make_row(
    obligation: &MaintenanceObligation,
    occurrence: Occurrence,
    location_name: &str,
    asset_label: &str,
) -> ComplianceRow {
    ComplianceRow {
        obligation_id: obligation.id,
        source_type: obligation.source_type(),
        location_id: obligation.location_id,
        location_name: location_name.to_string(),
        asset_id: obligation.asset_id,
        asset_label: asset_label.to_string(),
        title: obligation.title.clone(),
        due_date: occurrence.due_date,
        completed_at: occurrence.completed_at,
        notes: occurrence.notes,
        status: occurrence.status,
    }
}

fn sort_rows(rows: &mut [ComplianceRow]) {
    rows.sort_by_cached_key(|row| {
        (
            format_iso_date(row.due_date),
            row.location_name.clone(),
            row.source_type.as_str(),
            row.asset_label.clone(),
        )
    });
}
