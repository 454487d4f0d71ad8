//! ICS feed generation.

use chrono::NaiveDate;
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use super::{FeedEntry, FeedMetadata};
use crate::date::{add_days, format_iso_date};
use crate::ledger::ComplianceStatus;
use crate::obligation::{ObligationId, SourceType};
use crate::report::ComplianceRow;

/// Stable UID for one occurrence: `<obligation>-<YYYYMMDD>@<domain>`.
pub fn feed_uid(id: ObligationId, due_date: NaiveDate, domain: &str) -> String {
    format!("{}-{}@{}", id, due_date.format("%Y%m%d"), domain)
}

/// Map report rows to feed entries, one per occurrence.
pub fn feed_entries(rows: &[ComplianceRow], metadata: &FeedMetadata) -> Vec<FeedEntry> {
    rows.iter()
        .map(|row| FeedEntry {
            uid: feed_uid(row.obligation_id, row.due_date, &metadata.uid_domain),
            date: row.due_date,
            summary: summary_for(row),
            description: Some(description_for(row)),
            location: Some(row.location_name.clone()),
        })
        .collect()
}

/// Generate a VCALENDAR holding one all-day VEVENT per entry.
///
/// Output depends only on the entries and metadata: DTSTAMP is pinned to
/// the due date rather than the wall clock.
pub fn generate_feed(entries: &[FeedEntry], metadata: &FeedMetadata) -> String {
    let mut cal = Calendar::new();

    // X-WR-CALNAME - Human-readable calendar name (de facto standard)
    cal.append_property(Property::new("X-WR-CALNAME", &metadata.calendar_name));

    for entry in entries {
        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&entry.uid);
        ics_event.summary(&entry.summary);

        let dtstamp = format!("{}T000000Z", entry.date.format("%Y%m%d"));
        ics_event.add_property("DTSTAMP", &dtstamp);

        add_date_property(&mut ics_event, "DTSTART", entry.date);
        add_date_property(&mut ics_event, "DTEND", add_days(entry.date, 1));

        if let Some(ref desc) = entry.description {
            ics_event.description(desc);
        }

        if let Some(ref loc) = entry.location {
            ics_event.location(loc);
        }

        // Occurrences don't block time
        ics_event.add_property("TRANSP", "TRANSPARENT");

        cal.push(ics_event.done());
    }

    let cal = cal.done();
    strip_ics_bloat(&cal.to_string())
}

fn summary_for(row: &ComplianceRow) -> String {
    let title = row
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(match row.source_type {
            SourceType::Pm => "Preventative maintenance",
            SourceType::Calibration => "Calibration",
        });

    format!("{} ({})", title, row.asset_label)
}

fn description_for(row: &ComplianceRow) -> String {
    let mut lines = vec![format!("Status: {}", status_label(row.status))];

    if let Some(done) = row.completed_at {
        lines.push(format!("Completed: {}", format_iso_date(done)));
    }
    if let Some(ref notes) = row.notes {
        lines.push(format!("Notes: {}", notes));
    }

    lines.join("\n")
}

fn status_label(status: ComplianceStatus) -> &'static str {
    match status {
        ComplianceStatus::ScheduledFuture => "Scheduled",
        ComplianceStatus::CompletedOnTime => "Completed on time",
        ComplianceStatus::CompletedLate => "Completed late",
        ComplianceStatus::Missed => "Missed",
    }
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with MAINTCAL
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:MAINTCAL\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Add an all-day date property (VALUE=DATE)
fn add_date_property(ics_event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}
