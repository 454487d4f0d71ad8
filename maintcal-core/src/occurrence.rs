//! Occurrence generation.
//!
//! Projects an anchor date forward through a recurrence rule and keeps the
//! dates that land inside a window. Generation is bounded: a weekly rule
//! anchored decades ago, or an enormous window, yields a truncated list
//! rather than a long walk.

use chrono::NaiveDate;
use tracing::debug;

use crate::constants::{FAST_FORWARD_STEP_LIMIT, TOTAL_STEP_LIMIT};
use crate::recurrence::{RecurrenceRule, next_occurrence};
use crate::window::DateWindow;

/// Due dates of an obligation inside `window`, in increasing order.
///
/// - No rule: the anchor itself if the window contains it.
/// - With a rule: walk from the anchor to the window start (at most
///   `FAST_FORWARD_STEP_LIMIT` steps), then collect dates up to the window
///   end (at most `TOTAL_STEP_LIMIT` steps overall). Hitting either limit
///   silently returns whatever was collected so far.
pub fn generate_occurrences(
    anchor: NaiveDate,
    rule: Option<RecurrenceRule>,
    window: &DateWindow,
) -> Vec<NaiveDate> {
    let Some(rule) = rule else {
        return if window.contains(anchor) {
            vec![anchor]
        } else {
            Vec::new()
        };
    };

    let mut current = anchor;
    let mut steps = 0;

    while current < window.start() {
        if steps >= FAST_FORWARD_STEP_LIMIT {
            debug!(%anchor, %rule, steps, "fast-forward limit reached before window start");
            return Vec::new();
        }
        current = next_occurrence(current, rule);
        steps += 1;
    }

    let mut dates = Vec::new();
    while current <= window.end() {
        if steps >= TOTAL_STEP_LIMIT {
            debug!(%anchor, %rule, collected = dates.len(), "step limit reached, truncating occurrences");
            break;
        }
        dates.push(current);

        let next = next_occurrence(current, rule);
        if next <= current {
            // Saturated at the end of the representable calendar.
            break;
        }
        current = next;
        steps += 1;
    }

    dates
}
