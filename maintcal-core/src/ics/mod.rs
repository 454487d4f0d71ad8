//! Calendar feed generation.
//!
//! Turns reconciled occurrences into all-day VEVENTs (RFC 5545). UIDs are
//! derived from the obligation and due date only, so regenerating a feed
//! for the same occurrences replaces events instead of duplicating them.

mod generate;

pub use generate::{feed_entries, feed_uid, generate_feed};

use chrono::NaiveDate;
use serde::Serialize;

/// Metadata about the feed (embedded in the VCALENDAR)
#[derive(Debug, Clone)]
pub struct FeedMetadata {
    /// Human-readable calendar name (X-WR-CALNAME)
    pub calendar_name: String,
    /// Domain part of each UID (e.g., "plant.example.com")
    pub uid_domain: String,
}

/// One occurrence as a calendar consumer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub uid: String,
    pub date: NaiveDate,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
