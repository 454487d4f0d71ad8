//! Facility records and the obligations projected from them.
//!
//! A PM schedule and an asset's calibration schedule are both obligations:
//! something due on an anchor date, optionally recurring. The records here
//! are what the storage layer hands us; `MaintenanceObligation` is what the
//! recurrence engine works on.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::constants::{ASSET_LABEL_SEPARATOR, UNASSIGNED_ASSET_LABEL};
use crate::date::parse_iso_date;
use crate::error::MaintCalError;
use crate::recurrence::{ParseMode, RecurrenceRule};

/// Where an obligation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Pm,
    Calibration,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Pm => "pm",
            SourceType::Calibration => "calibration",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies an obligation across both sources: `pm-12`, `calibration-7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObligationId {
    pub source: SourceType,
    pub id: u64,
}

impl ObligationId {
    pub fn pm(id: u64) -> Self {
        ObligationId {
            source: SourceType::Pm,
            id,
        }
    }

    pub fn calibration(id: u64) -> Self {
        ObligationId {
            source: SourceType::Calibration,
            id,
        }
    }
}

impl fmt::Display for ObligationId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.id)
    }
}

impl FromStr for ObligationId {
    type Err = MaintCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MaintCalError::InvalidObligationId(s.to_string());

        let (source, id) = s.rsplit_once('-').ok_or_else(invalid)?;
        let source = match source {
            "pm" => SourceType::Pm,
            "calibration" => SourceType::Calibration,
            _ => return Err(invalid()),
        };
        let id = id.parse().map_err(|_| invalid())?;

        Ok(ObligationId { source, id })
    }
}

impl Serialize for ObligationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObligationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A facility location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: u64,
    pub name: String,
}

/// A tracked physical asset. Calibration fields are stored as entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: u64,
    pub location_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Next calibration due date (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_due: Option<String>,
    /// Free text such as "Annually" or "every 6 months"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_frequency: Option<String>,
}

impl Asset {
    /// Display label: the non-empty identifying fields joined together,
    /// or `Asset #<id>` when the asset has none.
    pub fn label(&self) -> String {
        let parts: Vec<&str> = [&self.name, &self.asset_tag, &self.serial_number]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            fallback_asset_label(self.id)
        } else {
            parts.join(ASSET_LABEL_SEPARATOR)
        }
    }
}

/// A preventative-maintenance schedule, optionally tied to an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PmSchedule {
    pub id: u64,
    pub location_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<u64>,
    pub title: String,
    /// Next due date (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due: Option<String>,
    /// Canonical frequency token from the PM form ("monthly", "semi-annual", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

/// One schedulable duty, as seen by the recurrence engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceObligation {
    pub id: ObligationId,
    pub location_id: u64,
    pub asset_id: Option<u64>,
    /// First (most authoritative) due date. Only ever moves forward.
    pub anchor_date: Option<NaiveDate>,
    pub rule: Option<RecurrenceRule>,
    pub title: Option<String>,
}

impl MaintenanceObligation {
    pub fn source_type(&self) -> SourceType {
        self.id.source
    }

    /// Project a PM schedule. The frequency comes from a fixed selector, so
    /// it is parsed strictly.
    pub fn from_pm(pm: &PmSchedule) -> Self {
        let id = ObligationId::pm(pm.id);
        MaintenanceObligation {
            id,
            location_id: pm.location_id,
            asset_id: pm.asset_id,
            anchor_date: parse_stored_date(id, pm.next_due.as_deref()),
            rule: parse_stored_rule(id, pm.frequency.as_deref(), ParseMode::Strict),
            title: Some(pm.title.clone()).filter(|t| !t.trim().is_empty()),
        }
    }

    /// Project an asset's calibration schedule. The frequency is free text,
    /// so it is parsed leniently.
    pub fn from_asset_calibration(asset: &Asset) -> Self {
        let id = ObligationId::calibration(asset.id);
        MaintenanceObligation {
            id,
            location_id: asset.location_id,
            asset_id: Some(asset.id),
            anchor_date: parse_stored_date(id, asset.calibration_due.as_deref()),
            rule: parse_stored_rule(id, asset.calibration_frequency.as_deref(), ParseMode::Lenient),
            title: Some("Calibration".to_string()),
        }
    }
}

/// Label for an asset reference that may be missing or unresolved.
pub fn asset_label(asset_id: Option<u64>, asset: Option<&Asset>) -> String {
    match (asset_id, asset) {
        (_, Some(asset)) => asset.label(),
        (Some(id), None) => fallback_asset_label(id),
        (None, None) => UNASSIGNED_ASSET_LABEL.to_string(),
    }
}

fn fallback_asset_label(id: u64) -> String {
    format!("Asset #{}", id)
}

fn parse_stored_date(id: ObligationId, value: Option<&str>) -> Option<NaiveDate> {
    let value = value.map(str::trim).filter(|s| !s.is_empty())?;
    let date = parse_iso_date(value);
    if date.is_none() {
        warn!(obligation = %id, value, "ignoring unparseable due date");
    }
    date
}

fn parse_stored_rule(id: ObligationId, value: Option<&str>, mode: ParseMode) -> Option<RecurrenceRule> {
    let value = value.map(str::trim).filter(|s| !s.is_empty())?;
    let rule = RecurrenceRule::parse(value, mode);
    if rule.is_none() {
        warn!(obligation = %id, value, "unrecognized frequency, treating as non-recurring");
    }
    rule
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_asset() -> Asset {
        Asset {
            id: 7,
            location_id: 1,
            name: Some("Torque Wrench".to_string()),
            asset_tag: Some("TW-001".to_string()),
            serial_number: Some("SN123".to_string()),
            model: Some("X100".to_string()),
            calibration_due: Some("2025-03-01".to_string()),
            calibration_frequency: Some("Annually".to_string()),
        }
    }

    #[test]
    fn test_obligation_id_round_trips_through_display() {
        let id: ObligationId = "calibration-42".parse().unwrap();
        assert_eq!(id, ObligationId::calibration(42));
        assert_eq!(id.to_string(), "calibration-42");
        assert_eq!("pm-3".parse::<ObligationId>().unwrap(), ObligationId::pm(3));
    }

    #[test]
    fn test_obligation_id_rejects_garbage() {
        for bad in ["", "pm", "pm-", "pm-x", "asset-3", "pm--3", "12"] {
            assert!(bad.parse::<ObligationId>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_obligation_id_serializes_as_string() {
        let json = serde_json::to_string(&ObligationId::pm(9)).unwrap();
        assert_eq!(json, "\"pm-9\"");
    }

    #[test]
    fn test_asset_label_joins_identifying_fields() {
        assert_eq!(make_test_asset().label(), "Torque Wrench - TW-001 - SN123");
    }

    #[test]
    fn test_asset_label_skips_blank_fields() {
        let mut asset = make_test_asset();
        asset.name = Some("   ".to_string());
        asset.serial_number = None;
        assert_eq!(asset.label(), "TW-001");
    }

    #[test]
    fn test_asset_label_fallbacks() {
        let bare = Asset {
            id: 12,
            ..Default::default()
        };
        assert_eq!(bare.label(), "Asset #12");
        assert_eq!(asset_label(Some(99), None), "Asset #99");
        assert_eq!(asset_label(None, None), "Unassigned Asset");
    }

    #[test]
    fn test_from_asset_calibration_parses_leniently() {
        let obligation = MaintenanceObligation::from_asset_calibration(&make_test_asset());
        assert_eq!(obligation.id, ObligationId::calibration(7));
        assert_eq!(obligation.rule, Some(RecurrenceRule::Annual));
        assert_eq!(obligation.anchor_date, parse_iso_date("2025-03-01"));
        assert_eq!(obligation.asset_id, Some(7));
    }

    #[test]
    fn test_from_pm_parses_strictly() {
        let pm = PmSchedule {
            id: 3,
            location_id: 2,
            asset_id: None,
            title: "Filter change".to_string(),
            next_due: Some("2025-04-15".to_string()),
            frequency: Some("Annually".to_string()),
        };
        let obligation = MaintenanceObligation::from_pm(&pm);
        assert_eq!(obligation.rule, None);

        let pm = PmSchedule {
            frequency: Some("semi-annual".to_string()),
            ..pm
        };
        assert_eq!(
            MaintenanceObligation::from_pm(&pm).rule,
            Some(RecurrenceRule::SemiAnnual)
        );
    }

    #[test]
    fn test_malformed_due_date_degrades_to_no_anchor() {
        let mut asset = make_test_asset();
        asset.calibration_due = Some("03/01/2025".to_string());
        let obligation = MaintenanceObligation::from_asset_calibration(&asset);
        assert_eq!(obligation.anchor_date, None);
        assert_eq!(obligation.rule, Some(RecurrenceRule::Annual));
    }
}
