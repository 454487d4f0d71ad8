//! Storage seams and an in-memory implementation.
//!
//! The recurrence engine never talks to a database. It reads obligations,
//! completion records and display names through these traits; the storage
//! layer owns uniqueness of ledger keys and atomicity of anchor updates.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::SeedData;
use crate::date::format_iso_date;
use crate::error::{MaintCalError, MaintCalResult};
use crate::ledger::{CompletionRecord, LedgerKey, should_advance};
use crate::obligation::{Asset, Location, MaintenanceObligation, ObligationId, PmSchedule, SourceType};

/// Outcome of a compare-and-set on an obligation's anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnchorUpdate {
    /// Anchor after the operation
    pub anchor: Option<NaiveDate>,
    pub advanced: bool,
}

/// Source of obligations (PM schedules and calibration schedules).
pub trait ObligationStore {
    /// All obligations, optionally restricted to one location.
    fn obligations(&self, location_id: Option<u64>) -> MaintCalResult<Vec<MaintenanceObligation>>;

    fn obligation(&self, id: ObligationId) -> MaintCalResult<Option<MaintenanceObligation>>;

    /// Set the anchor to `candidate` if, at the time of the write, the
    /// current anchor is absent or `<= completed_due`. The read, the check
    /// and the write must not interleave with another call for the same id.
    fn advance_anchor(
        &self,
        id: ObligationId,
        completed_due: NaiveDate,
        candidate: NaiveDate,
    ) -> MaintCalResult<AnchorUpdate>;
}

/// Completion records keyed by `(obligation, due date)`.
pub trait CompletionLedger {
    fn record(&self, key: &LedgerKey) -> MaintCalResult<Option<CompletionRecord>>;

    fn records_for(&self, id: ObligationId) -> MaintCalResult<Vec<CompletionRecord>>;

    /// Insert, or replace the record with the same key. Never duplicates.
    fn upsert(&self, record: CompletionRecord) -> MaintCalResult<CompletionRecord>;
}

/// Display lookups for report rows.
pub trait Directory {
    fn location_name(&self, id: u64) -> MaintCalResult<Option<String>>;

    fn asset(&self, id: u64) -> MaintCalResult<Option<Asset>>;
}

#[derive(Default)]
struct Catalog {
    locations: BTreeMap<u64, Location>,
    assets: BTreeMap<u64, Asset>,
    obligations: BTreeMap<ObligationId, MaintenanceObligation>,
}

/// Process-local store backed by mutex-guarded maps.
#[derive(Default)]
pub struct MemoryStore {
    catalog: Mutex<Catalog>,
    ledger: Mutex<BTreeMap<LedgerKey, CompletionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from seed data.
    pub fn from_seed(seed: &SeedData) -> MaintCalResult<Self> {
        let store = Self::new();

        for location in seed.locations_or_default() {
            store.insert_location(location)?;
        }
        for asset in &seed.assets {
            store.insert_asset(asset.clone())?;
        }
        for pm in &seed.pm_schedules {
            store.insert_pm(pm.clone())?;
        }
        for record in &seed.completions {
            store.upsert(record.clone())?;
        }

        Ok(store)
    }

    pub fn insert_location(&self, location: Location) -> MaintCalResult<()> {
        self.catalog()?.locations.insert(location.id, location);
        Ok(())
    }

    /// Insert an asset along with its calibration obligation.
    pub fn insert_asset(&self, asset: Asset) -> MaintCalResult<()> {
        let obligation = MaintenanceObligation::from_asset_calibration(&asset);
        let mut catalog = self.catalog()?;
        catalog.obligations.insert(obligation.id, obligation);
        catalog.assets.insert(asset.id, asset);
        Ok(())
    }

    pub fn insert_pm(&self, pm: PmSchedule) -> MaintCalResult<()> {
        let obligation = MaintenanceObligation::from_pm(&pm);
        self.catalog()?.obligations.insert(obligation.id, obligation);
        Ok(())
    }

    pub fn locations(&self) -> MaintCalResult<Vec<Location>> {
        Ok(self.catalog()?.locations.values().cloned().collect())
    }

    fn catalog(&self) -> MaintCalResult<MutexGuard<'_, Catalog>> {
        self.catalog
            .lock()
            .map_err(|_| MaintCalError::Storage("catalog lock poisoned".into()))
    }

    fn ledger(&self) -> MaintCalResult<MutexGuard<'_, BTreeMap<LedgerKey, CompletionRecord>>> {
        self.ledger
            .lock()
            .map_err(|_| MaintCalError::Storage("ledger lock poisoned".into()))
    }
}

impl ObligationStore for MemoryStore {
    fn obligations(&self, location_id: Option<u64>) -> MaintCalResult<Vec<MaintenanceObligation>> {
        Ok(self
            .catalog()?
            .obligations
            .values()
            .filter(|o| location_id.is_none_or(|id| o.location_id == id))
            .cloned()
            .collect())
    }

    fn obligation(&self, id: ObligationId) -> MaintCalResult<Option<MaintenanceObligation>> {
        Ok(self.catalog()?.obligations.get(&id).cloned())
    }

    fn advance_anchor(
        &self,
        id: ObligationId,
        completed_due: NaiveDate,
        candidate: NaiveDate,
    ) -> MaintCalResult<AnchorUpdate> {
        let mut catalog = self.catalog()?;

        let obligation = catalog
            .obligations
            .get_mut(&id)
            .ok_or(MaintCalError::ObligationNotFound(id))?;

        if !should_advance(obligation.anchor_date, completed_due) {
            return Ok(AnchorUpdate {
                anchor: obligation.anchor_date,
                advanced: false,
            });
        }
        obligation.anchor_date = Some(candidate);

        // Keep the asset's stored due date in step with its obligation.
        if id.source == SourceType::Calibration {
            if let Some(asset) = catalog.assets.get_mut(&id.id) {
                asset.calibration_due = Some(format_iso_date(candidate));
            }
        }

        Ok(AnchorUpdate {
            anchor: Some(candidate),
            advanced: true,
        })
    }
}

impl CompletionLedger for MemoryStore {
    fn record(&self, key: &LedgerKey) -> MaintCalResult<Option<CompletionRecord>> {
        Ok(self.ledger()?.get(key).cloned())
    }

    fn records_for(&self, id: ObligationId) -> MaintCalResult<Vec<CompletionRecord>> {
        Ok(self
            .ledger()?
            .values()
            .filter(|r| r.obligation_id == id)
            .cloned()
            .collect())
    }

    fn upsert(&self, record: CompletionRecord) -> MaintCalResult<CompletionRecord> {
        self.ledger()?.insert(record.key(), record.clone());
        Ok(record)
    }
}

impl Directory for MemoryStore {
    fn location_name(&self, id: u64) -> MaintCalResult<Option<String>> {
        Ok(self.catalog()?.locations.get(&id).map(|l| l.name.clone()))
    }

    fn asset(&self, id: u64) -> MaintCalResult<Option<Asset>> {
        Ok(self.catalog()?.assets.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::date::parse_iso_date;
    use crate::recurrence::RecurrenceRule;

    fn d(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    fn make_test_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_asset(Asset {
                id: 3,
                location_id: 2,
                name: Some("Scale".to_string()),
                calibration_due: Some("2025-01-15".to_string()),
                calibration_frequency: Some("quarterly".to_string()),
                ..Default::default()
            })
            .unwrap();
        store
            .insert_pm(PmSchedule {
                id: 8,
                location_id: 1,
                asset_id: Some(3),
                title: "Lubricate".to_string(),
                next_due: None,
                frequency: Some("weekly".to_string()),
            })
            .unwrap();
        store
    }

    #[test]
    fn test_obligations_filter_by_location() {
        let store = make_test_store();
        assert_eq!(store.obligations(None).unwrap().len(), 2);

        let at_two = store.obligations(Some(2)).unwrap();
        assert_eq!(at_two.len(), 1);
        assert_eq!(at_two[0].id, ObligationId::calibration(3));
        assert_eq!(at_two[0].rule, Some(RecurrenceRule::Quarterly));
    }

    #[test]
    fn test_advance_anchor_from_absent() {
        let store = make_test_store();
        let update = store
            .advance_anchor(ObligationId::pm(8), d("2025-03-03"), d("2025-03-10"))
            .unwrap();
        assert_eq!(
            update,
            AnchorUpdate {
                anchor: Some(d("2025-03-10")),
                advanced: true
            }
        );
    }

    #[test]
    fn test_advance_anchor_refuses_when_ahead() {
        let store = make_test_store();
        let id = ObligationId::calibration(3);
        let update = store.advance_anchor(id, d("2024-10-15"), d("2025-01-15")).unwrap();
        assert!(!update.advanced);
        assert_eq!(update.anchor, Some(d("2025-01-15")));
    }

    #[test]
    fn test_advance_anchor_updates_asset_due_date() {
        let store = make_test_store();
        store
            .advance_anchor(ObligationId::calibration(3), d("2025-01-15"), d("2025-04-15"))
            .unwrap();
        let asset = store.asset(3).unwrap().unwrap();
        assert_eq!(asset.calibration_due.as_deref(), Some("2025-04-15"));
    }

    #[test]
    fn test_advance_anchor_unknown_obligation() {
        let store = make_test_store();
        let err = store
            .advance_anchor(ObligationId::pm(99), d("2025-01-01"), d("2025-01-08"))
            .unwrap_err();
        assert!(matches!(err, MaintCalError::ObligationNotFound(_)));
    }

    #[test]
    fn test_upsert_replaces_same_key() {
        let store = make_test_store();
        let id = ObligationId::pm(8);
        let mut record = CompletionRecord {
            obligation_id: id,
            due_date: d("2025-03-03"),
            completed_at: Some(d("2025-03-03")),
            notes: Some("ok".to_string()),
        };
        store.upsert(record.clone()).unwrap();
        record.notes = None;
        store.upsert(record.clone()).unwrap();

        assert_eq!(store.records_for(id).unwrap(), vec![record.clone()]);
        assert_eq!(store.record(&record.key()).unwrap(), Some(record));
    }

    #[test]
    fn test_concurrent_advances_only_move_forward() {
        let store = Arc::new(make_test_store());
        let id = ObligationId::pm(8);
        let start = d("2025-01-06");

        let handles: Vec<_> = (0..16)
            .map(|week| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let due = crate::date::add_days(start, 7 * week);
                    let next = crate::date::add_days(due, 7);
                    store.advance_anchor(id, due, next).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Whatever the interleaving, the latest cycle's successor wins.
        let anchor = store.obligation(id).unwrap().unwrap().anchor_date;
        assert_eq!(anchor, Some(crate::date::add_days(start, 7 * 16)));
    }
}
