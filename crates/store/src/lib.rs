//! Service-history persistence seam.
//!
//! The analysis core only ever reads history; writes happen in the
//! surrounding application when a work order completes. The `HistoryStore`
//! trait keeps the core backend-agnostic, and the in-memory implementation
//! backs the eval binary and tests.

use motocare_model::ServiceRecord;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from history-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record {0} already exists")]
    DuplicateRecord(String),
}

/// Query + append interface over a vehicle's service history.
///
/// `history_for` returns a snapshot in no particular order — analyzers sort
/// internally and must not assume anything about it.
pub trait HistoryStore {
    /// All records for one vehicle. Empty when the vehicle has no history.
    fn history_for(&self, vehicle_id: &str) -> Vec<ServiceRecord>;

    /// Append a completed-service record.
    ///
    /// The only validation is record-id uniqueness; field contents are
    /// accepted as entered (data-entry forms own validation).
    fn append(&mut self, record: ServiceRecord) -> Result<(), StoreError>;
}

/// In-memory history store keyed by vehicle id.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: HashMap<String, Vec<ServiceRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all vehicles.
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn history_for(&self, vehicle_id: &str) -> Vec<ServiceRecord> {
        self.records.get(vehicle_id).cloned().unwrap_or_default()
    }

    fn append(&mut self, record: ServiceRecord) -> Result<(), StoreError> {
        let records = self.records.entry(record.vehicle_id.clone()).or_default();
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::DuplicateRecord(record.id));
        }
        records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use motocare_model::ServiceKind;

    fn record(id: &str, vehicle: &str) -> ServiceRecord {
        ServiceRecord::new(
            id,
            vehicle,
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            8_000,
            ServiceKind::Preventive,
            "oil change",
        )
    }

    #[test]
    fn test_append_and_query() {
        let mut store = InMemoryHistoryStore::new();
        store.append(record("a", "veh-1")).unwrap();
        store.append(record("b", "veh-1")).unwrap();
        store.append(record("c", "veh-2")).unwrap();

        assert_eq!(store.history_for("veh-1").len(), 2);
        assert_eq!(store.history_for("veh-2").len(), 1);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_unknown_vehicle_is_empty() {
        let store = InMemoryHistoryStore::new();
        assert!(store.history_for("veh-404").is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut store = InMemoryHistoryStore::new();
        store.append(record("a", "veh-1")).unwrap();
        assert!(matches!(
            store.append(record("a", "veh-1")),
            Err(StoreError::DuplicateRecord(_))
        ));
    }
}
