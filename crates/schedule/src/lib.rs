//! Manufacturer maintenance schedules.
//!
//! Static reference data: per-manufacturer intervals for the fixed set of
//! maintenance items, plus one-off special rules (e.g. valve clearance at a
//! fixed odometer threshold). Lookup is by manufacturer name only; the data
//! shape carries model-level overrides but no current schedule sets them.

use serde::{Deserialize, Serialize};

/// One category of periodic upkeep with its own interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceItem {
    OilChange,
    OilFilter,
    AirFilter,
    SparkPlugs,
    DriveChain,
    Brakes,
    GeneralInspection,
    /// Not part of the interval table; referenced by special rules
    Valves,
}

impl MaintenanceItem {
    /// Get a human-readable label for this item.
    pub fn label(&self) -> &'static str {
        match self {
            Self::OilChange => "oil change",
            Self::OilFilter => "oil filter",
            Self::AirFilter => "air filter",
            Self::SparkPlugs => "spark plugs",
            Self::DriveChain => "drive chain",
            Self::Brakes => "brakes",
            Self::GeneralInspection => "general inspection",
            Self::Valves => "valve clearance",
        }
    }
}

/// Distance/time pair for one maintenance item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInterval {
    /// Kilometers between services
    pub distance_km: u32,
    /// Months between services
    pub months: u32,
}

impl ServiceInterval {
    pub const fn new(distance_km: u32, months: u32) -> Self {
        Self { distance_km, months }
    }
}

/// A one-off manufacturer rule triggered at a fixed odometer threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialRule {
    /// The item the rule concerns
    pub item: MaintenanceItem,
    /// Odometer threshold in kilometers
    pub trigger_km: u32,
    /// Fixed recommendation text carried into the alert
    pub recommendation: String,
}

/// Per-model interval override. Present in the data shape; current catalog
/// data never populates these, so lookup degrades to manufacturer-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOverride {
    pub model: String,
    pub item: MaintenanceItem,
    pub interval: ServiceInterval,
}

/// Full maintenance schedule for one manufacturer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManufacturerSchedule {
    pub manufacturer: String,

    /// Interval per maintenance item, in display order
    pub intervals: Vec<(MaintenanceItem, ServiceInterval)>,

    #[serde(default)]
    pub special_rules: Vec<SpecialRule>,

    #[serde(default)]
    pub model_overrides: Vec<ModelOverride>,
}

impl ManufacturerSchedule {
    /// Interval for one item, if the schedule covers it.
    pub fn interval_for(&self, item: MaintenanceItem) -> Option<ServiceInterval> {
        self.intervals
            .iter()
            .find(|(i, _)| *i == item)
            .map(|(_, interval)| *interval)
    }

    /// Iterate over (item, interval) pairs in display order.
    pub fn items(&self) -> impl Iterator<Item = (MaintenanceItem, ServiceInterval)> + '_ {
        self.intervals.iter().copied()
    }
}

/// Read-only catalog of manufacturer schedules.
#[derive(Debug, Clone)]
pub struct ScheduleCatalog {
    schedules: Vec<ManufacturerSchedule>,
}

impl ScheduleCatalog {
    /// Build a catalog from explicit schedule data.
    pub fn new(schedules: Vec<ManufacturerSchedule>) -> Self {
        Self { schedules }
    }

    /// Look up the schedule for a manufacturer.
    ///
    /// Case-insensitive exact match on the manufacturer name. Unknown makes
    /// return `None`; callers skip schedule-dependent logic in that case.
    pub fn schedule_for(&self, manufacturer: &str) -> Option<&ManufacturerSchedule> {
        let wanted = manufacturer.trim();
        self.schedules
            .iter()
            .find(|s| s.manufacturer.eq_ignore_ascii_case(wanted))
    }
}

impl Default for ScheduleCatalog {
    /// The built-in factory schedules.
    fn default() -> Self {
        Self::new(vec![
            schedule(
                "Honda",
                &[
                    (MaintenanceItem::OilChange, 3_000, 6),
                    (MaintenanceItem::OilFilter, 6_000, 12),
                    (MaintenanceItem::AirFilter, 12_000, 12),
                    (MaintenanceItem::SparkPlugs, 8_000, 12),
                    (MaintenanceItem::DriveChain, 24_000, 24),
                    (MaintenanceItem::Brakes, 12_000, 12),
                    (MaintenanceItem::GeneralInspection, 12_000, 12),
                ],
                vec![rule(
                    MaintenanceItem::Valves,
                    24_000,
                    "Check and adjust valve clearance per the service manual",
                )],
            ),
            schedule(
                "Yamaha",
                &[
                    (MaintenanceItem::OilChange, 5_000, 6),
                    (MaintenanceItem::OilFilter, 10_000, 12),
                    (MaintenanceItem::AirFilter, 15_000, 18),
                    (MaintenanceItem::SparkPlugs, 10_000, 12),
                    (MaintenanceItem::DriveChain, 24_000, 24),
                    (MaintenanceItem::Brakes, 12_000, 12),
                    (MaintenanceItem::GeneralInspection, 10_000, 12),
                ],
                vec![rule(
                    MaintenanceItem::Valves,
                    26_000,
                    "Inspect valve clearance; adjust if outside tolerance",
                )],
            ),
            schedule(
                "Suzuki",
                &[
                    (MaintenanceItem::OilChange, 5_000, 6),
                    (MaintenanceItem::OilFilter, 10_000, 12),
                    (MaintenanceItem::AirFilter, 15_000, 18),
                    (MaintenanceItem::SparkPlugs, 12_000, 18),
                    (MaintenanceItem::DriveChain, 24_000, 24),
                    (MaintenanceItem::Brakes, 12_000, 12),
                    (MaintenanceItem::GeneralInspection, 12_000, 12),
                ],
                vec![rule(
                    MaintenanceItem::Valves,
                    24_000,
                    "Check and adjust valve clearance per the service manual",
                )],
            ),
            schedule(
                "Kawasaki",
                &[
                    (MaintenanceItem::OilChange, 6_000, 6),
                    (MaintenanceItem::OilFilter, 12_000, 12),
                    (MaintenanceItem::AirFilter, 18_000, 18),
                    (MaintenanceItem::SparkPlugs, 12_000, 12),
                    (MaintenanceItem::DriveChain, 24_000, 24),
                    (MaintenanceItem::Brakes, 12_000, 12),
                    (MaintenanceItem::GeneralInspection, 12_000, 12),
                ],
                vec![rule(
                    MaintenanceItem::Valves,
                    24_000,
                    "Check and adjust valve clearance per the service manual",
                )],
            ),
            schedule(
                "BMW",
                &[
                    (MaintenanceItem::OilChange, 10_000, 12),
                    (MaintenanceItem::OilFilter, 10_000, 12),
                    (MaintenanceItem::AirFilter, 20_000, 24),
                    (MaintenanceItem::SparkPlugs, 20_000, 24),
                    (MaintenanceItem::DriveChain, 20_000, 24),
                    (MaintenanceItem::Brakes, 10_000, 12),
                    (MaintenanceItem::GeneralInspection, 10_000, 12),
                ],
                vec![rule(
                    MaintenanceItem::Valves,
                    20_000,
                    "Check valve clearance at the scheduled major service",
                )],
            ),
            schedule(
                "Ducati",
                &[
                    (MaintenanceItem::OilChange, 12_000, 12),
                    (MaintenanceItem::OilFilter, 12_000, 12),
                    (MaintenanceItem::AirFilter, 12_000, 24),
                    (MaintenanceItem::SparkPlugs, 12_000, 24),
                    (MaintenanceItem::DriveChain, 24_000, 24),
                    (MaintenanceItem::Brakes, 12_000, 12),
                    (MaintenanceItem::GeneralInspection, 12_000, 12),
                ],
                vec![rule(
                    MaintenanceItem::Valves,
                    12_000,
                    "Desmodromic valve clearance service required",
                )],
            ),
        ])
    }
}

fn schedule(
    manufacturer: &str,
    intervals: &[(MaintenanceItem, u32, u32)],
    special_rules: Vec<SpecialRule>,
) -> ManufacturerSchedule {
    ManufacturerSchedule {
        manufacturer: manufacturer.to_string(),
        intervals: intervals
            .iter()
            .map(|&(item, km, months)| (item, ServiceInterval::new(km, months)))
            .collect(),
        special_rules,
        model_overrides: Vec::new(),
    }
}

fn rule(item: MaintenanceItem, trigger_km: u32, recommendation: &str) -> SpecialRule {
    SpecialRule {
        item,
        trigger_km,
        recommendation: recommendation.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        let catalog = ScheduleCatalog::default();
        assert!(catalog.schedule_for("honda").is_some());
        assert!(catalog.schedule_for("HONDA").is_some());
        assert!(catalog.schedule_for(" Honda ").is_some());
    }

    #[test]
    fn test_unknown_manufacturer_is_none() {
        let catalog = ScheduleCatalog::default();
        assert!(catalog.schedule_for("Vespa").is_none());
        assert!(catalog.schedule_for("").is_none());
    }

    #[test]
    fn test_honda_oil_interval() {
        let catalog = ScheduleCatalog::default();
        let honda = catalog.schedule_for("Honda").unwrap();
        let oil = honda.interval_for(MaintenanceItem::OilChange).unwrap();
        assert_eq!(oil.distance_km, 3_000);
        assert_eq!(oil.months, 6);
    }

    #[test]
    fn test_valve_special_rule_present() {
        let catalog = ScheduleCatalog::default();
        let honda = catalog.schedule_for("Honda").unwrap();
        assert!(honda
            .special_rules
            .iter()
            .any(|r| r.item == MaintenanceItem::Valves && r.trigger_km == 24_000));
    }

    #[test]
    fn test_overrides_never_populated() {
        let catalog = ScheduleCatalog::default();
        let honda = catalog.schedule_for("Honda").unwrap();
        assert!(honda.model_overrides.is_empty());
    }
}
