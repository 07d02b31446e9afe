//! Keyword classification of service records.
//!
//! Free-text descriptions and replaced-part names are the only signal for
//! which maintenance item a record covered. The matching is inherently fuzzy,
//! so the whole policy lives behind `classify_record` — scoring code never
//! embeds keywords of its own.

use motocare_model::ServiceRecord;
use motocare_schedule::MaintenanceItem;

/// Every item the classifier knows about, in its fixed scan order.
pub const ALL_ITEMS: [MaintenanceItem; 8] = [
    MaintenanceItem::OilChange,
    MaintenanceItem::OilFilter,
    MaintenanceItem::AirFilter,
    MaintenanceItem::SparkPlugs,
    MaintenanceItem::DriveChain,
    MaintenanceItem::Brakes,
    MaintenanceItem::GeneralInspection,
    MaintenanceItem::Valves,
];

/// Keyword set matched (case-insensitive substring) for each item.
pub fn keywords(item: MaintenanceItem) -> &'static [&'static str] {
    match item {
        MaintenanceItem::OilChange => &["oil", "lubricant"],
        MaintenanceItem::OilFilter => &["oil filter"],
        MaintenanceItem::AirFilter => &["air filter"],
        MaintenanceItem::SparkPlugs => &["spark", "plug", "ignition"],
        MaintenanceItem::DriveChain => &["chain", "transmission", "sprocket"],
        MaintenanceItem::Brakes => &["brake", "pad", "disc"],
        MaintenanceItem::GeneralInspection => &["inspection", "general", "complete overhaul"],
        MaintenanceItem::Valves => &["valve", "adjustment"],
    }
}

/// Classify a record's text into the maintenance items it covers.
///
/// Matching is case-insensitive substring against the description and every
/// part name. Items come back in the fixed scan order; a record that says
/// "oil filter replacement" classifies as both oil change and oil filter,
/// which mirrors how technicians actually log that work.
pub fn classify_record(description: &str, part_names: &[&str]) -> Vec<MaintenanceItem> {
    let description = description.to_lowercase();
    let part_names: Vec<String> = part_names.iter().map(|n| n.to_lowercase()).collect();

    ALL_ITEMS
        .into_iter()
        .filter(|&item| {
            keywords(item).iter().any(|kw| {
                description.contains(kw) || part_names.iter().any(|n| n.contains(kw))
            })
        })
        .collect()
}

/// Whether a record's text matches one maintenance item.
pub fn matches_item(record: &ServiceRecord, item: MaintenanceItem) -> bool {
    classify_record(&record.description, &record.part_names()).contains(&item)
}

/// Most recent record (by service date) matching the given item, if any.
///
/// Input order does not matter; history is scanned as a multiset.
pub fn last_service_for(
    history: &[ServiceRecord],
    item: MaintenanceItem,
) -> Option<&ServiceRecord> {
    history
        .iter()
        .filter(|r| matches_item(r, item))
        .max_by_key(|r| r.service_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use motocare_model::ServiceKind;

    fn record(id: &str, date: (i32, u32, u32), description: &str) -> ServiceRecord {
        ServiceRecord::new(
            id,
            "veh-1",
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            10_000,
            ServiceKind::Preventive,
            description,
        )
    }

    #[test]
    fn test_oil_change_matches() {
        let items = classify_record("Full oil change", &[]);
        assert!(items.contains(&MaintenanceItem::OilChange));
        assert!(!items.contains(&MaintenanceItem::OilFilter));
    }

    #[test]
    fn test_oil_filter_implies_oil() {
        // "oil filter" contains "oil", so the record covers both items
        let items = classify_record("oil filter replacement", &[]);
        assert!(items.contains(&MaintenanceItem::OilChange));
        assert!(items.contains(&MaintenanceItem::OilFilter));
    }

    #[test]
    fn test_part_names_match() {
        let items = classify_record("routine service", &["NGK spark plug"]);
        assert!(items.contains(&MaintenanceItem::SparkPlugs));
    }

    #[test]
    fn test_chain_via_sprocket() {
        let items = classify_record("replaced rear sprocket", &[]);
        assert!(items.contains(&MaintenanceItem::DriveChain));
    }

    #[test]
    fn test_case_insensitive() {
        let items = classify_record("BRAKE PAD REPLACEMENT", &[]);
        assert!(items.contains(&MaintenanceItem::Brakes));
    }

    #[test]
    fn test_no_match() {
        assert!(classify_record("washed and waxed", &[]).is_empty());
    }

    #[test]
    fn test_last_service_for_picks_latest() {
        let history = vec![
            record("a", (2024, 1, 10), "oil change"),
            record("b", (2024, 9, 2), "oil and lubricant service"),
            record("c", (2024, 5, 20), "brake pads"),
        ];
        let last = last_service_for(&history, MaintenanceItem::OilChange).unwrap();
        assert_eq!(last.id, "b");
        assert!(last_service_for(&history, MaintenanceItem::Valves).is_none());
    }
}
