//! Maintenance alert generation.
//!
//! Projects each scheduled item forward from its last matching service (or
//! from "now" when never serviced) and emits an alert once the projection
//! falls inside the configured warning tiers. Items comfortably far from due
//! produce nothing at all — below-medium alerts are suppressed, not emitted
//! with low priority.
//!
//! Alerts come back unsaved; the caller persists them and fills in the
//! owning client.

use chrono::{Days, Months, NaiveDate, Utc};
use motocare_classify::{last_service_for, matches_item};
use motocare_model::{
    AlertKind, AlertPriority, AlertStatus, MaintenanceAlert, ServiceRecord, Vehicle,
};
use motocare_reasoning::ReasoningAdapter;
use motocare_schedule::ManufacturerSchedule;
use serde::Deserialize;
use uuid::Uuid;

/// Configuration for the alert generator.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// High tier: due within this many days
    pub high_days: i64,
    /// High tier: due within this many kilometers
    pub high_km: i64,
    /// Medium tier: due within this many days
    pub medium_days: i64,
    /// Medium tier: due within this many kilometers
    pub medium_km: i64,
    /// Part-warranty window, days either side of expiry
    pub warranty_window_days: i64,
    /// Part-warranty window, kilometers either side of expiry
    pub warranty_window_km: i64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            high_days: 30,
            high_km: 500,
            medium_days: 60,
            medium_km: 1_000,
            warranty_window_days: 30,
            warranty_window_km: 500,
        }
    }
}

/// Generate maintenance alerts for a vehicle as of now.
pub fn generate_alerts(
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    current_odometer: u32,
    schedule: Option<&ManufacturerSchedule>,
    config: &AlertConfig,
) -> Vec<MaintenanceAlert> {
    generate_alerts_at(
        vehicle,
        history,
        current_odometer,
        schedule,
        config,
        Utc::now().date_naive(),
    )
}

/// Generate maintenance alerts for a vehicle as of a given date.
pub fn generate_alerts_at(
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    current_odometer: u32,
    schedule: Option<&ManufacturerSchedule>,
    config: &AlertConfig,
    today: NaiveDate,
) -> Vec<MaintenanceAlert> {
    let mut alerts = Vec::new();

    if let Some(schedule) = schedule {
        for (item, interval) in schedule.items() {
            // Anchor at the last matching service, or at "now" for an item
            // with no history — a fresh anchor starts a full interval.
            let last = last_service_for(history, item);
            let (anchor_date, anchor_odometer) = match last {
                Some(record) => (record.service_date, record.odometer_km),
                None => (today, current_odometer),
            };
            let Some(due_date) = anchor_date.checked_add_months(Months::new(interval.months))
            else {
                continue;
            };
            let due_odometer = anchor_odometer.saturating_add(interval.distance_km);

            let days_remaining = (due_date - today).num_days();
            let km_remaining = due_odometer as i64 - current_odometer as i64;

            let (priority, by_distance) = if days_remaining <= 0 || km_remaining <= 0 {
                (AlertPriority::Critical, km_remaining <= 0)
            } else if days_remaining <= config.high_days || km_remaining <= config.high_km {
                (AlertPriority::High, km_remaining <= config.high_km)
            } else if days_remaining <= config.medium_days || km_remaining <= config.medium_km {
                (AlertPriority::Medium, km_remaining <= config.medium_km)
            } else {
                continue;
            };
            let kind = if by_distance {
                AlertKind::Distance
            } else {
                AlertKind::Time
            };

            let description = match last {
                Some(record) => format!(
                    "Last serviced {} at {} km. Due {} at {} km.",
                    record.service_date, record.odometer_km, due_date, due_odometer
                ),
                None => format!(
                    "No {} on record. Due {} at {} km.",
                    item.label(),
                    due_date,
                    due_odometer
                ),
            };

            alerts.push(make_alert(
                vehicle,
                kind,
                priority,
                format!("{} due", title_case(item.label())),
                description,
                due_date,
                Some(due_odometer),
            ));
        }

        // Special rules fire once the odometer crosses the threshold with no
        // matching service at or past it.
        for rule in &schedule.special_rules {
            if (current_odometer as i64) < rule.trigger_km as i64 {
                continue;
            }
            let serviced_since_crossing = history
                .iter()
                .any(|r| matches_item(r, rule.item) && r.odometer_km >= rule.trigger_km);
            if serviced_since_crossing {
                continue;
            }
            alerts.push(make_alert(
                vehicle,
                AlertKind::MandatoryInspection,
                AlertPriority::High,
                format!("{} required", title_case(rule.item.label())),
                rule.recommendation.clone(),
                today,
                Some(rule.trigger_km),
            ));
        }
    }

    // Part warranties about to lapse (or just lapsed) are worth acting on;
    // anything long expired stays silent.
    for record in history {
        for part in &record.parts {
            let expiry_date = part
                .warranty_months
                .and_then(|m| record.service_date.checked_add_months(Months::new(m)));
            let expiry_odometer = part
                .warranty_km
                .map(|km| record.odometer_km.saturating_add(km));
            if expiry_date.is_none() && expiry_odometer.is_none() {
                continue;
            }

            let days_left = expiry_date.map(|d| (d - today).num_days());
            let km_left = expiry_odometer.map(|o| o as i64 - current_odometer as i64);

            let date_in_window =
                days_left.is_some_and(|d| d.abs() <= config.warranty_window_days);
            let km_in_window = km_left.is_some_and(|k| k.abs() <= config.warranty_window_km);
            if !date_in_window && !km_in_window {
                continue;
            }

            let expired =
                days_left.is_some_and(|d| d < 0) || km_left.is_some_and(|k| k < 0);
            let priority = if expired {
                AlertPriority::High
            } else {
                AlertPriority::Medium
            };

            alerts.push(make_alert(
                vehicle,
                AlertKind::PartWarranty,
                priority,
                format!("Warranty expiring: {}", part.name),
                format!(
                    "Installed {} at {} km; warranty runs out around this point.",
                    record.service_date, record.odometer_km
                ),
                expiry_date.unwrap_or(today),
                expiry_odometer,
            ));
        }
    }

    alerts
}

fn make_alert(
    vehicle: &Vehicle,
    kind: AlertKind,
    priority: AlertPriority,
    title: String,
    description: String,
    due_date: NaiveDate,
    due_odometer: Option<u32>,
) -> MaintenanceAlert {
    MaintenanceAlert {
        id: Uuid::new_v4(),
        vehicle_id: vehicle.id.clone(),
        client_id: None,
        kind,
        priority,
        title,
        description,
        due_date,
        due_odometer,
        status: AlertStatus::Active,
        created_at: Utc::now(),
    }
}

fn title_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Generate with reasoning assistance when a provider is configured.
///
/// Provider output uses relative day/kilometer offsets, mapped onto absolute
/// dates and odometer values anchored at today. Any failure lands on the
/// deterministic generator; the caller never sees an error.
pub async fn generate_alerts_assisted(
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    current_odometer: u32,
    schedule: Option<&ManufacturerSchedule>,
    config: &AlertConfig,
    adapter: Option<&ReasoningAdapter>,
) -> Vec<MaintenanceAlert> {
    let today = Utc::now().date_naive();
    if let Some(adapter) = adapter {
        let prompt = build_alert_prompt(vehicle, history, current_odometer);
        if let Some(text) = adapter.query(&prompt).await {
            match parse_alerts(&text, vehicle, current_odometer, today) {
                Ok(alerts) => return alerts,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Unparseable reasoning alerts, using deterministic generation"
                    );
                }
            }
        }
    }
    generate_alerts_at(vehicle, history, current_odometer, schedule, config, today)
}

fn build_alert_prompt(
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    current_odometer: u32,
) -> String {
    let mut recent: Vec<&ServiceRecord> = history.iter().collect();
    recent.sort_by(|a, b| b.service_date.cmp(&a.service_date));
    recent.truncate(10);

    let mut prompt = format!(
        "You are a motorcycle maintenance planner. List the maintenance alerts this vehicle needs.\n\
         Vehicle: {} {} ({}), current odometer {} km.\n\
         Recent service history (most recent first):\n",
        vehicle.manufacturer, vehicle.model, vehicle.year, current_odometer
    );
    if recent.is_empty() {
        prompt.push_str("  (no services on record)\n");
    }
    for r in &recent {
        prompt.push_str(&format!(
            "  - {}: {} at {} km, {}\n",
            r.service_date,
            r.kind.label(),
            r.odometer_km,
            r.description
        ));
    }
    prompt.push_str(
        "Answer with a strict JSON array only, no prose. Each entry:\n\
         {\"item\": .., \"priority\": \"medium|high|critical\", \
         \"due_in_days\": <days from today>, \"due_in_km\": <km from current reading>, \
         \"description\": ..}\n\
         Omit anything that is not due within the next two months.",
    );
    prompt
}

#[derive(Debug, Deserialize)]
struct AlertDto {
    item: String,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    due_in_days: Option<i64>,
    #[serde(default)]
    due_in_km: Option<i64>,
    #[serde(default)]
    description: String,
}

fn parse_alerts(
    text: &str,
    vehicle: &Vehicle,
    current_odometer: u32,
    today: NaiveDate,
) -> Result<Vec<MaintenanceAlert>, serde_json::Error> {
    let json = extract_json_array(text);
    let dtos: Vec<AlertDto> = serde_json::from_str(json)?;

    Ok(dtos
        .into_iter()
        .filter_map(|dto| {
            let priority = match dto.priority.as_deref().map(str::to_lowercase).as_deref() {
                Some("critical") => AlertPriority::Critical,
                Some("high") => AlertPriority::High,
                Some("medium") | None => AlertPriority::Medium,
                // Below-medium never surfaces as an alert.
                Some(_) => return None,
            };

            let due_date = match dto.due_in_days {
                Some(days) if days >= 0 => today.checked_add_days(Days::new(days as u64))?,
                Some(days) => today.checked_sub_days(Days::new(days.unsigned_abs()))?,
                None => today,
            };
            let due_odometer = dto
                .due_in_km
                .map(|km| (current_odometer as i64 + km).max(0) as u32);
            let kind = if dto.due_in_km.is_some() && dto.due_in_days.is_none() {
                AlertKind::Distance
            } else {
                AlertKind::Time
            };

            let description = if dto.description.is_empty() {
                format!("{} coming due.", title_case(&dto.item))
            } else {
                dto.description
            };

            Some(make_alert(
                vehicle,
                kind,
                priority,
                format!("{} due", title_case(&dto.item)),
                description,
                due_date,
                due_odometer,
            ))
        })
        .collect())
}

fn extract_json_array(text: &str) -> &str {
    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}
