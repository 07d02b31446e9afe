//! Vehicle risk assessment from service history.
//!
//! Scores one vehicle 0-100 from four weighted factor groups: recency of the
//! last service, conformance to the manufacturer schedule, historical
//! patterns (corrective ratio, cost trend), and vehicle age. A reasoning
//! provider can be consulted first; any failure there falls back to the
//! deterministic scoring below, which is always available.

use chrono::{Datelike, Months, NaiveDate, Utc};
use motocare_classify::last_service_for;
use motocare_model::{
    RiskAssessment, RiskLevel, ServiceKind, ServiceRecord, UpcomingService, Urgency, Vehicle,
};
use motocare_reasoning::ReasoningAdapter;
use motocare_schedule::{MaintenanceItem, ManufacturerSchedule};
use serde::Deserialize;

/// Configuration for the risk analyzer.
///
/// Base penalties are per maintenance item; the applied penalty is
/// `base * clamp(days_overdue / 30, 1, overdue_cap)`.
#[derive(Debug, Clone)]
pub struct RiskConfig {
    pub oil_penalty: f64,
    pub oil_filter_penalty: f64,
    pub air_filter_penalty: f64,
    pub spark_plugs_penalty: f64,
    pub chain_penalty: f64,
    pub brakes_penalty: f64,
    pub inspection_penalty: f64,
    /// Applied to items without a dedicated penalty
    pub default_penalty: f64,
    /// Ceiling on the overdue multiplier, so one very old item cannot
    /// collapse the score on its own
    pub overdue_cap: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            oil_penalty: 30.0,
            oil_filter_penalty: 20.0,
            air_filter_penalty: 10.0,
            spark_plugs_penalty: 15.0,
            chain_penalty: 15.0,
            brakes_penalty: 25.0,
            inspection_penalty: 20.0,
            default_penalty: 10.0,
            overdue_cap: 3.0,
        }
    }
}

impl RiskConfig {
    /// Base penalty for one maintenance item.
    pub fn base_penalty(&self, item: MaintenanceItem) -> f64 {
        match item {
            MaintenanceItem::OilChange => self.oil_penalty,
            MaintenanceItem::OilFilter => self.oil_filter_penalty,
            MaintenanceItem::AirFilter => self.air_filter_penalty,
            MaintenanceItem::SparkPlugs => self.spark_plugs_penalty,
            MaintenanceItem::DriveChain => self.chain_penalty,
            MaintenanceItem::Brakes => self.brakes_penalty,
            MaintenanceItem::GeneralInspection => self.inspection_penalty,
            MaintenanceItem::Valves => self.default_penalty,
        }
    }
}

/// Assess a vehicle's maintenance risk as of now.
pub fn assess_risk(
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    current_odometer: u32,
    schedule: Option<&ManufacturerSchedule>,
    config: &RiskConfig,
) -> RiskAssessment {
    assess_risk_at(
        vehicle,
        history,
        current_odometer,
        schedule,
        config,
        Utc::now().date_naive(),
    )
}

/// Assess a vehicle's maintenance risk as of a given date.
///
/// Pure: identical inputs always yield identical output.
pub fn assess_risk_at(
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    current_odometer: u32,
    schedule: Option<&ManufacturerSchedule>,
    config: &RiskConfig,
    today: NaiveDate,
) -> RiskAssessment {
    // A vehicle with no history at all is its own case: fixed mid score,
    // no other factors apply.
    if history.is_empty() {
        return RiskAssessment {
            level: RiskLevel::Medium,
            score: 50,
            factors: vec!["No maintenance history on record".to_string()],
            recommendations: vec!["Schedule a first full inspection".to_string()],
            upcoming: Vec::new(),
        };
    }

    let mut score = 100.0_f64;
    let mut factors = Vec::new();
    let mut recommendations = Vec::new();
    let mut upcoming = Vec::new();

    // Recency: the most recent record by date is authoritative even when
    // odometer readings are noisy.
    let last = history
        .iter()
        .max_by_key(|r| r.service_date)
        .expect("history is non-empty");
    let days_since_last = (today - last.service_date).num_days();
    if days_since_last > 365 {
        score -= 40.0;
        factors.push(format!(
            "Over a year without maintenance ({} days since last service)",
            days_since_last
        ));
        recommendations.push("Schedule an urgent general inspection".to_string());
    } else if days_since_last > 180 {
        score -= 25.0;
        factors.push(format!(
            "Over 6 months without maintenance ({} days since last service)",
            days_since_last
        ));
        recommendations.push("Schedule a preventive inspection".to_string());
    }

    // Schedule conformance: project each serviced item forward one interval
    // and penalize anything behind today or the current odometer. Items with
    // no matching record contribute nothing here.
    if let Some(schedule) = schedule {
        for (item, interval) in schedule.items() {
            let Some(record) = last_service_for(history, item) else {
                continue;
            };
            let Some(due_date) = record
                .service_date
                .checked_add_months(Months::new(interval.months))
            else {
                continue;
            };
            let due_odometer = record.odometer_km.saturating_add(interval.distance_km);

            let days_overdue = (today - due_date).num_days();
            let km_overdue = current_odometer as i64 - due_odometer as i64;
            if days_overdue <= 0 && km_overdue <= 0 {
                continue;
            }

            let multiplier = (days_overdue as f64 / 30.0).clamp(1.0, config.overdue_cap);
            score -= config.base_penalty(item) * multiplier;
            factors.push(format!(
                "{} overdue (due {} / {} km)",
                item.label(),
                due_date,
                due_odometer
            ));

            let (urgency, window) = if days_overdue > 90 {
                (Urgency::High, format!("{} days past due", days_overdue))
            } else if days_overdue > 0 {
                (Urgency::Medium, format!("{} days past due", days_overdue))
            } else {
                (Urgency::Low, format!("{} km past due", km_overdue))
            };
            upcoming.push(UpcomingService {
                item: item.label().to_string(),
                urgency,
                window,
            });
        }
    }

    // Pattern factors need a minimum of history to say anything.
    if history.len() >= 3 {
        let corrective = history
            .iter()
            .filter(|r| r.kind == ServiceKind::Corrective)
            .count();
        let ratio = corrective as f64 / history.len() as f64;
        if ratio > 0.3 {
            score -= 20.0;
            factors.push(format!(
                "High incidence of corrective repairs ({} of {})",
                corrective,
                history.len()
            ));
            recommendations.push("Investigate root causes of recurring failures".to_string());
        }

        let mut by_date: Vec<&ServiceRecord> = history.iter().collect();
        by_date.sort_by_key(|r| r.service_date);
        let oldest_avg = average_cost(&by_date[..3]);
        let recent_avg = average_cost(&by_date[by_date.len() - 3..]);
        if recent_avg > oldest_avg * 1.2 {
            score -= 15.0;
            factors.push("Maintenance costs trending upward".to_string());
            recommendations.push("Review cost-benefit of preventive work".to_string());
        }
    }

    let age = today.year() - vehicle.year;
    if age > 10 {
        score -= 10.0;
        factors.push(format!("Vehicle over 10 years old ({} years)", age));
        recommendations
            .push("Watch wear components: suspension, bearings, seals".to_string());
    }

    let score = score.clamp(0.0, 100.0).round() as u8;
    RiskAssessment {
        level: RiskLevel::from_score(score),
        score,
        factors,
        recommendations,
        upcoming,
    }
}

fn average_cost(records: &[&ServiceRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.cost).sum::<f64>() / records.len() as f64
}

/// Assess with reasoning assistance when a provider is configured.
///
/// The provider is consulted once; a missing adapter, a failed call, or an
/// unparseable completion all land on the deterministic path. The caller
/// never sees an error from this function.
pub async fn assess_risk_assisted(
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    current_odometer: u32,
    schedule: Option<&ManufacturerSchedule>,
    config: &RiskConfig,
    adapter: Option<&ReasoningAdapter>,
) -> RiskAssessment {
    if let Some(adapter) = adapter {
        let prompt = build_risk_prompt(vehicle, history, current_odometer);
        if let Some(text) = adapter.query(&prompt).await {
            match parse_assessment(&text) {
                Ok(assessment) => return assessment,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Unparseable reasoning assessment, using deterministic scoring"
                    );
                }
            }
        }
    }
    assess_risk(vehicle, history, current_odometer, schedule, config)
}

/// Natural-language prompt covering the vehicle and its recent history.
fn build_risk_prompt(
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    current_odometer: u32,
) -> String {
    let mut recent: Vec<&ServiceRecord> = history.iter().collect();
    recent.sort_by(|a, b| b.service_date.cmp(&a.service_date));
    recent.truncate(10);

    let mut prompt = format!(
        "You are a motorcycle maintenance analyst. Assess the maintenance risk of this vehicle.\n\
         Vehicle: {} {} ({}), current odometer {} km.\n\
         Recent service history (most recent first):\n",
        vehicle.manufacturer, vehicle.model, vehicle.year, current_odometer
    );
    if recent.is_empty() {
        prompt.push_str("  (no services on record)\n");
    }
    for r in &recent {
        prompt.push_str(&format!(
            "  - {}: {} at {} km, {} ({:.2})\n",
            r.service_date,
            r.kind.label(),
            r.odometer_km,
            r.description,
            r.cost
        ));
    }
    prompt.push_str(
        "Answer with strict JSON only, no prose, using this shape:\n\
         {\"score\": 0-100, \"level\": \"low|medium|high|critical\", \
         \"factors\": [..], \"recommendations\": [..], \
         \"upcoming\": [{\"item\": .., \"urgency\": \"low|medium|high\", \"window\": ..}]}",
    );
    prompt
}

#[derive(Debug, Deserialize)]
struct AssessmentDto {
    score: f64,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    factors: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    upcoming: Vec<UpcomingDto>,
}

#[derive(Debug, Deserialize)]
struct UpcomingDto {
    item: String,
    #[serde(default)]
    urgency: Option<String>,
    #[serde(default)]
    window: String,
}

/// Parse a completion into an assessment, clamping the score on ingest.
///
/// Providers tend to wrap JSON in code fences or a sentence of prose, so
/// parsing starts at the first brace.
fn parse_assessment(text: &str) -> Result<RiskAssessment, serde_json::Error> {
    let json = extract_json_object(text);
    let dto: AssessmentDto = serde_json::from_str(json)?;

    let score = dto.score.clamp(0.0, 100.0).round() as u8;
    let level = dto
        .level
        .as_deref()
        .and_then(parse_level)
        .unwrap_or_else(|| RiskLevel::from_score(score));

    Ok(RiskAssessment {
        level,
        score,
        factors: dto.factors,
        recommendations: dto.recommendations,
        upcoming: dto
            .upcoming
            .into_iter()
            .map(|u| UpcomingService {
                item: u.item,
                urgency: u
                    .urgency
                    .as_deref()
                    .and_then(parse_urgency)
                    .unwrap_or(Urgency::Medium),
                window: u.window,
            })
            .collect(),
    })
}

fn extract_json_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

fn parse_level(s: &str) -> Option<RiskLevel> {
    match s.to_lowercase().as_str() {
        "low" => Some(RiskLevel::Low),
        "medium" => Some(RiskLevel::Medium),
        "high" => Some(RiskLevel::High),
        "critical" => Some(RiskLevel::Critical),
        _ => None,
    }
}

fn parse_urgency(s: &str) -> Option<Urgency> {
    match s.to_lowercase().as_str() {
        "low" => Some(Urgency::Low),
        "medium" => Some(Urgency::Medium),
        "high" => Some(Urgency::High),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use motocare_schedule::ScheduleCatalog;
    use pretty_assertions::assert_eq;

    const TODAY: fn() -> NaiveDate = || NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    fn record(
        id: &str,
        days_ago: u64,
        odometer_km: u32,
        kind: ServiceKind,
        description: &str,
        cost: f64,
    ) -> ServiceRecord {
        let mut r = ServiceRecord::new(
            id,
            "veh-1",
            TODAY().checked_sub_days(Days::new(days_ago)).unwrap(),
            odometer_km,
            kind,
            description,
        );
        r.cost = cost;
        r
    }

    #[test]
    fn test_empty_history_scores_fifty_medium() {
        let vehicle = Vehicle::new("veh-1", "Honda", 2020);
        let assessment =
            assess_risk_at(&vehicle, &[], 13_500, None, &RiskConfig::default(), TODAY());
        assert_eq!(assessment.score, 50);
        assert_eq!(assessment.level, RiskLevel::Medium);

        // Age does not apply either: no other penalties for empty history.
        let old = Vehicle::new("veh-2", "Honda", 1998);
        let assessment =
            assess_risk_at(&old, &[], 90_000, None, &RiskConfig::default(), TODAY());
        assert_eq!(assessment.score, 50);
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn test_overdue_oil_collapses_score() {
        // Oil changed 400 days ago at 10 000 km; Honda interval is
        // 3000 km / 6 months and the bike now reads 13 500 km. Both the
        // date and distance projections are behind, the recency penalty
        // applies, and the capped overdue multiplier bottoms the score out.
        let catalog = ScheduleCatalog::default();
        let schedule = catalog.schedule_for("Honda");
        let vehicle = Vehicle::new("veh-1", "Honda", 2018);
        let history = vec![record(
            "r1",
            400,
            10_000,
            ServiceKind::Preventive,
            "oil change",
            180.0,
        )];

        let assessment = assess_risk_at(
            &vehicle,
            &history,
            13_500,
            schedule,
            &RiskConfig::default(),
            TODAY(),
        );

        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.level, RiskLevel::Critical);
        assert!(assessment
            .factors
            .iter()
            .any(|f| f.contains("Over a year without maintenance")));
        assert!(assessment.factors.iter().any(|f| f.contains("oil change")));
        let entry = assessment
            .upcoming
            .iter()
            .find(|u| u.item == "oil change")
            .unwrap();
        assert_eq!(entry.urgency, Urgency::High);
    }

    #[test]
    fn test_corrective_ratio_flagged() {
        let vehicle = Vehicle::new("veh-1", "Vespa", 2022);
        let history = vec![
            record("a", 150, 9_000, ServiceKind::Preventive, "checkup", 80.0),
            record("b", 120, 9_500, ServiceKind::Corrective, "electrical fault", 240.0),
            record("c", 90, 10_000, ServiceKind::Preventive, "checkup", 80.0),
            record("d", 60, 10_500, ServiceKind::Corrective, "stator failure", 310.0),
            record("e", 30, 11_000, ServiceKind::Preventive, "checkup", 80.0),
        ];

        // Unknown manufacturer: schedule-dependent scoring is skipped but
        // the assessment still comes back.
        let assessment = assess_risk_at(
            &vehicle,
            &history,
            11_200,
            None,
            &RiskConfig::default(),
            TODAY(),
        );

        assert!(assessment
            .factors
            .iter()
            .any(|f| f.contains("High incidence of corrective repairs (2 of 5)")));
        assert!(assessment.score <= 100);
    }

    #[test]
    fn test_rising_costs_flagged() {
        let vehicle = Vehicle::new("veh-1", "Vespa", 2022);
        let history = vec![
            record("a", 170, 5_000, ServiceKind::Preventive, "checkup", 100.0),
            record("b", 140, 5_500, ServiceKind::Preventive, "checkup", 100.0),
            record("c", 110, 6_000, ServiceKind::Preventive, "checkup", 100.0),
            record("d", 80, 6_500, ServiceKind::Preventive, "checkup", 190.0),
            record("e", 50, 7_000, ServiceKind::Preventive, "checkup", 200.0),
            record("f", 20, 7_500, ServiceKind::Preventive, "checkup", 210.0),
        ];

        let assessment = assess_risk_at(
            &vehicle,
            &history,
            7_600,
            None,
            &RiskConfig::default(),
            TODAY(),
        );

        assert_eq!(assessment.score, 85);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(assessment
            .factors
            .iter()
            .any(|f| f.contains("costs trending upward")));
    }

    #[test]
    fn test_recent_history_scores_clean() {
        let vehicle = Vehicle::new("veh-1", "Vespa", 2023);
        let history = vec![record(
            "a",
            30,
            4_000,
            ServiceKind::Preventive,
            "checkup",
            90.0,
        )];
        let assessment = assess_risk_at(
            &vehicle,
            &history,
            4_200,
            None,
            &RiskConfig::default(),
            TODAY(),
        );
        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(assessment.factors.is_empty());
    }

    #[test]
    fn test_deterministic_assessment_is_pure() {
        let catalog = ScheduleCatalog::default();
        let schedule = catalog.schedule_for("Honda");
        let vehicle = Vehicle::new("veh-1", "Honda", 2012);
        let history = vec![
            record("a", 200, 18_000, ServiceKind::Preventive, "oil change", 150.0),
            record("b", 400, 15_000, ServiceKind::Corrective, "brake disc", 320.0),
            record("c", 600, 12_000, ServiceKind::Inspection, "general inspection", 90.0),
        ];

        let first = assess_risk_at(
            &vehicle,
            &history,
            21_000,
            schedule,
            &RiskConfig::default(),
            TODAY(),
        );
        let second = assess_risk_at(
            &vehicle,
            &history,
            21_000,
            schedule,
            &RiskConfig::default(),
            TODAY(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_assessment_with_code_fence() {
        let text = "```json\n{\"score\": 72.4, \"level\": \"medium\", \
                    \"factors\": [\"a\"], \"recommendations\": [], \
                    \"upcoming\": [{\"item\": \"brakes\", \"urgency\": \"high\", \"window\": \"soon\"}]}\n```";
        let assessment = parse_assessment(text).unwrap();
        assert_eq!(assessment.score, 72);
        assert_eq!(assessment.level, RiskLevel::Medium);
        assert_eq!(assessment.upcoming[0].urgency, Urgency::High);
    }

    #[test]
    fn test_parse_assessment_clamps_and_defaults_level() {
        let assessment = parse_assessment("{\"score\": 240}").unwrap();
        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.level, RiskLevel::Low);
    }

    #[test]
    fn test_parse_assessment_rejects_prose() {
        assert!(parse_assessment("the vehicle seems fine to me").is_err());
    }

    #[test]
    fn test_prompt_includes_recent_history() {
        let vehicle = Vehicle::new("veh-1", "Honda", 2018);
        let history = vec![record(
            "a",
            10,
            12_000,
            ServiceKind::Preventive,
            "oil change",
            150.0,
        )];
        let prompt = build_risk_prompt(&vehicle, &history, 12_300);
        assert!(prompt.contains("Honda"));
        assert!(prompt.contains("oil change"));
        assert!(prompt.contains("12300"));
    }
}
