//! Maintenance report composition.
//!
//! Pure assembly of analyzer output and raw history into a human-readable
//! record — no external calls, always deterministic. The summary feeds the
//! UI, chat dispatch, and PDF export unchanged.

use chrono::{NaiveDate, Utc};
use motocare_model::{
    AlertPriority, MaintenanceAlert, MaintenanceReport, RiskAssessment, ServiceRecord,
    UpcomingEntry, Vehicle,
};

/// Build a maintenance report as of now.
pub fn build_report(
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    alerts: &[MaintenanceAlert],
    assessment: &RiskAssessment,
) -> MaintenanceReport {
    build_report_at(vehicle, history, alerts, assessment, Utc::now().date_naive())
}

/// Build a maintenance report as of a given date.
pub fn build_report_at(
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    alerts: &[MaintenanceAlert],
    assessment: &RiskAssessment,
    today: NaiveDate,
) -> MaintenanceReport {
    let total_services = history.len();
    let total_cost: f64 = history.iter().map(|r| r.cost).sum();
    let last_service = history.iter().map(|r| r.service_date).max();

    let critical_pending = alerts
        .iter()
        .filter(|a| a.priority == AlertPriority::Critical && a.status.is_open())
        .count();

    let mut summary = format!(
        "{} {} ({}): {} service(s) on record, {:.2} total maintenance spend.",
        vehicle.manufacturer, vehicle.model, vehicle.year, total_services, total_cost
    );
    match last_service {
        Some(date) => {
            let days = (today - date).num_days();
            summary.push_str(&format!(" Last serviced {} ({} days ago).", date, days));
        }
        None => summary.push_str(" No service on record."),
    }
    summary.push_str(&format!(
        " Risk level {} (score {}).",
        assessment.level.label(),
        assessment.score
    ));
    if critical_pending == 0 {
        summary.push_str(" Maintenance up to date.");
    } else {
        summary.push_str(&format!(
            " Attention needed: {} critical alert(s) pending.",
            critical_pending
        ));
    }

    let mut upcoming: Vec<UpcomingEntry> = alerts
        .iter()
        .filter(|a| a.status.is_open())
        .map(|a| UpcomingEntry {
            title: a.title.clone(),
            due_date: a.due_date,
            priority: a.priority,
        })
        .collect();
    upcoming.sort_by_key(|e| e.due_date);

    MaintenanceReport {
        summary,
        history: history.to_vec(),
        alerts: alerts.to_vec(),
        assessment: assessment.clone(),
        upcoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use motocare_model::{
        AlertKind, AlertStatus, RiskLevel, ServiceKind,
    };
    use uuid::Uuid;

    const TODAY: fn() -> NaiveDate = || NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    fn assessment() -> RiskAssessment {
        RiskAssessment {
            level: RiskLevel::Medium,
            score: 65,
            factors: Vec::new(),
            recommendations: Vec::new(),
            upcoming: Vec::new(),
        }
    }

    fn alert(title: &str, priority: AlertPriority, status: AlertStatus, days: u64) -> MaintenanceAlert {
        MaintenanceAlert {
            id: Uuid::new_v4(),
            vehicle_id: "veh-1".to_string(),
            client_id: None,
            kind: AlertKind::Time,
            priority,
            title: title.to_string(),
            description: String::new(),
            due_date: TODAY().checked_add_days(Days::new(days)).unwrap(),
            due_odometer: None,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_up_to_date() {
        let vehicle = Vehicle::new("veh-1", "Honda", 2020);
        let mut record = ServiceRecord::new(
            "r1",
            "veh-1",
            TODAY().checked_sub_days(Days::new(40)).unwrap(),
            8_000,
            ServiceKind::Preventive,
            "oil change",
        );
        record.cost = 150.0;

        let report = build_report_at(&vehicle, &[record], &[], &assessment(), TODAY());
        assert!(report.summary.contains("1 service(s)"));
        assert!(report.summary.contains("150.00"));
        assert!(report.summary.contains("40 days ago"));
        assert!(report.summary.contains("Maintenance up to date."));
    }

    #[test]
    fn test_summary_attention_needed() {
        let vehicle = Vehicle::new("veh-1", "Honda", 2020);
        let alerts = vec![
            alert("Oil change due", AlertPriority::Critical, AlertStatus::Active, 0),
            alert("Brakes due", AlertPriority::Critical, AlertStatus::Done, 5),
            alert("Air filter due", AlertPriority::Medium, AlertStatus::Active, 20),
        ];

        let report = build_report_at(&vehicle, &[], &alerts, &assessment(), TODAY());
        // Only the open critical alert counts.
        assert!(report
            .summary
            .contains("Attention needed: 1 critical alert(s) pending."));
        assert!(report.summary.contains("No service on record."));
    }

    #[test]
    fn test_upcoming_sorted_and_open_only() {
        let vehicle = Vehicle::new("veh-1", "Honda", 2020);
        let alerts = vec![
            alert("Later", AlertPriority::Medium, AlertStatus::Active, 30),
            alert("Sooner", AlertPriority::High, AlertStatus::Scheduled, 5),
            alert("Closed", AlertPriority::High, AlertStatus::Dismissed, 1),
        ];

        let report = build_report_at(&vehicle, &[], &alerts, &assessment(), TODAY());
        let titles: Vec<&str> = report.upcoming.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);
    }
}
