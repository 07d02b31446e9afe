//! Core domain model for MotoCare maintenance analysis.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `Vehicle`: the motorcycle under analysis
//! - `ServiceRecord`: one completed maintenance event
//! - `RiskAssessment`: the computed health/urgency summary for a vehicle
//! - `MaintenanceAlert`: a discrete, actionable due/overdue notice
//! - `MaintenanceReport`: composite summary assembled per request

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a completed service event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Scheduled upkeep
    Preventive,
    /// Repair after a fault
    Corrective,
    /// Check-up with no parts replaced
    Inspection,
    /// Unplanned roadside/urgent repair
    Emergency,
}

impl ServiceKind {
    /// Get a human-readable label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Preventive => "preventive",
            Self::Corrective => "corrective",
            Self::Inspection => "inspection",
            Self::Emergency => "emergency",
        }
    }
}

/// A motorcycle registered to a client.
///
/// Owned by the surrounding application; the analysis core receives it
/// read-only and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique identifier
    pub id: String,

    /// Manufacturer name (e.g. "Honda")
    pub manufacturer: String,

    /// Model name (e.g. "CB 500X")
    #[serde(default)]
    pub model: String,

    /// Model year
    pub year: i32,

    /// License plate
    #[serde(default)]
    pub plate: String,
}

impl Vehicle {
    /// Create a minimal vehicle for testing.
    pub fn new(id: impl Into<String>, manufacturer: impl Into<String>, year: i32) -> Self {
        Self {
            id: id.into(),
            manufacturer: manufacturer.into(),
            model: String::new(),
            year,
            plate: String::new(),
        }
    }
}

/// A part replaced during a service, with optional warranty coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplacedPart {
    /// Part name as entered by the technician
    pub name: String,

    /// Warranty duration in months, if the part carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_months: Option<u32>,

    /// Warranty distance in kilometers, if the part carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_km: Option<u32>,
}

/// Next-due projection written by the technician at service time.
///
/// Informational only; the analyzers compute their own projections from
/// manufacturer intervals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextDueProjection {
    pub date: NaiveDate,
    pub odometer_km: u32,
    #[serde(default)]
    pub label: String,
}

/// A completed maintenance event logged against a vehicle.
///
/// Created when a work order transitions to completed; never mutated
/// afterwards. Collections of records are a multiset — consumers must not
/// assume any ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Unique identifier
    pub id: String,

    /// Owning vehicle id
    pub vehicle_id: String,

    /// Date the service was performed
    pub service_date: NaiveDate,

    /// Odometer reading at service time, in kilometers
    pub odometer_km: u32,

    /// Kind of service
    pub kind: ServiceKind,

    /// Free-text description of the work performed
    #[serde(default)]
    pub description: String,

    /// Total cost charged for the service
    #[serde(default)]
    pub cost: f64,

    /// Parts replaced during the service
    #[serde(default)]
    pub parts: Vec<ReplacedPart>,

    /// Technician's next-due projection, if one was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due: Option<NextDueProjection>,

    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ServiceRecord {
    /// Create a minimal record for testing.
    pub fn new(
        id: impl Into<String>,
        vehicle_id: impl Into<String>,
        service_date: NaiveDate,
        odometer_km: u32,
        kind: ServiceKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            vehicle_id: vehicle_id.into(),
            service_date,
            odometer_km,
            kind,
            description: description.into(),
            cost: 0.0,
            parts: Vec::new(),
            next_due: None,
            notes: None,
        }
    }

    /// Names of the parts replaced in this service.
    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Categorical risk level derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Map a 0-100 score onto its level band.
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::Low,
            60..=79 => Self::Medium,
            40..=59 => Self::High,
            _ => Self::Critical,
        }
    }

    /// Get a human-readable label for this level.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Urgency of an upcoming-service entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

/// One maintenance item the vehicle will need soon (or needed already).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingService {
    /// Maintenance item label (e.g. "oil change")
    pub item: String,

    /// How pressing the item is
    pub urgency: Urgency,

    /// Textual time/distance-remaining description
    pub window: String,
}

/// Computed health/urgency summary for a vehicle's maintenance state.
///
/// Transient — computed on demand, never persisted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Categorical level derived from the score
    pub level: RiskLevel,

    /// Numeric score, always clamped to 0..=100
    pub score: u8,

    /// Risk-factor descriptions, in the order they were detected
    #[serde(default)]
    pub factors: Vec<String>,

    /// Recommendation strings, in the order they were added
    #[serde(default)]
    pub recommendations: Vec<String>,

    /// Maintenance items coming due
    #[serde(default)]
    pub upcoming: Vec<UpcomingService>,
}

/// What triggered a maintenance alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Distance interval exceeded or about to be
    Distance,
    /// Time interval exceeded or about to be
    Time,
    /// A replaced part's warranty is about to lapse
    PartWarranty,
    /// A manufacturer special rule (e.g. valve clearance check) applies
    MandatoryInspection,
}

impl AlertKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Time => "time",
            Self::PartWarranty => "part warranty",
            Self::MandatoryInspection => "mandatory inspection",
        }
    }
}

/// Alert priority.
///
/// The generator never emits `Low` — items that are not yet due are simply
/// omitted. The variant exists because persisted alerts may carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertPriority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Lifecycle status of a persisted alert.
///
/// Transitions are owned by the surrounding application, not the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Scheduled,
    Done,
    Dismissed,
}

impl AlertStatus {
    /// Whether the alert still needs attention.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Active | Self::Scheduled)
    }
}

/// A discrete, actionable due/overdue maintenance notice.
///
/// Produced unsaved by the alert generator; the caller persists it and
/// fills in `client_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceAlert {
    pub id: Uuid,

    pub vehicle_id: String,

    /// Owning client id, filled by the caller before persisting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    pub kind: AlertKind,

    pub priority: AlertPriority,

    /// Short title shown in lists
    pub title: String,

    /// Longer description with the projection details
    pub description: String,

    pub due_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_odometer: Option<u32>,

    pub status: AlertStatus,

    pub created_at: DateTime<Utc>,
}

/// An entry in a report's upcoming-maintenance list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingEntry {
    pub title: String,
    pub due_date: NaiveDate,
    pub priority: AlertPriority,
}

/// Composite maintenance report, built fresh per request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceReport {
    /// Narrative summary for display or export
    pub summary: String,

    /// History slice the report was built from
    pub history: Vec<ServiceRecord>,

    /// Alerts considered by the report
    pub alerts: Vec<MaintenanceAlert>,

    /// Risk assessment the report embeds
    pub assessment: RiskAssessment,

    /// Open alerts as (title, due date, priority) triples, sorted by due date
    pub upcoming: Vec<UpcomingEntry>,
}
