//! Evaluation CLI for exercising the maintenance analysis pipeline.
//!
//! Usage:
//!     eval assess fixtures/cb500x.json --odometer 13500
//!     eval alerts fixtures/cb500x.json --odometer 13500 --format json
//!     eval report fixtures/cb500x.json --odometer 13500
//!
//! A fixture file carries one vehicle plus its service records:
//!     { "vehicle": { ... }, "records": [ ... ] }

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use motocare_alerts::{generate_alerts_assisted, AlertConfig};
use motocare_model::{MaintenanceAlert, RiskAssessment, ServiceRecord, Vehicle};
use motocare_reasoning::{Provider, ReasoningAdapter, ReasoningConfig};
use motocare_report::build_report;
use motocare_risk::{assess_risk_assisted, RiskConfig};
use motocare_schedule::ScheduleCatalog;
use motocare_store::{HistoryStore, InMemoryHistoryStore};
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "eval")]
#[command(about = "Evaluate vehicle maintenance risk and alerts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Reasoning provider (openai, anthropic, gemini); omit for deterministic-only
    #[arg(long, global = true)]
    provider: Option<String>,

    /// API key for the reasoning provider
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Provider model override
    #[arg(long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the risk assessment for a vehicle
    Assess {
        /// Path to the fixture JSON file
        file: String,

        /// Current odometer reading in kilometers
        #[arg(short, long)]
        odometer: u32,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Generate maintenance alerts for a vehicle
    Alerts {
        file: String,

        #[arg(short, long)]
        odometer: u32,

        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Build the full maintenance report for a vehicle
    Report {
        file: String,

        #[arg(short, long)]
        odometer: u32,

        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[derive(Debug, Deserialize)]
struct Fixture {
    vehicle: Vehicle,
    #[serde(default)]
    records: Vec<ServiceRecord>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("motocare=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let reasoning = ReasoningConfig {
        provider: cli
            .provider
            .as_deref()
            .map(Provider::from)
            .unwrap_or_default(),
        api_key: cli.api_key.clone().unwrap_or_default(),
        model: cli.model.clone(),
        ..Default::default()
    };
    let adapter = ReasoningAdapter::from_config(&reasoning);
    if let Some(adapter) = &adapter {
        tracing::debug!(provider = adapter.provider_name(), "Reasoning assistance enabled");
    }

    match cli.command {
        Commands::Assess {
            file,
            odometer,
            format,
        } => {
            let (vehicle, history) = load_fixture(&file)?;
            let assessment = assess(&vehicle, &history, odometer, adapter.as_ref()).await;
            print_assessment(&vehicle, &assessment, &format)?;
        }
        Commands::Alerts {
            file,
            odometer,
            format,
        } => {
            let (vehicle, history) = load_fixture(&file)?;
            let alerts = alerts(&vehicle, &history, odometer, adapter.as_ref()).await;
            print_alerts(&alerts, &format)?;
        }
        Commands::Report {
            file,
            odometer,
            format,
        } => {
            let (vehicle, history) = load_fixture(&file)?;
            let assessment = assess(&vehicle, &history, odometer, adapter.as_ref()).await;
            let alerts = alerts(&vehicle, &history, odometer, adapter.as_ref()).await;
            let report = build_report(&vehicle, &history, &alerts, &assessment);

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.summary);
                if !report.upcoming.is_empty() {
                    println!("\nUpcoming maintenance:");
                    for entry in &report.upcoming {
                        println!(
                            "  {} — due {} [{}]",
                            entry.title,
                            entry.due_date,
                            entry.priority.label()
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

/// Load a fixture and replay it through the history store, the same path the
/// shop application takes when a work order completes.
fn load_fixture(path: &str) -> Result<(Vehicle, Vec<ServiceRecord>)> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read fixture {}", path))?;
    let fixture: Fixture =
        serde_json::from_str(&raw).with_context(|| format!("Invalid fixture {}", path))?;

    let mut store = InMemoryHistoryStore::new();
    for record in fixture.records {
        store
            .append(record)
            .context("Fixture contains a duplicate record")?;
    }
    let history = store.history_for(&fixture.vehicle.id);
    Ok((fixture.vehicle, history))
}

async fn assess(
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    odometer: u32,
    adapter: Option<&ReasoningAdapter>,
) -> RiskAssessment {
    let catalog = ScheduleCatalog::default();
    let schedule = catalog.schedule_for(&vehicle.manufacturer);
    assess_risk_assisted(
        vehicle,
        history,
        odometer,
        schedule,
        &RiskConfig::default(),
        adapter,
    )
    .await
}

async fn alerts(
    vehicle: &Vehicle,
    history: &[ServiceRecord],
    odometer: u32,
    adapter: Option<&ReasoningAdapter>,
) -> Vec<MaintenanceAlert> {
    let catalog = ScheduleCatalog::default();
    let schedule = catalog.schedule_for(&vehicle.manufacturer);
    generate_alerts_assisted(
        vehicle,
        history,
        odometer,
        schedule,
        &AlertConfig::default(),
        adapter,
    )
    .await
}

fn print_assessment(vehicle: &Vehicle, assessment: &RiskAssessment, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(assessment)?);
        return Ok(());
    }

    println!(
        "{} {} ({})",
        vehicle.manufacturer, vehicle.model, vehicle.year
    );
    println!(
        "Risk: {} (score {})",
        assessment.level.label(),
        assessment.score
    );
    if !assessment.factors.is_empty() {
        println!("\nFactors:");
        for factor in &assessment.factors {
            println!("  - {}", factor);
        }
    }
    if !assessment.recommendations.is_empty() {
        println!("\nRecommendations:");
        for rec in &assessment.recommendations {
            println!("  - {}", rec);
        }
    }
    if !assessment.upcoming.is_empty() {
        println!("\nUpcoming:");
        for entry in &assessment.upcoming {
            println!("  - {} ({:?}): {}", entry.item, entry.urgency, entry.window);
        }
    }
    Ok(())
}

fn print_alerts(alerts: &[MaintenanceAlert], format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(alerts)?);
        return Ok(());
    }

    if alerts.is_empty() {
        println!("No alerts.");
        return Ok(());
    }
    for (i, alert) in alerts.iter().enumerate() {
        println!(
            "{}. [{}] {} ({})",
            i + 1,
            alert.priority.label(),
            alert.title,
            alert.kind.label()
        );
        println!("   {}", alert.description);
        match alert.due_odometer {
            Some(km) => println!("   Due {} at {} km", alert.due_date, km),
            None => println!("   Due {}", alert.due_date),
        }
    }
    println!("\nTotal: {} alert(s)", alerts.len());
    Ok(())
}
