//! Portfolio Risk Engine - Main Entry Point
//!
//! Reads a loan portfolio and a customer list, audits the portfolio for fraud
//! networks, segments the customers and estimates their lifetime value, then
//! prints a JSON report to stdout.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use portfolio_risk_engine::{
    config::{AppConfig, LoggingConfig},
    fraud::{
        FraudNetworkAnalyzer, LoanValidation, LoanValidator, PortfolioAudit, PortfolioAuditor,
    },
    metrics::EngineMetrics,
    segmentation::{
        ClvOverview, ClvRecord, LifetimeValueEstimator, RfmOverview, RfmRecord,
        SegmentationEngine,
    },
    types::{Customer, Loan},
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    generated_at: DateTime<Utc>,
    audit: PortfolioAudit,
    segmentation: SegmentationReport,
    lifetime_value: LifetimeValueReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    candidates: Vec<CandidateReport>,
}

#[derive(Serialize)]
struct SegmentationReport {
    overview: RfmOverview,
    customers: Vec<RfmRecord>,
}

#[derive(Serialize)]
struct LifetimeValueReport {
    overview: ClvOverview,
    customers: Vec<ClvRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CandidateReport {
    name: String,
    #[serde(flatten)]
    outcome: CandidateOutcome,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum CandidateOutcome {
    Validation(LoanValidation),
    Rejected(String),
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("portfolio_risk_engine={}", logging.level)))
        .context("Invalid log level")?;

    // stdout carries the report
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "pretty" {
        builder.pretty().init();
    } else {
        builder.json().init();
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<Vec<T>> {
    let raw = fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read {}", path))?;

    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path))
}

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };

    init_logging(&config.logging)?;

    info!("Starting Portfolio Risk Engine");
    info!(
        max_depth = config.detection.max_depth,
        medium = config.detection.risk_levels.medium,
        high = config.detection.risk_levels.high,
        critical = config.detection.risk_levels.critical,
        "Configuration loaded"
    );

    let loans: Vec<Loan> = read_json(&config.input.loans_path)?;
    let customers: Vec<Customer> = read_json(&config.input.customers_path)?;
    info!(
        loans = loans.len(),
        customers = customers.len(),
        "Input loaded"
    );

    let metrics = EngineMetrics::new();
    let now = Utc::now();
    let analyzer = FraudNetworkAnalyzer::from_config(&config.detection);

    let start = Instant::now();
    let audit = PortfolioAuditor::new(analyzer.clone()).audit(&loans);
    metrics.record_audit(start.elapsed(), &audit);

    let start = Instant::now();
    let rfm_records = SegmentationEngine::new().segment(&customers, now);
    metrics.record_segmentation(start.elapsed(), &rfm_records);

    let start = Instant::now();
    let clv_records = LifetimeValueEstimator::new().estimate_all(&customers, now);
    metrics.record_pass_time("clv", start.elapsed());

    let mut candidates = Vec::new();
    if let Some(path) = &config.input.candidates_path {
        let validator = LoanValidator::new(analyzer, &config.validation);
        let start = Instant::now();

        for candidate in read_json::<Loan>(path)? {
            let outcome = match validator.validate(&candidate, &loans) {
                Ok(validation) => CandidateOutcome::Validation(validation),
                Err(e) => {
                    warn!(candidate = %candidate.name, error = %e, "Candidate rejected");
                    CandidateOutcome::Rejected(e.to_string())
                }
            };
            candidates.push(CandidateReport {
                name: candidate.name,
                outcome,
            });
        }
        metrics.record_pass_time("validation", start.elapsed());
    }

    let report = RunReport {
        generated_at: now,
        segmentation: SegmentationReport {
            overview: RfmOverview::from_records(&rfm_records),
            customers: rfm_records,
        },
        lifetime_value: LifetimeValueReport {
            overview: ClvOverview::from_records(&clv_records, &customers, now),
            customers: clv_records,
        },
        audit,
        candidates,
    };

    info!(
        overall_risk = ?report.audit.overall_risk,
        flagged = report.audit.flagged_loans.len(),
        "Run complete"
    );
    metrics.print_summary();

    let output = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", output);

    Ok(())
}
