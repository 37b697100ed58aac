//! Configuration management for the risk engine

use crate::types::risk::RiskLevelThresholds;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub input: InputConfig,
    pub detection: DetectionConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    pub logging: LoggingConfig,
}

/// Where the binary reads its records from
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// JSON array of loans
    pub loans_path: String,
    /// JSON array of customers
    pub customers_path: String,
    /// Optional JSON array of new loans to screen against the portfolio
    #[serde(default)]
    pub candidates_path: Option<String>,
}

/// Fraud-network detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Hops explored from the starting loan
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Risk level classification thresholds
    #[serde(default)]
    pub risk_levels: RiskLevelThresholds,
}

fn default_max_depth() -> usize {
    crate::fraud::analyzer::DEFAULT_MAX_DEPTH
}

/// New-loan screening thresholds
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidationConfig {
    /// Scores at or above this are invalid
    pub reject_at: u32,
    /// Scores at or above this are flagged for review
    pub flag_at: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            reject_at: 20,
            flag_at: 15,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            risk_levels: RiskLevelThresholds::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input: InputConfig {
                loans_path: "data/loans.json".to_string(),
                customers_path: "data/customers.json".to_string(),
                candidates_path: None,
            },
            detection: DetectionConfig::default(),
            validation: ValidationConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }
}
