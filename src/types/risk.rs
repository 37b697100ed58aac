//! Risk level classification for fraud scores

use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk level classification of a cumulative fraud score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Determine risk level from score and thresholds.
    ///
    /// Every boundary is exclusive: a score equal to a threshold stays in the
    /// lower level.
    pub fn from_score(score: u32, thresholds: &RiskLevelThresholds) -> Self {
        if score > thresholds.critical {
            RiskLevel::Critical
        } else if score > thresholds.high {
            RiskLevel::High
        } else if score > thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Configurable risk level thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskLevelThresholds {
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            medium: 15,
            high: 30,
            critical: 50,
        }
    }
}

/// Portfolio-wide risk, which adds `None` for an empty portfolio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortfolioRisk {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl From<RiskLevel> for PortfolioRisk {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => PortfolioRisk::Low,
            RiskLevel::Medium => PortfolioRisk::Medium,
            RiskLevel::High => PortfolioRisk::High,
            RiskLevel::Critical => PortfolioRisk::Critical,
        }
    }
}
