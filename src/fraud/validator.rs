//! Pre-insert screening of a new loan against an existing portfolio

use crate::config::ValidationConfig;
use crate::error::{EngineError, Result};
use crate::fraud::analyzer::FraudNetworkAnalyzer;
use crate::graph::RelationshipGraph;
use crate::types::loan::{FraudReport, Loan};
use crate::types::risk::RiskLevel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

pub const HIGH_RISK_WARNING: &str = "This loan shows high-risk fraud patterns";
pub const MANY_CONNECTIONS_WARNING: &str = "This loan has many connections to existing loans";
pub const LARGE_AMOUNT_WARNING: &str = "Large loan amount - verify legitimacy";

const MANY_CONNECTIONS: usize = 3;
const LARGE_AMOUNT: f64 = 50_000.0;

/// Verdict on a candidate loan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanValidation {
    /// Score below the rejection threshold
    pub is_valid: bool,
    pub fraud_score: u32,
    pub risk_level: RiskLevel,
    pub warnings: Vec<String>,
    /// Score at or above the flag threshold; may hold while `is_valid` does
    pub should_flag: bool,
}

impl LoanValidation {
    /// System report to attach to the candidate when it should be flagged
    pub fn auto_flag_report(&self, now: DateTime<Utc>) -> Option<FraudReport> {
        self.should_flag
            .then(|| FraudReport::auto_flagged(&self.warnings, now))
    }
}

/// Screens candidate loans before they are stored.
#[derive(Debug, Clone)]
pub struct LoanValidator {
    analyzer: FraudNetworkAnalyzer,
    reject_at: u32,
    flag_at: u32,
}

impl Default for LoanValidator {
    fn default() -> Self {
        Self::new(FraudNetworkAnalyzer::default(), &ValidationConfig::default())
    }
}

impl LoanValidator {
    pub fn new(analyzer: FraudNetworkAnalyzer, config: &ValidationConfig) -> Self {
        Self {
            analyzer,
            reject_at: config.reject_at,
            flag_at: config.flag_at,
        }
    }

    /// Analyze `candidate` as if it had been added to `existing`.
    ///
    /// The candidate is given a synthetic `temp-` id for the analysis. A
    /// candidate carrying the real id of a loan already in the portfolio is
    /// rejected with [`EngineError::DuplicateLoanId`].
    pub fn validate(&self, candidate: &Loan, existing: &[Loan]) -> Result<LoanValidation> {
        if !candidate.id.is_empty() && existing.iter().any(|l| l.id == candidate.id) {
            warn!(loan_id = %candidate.id, "Candidate loan reuses an existing id");
            return Err(EngineError::DuplicateLoanId(candidate.id.clone()));
        }

        let temp_id = format!("temp-{}", uuid::Uuid::new_v4());
        let mut loans = Vec::with_capacity(existing.len() + 1);
        loans.extend_from_slice(existing);
        loans.push(Loan {
            id: temp_id.clone(),
            ..candidate.clone()
        });

        let graph = RelationshipGraph::build(&loans);
        let analysis = self
            .analyzer
            .analyze(&temp_id, &graph, &loans)
            .ok_or_else(|| EngineError::LoanNotFound(temp_id.clone()))?;

        let mut warnings = Vec::new();
        if analysis.fraud_score >= self.reject_at {
            warnings.push(HIGH_RISK_WARNING.to_string());
        }
        if analysis.connected_loans > MANY_CONNECTIONS {
            warnings.push(MANY_CONNECTIONS_WARNING.to_string());
        }
        if candidate.total > LARGE_AMOUNT {
            warnings.push(LARGE_AMOUNT_WARNING.to_string());
        }

        let validation = LoanValidation {
            is_valid: analysis.fraud_score < self.reject_at,
            fraud_score: analysis.fraud_score,
            risk_level: analysis.risk_level,
            warnings,
            should_flag: analysis.fraud_score >= self.flag_at,
        };

        debug!(
            candidate = %candidate.name,
            fraud_score = validation.fraud_score,
            is_valid = validation.is_valid,
            should_flag = validation.should_flag,
            "Candidate loan validated"
        );

        Ok(validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(id: &str, provider: &str) -> Loan {
        Loan::new(id, format!("Loan {id}"), provider, 1000.0, 500.0)
    }

    #[test]
    fn test_clean_candidate() {
        let existing = vec![loan("a", "Bank A")];
        let candidate = loan("", "Bank B");
        let result = LoanValidator::default()
            .validate(&candidate, &existing)
            .unwrap();

        assert!(result.is_valid);
        assert!(!result.should_flag);
        assert!(result.warnings.is_empty());
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(result.auto_flag_report(Utc::now()).is_none());
    }

    #[test]
    fn test_candidate_document_without_id() {
        let candidate: Loan =
            serde_json::from_str(r#"{"name": "New card", "provider": "Bank B", "total": 500}"#)
                .unwrap();
        let result = LoanValidator::default()
            .validate(&candidate, &[loan("a", "Bank A")])
            .unwrap();

        assert!(result.is_valid);
    }

    #[test]
    fn test_identical_to_four_existing_loans() {
        let existing: Vec<Loan> = (0..4)
            .map(|i| loan(&format!("e{i}"), "Twin Lender").with_email("same@x.io"))
            .collect();
        let candidate = loan("new", "Twin Lender").with_email("same@x.io");

        let result = LoanValidator::default()
            .validate(&candidate, &existing)
            .unwrap();

        // Every loan in the clique has 4 neighbours: 5 loans x 8 points
        assert_eq!(result.fraud_score, 40);
        assert!(result.should_flag);
        assert!(!result.is_valid);
        assert_eq!(
            result.warnings,
            vec![
                HIGH_RISK_WARNING.to_string(),
                MANY_CONNECTIONS_WARNING.to_string()
            ]
        );
    }

    #[test]
    fn test_flag_band_is_still_valid() {
        // 15 points: unknown provider only
        let candidate = loan("", "unknown lender");
        let result = LoanValidator::default().validate(&candidate, &[]).unwrap();

        assert_eq!(result.fraud_score, 15);
        assert!(result.is_valid);
        assert!(result.should_flag);
        assert!(result.warnings.is_empty());

        let report = result.auto_flag_report(Utc::now()).unwrap();
        assert!(report.is_auto_flagged());
        assert_eq!(report.details, "");
    }

    #[test]
    fn test_reject_threshold_is_inclusive() {
        // 20 points: unknown provider + high utilization
        let candidate = Loan::new("", "Card", "Unknown", 1000.0, 990.0);
        let result = LoanValidator::default().validate(&candidate, &[]).unwrap();

        assert_eq!(result.fraud_score, 20);
        assert!(!result.is_valid);
        assert_eq!(result.warnings, vec![HIGH_RISK_WARNING.to_string()]);
    }

    #[test]
    fn test_large_amount_warns_independently() {
        let candidate = Loan::new("", "Mortgage", "Bank", 200_000.0, 10_000.0);
        let result = LoanValidator::default().validate(&candidate, &[]).unwrap();

        assert!(result.is_valid);
        assert_eq!(result.warnings, vec![LARGE_AMOUNT_WARNING.to_string()]);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let existing = vec![loan("dup", "Bank")];
        let candidate = loan("dup", "Other");

        let err = LoanValidator::default()
            .validate(&candidate, &existing)
            .unwrap_err();
        assert_eq!(err, EngineError::DuplicateLoanId("dup".to_string()));
    }

    #[test]
    fn test_existing_portfolio_is_untouched() {
        let existing = vec![loan("a", "Bank")];
        let snapshot = existing.clone();
        let _ = LoanValidator::default().validate(&loan("", "Bank"), &existing);

        assert_eq!(existing, snapshot);
    }
}
