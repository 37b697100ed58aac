//! Portfolio-wide fraud audit and recommendation rules

use crate::fraud::analyzer::{FraudAnalysisResult, FraudNetworkAnalyzer};
use crate::graph::{GraphStats, RelationshipGraph};
use crate::types::loan::Loan;
use crate::types::risk::{PortfolioRisk, RiskLevel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

pub const EMPTY_PORTFOLIO_MESSAGE: &str = "No loans to analyze";

/// Analysis of one loan used as the traversal start
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanAnalysis {
    pub loan_id: String,
    pub loan_name: String,
    pub provider: String,
    #[serde(flatten)]
    pub analysis: FraudAnalysisResult,
}

/// Result of auditing a whole portfolio
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAudit {
    pub overall_risk: PortfolioRisk,
    pub total_loans: usize,
    pub analyzed_loans: Vec<LoanAnalysis>,
    /// Analyses above `LOW`, highest fraud score first
    pub flagged_loans: Vec<LoanAnalysis>,
    pub recommendations: Vec<String>,
    pub graph_stats: GraphStats,
}

/// Loan summary carried by a single-loan report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub amount: f64,
    pub remaining: f64,
}

/// Detailed fraud report for one loan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanFraudReport {
    pub loan: LoanSummary,
    #[serde(flatten)]
    pub analysis: FraudAnalysisResult,
    pub generated_at: DateTime<Utc>,
}

/// A recommendation block, appended whenever its condition holds
struct RecommendationRule {
    applies: fn(&[LoanAnalysis]) -> bool,
    advice: fn(&[LoanAnalysis]) -> Vec<String>,
}

fn count_at(flagged: &[LoanAnalysis], level: RiskLevel) -> usize {
    flagged
        .iter()
        .filter(|l| l.analysis.risk_level == level)
        .count()
}

/// Evaluated top to bottom; every matching rule contributes its block
const RECOMMENDATION_RULES: &[RecommendationRule] = &[
    RecommendationRule {
        applies: |flagged| count_at(flagged, RiskLevel::Critical) > 0,
        advice: |flagged| {
            vec![
                format!(
                    "CRITICAL: {} loan(s) show severe fraud patterns",
                    count_at(flagged, RiskLevel::Critical)
                ),
                "Contact your financial institution immediately".to_string(),
                "Freeze credit reports with all three bureaus".to_string(),
            ]
        },
    },
    RecommendationRule {
        applies: |flagged| count_at(flagged, RiskLevel::High) > 0,
        advice: |flagged| {
            vec![
                format!(
                    "HIGH RISK: {} loan(s) need immediate review",
                    count_at(flagged, RiskLevel::High)
                ),
                "Request detailed statements from loan providers".to_string(),
                "Verify all loan details and recent transactions".to_string(),
            ]
        },
    },
    RecommendationRule {
        applies: |flagged| count_at(flagged, RiskLevel::Medium) > 0,
        advice: |flagged| {
            vec![
                format!(
                    "MEDIUM RISK: {} loan(s) show unusual patterns",
                    count_at(flagged, RiskLevel::Medium)
                ),
                "Review loan documentation carefully".to_string(),
                "Set up fraud alerts on your credit accounts".to_string(),
            ]
        },
    },
    RecommendationRule {
        applies: |flagged| flagged.iter().any(|l| l.analysis.connected_loans > 3),
        advice: |_| {
            vec![
                "Multiple loans show interconnected patterns".to_string(),
                "Investigate shared providers or account details".to_string(),
            ]
        },
    },
];

/// Build the advisory list for a set of flagged analyses
pub fn recommendations_for(flagged: &[LoanAnalysis]) -> Vec<String> {
    if flagged.is_empty() {
        return vec![
            "No fraud patterns detected in your loan portfolio".to_string(),
            "Continue monitoring loan activity regularly".to_string(),
        ];
    }

    RECOMMENDATION_RULES
        .iter()
        .filter(|rule| (rule.applies)(flagged))
        .flat_map(|rule| (rule.advice)(flagged))
        .collect()
}

/// Runs the network analyzer from every loan of a portfolio.
#[derive(Debug, Clone, Default)]
pub struct PortfolioAuditor {
    analyzer: FraudNetworkAnalyzer,
}

impl PortfolioAuditor {
    pub fn new(analyzer: FraudNetworkAnalyzer) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&self) -> &FraudNetworkAnalyzer {
        &self.analyzer
    }

    /// Audit every loan in the portfolio.
    pub fn audit(&self, loans: &[Loan]) -> PortfolioAudit {
        if loans.is_empty() {
            return PortfolioAudit {
                overall_risk: PortfolioRisk::None,
                total_loans: 0,
                analyzed_loans: Vec::new(),
                flagged_loans: Vec::new(),
                recommendations: vec![EMPTY_PORTFOLIO_MESSAGE.to_string()],
                graph_stats: GraphStats {
                    total_nodes: 0,
                    total_edges: 0,
                },
            };
        }

        let graph = RelationshipGraph::build(loans);

        let analyzed_loans: Vec<LoanAnalysis> = loans
            .iter()
            .filter_map(|loan| {
                self.analyzer
                    .analyze(&loan.id, &graph, loans)
                    .map(|analysis| LoanAnalysis {
                        loan_id: loan.id.clone(),
                        loan_name: loan.name.clone(),
                        provider: loan.provider.clone(),
                        analysis,
                    })
            })
            .collect();

        let mut flagged_loans: Vec<LoanAnalysis> = analyzed_loans
            .iter()
            .filter(|a| a.analysis.risk_level != RiskLevel::Low)
            .cloned()
            .collect();
        flagged_loans.sort_by(|a, b| b.analysis.fraud_score.cmp(&a.analysis.fraud_score));

        let max_score = analyzed_loans
            .iter()
            .map(|a| a.analysis.fraud_score)
            .max()
            .unwrap_or(0);
        let overall_risk =
            PortfolioRisk::from(RiskLevel::from_score(max_score, self.analyzer.thresholds()));

        let recommendations = recommendations_for(&flagged_loans);
        let graph_stats = graph.stats();

        info!(
            total_loans = loans.len(),
            flagged = flagged_loans.len(),
            max_score = max_score,
            overall_risk = ?overall_risk,
            edges = graph_stats.total_edges,
            "Portfolio audit complete"
        );

        PortfolioAudit {
            overall_risk,
            total_loans: loans.len(),
            analyzed_loans,
            flagged_loans,
            recommendations,
            graph_stats,
        }
    }

    /// Detailed report for one loan, or `None` if the id is unknown
    pub fn loan_report(
        &self,
        loan_id: &str,
        loans: &[Loan],
        generated_at: DateTime<Utc>,
    ) -> Option<LoanFraudReport> {
        let loan = loans.iter().find(|l| l.id == loan_id)?;
        let graph = RelationshipGraph::build(loans);
        let analysis = self.analyzer.analyze(loan_id, &graph, loans)?;

        Some(LoanFraudReport {
            loan: LoanSummary {
                id: loan.id.clone(),
                name: loan.name.clone(),
                provider: loan.provider.clone(),
                amount: loan.total,
                remaining: loan.remaining,
            },
            analysis,
            generated_at,
        })
    }
}
