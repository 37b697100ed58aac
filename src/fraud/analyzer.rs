//! Depth-bounded fraud network traversal

use crate::config::DetectionConfig;
use crate::graph::RelationshipGraph;
use crate::types::loan::Loan;
use crate::types::risk::{RiskLevel, RiskLevelThresholds};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Default traversal depth from the starting loan
pub const DEFAULT_MAX_DEPTH: usize = 3;

const FLAGGED_LOAN_POINTS: u32 = 20;
const LARGE_UNPAID_POINTS: u32 = 10;
const UNKNOWN_PROVIDER_POINTS: u32 = 15;
const HIGH_UTILIZATION_POINTS: u32 = 5;
const POINTS_PER_CONNECTION: u32 = 2;

const LARGE_LOAN_TOTAL: f64 = 50_000.0;
const UNPAID_RATIO: f64 = 0.95;
const HIGH_UTILIZATION_PERCENT: f64 = 95.0;
const CONNECTION_THRESHOLD: usize = 3;
/// Loans scoring above this on their own are reported in the fraud path
const PATH_SCORE_THRESHOLD: u32 = 10;

/// A suspicious loan met during the traversal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudPathEntry {
    pub loan_id: String,
    pub name: String,
    pub provider: String,
    /// This loan's own sub-score
    pub fraud_score: u32,
    pub depth: usize,
    /// Loan ids from the starting loan to this one, inclusive
    pub path: Vec<String>,
}

/// Outcome of one traversal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudAnalysisResult {
    pub risk_level: RiskLevel,
    /// Sum of the sub-scores of every visited loan
    pub fraud_score: u32,
    pub connected_loans: usize,
    /// Number of loans the traversal reached
    pub network_depth: usize,
    pub fraud_path: Vec<FraudPathEntry>,
    /// Visited loan ids in visit order
    pub visited: Vec<String>,
}

/// Scores the network of loans reachable from a starting loan.
#[derive(Debug, Clone, PartialEq)]
pub struct FraudNetworkAnalyzer {
    max_depth: usize,
    thresholds: RiskLevelThresholds,
}

impl Default for FraudNetworkAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH, RiskLevelThresholds::default())
    }
}

/// One active call of the depth-first walk
struct Frame<'g> {
    neighbors: &'g [String],
    depth: usize,
    cursor: usize,
}

/// Mutable state of a single traversal
struct Traversal<'a> {
    graph: &'a RelationshipGraph,
    by_id: HashMap<&'a str, &'a Loan>,
    max_depth: usize,
    visited: HashSet<String>,
    visit_order: Vec<String>,
    fraud_path: Vec<FraudPathEntry>,
    fraud_score: u32,
    connected_loans: usize,
    stack: Vec<Frame<'a>>,
    path: Vec<String>,
}

impl FraudNetworkAnalyzer {
    pub fn new(max_depth: usize, thresholds: RiskLevelThresholds) -> Self {
        Self {
            max_depth,
            thresholds,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(config.max_depth, config.risk_levels.clone())
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn thresholds(&self) -> &RiskLevelThresholds {
        &self.thresholds
    }

    /// Walk the network around `start_loan_id`.
    ///
    /// Returns `None` when the starting id is not among `loans`.
    pub fn analyze(
        &self,
        start_loan_id: &str,
        graph: &RelationshipGraph,
        loans: &[Loan],
    ) -> Option<FraudAnalysisResult> {
        let mut by_id: HashMap<&str, &Loan> = HashMap::with_capacity(loans.len());
        for loan in loans {
            by_id.entry(loan.id.as_str()).or_insert(loan);
        }
        if !by_id.contains_key(start_loan_id) {
            return None;
        }

        let mut walk = Traversal {
            graph,
            by_id,
            max_depth: self.max_depth,
            visited: HashSet::new(),
            visit_order: Vec::new(),
            fraud_path: Vec::new(),
            fraud_score: 0,
            connected_loans: 0,
            stack: Vec::new(),
            path: Vec::new(),
        };
        walk.run(start_loan_id);

        let risk_level = RiskLevel::from_score(walk.fraud_score, &self.thresholds);

        debug!(
            start_loan = %start_loan_id,
            fraud_score = walk.fraud_score,
            risk_level = %risk_level,
            visited = walk.visit_order.len(),
            "Fraud network analyzed"
        );

        Some(FraudAnalysisResult {
            risk_level,
            fraud_score: walk.fraud_score,
            connected_loans: walk.connected_loans,
            network_depth: walk.visit_order.len(),
            fraud_path: walk.fraud_path,
            visited: walk.visit_order,
        })
    }

    /// Sub-score of a single loan given its number of graph neighbours
    pub fn loan_score(loan: &Loan, connection_count: usize) -> u32 {
        let mut score: u32 = 0;

        if loan.is_fraud {
            score = score.saturating_add(FLAGGED_LOAN_POINTS);
        }

        // Large loan with almost nothing repaid
        if loan.total > LARGE_LOAN_TOTAL && loan.remaining > loan.total * UNPAID_RATIO {
            score = score.saturating_add(LARGE_UNPAID_POINTS);
        }

        if loan.provider.to_lowercase().contains("unknown") {
            score = score.saturating_add(UNKNOWN_PROVIDER_POINTS);
        }

        if loan.utilization_percent() > HIGH_UTILIZATION_PERCENT {
            score = score.saturating_add(HIGH_UTILIZATION_POINTS);
        }

        // The whole count is charged once the threshold is crossed
        if connection_count > CONNECTION_THRESHOLD {
            let connections = u32::try_from(connection_count).unwrap_or(u32::MAX);
            score = score.saturating_add(POINTS_PER_CONNECTION.saturating_mul(connections));
        }

        score
    }
}

impl<'a> Traversal<'a> {
    /// Pre-order depth-first walk, equivalent to the recursive form
    /// `visit(node, depth); for n in neighbors { if !visited(n) { visit(n, depth + 1) } }`.
    fn run(&mut self, start: &str) {
        self.enter(start, 0);

        while let Some(frame) = self.stack.last_mut() {
            let neighbors: &'a [String] = frame.neighbors;
            if frame.cursor < neighbors.len() {
                let next = &neighbors[frame.cursor];
                let depth = frame.depth + 1;
                frame.cursor += 1;
                if !self.visited.contains(next) {
                    self.enter(next, depth);
                }
            } else {
                self.stack.pop();
                self.path.pop();
            }
        }
    }

    /// Visit a loan; pushes a frame when its neighbours must be explored.
    fn enter(&mut self, loan_id: &str, depth: usize) {
        if self.visited.contains(loan_id) || depth > self.max_depth {
            return;
        }

        self.visited.insert(loan_id.to_string());
        self.visit_order.push(loan_id.to_string());
        self.connected_loans += 1;

        let Some(loan) = self.by_id.get(loan_id).copied() else {
            return;
        };

        self.path.push(loan_id.to_string());

        let graph: &'a RelationshipGraph = self.graph;
        let neighbors = graph.neighbors(loan_id);
        let loan_score = FraudNetworkAnalyzer::loan_score(loan, neighbors.len());
        self.fraud_score = self.fraud_score.saturating_add(loan_score);

        if loan_score > PATH_SCORE_THRESHOLD {
            self.fraud_path.push(FraudPathEntry {
                loan_id: loan_id.to_string(),
                name: loan.name.clone(),
                provider: loan.provider.clone(),
                fraud_score: loan_score,
                depth,
                path: self.path.clone(),
            });
        }

        self.stack.push(Frame {
            neighbors,
            depth,
            cursor: 0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(id: &str, provider: &str) -> Loan {
        Loan::new(id, format!("Loan {id}"), provider, 1000.0, 500.0)
    }

    fn analyze(start: &str, loans: &[Loan]) -> FraudAnalysisResult {
        let graph = RelationshipGraph::build(loans);
        FraudNetworkAnalyzer::default()
            .analyze(start, &graph, loans)
            .unwrap()
    }

    #[test]
    fn test_isolated_unknown_lender_is_medium() {
        let loans = vec![Loan::new("x", "Mortgage", "Unknown Lender", 60_000.0, 59_000.0)];
        let result = analyze("x", &loans);

        // 10 (large, unpaid) + 15 (unknown provider) + 5 (utilization)
        assert_eq!(result.fraud_score, 30);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.connected_loans, 1);
        assert_eq!(result.fraud_path.len(), 1);
        assert_eq!(result.fraud_path[0].path, vec!["x".to_string()]);
        assert_eq!(result.fraud_path[0].depth, 0);
    }

    #[test]
    fn test_shared_email_pair_connects_both_ways() {
        let loans = vec![
            loan("a", "Alpha").with_email("same@example.com"),
            loan("b", "Beta").with_email("same@example.com"),
        ];

        assert_eq!(analyze("a", &loans).connected_loans, 2);
        assert_eq!(analyze("b", &loans).connected_loans, 2);
    }

    #[test]
    fn test_signal_points() {
        let mut flagged = loan("f", "Bank");
        flagged.is_fraud = true;
        assert_eq!(FraudNetworkAnalyzer::loan_score(&flagged, 0), 20);

        let unpaid = Loan::new("u", "", "Bank", 1000.0, 990.0);
        assert_eq!(FraudNetworkAnalyzer::loan_score(&unpaid, 0), 5);

        let unknown = loan("k", "UNKNOWN corp");
        assert_eq!(FraudNetworkAnalyzer::loan_score(&unknown, 0), 15);

        // Exactly 95% utilization does not trigger
        let edge = Loan::new("e", "", "Bank", 100.0, 95.0);
        assert_eq!(FraudNetworkAnalyzer::loan_score(&edge, 0), 0);
    }

    #[test]
    fn test_connection_points_use_full_count() {
        let plain = loan("p", "Bank");

        assert_eq!(FraudNetworkAnalyzer::loan_score(&plain, 3), 0);
        assert_eq!(FraudNetworkAnalyzer::loan_score(&plain, 4), 8);
        assert_eq!(FraudNetworkAnalyzer::loan_score(&plain, 6), 12);
    }

    #[test]
    fn test_huge_connection_count_saturates() {
        let mut flagged = loan("f", "Unknown Lender");
        flagged.is_fraud = true;

        assert_eq!(FraudNetworkAnalyzer::loan_score(&flagged, usize::MAX), u32::MAX);
        assert_eq!(
            FraudNetworkAnalyzer::loan_score(&loan("p", "Bank"), u32::MAX as usize / 2 + 1),
            u32::MAX
        );
    }

    #[test]
    fn test_depth_bound_stops_traversal() {
        // Chain a - b - c - d - e - f via pairwise shared phones
        let loans = vec![
            loan("a", "P1").with_phone("1"),
            loan("b", "P2").with_phone("1").with_email("2"),
            loan("c", "P3").with_email("2").with_address("3"),
            loan("d", "P4").with_address("3").with_email("4"),
            loan("e", "P5").with_email("4").with_address("5"),
            loan("f", "P6").with_address("5"),
        ];
        let result = analyze("a", &loans);

        assert_eq!(result.visited, ["a", "b", "c", "d"].map(String::from));
        assert_eq!(result.network_depth, 4);

        let graph = RelationshipGraph::build(&loans);
        let shallow = FraudNetworkAnalyzer::new(1, RiskLevelThresholds::default())
            .analyze("a", &graph, &loans)
            .unwrap();
        assert_eq!(shallow.visited, ["a", "b"].map(String::from));
    }

    #[test]
    fn test_preorder_paths_follow_adjacency_order() {
        // a-b and a-c share provider groups; c-d share an email
        let mut loans = vec![
            Loan::new("a", "A", "Unknown One", 100.0, 99.0),
            Loan::new("b", "B", "Unknown One", 100.0, 99.0),
            Loan::new("c", "C", "Unknown Two", 100.0, 99.0).with_email("c@d"),
            Loan::new("d", "D", "Unknown Three", 100.0, 99.0).with_email("c@d"),
        ];
        loans[2].phone = Some("shared".to_string());
        loans[0].phone = Some("shared".to_string());

        let result = analyze("a", &loans);

        assert_eq!(result.visited, ["a", "b", "c", "d"].map(String::from));
        let paths: Vec<Vec<String>> = result.fraud_path.iter().map(|e| e.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                vec!["a".to_string()],
                vec!["a".to_string(), "b".to_string()],
                vec!["a".to_string(), "c".to_string()],
                vec!["a".to_string(), "c".to_string(), "d".to_string()],
            ]
        );
        // Each loan: 15 (unknown) + 5 (utilization)
        assert_eq!(result.fraud_score, 80);
        assert_eq!(result.risk_level, RiskLevel::Critical);
    }

    #[test]
    fn test_cycles_are_visited_once() {
        let loans = vec![loan("a", "Ring"), loan("b", "Ring"), loan("c", "Ring")];
        let result = analyze("b", &loans);

        assert_eq!(result.visited.len(), 3);
        assert_eq!(result.connected_loans, 3);
        let unique: HashSet<&String> = result.visited.iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_low_scoring_loans_stay_off_the_path() {
        let loans = vec![loan("a", "Bank")];
        let result = analyze("a", &loans);

        assert_eq!(result.fraud_score, 0);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(result.fraud_path.is_empty());
    }

    #[test]
    fn test_unknown_start_is_not_found() {
        let loans = vec![loan("a", "Bank")];
        let graph = RelationshipGraph::build(&loans);

        assert!(FraudNetworkAnalyzer::default()
            .analyze("missing", &graph, &loans)
            .is_none());
    }

    #[test]
    fn test_repeated_analysis_is_identical() {
        let loans = vec![
            loan("a", "Hub"),
            loan("b", "Hub"),
            loan("c", "Unknown Hub").with_email("m@x"),
            loan("d", "Hub").with_email("m@x"),
        ];
        let first = analyze("c", &loans);
        let second = analyze("c", &loans);

        assert_eq!(first, second);
    }
}
