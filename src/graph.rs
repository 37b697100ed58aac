//! Relationship graph over a loan portfolio.
//!
//! Two loans are connected when they share a lender or any non-empty contact
//! attribute. Every unordered pair is compared, which is quadratic in the
//! portfolio size; portfolios hold tens of loans, so no attribute index is
//! kept.

use crate::types::loan::Loan;
use serde::Serialize;
use std::collections::HashMap;

/// Undirected adjacency lists keyed by loan id.
///
/// Neighbour lists keep the order in which edges were discovered, which the
/// fraud traversal relies on for reproducible paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipGraph {
    /// Loan ids in portfolio order, without duplicates
    nodes: Vec<String>,
    adjacency: HashMap<String, Vec<String>>,
}

/// Node and edge counts of a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
}

impl RelationshipGraph {
    /// Build the graph for `loans`.
    pub fn build(loans: &[Loan]) -> Self {
        let mut graph = Self::default();

        for loan in loans {
            if !graph.adjacency.contains_key(&loan.id) {
                graph.nodes.push(loan.id.clone());
                graph.adjacency.insert(loan.id.clone(), Vec::new());
            }
        }

        for (i, a) in loans.iter().enumerate() {
            for b in &loans[i + 1..] {
                if shares_attribute(a, b) {
                    graph.add_edge(&a.id, &b.id);
                }
            }
        }

        graph
    }

    fn add_edge(&mut self, a: &str, b: &str) {
        if let Some(list) = self.adjacency.get_mut(a) {
            list.push(b.to_string());
        }
        if let Some(list) = self.adjacency.get_mut(b) {
            list.push(a.to_string());
        }
    }

    /// Neighbours of `id` in discovery order; empty for unknown ids
    pub fn neighbors(&self, id: &str) -> &[String] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, id: &str) -> usize {
        self.neighbors(id).len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    /// Loan ids in portfolio order
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum::<usize>() / 2
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
        }
    }
}

/// True when two loans share a lender, email, phone or address.
///
/// Empty or missing values never match each other.
fn shares_attribute(a: &Loan, b: &Loan) -> bool {
    same_non_empty(Some(&a.provider), Some(&b.provider))
        || same_non_empty(a.email.as_ref(), b.email.as_ref())
        || same_non_empty(a.phone.as_ref(), b.phone.as_ref())
        || same_non_empty(a.address.as_ref(), b.address.as_ref())
}

fn same_non_empty(a: Option<&String>, b: Option<&String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => !a.is_empty() && a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(id: &str, provider: &str) -> Loan {
        Loan::new(id, format!("Loan {id}"), provider, 1000.0, 500.0)
    }

    #[test]
    fn test_shared_email_creates_single_edge() {
        let loans = vec![
            loan("a", "Alpha").with_email("x@example.com"),
            loan("b", "Beta").with_email("x@example.com"),
        ];
        let graph = RelationshipGraph::build(&loans);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.neighbors("a"), ["b".to_string()]);
        assert_eq!(graph.neighbors("b"), ["a".to_string()]);
    }

    #[test]
    fn test_provider_match_is_case_sensitive() {
        let loans = vec![loan("a", "Acme"), loan("b", "acme"), loan("c", "Acme")];
        let graph = RelationshipGraph::build(&loans);

        assert_eq!(graph.neighbors("a"), ["c".to_string()]);
        assert!(graph.neighbors("b").is_empty());
    }

    #[test]
    fn test_empty_fields_never_connect() {
        let loans = vec![
            loan("a", "").with_email("").with_phone(""),
            loan("b", "").with_email("").with_phone(""),
            loan("c", "Other"),
        ];
        let graph = RelationshipGraph::build(&loans);

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_any_shared_attribute_connects() {
        let loans = vec![
            loan("a", "P1").with_phone("555-0100"),
            loan("b", "P2").with_phone("555-0100"),
            loan("c", "P3").with_address("1 Main St"),
            loan("d", "P4").with_address("1 Main St"),
        ];
        let graph = RelationshipGraph::build(&loans);

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.neighbors("c"), ["d".to_string()]);
    }

    #[test]
    fn test_multiple_shared_attributes_make_one_edge() {
        let loans = vec![
            loan("a", "Same").with_email("e@x.io").with_phone("1"),
            loan("b", "Same").with_email("e@x.io").with_phone("1"),
        ];
        let graph = RelationshipGraph::build(&loans);

        assert_eq!(graph.degree("a"), 1);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_neighbor_order_follows_portfolio_order() {
        let loans = vec![
            loan("a", "Hub"),
            loan("b", "Hub"),
            loan("c", "Hub"),
            loan("d", "Hub"),
        ];
        let graph = RelationshipGraph::build(&loans);

        assert_eq!(graph.neighbors("a"), ["b", "c", "d"].map(String::from));
        assert_eq!(graph.neighbors("c"), ["a", "b", "d"].map(String::from));
        assert_eq!(
            graph.stats(),
            GraphStats {
                total_nodes: 4,
                total_edges: 6
            }
        );
    }

    #[test]
    fn test_unknown_node_has_no_neighbors() {
        let graph = RelationshipGraph::build(&[]);
        assert!(graph.neighbors("missing").is_empty());
        assert!(!graph.contains("missing"));
    }
}
