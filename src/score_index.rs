//! Binary search tree over non-overlapping score ranges.
//!
//! Nodes are ordered by their lower bound. The tree never rebalances, so its
//! shape is whatever the insertion order makes it: inserting the middle range
//! first and bisecting from there gives logarithmic lookups, while inserting
//! ranges in ascending order degrades to a linked list.

use serde::Serialize;

#[derive(Debug, Clone)]
struct CategoryNode<T> {
    min_score: u32,
    max_score: u32,
    category: T,
    left: Option<Box<CategoryNode<T>>>,
    right: Option<Box<CategoryNode<T>>>,
}

/// Lookup outcome with the number of nodes compared along the way
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeLookup<'a, T> {
    pub category: Option<&'a T>,
    pub comparisons: usize,
}

/// One entry of an in-order listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeEntry<'a, T> {
    pub min_score: u32,
    pub max_score: u32,
    pub category: &'a T,
}

/// Maps inclusive `[min, max]` score ranges to category data.
#[derive(Debug, Clone)]
pub struct ScoreRangeIndex<T> {
    root: Option<Box<CategoryNode<T>>>,
    len: usize,
}

impl<T> Default for ScoreRangeIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScoreRangeIndex<T> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Insert a range; ties on `min_score` go right.
    pub fn insert(&mut self, min_score: u32, max_score: u32, category: T) {
        let node = Box::new(CategoryNode {
            min_score,
            max_score,
            category,
            left: None,
            right: None,
        });
        attach(&mut self.root, node);
        self.len += 1;
    }

    /// Category whose range contains `score`
    pub fn search(&self, score: u32) -> Option<&T> {
        self.search_with_stats(score).category
    }

    pub fn search_with_stats(&self, score: u32) -> RangeLookup<'_, T> {
        let mut comparisons = 0;
        let mut current = self.root.as_deref();

        while let Some(node) = current {
            comparisons += 1;
            if score >= node.min_score && score <= node.max_score {
                return RangeLookup {
                    category: Some(&node.category),
                    comparisons,
                };
            }
            current = if score < node.min_score {
                node.left.as_deref()
            } else {
                node.right.as_deref()
            };
        }

        RangeLookup {
            category: None,
            comparisons,
        }
    }

    /// Number of levels; 0 for an empty tree
    pub fn height(&self) -> usize {
        fn depth<T>(node: Option<&CategoryNode<T>>) -> usize {
            match node {
                None => 0,
                Some(n) => 1 + depth(n.left.as_deref()).max(depth(n.right.as_deref())),
            }
        }
        depth(self.root.as_deref())
    }

    /// Ranges in ascending order of lower bound
    pub fn in_order(&self) -> Vec<RangeEntry<'_, T>> {
        let mut entries = Vec::with_capacity(self.len);
        let mut stack: Vec<&CategoryNode<T>> = Vec::new();
        let mut current = self.root.as_deref();

        while current.is_some() || !stack.is_empty() {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            if let Some(node) = stack.pop() {
                entries.push(RangeEntry {
                    min_score: node.min_score,
                    max_score: node.max_score,
                    category: &node.category,
                });
                current = node.right.as_deref();
            }
        }

        entries
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn attach<T>(slot: &mut Option<Box<CategoryNode<T>>>, node: Box<CategoryNode<T>>) {
    match slot {
        Some(parent) if node.min_score < parent.min_score => attach(&mut parent.left, node),
        Some(parent) => attach(&mut parent.right, node),
        None => *slot = Some(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGES: [(u32, u32, &str); 5] = [
        (300, 579, "a"),
        (580, 669, "b"),
        (670, 739, "c"),
        (740, 799, "d"),
        (800, 850, "e"),
    ];

    fn build(order: &[usize]) -> ScoreRangeIndex<&'static str> {
        let mut index = ScoreRangeIndex::new();
        for &i in order {
            let (min, max, name) = RANGES[i];
            index.insert(min, max, name);
        }
        index
    }

    #[test]
    fn test_search_hits_each_range() {
        let index = build(&[2, 1, 3, 0, 4]);

        assert_eq!(index.search(300), Some(&"a"));
        assert_eq!(index.search(579), Some(&"a"));
        assert_eq!(index.search(580), Some(&"b"));
        assert_eq!(index.search(700), Some(&"c"));
        assert_eq!(index.search(799), Some(&"d"));
        assert_eq!(index.search(850), Some(&"e"));
    }

    #[test]
    fn test_out_of_range_is_not_found() {
        let index = build(&[2, 1, 3, 0, 4]);

        assert_eq!(index.search(0), None);
        assert_eq!(index.search(299), None);
        assert_eq!(index.search(851), None);
    }

    #[test]
    fn test_balanced_order_bounds_comparisons() {
        let index = build(&[2, 1, 3, 0, 4]);

        assert_eq!(index.height(), 3);
        for score in 300..=850 {
            let lookup = index.search_with_stats(score);
            assert!(lookup.category.is_some());
            assert!(lookup.comparisons <= 3);
        }
    }

    #[test]
    fn test_ascending_order_degenerates() {
        let index = build(&[0, 1, 2, 3, 4]);

        assert_eq!(index.height(), 5);
        assert_eq!(index.search_with_stats(820).comparisons, 5);
        // Still correct, only slower
        assert_eq!(index.search(820), Some(&"e"));
    }

    #[test]
    fn test_in_order_listing() {
        let index = build(&[2, 4, 0, 3, 1]);
        let mins: Vec<u32> = index.in_order().iter().map(|e| e.min_score).collect();

        assert_eq!(mins, vec![300, 580, 670, 740, 800]);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_empty_index() {
        let index: ScoreRangeIndex<u8> = ScoreRangeIndex::new();

        assert!(index.is_empty());
        assert_eq!(index.height(), 0);
        assert_eq!(index.search_with_stats(500).comparisons, 0);
    }
}
