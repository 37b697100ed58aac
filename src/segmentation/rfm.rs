//! Recency / frequency / monetary segmentation

use crate::types::customer::Customer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::info;

/// Spending per simulated transaction
pub(crate) const SPEND_PER_TRANSACTION: f64 = 100.0;
const NEUTRAL_SCORE: u8 = 3;
const QUINTILES: usize = 5;

/// Behavioural segment, in rule priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Segment {
    Champions,
    Loyal,
    Potential,
    Promising,
    NeedAttention,
    AboutToSleep,
    AtRisk,
    CantLose,
    Hibernating,
    Lost,
}

impl Segment {
    pub const ALL: [Segment; 10] = [
        Segment::Champions,
        Segment::Loyal,
        Segment::Potential,
        Segment::Promising,
        Segment::NeedAttention,
        Segment::AboutToSleep,
        Segment::AtRisk,
        Segment::CantLose,
        Segment::Hibernating,
        Segment::Lost,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Segment::Champions => "Champions",
            Segment::Loyal => "Loyal Customers",
            Segment::Potential => "Potential Loyalists",
            Segment::Promising => "Promising",
            Segment::NeedAttention => "Need Attention",
            Segment::AboutToSleep => "About To Sleep",
            Segment::AtRisk => "At Risk",
            Segment::CantLose => "Can't Lose Them",
            Segment::Hibernating => "Hibernating",
            Segment::Lost => "Lost",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_name())
    }
}

/// Quintile scores of one customer, each in 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfmScores {
    pub r: u8,
    pub f: u8,
    pub m: u8,
}

struct SegmentRule {
    segment: Segment,
    matches: fn(RfmScores) -> bool,
}

/// First matching rule wins. Score tuples often satisfy several rules, so
/// the order is part of the contract; `CantLose` is fully covered by
/// `AtRisk` and never assigned.
const SEGMENT_RULES: &[SegmentRule] = &[
    SegmentRule {
        segment: Segment::Champions,
        matches: |s| s.r >= 4 && s.f >= 4 && s.m >= 4,
    },
    SegmentRule {
        segment: Segment::Loyal,
        matches: |s| s.r >= 3 && s.f >= 4 && s.m >= 3,
    },
    SegmentRule {
        segment: Segment::Potential,
        matches: |s| s.r >= 4 && s.f >= 3 && s.m >= 2,
    },
    SegmentRule {
        segment: Segment::Promising,
        matches: |s| s.r >= 4 && s.f <= 2,
    },
    SegmentRule {
        segment: Segment::NeedAttention,
        matches: |s| s.r >= 3 && s.f >= 2 && s.m >= 2,
    },
    SegmentRule {
        segment: Segment::AboutToSleep,
        matches: |s| (2..=3).contains(&s.r) && s.f <= 2,
    },
    SegmentRule {
        segment: Segment::AtRisk,
        matches: |s| s.r <= 2 && s.f >= 3 && s.m >= 3,
    },
    SegmentRule {
        segment: Segment::CantLose,
        matches: |s| s.r <= 2 && s.f >= 4 && s.m >= 4,
    },
    SegmentRule {
        segment: Segment::Hibernating,
        matches: |s| s.r <= 2 && s.f <= 2 && s.m >= 2,
    },
    SegmentRule {
        segment: Segment::Lost,
        matches: |_| true,
    },
];

/// Segment for a score tuple
pub fn classify(scores: RfmScores) -> Segment {
    SEGMENT_RULES
        .iter()
        .find(|rule| (rule.matches)(scores))
        .map(|rule| rule.segment)
        .unwrap_or(Segment::Lost)
}

/// Per-customer segmentation result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfmRecord {
    pub customer_id: String,
    /// Days since last activity
    pub recency: i64,
    pub frequency: u64,
    pub monetary: f64,
    pub r_score: u8,
    pub f_score: u8,
    pub m_score: u8,
    pub segment: Segment,
}

impl RfmRecord {
    pub fn scores(&self) -> RfmScores {
        RfmScores {
            r: self.r_score,
            f: self.f_score,
            m: self.m_score,
        }
    }
}

/// Simulated transaction count: one per 100 spent, at least one for any spend
pub fn transaction_count(total_spending: f64) -> u64 {
    if total_spending > 0.0 {
        ((total_spending / SPEND_PER_TRANSACTION).floor() as u64).max(1)
    } else {
        0
    }
}

/// Quintile score of `value` within ascending `sorted`.
///
/// Ties share the score of the first occurrence. An empty list or a value
/// missing from it scores a neutral 3. `reverse` flips the scale for metrics
/// where lower is better.
pub fn quintile_score<T: PartialOrd>(value: &T, sorted: &[T], reverse: bool) -> u8 {
    if sorted.is_empty() {
        return NEUTRAL_SCORE;
    }
    let Some(index) = sorted.iter().position(|v| v == value) else {
        return NEUTRAL_SCORE;
    };

    let bucket = sorted.len().div_ceil(QUINTILES);
    let score = (index / bucket + 1).min(QUINTILES) as u8;

    if reverse {
        6 - score
    } else {
        score
    }
}

fn sorted_by_partial<T: PartialOrd + Copy>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut sorted: Vec<T> = values.collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Segments customers by relative recency, frequency and spend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentationEngine;

impl SegmentationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score and segment every customer relative to the others
    pub fn segment(&self, customers: &[Customer], now: DateTime<Utc>) -> Vec<RfmRecord> {
        let raw: Vec<(String, i64, u64, f64)> = customers
            .iter()
            .map(|c| {
                (
                    c.id.clone(),
                    c.days_inactive(now),
                    transaction_count(c.total_spending),
                    c.total_spending,
                )
            })
            .collect();

        let recency_values = sorted_by_partial(raw.iter().map(|r| r.1));
        let frequency_values = sorted_by_partial(raw.iter().map(|r| r.2));
        let monetary_values = sorted_by_partial(raw.iter().map(|r| r.3));

        let records: Vec<RfmRecord> = raw
            .into_iter()
            .map(|(customer_id, recency, frequency, monetary)| {
                let scores = RfmScores {
                    r: quintile_score(&recency, &recency_values, true),
                    f: quintile_score(&frequency, &frequency_values, false),
                    m: quintile_score(&monetary, &monetary_values, false),
                };
                RfmRecord {
                    customer_id,
                    recency,
                    frequency,
                    monetary,
                    r_score: scores.r,
                    f_score: scores.f,
                    m_score: scores.m,
                    segment: classify(scores),
                }
            })
            .collect();

        info!(customers = records.len(), "RFM segmentation complete");

        records
    }
}

/// Aggregate view of a segmentation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfmOverview {
    /// Rounded to whole days
    pub avg_recency: i64,
    pub avg_frequency: f64,
    pub avg_monetary: f64,
    pub champions_count: usize,
    /// Every segment in rule order, including empty ones
    pub segment_counts: Vec<(Segment, usize)>,
}

impl RfmOverview {
    pub fn from_records(records: &[RfmRecord]) -> Self {
        let n = records.len();
        let mean = |sum: f64| if n > 0 { sum / n as f64 } else { 0.0 };

        let segment_counts: Vec<(Segment, usize)> = Segment::ALL
            .iter()
            .map(|&segment| {
                let count = records.iter().filter(|r| r.segment == segment).count();
                (segment, count)
            })
            .collect();

        Self {
            avg_recency: mean(records.iter().map(|r| r.recency as f64).sum()).round() as i64,
            avg_frequency: mean(records.iter().map(|r| r.frequency as f64).sum()),
            avg_monetary: mean(records.iter().map(|r| r.monetary).sum()),
            champions_count: records
                .iter()
                .filter(|r| r.segment == Segment::Champions)
                .count(),
            segment_counts,
        }
    }
}
