//! Customer lifetime value estimation

use crate::segmentation::rfm::SPEND_PER_TRANSACTION;
use crate::types::customer::Customer;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Share of customer value kept as profit
pub const PROFIT_MARGIN: f64 = 0.20;

const DAYS_PER_MONTH: i64 = 30;
const HIGH_VALUE_CLV: f64 = 1000.0;
const HIGH_SPENDER: f64 = 1000.0;
const RETENTION_WINDOW_DAYS: i64 = 30;

/// Value tier derived from the predicted CLV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClvTier {
    Starter,
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl ClvTier {
    pub const ALL: [ClvTier; 5] = [
        ClvTier::Platinum,
        ClvTier::Gold,
        ClvTier::Silver,
        ClvTier::Bronze,
        ClvTier::Starter,
    ];

    /// Tier for a CLV amount; every lower bound is inclusive
    pub fn from_clv(clv: f64) -> Self {
        if clv >= 2000.0 {
            ClvTier::Platinum
        } else if clv >= 1000.0 {
            ClvTier::Gold
        } else if clv >= 500.0 {
            ClvTier::Silver
        } else if clv >= 100.0 {
            ClvTier::Bronze
        } else {
            ClvTier::Starter
        }
    }
}

/// Predicted relationship length in months.
///
/// Inactivity is checked before spend, so a long-inactive big spender still
/// gets the short lifespan.
pub fn predicted_lifespan_months(days_inactive: i64, total_spending: f64) -> u32 {
    if days_inactive > 90 {
        12
    } else if days_inactive > 60 {
        18
    } else if total_spending > HIGH_SPENDER {
        36
    } else {
        24
    }
}

/// Lifetime value estimate for one customer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClvRecord {
    pub customer_id: String,
    pub predicted_clv: f64,
    pub tier: ClvTier,
    pub avg_order_value: f64,
    /// Transactions per month
    pub purchase_frequency: f64,
    /// Value per month
    pub customer_value: f64,
    pub predicted_lifespan_months: u32,
    pub months_since_joined: i64,
    pub total_spending: f64,
}

/// Estimates lifetime value from spend and engagement.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifetimeValueEstimator;

impl LifetimeValueEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn estimate(&self, customer: &Customer, now: DateTime<Utc>) -> ClvRecord {
        let months_since_joined = customer
            .days_since_joined(now)
            .div_euclid(DAYS_PER_MONTH)
            .max(1);
        let total_spending = customer.total_spending;

        let total_transactions = ((total_spending / SPEND_PER_TRANSACTION).floor()).max(1.0);
        let avg_order_value = total_spending / total_transactions;
        let purchase_frequency = total_transactions / months_since_joined as f64;
        let customer_value = avg_order_value * purchase_frequency;

        let lifespan = predicted_lifespan_months(customer.days_inactive(now), total_spending);
        let predicted_clv = customer_value * lifespan as f64 * PROFIT_MARGIN;

        ClvRecord {
            customer_id: customer.id.clone(),
            predicted_clv,
            tier: ClvTier::from_clv(predicted_clv),
            avg_order_value,
            purchase_frequency,
            customer_value,
            predicted_lifespan_months: lifespan,
            months_since_joined,
            total_spending,
        }
    }

    pub fn estimate_all(&self, customers: &[Customer], now: DateTime<Utc>) -> Vec<ClvRecord> {
        let records: Vec<ClvRecord> = customers.iter().map(|c| self.estimate(c, now)).collect();

        info!(customers = records.len(), "CLV estimation complete");

        records
    }
}

/// Aggregate view of a CLV pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClvOverview {
    pub avg_clv: f64,
    pub total_clv: f64,
    /// Customers with CLV above 1000
    pub high_value_count: usize,
    pub avg_lifespan_months: f64,
    pub avg_order_value: f64,
    pub avg_purchase_frequency: f64,
    pub avg_customer_value: f64,
    /// Percentage of customers active within the last 30 days
    pub retention_rate: f64,
    pub tier_counts: Vec<(ClvTier, usize)>,
}

impl ClvOverview {
    pub fn from_records(records: &[ClvRecord], customers: &[Customer], now: DateTime<Utc>) -> Self {
        let n = records.len();
        let mean = |sum: f64| if n > 0 { sum / n as f64 } else { 0.0 };

        let total_clv: f64 = records.iter().map(|r| r.predicted_clv).sum();

        let cutoff = now - Duration::days(RETENTION_WINDOW_DAYS);
        let active = customers
            .iter()
            .filter(|c| c.last_active.is_some_and(|at| at >= cutoff))
            .count();
        let retention_rate = if customers.is_empty() {
            0.0
        } else {
            active as f64 / customers.len() as f64 * 100.0
        };

        Self {
            avg_clv: mean(total_clv),
            total_clv,
            high_value_count: records
                .iter()
                .filter(|r| r.predicted_clv > HIGH_VALUE_CLV)
                .count(),
            avg_lifespan_months: mean(
                records
                    .iter()
                    .map(|r| r.predicted_lifespan_months as f64)
                    .sum(),
            ),
            avg_order_value: mean(records.iter().map(|r| r.avg_order_value).sum()),
            avg_purchase_frequency: mean(records.iter().map(|r| r.purchase_frequency).sum()),
            avg_customer_value: mean(records.iter().map(|r| r.customer_value).sum()),
            retention_rate,
            tier_counts: ClvTier::ALL
                .iter()
                .map(|&tier| (tier, records.iter().filter(|r| r.tier == tier).count()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        assert_eq!(ClvTier::from_clv(2000.0), ClvTier::Platinum);
        assert_eq!(ClvTier::from_clv(1999.99), ClvTier::Gold);
        assert_eq!(ClvTier::from_clv(1000.0), ClvTier::Gold);
        assert_eq!(ClvTier::from_clv(999.99), ClvTier::Silver);
        assert_eq!(ClvTier::from_clv(500.0), ClvTier::Silver);
        assert_eq!(ClvTier::from_clv(100.0), ClvTier::Bronze);
        assert_eq!(ClvTier::from_clv(99.99), ClvTier::Starter);
        assert_eq!(ClvTier::from_clv(0.0), ClvTier::Starter);
    }

    #[test]
    fn test_lifespan_precedence() {
        assert_eq!(predicted_lifespan_months(120, 50_000.0), 12);
        assert_eq!(predicted_lifespan_months(91, 0.0), 12);
        assert_eq!(predicted_lifespan_months(90, 0.0), 18);
        assert_eq!(predicted_lifespan_months(61, 5_000.0), 18);
        assert_eq!(predicted_lifespan_months(60, 5_000.0), 36);
        assert_eq!(predicted_lifespan_months(0, 1_000.0), 24);
    }

    #[test]
    fn test_estimate_active_high_spender() {
        let now = Utc::now();
        let customer = Customer::new("c1", 1200.0)
            .joined(now - Duration::days(60))
            .active(now - Duration::days(1));
        let record = LifetimeValueEstimator::new().estimate(&customer, now);

        assert_eq!(record.months_since_joined, 2);
        assert_eq!(record.avg_order_value, 100.0);
        assert_eq!(record.purchase_frequency, 6.0);
        assert_eq!(record.customer_value, 600.0);
        assert_eq!(record.predicted_lifespan_months, 36);
        // 600 x 36 x 0.2
        assert!((record.predicted_clv - 4320.0).abs() < 1e-9);
        assert_eq!(record.tier, ClvTier::Platinum);
    }

    #[test]
    fn test_inactive_high_spender_gets_short_lifespan() {
        let now = Utc::now();
        let customer = Customer::new("c2", 5000.0)
            .joined(now - Duration::days(400))
            .active(now - Duration::days(100));
        let record = LifetimeValueEstimator::new().estimate(&customer, now);

        assert_eq!(record.predicted_lifespan_months, 12);
        assert_eq!(record.months_since_joined, 13);
    }

    #[test]
    fn test_new_customer_without_spend() {
        let now = Utc::now();
        let record = LifetimeValueEstimator::new().estimate(&Customer::new("c3", 0.0), now);

        assert_eq!(record.months_since_joined, 1);
        assert_eq!(record.avg_order_value, 0.0);
        assert_eq!(record.purchase_frequency, 1.0);
        assert_eq!(record.predicted_clv, 0.0);
        assert_eq!(record.tier, ClvTier::Starter);
    }

    #[test]
    fn test_overview() {
        let now = Utc::now();
        let customers = vec![
            Customer::new("a", 1200.0)
                .joined(now - Duration::days(60))
                .active(now - Duration::days(1)),
            Customer::new("b", 0.0).joined(now - Duration::days(10)),
        ];
        let records = LifetimeValueEstimator::new().estimate_all(&customers, now);
        let overview = ClvOverview::from_records(&records, &customers, now);

        assert_eq!(overview.high_value_count, 1);
        assert!((overview.total_clv - 4320.0).abs() < 1e-9);
        assert_eq!(overview.retention_rate, 50.0);
        assert_eq!(overview.avg_lifespan_months, 30.0);
        assert_eq!(overview.tier_counts[0], (ClvTier::Platinum, 1));
        assert_eq!(overview.tier_counts[4], (ClvTier::Starter, 1));
    }

    #[test]
    fn test_retention_window_includes_thirtieth_day() {
        let now = Utc::now();
        let customers = vec![
            Customer::new("edge", 100.0).active(now - Duration::days(30)),
            Customer::new("late", 100.0).active(now - Duration::days(30) - Duration::seconds(1)),
            Customer::new("gone", 100.0).active(now - Duration::days(31)),
            Customer::new("fresh", 100.0).active(now),
        ];
        let records = LifetimeValueEstimator::new().estimate_all(&customers, now);
        let overview = ClvOverview::from_records(&records, &customers, now);

        assert_eq!(overview.retention_rate, 50.0);
    }

    #[test]
    fn test_overview_of_nothing() {
        let overview = ClvOverview::from_records(&[], &[], Utc::now());

        assert_eq!(overview.avg_clv, 0.0);
        assert_eq!(overview.retention_rate, 0.0);
    }
}
