//! Sliding-window analytics over dated activity.
//!
//! Every function keeps only the entries inside `[now - window, now]` and
//! summarizes them. Callers pass `now` so results are reproducible.

use crate::utilization::round_to;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const SCORE_TREND_WINDOW_DAYS: i64 = 30;
pub const PAYMENT_WINDOW_DAYS: i64 = 90;
pub const SPENDING_WINDOW_DAYS: i64 = 30;

/// Percentage change needed before a score trend counts as moving
const TREND_THRESHOLD_PERCENT: f64 = 1.0;
const VELOCITY_BAND: f64 = 0.10;

fn in_window(at: DateTime<Utc>, now: DateTime<Utc>, window_days: i64) -> bool {
    at >= now - Duration::days(window_days) && at <= now
}

/// A credit score observed at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub score: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn from_change(percentage_change: f64) -> Self {
        if percentage_change > TREND_THRESHOLD_PERCENT {
            TrendDirection::Up
        } else if percentage_change < -TREND_THRESHOLD_PERCENT {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTrend {
    /// Oldest to newest score in the window, rounded to one decimal
    pub percentage_change: f64,
    pub direction: TrendDirection,
    pub data_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_score: Option<u32>,
    pub window_days: i64,
    pub message: String,
}

impl ScoreTrend {
    fn flat(data_points: usize, window_days: i64, message: &str) -> Self {
        Self {
            percentage_change: 0.0,
            direction: TrendDirection::Stable,
            data_points,
            oldest_score: None,
            newest_score: None,
            window_days,
            message: message.to_string(),
        }
    }
}

/// Compare the oldest and newest score inside the window.
///
/// Fewer than two points in the window yields a stable, zero-change trend.
pub fn credit_score_trend(history: &[ScorePoint], window_days: i64, now: DateTime<Utc>) -> ScoreTrend {
    if history.is_empty() {
        return ScoreTrend::flat(0, window_days, "No historical data available");
    }

    let mut recent: Vec<&ScorePoint> = history
        .iter()
        .filter(|p| in_window(p.timestamp, now, window_days))
        .collect();

    match recent.len() {
        0 => return ScoreTrend::flat(0, window_days, "No data in window"),
        1 => return ScoreTrend::flat(1, window_days, "Need more data for trend"),
        _ => {}
    }

    recent.sort_by_key(|p| p.timestamp);
    let oldest = recent[0].score;
    let newest = recent[recent.len() - 1].score;

    let change = if oldest > 0 {
        (f64::from(newest) - f64::from(oldest)) / f64::from(oldest) * 100.0
    } else {
        0.0
    };
    let direction = TrendDirection::from_change(change);

    ScoreTrend {
        percentage_change: round_to(change, 1),
        direction,
        data_points: recent.len(),
        oldest_score: Some(oldest),
        newest_score: Some(newest),
        window_days,
        message: format!("{:.1}% change in {} days", change.abs(), window_days),
    }
}

/// A scheduled payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default)]
    pub amount: f64,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentStatus {
    #[serde(rename = "No Activity")]
    NoActivity,
    #[serde(rename = "No Recent Activity")]
    NoRecentActivity,
    Excellent,
    Good,
    Fair,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

impl PaymentStatus {
    /// Status band for an on-time percentage; lower bounds are inclusive
    pub fn from_on_time_rate(rate: f64) -> Self {
        if rate >= 95.0 {
            PaymentStatus::Excellent
        } else if rate >= 80.0 {
            PaymentStatus::Good
        } else if rate >= 60.0 {
            PaymentStatus::Fair
        } else {
            PaymentStatus::NeedsAttention
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentActivity {
    /// Completed share of payments due in the window, one decimal
    pub on_time_rate: f64,
    pub total_payments: usize,
    pub completed_payments: usize,
    /// Two decimals
    pub avg_amount: f64,
    pub status: PaymentStatus,
    pub window_days: i64,
}

/// Summarize payments whose due date falls inside the window.
pub fn payment_activity(payments: &[Payment], window_days: i64, now: DateTime<Utc>) -> PaymentActivity {
    let empty = |status| PaymentActivity {
        on_time_rate: 0.0,
        total_payments: 0,
        completed_payments: 0,
        avg_amount: 0.0,
        status,
        window_days,
    };

    if payments.is_empty() {
        return empty(PaymentStatus::NoActivity);
    }

    let recent: Vec<&Payment> = payments
        .iter()
        .filter(|p| in_window(p.due_date, now, window_days))
        .collect();
    if recent.is_empty() {
        return empty(PaymentStatus::NoRecentActivity);
    }

    let total = recent.len();
    let completed = recent.iter().filter(|p| p.completed).count();
    let total_amount: f64 = recent.iter().map(|p| p.amount).sum();
    let rate = completed as f64 / total as f64 * 100.0;

    PaymentActivity {
        on_time_rate: round_to(rate, 1),
        total_payments: total,
        completed_payments: completed,
        avg_amount: round_to(total_amount / total as f64, 2),
        status: PaymentStatus::from_on_time_rate(rate),
        window_days,
    }
}

/// An amount spent at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpendingEntry {
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpendingTrend {
    #[serde(rename = "No Data")]
    NoData,
    #[serde(rename = "No Recent Activity")]
    NoRecentActivity,
    Stable,
    Increasing,
    Decreasing,
}

impl SpendingTrend {
    /// Second-half spend against first-half spend, with a 10% dead band
    pub fn from_halves(first_half: f64, second_half: f64) -> Self {
        if second_half > first_half * (1.0 + VELOCITY_BAND) {
            SpendingTrend::Increasing
        } else if second_half < first_half * (1.0 - VELOCITY_BAND) {
            SpendingTrend::Decreasing
        } else {
            SpendingTrend::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingVelocity {
    pub avg_daily_spending: f64,
    pub total_spending: f64,
    /// Daily average over a 30-day month
    pub projected_monthly: f64,
    pub trend: SpendingTrend,
    pub window_days: i64,
}

/// Daily spend rate inside the window and whether it is speeding up.
pub fn spending_velocity(
    history: &[SpendingEntry],
    window_days: i64,
    now: DateTime<Utc>,
) -> SpendingVelocity {
    let empty = |trend| SpendingVelocity {
        avg_daily_spending: 0.0,
        total_spending: 0.0,
        projected_monthly: 0.0,
        trend,
        window_days,
    };

    if history.is_empty() {
        return empty(SpendingTrend::NoData);
    }

    let recent: Vec<&SpendingEntry> = history
        .iter()
        .filter(|e| in_window(e.timestamp, now, window_days))
        .collect();
    if recent.is_empty() {
        return empty(SpendingTrend::NoRecentActivity);
    }

    let total: f64 = recent.iter().map(|e| e.amount).sum();
    let avg_daily = if window_days > 0 {
        total / window_days as f64
    } else {
        total
    };

    let window_start = now - Duration::days(window_days);
    let midpoint = window_start + (now - window_start) / 2;
    let (first_half, second_half) = recent.iter().fold((0.0, 0.0), |(first, second), e| {
        if e.timestamp < midpoint {
            (first + e.amount, second)
        } else {
            (first, second + e.amount)
        }
    });

    SpendingVelocity {
        avg_daily_spending: round_to(avg_daily, 2),
        total_spending: round_to(total, 2),
        projected_monthly: round_to(avg_daily * 30.0, 2),
        trend: SpendingTrend::from_halves(first_half, second_half),
        window_days,
    }
}
