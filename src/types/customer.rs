//! Customer records consumed by the segmentation engines

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dashboard user as seen by the admin analytics.
///
/// The data-access layer converts store timestamps into UTC before handing
/// records over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,

    #[serde(default)]
    pub total_spending: f64,

    #[serde(default)]
    pub is_premium: bool,
}

impl Customer {
    pub fn new(id: impl Into<String>, total_spending: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            joined_date: None,
            last_active: None,
            total_spending,
            is_premium: false,
        }
    }

    pub fn joined(mut self, at: DateTime<Utc>) -> Self {
        self.joined_date = Some(at);
        self
    }

    pub fn active(mut self, at: DateTime<Utc>) -> Self {
        self.last_active = Some(at);
        self
    }

    /// Last activity, falling back to the join date and then to `now`
    pub fn last_seen(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.last_active.or(self.joined_date).unwrap_or(now)
    }

    /// Whole days since the last activity, never negative
    pub fn days_inactive(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_seen(now)).num_days().max(0)
    }

    /// Whole days since joining (`now` when unknown)
    pub fn days_since_joined(&self, now: DateTime<Utc>) -> i64 {
        (now - self.joined_date.unwrap_or(now)).num_days()
    }
}
