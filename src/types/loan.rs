//! Loan records and fraud reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reason attached to reports the detection system files on its own.
pub const AUTO_FLAG_REASON: &str = "Auto-flagged by fraud detection system";

/// A loan held by a user, as exported from the document store.
///
/// Every field has a serde default so partially filled documents still
/// deserialize: missing amounts read as 0 and missing contact fields are
/// absent. A candidate that has not been stored yet has an empty `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    /// Identifier, unique within a portfolio
    #[serde(default)]
    pub id: String,

    /// Display name chosen by the user
    #[serde(default)]
    pub name: String,

    /// Lender name
    #[serde(default)]
    pub provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Original principal
    #[serde(default)]
    pub total: f64,

    /// Outstanding balance
    #[serde(default)]
    pub remaining: f64,

    #[serde(default)]
    pub is_fraud: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud_report: Option<FraudReport>,
}

impl Loan {
    /// Create a loan with no contact details and no fraud flag
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        provider: impl Into<String>,
        total: f64,
        remaining: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider: provider.into(),
            email: None,
            phone: None,
            address: None,
            total,
            remaining,
            is_fraud: false,
            fraud_report: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Mark the loan fraudulent and attach the report, replacing any earlier one
    pub fn flag_fraud(&mut self, report: FraudReport) {
        self.is_fraud = true;
        self.fraud_report = Some(report);
    }

    /// Outstanding balance as a percentage of the principal.
    ///
    /// A zero principal yields NaN or infinity, which compare the way the
    /// fraud signals expect (never above / always above the cutoff).
    pub fn utilization_percent(&self) -> f64 {
        (self.remaining / self.total) * 100.0
    }
}

/// Fraud report attached to a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudReport {
    pub reason: String,

    pub details: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    pub reported_at: DateTime<Utc>,

    /// Set when the system, not the user, made the determination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_flagged: Option<bool>,
}

impl FraudReport {
    /// Report filed by the loan holder
    pub fn user_filed(
        reason: impl Into<String>,
        details: impl Into<String>,
        contact: Option<String>,
        reported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            reason: reason.into(),
            details: details.into(),
            contact,
            reported_at,
            auto_flagged: None,
        }
    }

    /// Report filed by the detection system; `warnings` become the details
    pub fn auto_flagged(warnings: &[String], reported_at: DateTime<Utc>) -> Self {
        Self {
            reason: AUTO_FLAG_REASON.to_string(),
            details: warnings.join("; "),
            contact: None,
            reported_at,
            auto_flagged: Some(true),
        }
    }

    pub fn is_auto_flagged(&self) -> bool {
        self.auto_flagged.unwrap_or(false)
    }
}
