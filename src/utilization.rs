//! Credit utilization checks for card payments.
//!
//! Each credit band carries its own utilization limits. A payment is checked
//! by projecting the combined balance across all cards and comparing the new
//! utilization with the limits of the payer's band.

use crate::categories::CreditCategoryIndex;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Utilization limits of one credit band, in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationLimits {
    pub recommended_limit: u32,
    pub ideal_limit: u32,
    pub warning_threshold: u32,
    pub danger_threshold: u32,
    pub message: &'static str,
}

/// A revolving credit line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub limit: f64,
    #[serde(default)]
    pub balance: f64,
}

impl CreditCard {
    pub fn new(id: impl Into<String>, name: impl Into<String>, limit: f64, balance: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            limit,
            balance,
        }
    }

    pub fn available_credit(&self) -> f64 {
        self.limit - self.balance
    }
}

pub fn total_limit(cards: &[CreditCard]) -> f64 {
    cards.iter().map(|c| c.limit).sum()
}

pub fn current_balance(cards: &[CreditCard]) -> f64 {
    cards.iter().map(|c| c.balance).sum()
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Effect of a payment on the card that takes it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardImpact {
    pub name: String,
    pub current_balance: f64,
    pub new_balance: f64,
    pub limit: f64,
    pub available_credit: f64,
    pub card_utilization: f64,
}

/// Utilization before and after a payment; percentages rounded to 2 places
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationChange {
    pub total_limit: f64,
    pub current_balance: f64,
    pub current_utilization: f64,
    pub new_balance: f64,
    pub new_utilization: f64,
    pub utilization_increase: f64,
    pub payment_card: CardImpact,
}

/// Project utilization after charging `payment` to card `card_id`.
pub fn calculate_new_utilization(
    cards: &[CreditCard],
    card_id: &str,
    payment: f64,
) -> Result<UtilizationChange> {
    let total_limit = total_limit(cards);
    let current_balance = current_balance(cards);
    let percent_of_total = |balance: f64| {
        if total_limit > 0.0 {
            balance / total_limit * 100.0
        } else {
            0.0
        }
    };

    let card = cards
        .iter()
        .find(|c| c.id == card_id)
        .ok_or_else(|| EngineError::CardNotFound(card_id.to_string()))?;

    let available_credit = card.available_credit();
    if available_credit < payment {
        return Err(EngineError::InsufficientCredit {
            available: available_credit,
            requested: payment,
            shortfall: payment - available_credit,
        });
    }

    let new_card_balance = card.balance + payment;
    let new_balance = current_balance + payment;
    let current_utilization = percent_of_total(current_balance);
    let new_utilization = percent_of_total(new_balance);
    let card_utilization = if card.limit > 0.0 {
        new_card_balance / card.limit * 100.0
    } else {
        0.0
    };

    Ok(UtilizationChange {
        total_limit,
        current_balance,
        current_utilization: round_to(current_utilization, 2),
        new_balance,
        new_utilization: round_to(new_utilization, 2),
        utilization_increase: round_to(new_utilization - current_utilization, 2),
        payment_card: CardImpact {
            name: card.name.clone(),
            current_balance: card.balance,
            new_balance: new_card_balance,
            limit: card.limit,
            available_credit,
            card_utilization: round_to(card_utilization, 2),
        },
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    Safe,
    Caution,
    Warning,
    Danger,
}

impl WarningLevel {
    /// Level of `utilization` against a band's limits; each bound is inclusive
    pub fn classify(utilization: f64, limits: &UtilizationLimits) -> Self {
        if utilization >= f64::from(limits.danger_threshold) {
            WarningLevel::Danger
        } else if utilization >= f64::from(limits.warning_threshold) {
            WarningLevel::Warning
        } else if utilization >= f64::from(limits.ideal_limit) {
            WarningLevel::Caution
        } else {
            WarningLevel::Safe
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationWarning {
    pub level: WarningLevel,
    pub message: String,
    pub recommendation: String,
    pub category_name: &'static str,
    pub recommended_limit: u32,
    pub ideal_limit: u32,
    pub current_utilization: f64,
    pub new_utilization: f64,
    pub utilization_increase: f64,
}

/// Card that can take a payment in full
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleCard {
    #[serde(flatten)]
    pub card: CreditCard,
    pub available_credit: f64,
    /// Rounded to one decimal place
    pub utilization_after_payment: f64,
}

/// Cards whose available credit covers `payment`, in input order
pub fn eligible_cards(cards: &[CreditCard], payment: f64) -> Vec<EligibleCard> {
    cards
        .iter()
        .filter(|c| c.available_credit() >= payment)
        .map(|c| {
            let after = if c.limit > 0.0 {
                (c.balance + payment) / c.limit * 100.0
            } else {
                0.0
            };
            EligibleCard {
                card: c.clone(),
                available_credit: c.available_credit(),
                utilization_after_payment: round_to(after, 1),
            }
        })
        .collect()
}

/// Outcome of checking one payment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationReport {
    pub change: UtilizationChange,
    /// Absent when the score falls outside every band
    pub warning: Option<UtilizationWarning>,
    pub limits: Option<UtilizationLimits>,
    /// False only for a danger-level warning; the user may still override
    pub should_proceed: bool,
}

/// Checks payments against the utilization limits of the payer's band.
#[derive(Debug, Clone, Copy)]
pub struct UtilizationChecker<'a> {
    categories: &'a CreditCategoryIndex,
}

impl<'a> UtilizationChecker<'a> {
    pub fn new(categories: &'a CreditCategoryIndex) -> Self {
        Self { categories }
    }

    pub fn limits_for(&self, credit_score: u32) -> Option<&'a UtilizationLimits> {
        let categories: &'a CreditCategoryIndex = self.categories;
        categories
            .category_for(credit_score)
            .map(|category| &category.utilization)
    }

    pub fn warning(&self, credit_score: u32, change: &UtilizationChange) -> Option<UtilizationWarning> {
        let category = self.categories.category_for(credit_score)?;
        let limits = &category.utilization;
        let new_utilization = change.new_utilization;
        let level = WarningLevel::classify(new_utilization, limits);

        let (message, recommendation) = match level {
            WarningLevel::Danger => (
                format!(
                    "Critical: Your utilization will be {:.1}%, exceeding the {}% recommended limit for {} category.",
                    new_utilization, limits.danger_threshold, category.name
                ),
                "This could negatively impact your credit score. Consider paying down existing balances or using a different payment method.".to_string(),
            ),
            WarningLevel::Warning => (
                format!(
                    "Warning: Your utilization will be {:.1}%, approaching the {}% limit for {} category.",
                    new_utilization, limits.danger_threshold, category.name
                ),
                format!(
                    "Try to keep utilization below {}% for optimal credit health.",
                    limits.warning_threshold
                ),
            ),
            WarningLevel::Caution => (
                format!(
                    "Your utilization will be {:.1}%. This is acceptable but not ideal.",
                    new_utilization
                ),
                format!(
                    "Aim for under {}% utilization for the best credit score impact.",
                    limits.ideal_limit
                ),
            ),
            WarningLevel::Safe => (
                format!(
                    "Excellent! Your utilization will be {:.1}%, well below the recommended limit.",
                    new_utilization
                ),
                format!(
                    "You're maintaining healthy credit habits for {} category.",
                    category.name
                ),
            ),
        };

        Some(UtilizationWarning {
            level,
            message,
            recommendation,
            category_name: category.name,
            recommended_limit: limits.recommended_limit,
            ideal_limit: limits.ideal_limit,
            current_utilization: change.current_utilization,
            new_utilization,
            utilization_increase: change.utilization_increase,
        })
    }

    /// Project the payment and grade it; card errors propagate.
    pub fn report(
        &self,
        credit_score: u32,
        cards: &[CreditCard],
        card_id: &str,
        payment: f64,
    ) -> Result<UtilizationReport> {
        let change = calculate_new_utilization(cards, card_id, payment)?;
        let warning = self.warning(credit_score, &change);
        let should_proceed = warning
            .as_ref()
            .map_or(true, |w| w.level != WarningLevel::Danger);

        debug!(
            credit_score = credit_score,
            new_utilization = change.new_utilization,
            level = ?warning.as_ref().map(|w| w.level),
            "Utilization checked"
        );

        Ok(UtilizationReport {
            limits: self.limits_for(credit_score).copied(),
            change,
            warning,
            should_proceed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::credit_category_index;

    fn cards() -> Vec<CreditCard> {
        vec![
            CreditCard::new("c1", "Everyday", 1000.0, 100.0),
            CreditCard::new("c2", "Travel", 1000.0, 0.0),
        ]
    }

    #[test]
    fn test_new_utilization() {
        let change = calculate_new_utilization(&cards(), "c1", 100.0).unwrap();

        assert_eq!(change.total_limit, 2000.0);
        assert_eq!(change.current_utilization, 5.0);
        assert_eq!(change.new_balance, 200.0);
        assert_eq!(change.new_utilization, 10.0);
        assert_eq!(change.utilization_increase, 5.0);
        assert_eq!(change.payment_card.available_credit, 900.0);
        assert_eq!(change.payment_card.card_utilization, 20.0);
    }

    #[test]
    fn test_unknown_card() {
        let err = calculate_new_utilization(&cards(), "nope", 10.0).unwrap_err();
        assert_eq!(err, EngineError::CardNotFound("nope".to_string()));
    }

    #[test]
    fn test_insufficient_credit() {
        let err = calculate_new_utilization(&cards(), "c1", 1000.0).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientCredit {
                available: 900.0,
                requested: 1000.0,
                shortfall: 100.0,
            }
        );

        // Exactly the available credit is accepted
        assert!(calculate_new_utilization(&cards(), "c1", 900.0).is_ok());
    }

    #[test]
    fn test_warning_level_boundaries() {
        let index = credit_category_index();
        let checker = UtilizationChecker::new(&index);
        // Needs Improvement: ideal 10, warning 20, danger 25
        let limits = checker.limits_for(600).unwrap();

        assert_eq!(WarningLevel::classify(9.99, limits), WarningLevel::Safe);
        assert_eq!(WarningLevel::classify(10.0, limits), WarningLevel::Caution);
        assert_eq!(WarningLevel::classify(19.99, limits), WarningLevel::Caution);
        assert_eq!(WarningLevel::classify(20.0, limits), WarningLevel::Warning);
        assert_eq!(WarningLevel::classify(24.99, limits), WarningLevel::Warning);
        assert_eq!(WarningLevel::classify(25.0, limits), WarningLevel::Danger);
    }

    #[test]
    fn test_limits_per_band() {
        let index = credit_category_index();
        let checker = UtilizationChecker::new(&index);

        assert_eq!(checker.limits_for(450).unwrap().danger_threshold, 30);
        assert_eq!(checker.limits_for(700).unwrap().warning_threshold, 15);
        assert_eq!(checker.limits_for(760).unwrap().warning_threshold, 12);
        let prime = checker.limits_for(820).unwrap();
        assert_eq!((prime.ideal_limit, prime.warning_threshold, prime.danger_threshold), (5, 8, 10));
        assert!(checker.limits_for(200).is_none());
    }

    #[test]
    fn test_prime_payer_hits_danger() {
        let index = credit_category_index();
        let report = UtilizationChecker::new(&index)
            .report(820, &cards(), "c1", 100.0)
            .unwrap();
        let warning = report.warning.unwrap();

        assert_eq!(warning.level, WarningLevel::Danger);
        assert_eq!(warning.category_name, "Prime");
        assert!(warning.message.contains("10.0%"));
        assert!(!report.should_proceed);
    }

    #[test]
    fn test_out_of_band_score_has_no_warning() {
        let index = credit_category_index();
        let report = UtilizationChecker::new(&index)
            .report(100, &cards(), "c2", 10.0)
            .unwrap();

        assert!(report.warning.is_none());
        assert!(report.limits.is_none());
        assert!(report.should_proceed);
    }

    #[test]
    fn test_eligible_cards() {
        let eligible = eligible_cards(&cards(), 950.0);

        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].card.id, "c2");
        assert_eq!(eligible[0].available_credit, 1000.0);
        assert_eq!(eligible[0].utilization_after_payment, 95.0);
        assert!(eligible_cards(&[], 1.0).is_empty());
    }
}
