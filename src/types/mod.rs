//! Type definitions for the risk engine

pub mod customer;
pub mod loan;
pub mod risk;

pub use customer::Customer;
pub use loan::{FraudReport, Loan};
pub use risk::{PortfolioRisk, RiskLevel, RiskLevelThresholds};
