//! Portfolio Risk Engine Library
//!
//! Fraud-network detection over loan portfolios, credit-score category
//! lookup with utilization guidance, activity trends, and customer
//! segmentation with lifetime value estimates.

pub mod categories;
pub mod config;
pub mod error;
pub mod fraud;
pub mod graph;
pub mod metrics;
pub mod score_index;
pub mod segmentation;
pub mod trends;
pub mod types;
pub mod utilization;

pub use categories::{credit_category_index, CreditCategory, CreditCategoryIndex};
pub use config::AppConfig;
pub use error::{EngineError, Result};
pub use fraud::{FraudNetworkAnalyzer, LoanValidator, PortfolioAuditor};
pub use graph::RelationshipGraph;
pub use score_index::ScoreRangeIndex;
pub use segmentation::{LifetimeValueEstimator, SegmentationEngine};
pub use types::{Customer, Loan, RiskLevel};
pub use utilization::{CreditCard, UtilizationChecker};
