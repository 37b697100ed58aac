//! Fraud-network detection over loan portfolios

pub mod analyzer;
pub mod auditor;
pub mod validator;

pub use analyzer::{FraudAnalysisResult, FraudNetworkAnalyzer, FraudPathEntry};
pub use auditor::{LoanAnalysis, LoanFraudReport, PortfolioAudit, PortfolioAuditor};
pub use validator::{LoanValidation, LoanValidator};
