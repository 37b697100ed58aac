//! Error types for the risk engine.

use thiserror::Error;

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by the engines.
///
/// Lookups that simply find nothing return `None` instead; this enum only
/// covers inputs the engines refuse to process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A candidate loan reuses the id of a loan already in the portfolio.
    #[error("Loan id already present in portfolio: {0}")]
    DuplicateLoanId(String),

    /// A loan id that should be part of the analyzed set was not found.
    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    /// The card chosen for a payment is not among the user's cards.
    #[error("Card not found: {0}")]
    CardNotFound(String),

    /// The chosen card cannot absorb the payment.
    #[error("Insufficient credit limit: {available:.2} available, {requested:.2} requested")]
    InsufficientCredit {
        available: f64,
        requested: f64,
        shortfall: f64,
    },
}
