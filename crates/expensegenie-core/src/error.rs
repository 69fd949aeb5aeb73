//! Domain errors

use thiserror::Error;

/// Errors raised when goal input cannot produce a plan
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("months must be at least 1")]
    ZeroMonths,

    #[error("months must be at most {0}")]
    TooManyMonths(u32),

    #[error("goal amount must be greater than 0")]
    InvalidGoalAmount,

    #[error("goal amount must be at most {0}")]
    GoalAmountTooLarge(rust_decimal::Decimal),

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
