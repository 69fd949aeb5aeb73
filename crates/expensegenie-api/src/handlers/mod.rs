//! API Handlers
//!
//! One module per resource.

pub mod ai;
pub mod auth;
pub mod budgets;
pub mod expenses;
pub mod goals;
pub mod health;

pub use health::*;
