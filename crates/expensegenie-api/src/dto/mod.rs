//! Request and response types

mod ai;
mod auth;
mod budget;
mod common;
mod expense;
mod goal;

pub use ai::*;
pub use auth::*;
pub use budget::*;
pub use common::*;
pub use expense::*;
pub use goal::*;
