//! PostgreSQL store implementations

mod budget;
mod expense;
mod goal;
mod user;

pub use budget::BudgetRepo;
pub use expense::ExpenseRepo;
pub use goal::GoalRepo;
pub use user::UserRepo;
