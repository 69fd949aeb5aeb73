//! ExpenseGenie core domain
//!
//! Pure computation shared by the HTTP layer and the AI advisor:
//!
//! - [`category`]: the fixed nine-category enum and the default budget map
//! - [`classifier`]: keyword-based categorization of free-text descriptions
//! - [`aggregate`]: per-category and per-month spending totals
//! - [`policy`]: the swappable per-category reduction policy table
//! - [`recommend`]: the budget-cut recommender
//! - [`feasibility`]: achievability verdict and narrative for a plan
//! - [`plan`]: goal validation, plan types and the rule-based plan assembler
//!
//! Nothing in this crate performs I/O.

pub mod aggregate;
pub mod category;
pub mod classifier;
pub mod error;
pub mod feasibility;
pub mod plan;
pub mod policy;
pub mod recommend;

pub use aggregate::{SpendingRecord, SpendingSummary};
pub use category::{default_budgets, Category};
pub use classifier::classify;
pub use error::{CoreError, CoreResult};
pub use feasibility::{evaluate, Feasibility, FeasibilityInput};
pub use plan::{rule_based_plan, BudgetPlan, GoalSpec, PricingInfo, MAX_AMOUNT, MAX_GOAL_MONTHS};
pub use policy::{CategoryPolicy, HighSpendTier, PolicyTable};
pub use recommend::{recommend_cuts, round_currency, BudgetCut, CutRecommendation};
