//! AI endpoint DTOs

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use expensegenie_core::{BudgetPlan, Category, PricingInfo, SpendingRecord};

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CategorizeRequest {
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategorizeResponse {
    pub category: Category,
}

/// Budget plan request
///
/// `goalAmount`, `months` and `expenses` are kept loose here and checked by
/// the handler so each problem gets its own message.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanRequest {
    pub goal_name: Option<String>,
    /// Number or numeric string
    #[schema(value_type = Option<f64>)]
    pub goal_amount: Option<Value>,
    #[schema(value_type = Option<u32>)]
    pub months: Option<Value>,
    /// Array of `{category, amount, date}`
    #[schema(value_type = Option<Vec<SpendingRecord>>)]
    pub expenses: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub current_budgets: Option<BTreeMap<String, Decimal>>,
    #[schema(value_type = Option<bool>)]
    pub search_pricing: Option<Value>,
}

/// One expense inside a plan request
#[derive(Debug, Clone, Deserialize)]
pub struct PlanExpense {
    pub category: String,
    pub amount: Decimal,
    #[serde(default)]
    pub date: String,
}

impl From<PlanExpense> for SpendingRecord {
    fn from(e: PlanExpense) -> Self {
        SpendingRecord::new(e.category, e.amount, e.date)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanResponse {
    pub plan: BudgetPlan,
    /// False when the rule-based planner produced the plan
    pub ai_generated: bool,
    pub pricing_info: Option<PricingInfo>,
}
