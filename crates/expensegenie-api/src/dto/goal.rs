//! Savings goal DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use expensegenie_db::DbGoal;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Goal name is required"))]
    pub goal_name: String,
    #[schema(value_type = f64)]
    pub goal_amount: Decimal,
    #[validate(range(min = 1, max = 600, message = "Months must be between 1 and 600"))]
    pub months: u32,
    /// Plan snapshot as returned by generate-budget-plan
    #[schema(value_type = Object)]
    pub plan: Value,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub pricing_info: Option<Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    pub id: Uuid,
    pub goal_name: String,
    #[schema(value_type = f64)]
    pub goal_amount: Decimal,
    pub months: i32,
    pub target_date: DateTime<Utc>,
    #[schema(value_type = f64)]
    pub current_savings: Decimal,
    #[schema(value_type = Object)]
    pub plan: Value,
    #[schema(value_type = Option<Object>)]
    pub pricing_info: Option<Value>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbGoal> for GoalResponse {
    fn from(goal: DbGoal) -> Self {
        Self {
            id: goal.id,
            goal_name: goal.goal_name,
            goal_amount: goal.goal_amount,
            months: goal.months,
            target_date: goal.target_date,
            current_savings: goal.current_savings,
            plan: goal.plan.0,
            pricing_info: goal.pricing_info.map(|p| p.0),
            status: goal.status,
            created_at: goal.created_at,
            updated_at: goal.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GoalsResponse {
    pub goals: Vec<GoalResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaveGoalResponse {
    pub message: String,
    pub goal: GoalResponse,
}
