//! Budget DTOs

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BudgetsResponse {
    /// Category name to monthly limit
    #[schema(value_type = Object)]
    pub budgets: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateBudgetsRequest {
    #[schema(value_type = Option<Object>)]
    pub budgets: Option<Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdateBudgetsResponse {
    pub message: String,
    #[schema(value_type = Object)]
    pub budgets: BTreeMap<String, Decimal>,
}
