//! Expense DTOs

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use expensegenie_db::DbExpense;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ExpenseRequest {
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EditExpenseRequest {
    pub id: Uuid,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl EditExpenseRequest {
    pub fn fields(&self) -> ExpenseRequest {
        ExpenseRequest {
            category: self.category.clone(),
            amount: self.amount,
            description: self.description.clone(),
            date: self.date,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeleteExpenseRequest {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub category: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbExpense> for ExpenseResponse {
    fn from(e: DbExpense) -> Self {
        Self {
            id: e.id,
            category: e.category,
            amount: e.amount,
            description: e.description,
            date: e.date,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExpensesResponse {
    pub expenses: Vec<ExpenseResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExpenseMutationResponse {
    pub message: String,
    pub expense: ExpenseResponse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopCategory {
    pub name: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
}

/// Dashboard figures
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummaryResponse {
    #[schema(value_type = f64)]
    pub total_expenses: Decimal,
    pub total_transactions: usize,
    pub top_category: Option<TopCategory>,
    #[schema(value_type = Object)]
    pub category_totals: BTreeMap<String, Decimal>,
    /// Keyed by `YYYY-MM`
    #[schema(value_type = Object)]
    pub monthly_totals: BTreeMap<String, Decimal>,
}
