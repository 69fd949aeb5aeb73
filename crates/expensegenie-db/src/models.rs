//! Database models

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// User Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_email_verified: bool,
    #[serde(skip_serializing)]
    pub verification_code: Option<String>,
    pub verification_code_expires: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub verification_token_hash: Option<String>,
    pub verification_token_expires: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    pub reset_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pending email verification: a 6-digit code plus a digest of the link token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationSecrets {
    pub code: String,
    pub code_expires: DateTime<Utc>,
    pub token_hash: String,
    pub token_expires: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub verification: VerificationSecrets,
}

// ============================================================================
// Budget Models
// ============================================================================

/// Per-user category budgets, keyed by category name
#[derive(Debug, Clone, FromRow)]
pub struct DbBudget {
    pub user_id: Uuid,
    pub budgets: Json<BTreeMap<String, Decimal>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbBudget {
    pub fn amounts(&self) -> &BTreeMap<String, Decimal> {
        &self.budgets.0
    }
}

// ============================================================================
// Goal Models
// ============================================================================

pub const GOAL_STATUS_ACTIVE: &str = "active";

#[derive(Debug, Clone, FromRow)]
pub struct DbGoal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub goal_name: String,
    pub goal_amount: Decimal,
    pub months: i32,
    pub target_date: DateTime<Utc>,
    pub current_savings: Decimal,
    pub plan: Json<serde_json::Value>,
    pub pricing_info: Option<Json<serde_json::Value>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub goal_name: String,
    pub goal_amount: Decimal,
    pub months: i32,
    pub target_date: DateTime<Utc>,
    pub plan: serde_json::Value,
    pub pricing_info: Option<serde_json::Value>,
}

// ============================================================================
// Expense Models
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct DbExpense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written on create and on full update
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
}
