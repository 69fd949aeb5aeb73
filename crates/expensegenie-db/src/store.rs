//! Storage traits
//!
//! Handlers only see these traits. [`crate::repos`] implements them on
//! PostgreSQL and [`crate::memory`] on in-process maps.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `Duplicate` when the email or username is taken.
    async fn create(&self, user: NewUser) -> DbResult<DbUser>;

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbUser>>;

    async fn find_by_email(&self, email: &str) -> DbResult<Option<DbUser>>;

    async fn find_by_email_or_username(&self, email: &str, username: &str) -> DbResult<Option<DbUser>>;

    /// User holding `code` whose code has not expired at `now`
    async fn find_by_verification_code(&self, code: &str, now: DateTime<Utc>) -> DbResult<Option<DbUser>>;

    /// User holding the link token digest, unexpired at `now`
    async fn find_by_verification_token(&self, token_hash: &str, now: DateTime<Utc>) -> DbResult<Option<DbUser>>;

    async fn find_by_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> DbResult<Option<DbUser>>;

    /// Replace any pending verification secrets
    async fn set_verification(&self, user_id: Uuid, secrets: VerificationSecrets) -> DbResult<()>;

    /// Mark verified and clear every verification secret
    async fn mark_verified(&self, user_id: Uuid) -> DbResult<()>;

    async fn set_reset_token(&self, user_id: Uuid, token_hash: &str, expires: DateTime<Utc>) -> DbResult<()>;

    /// Store a new password hash and clear the reset token
    async fn reset_password(&self, user_id: Uuid, password_hash: &str) -> DbResult<()>;
}

#[async_trait]
pub trait BudgetStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> DbResult<Option<DbBudget>>;

    /// Create or replace the whole budget map
    async fn upsert(&self, user_id: Uuid, budgets: BTreeMap<String, Decimal>) -> DbResult<DbBudget>;
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn create(&self, user_id: Uuid, goal: NewGoal) -> DbResult<DbGoal>;

    /// Active goals, newest first
    async fn list_active(&self, user_id: Uuid) -> DbResult<Vec<DbGoal>>;
}

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn create(&self, user_id: Uuid, input: ExpenseInput) -> DbResult<DbExpense>;

    /// All of the user's expenses, newest date first
    async fn list(&self, user_id: Uuid) -> DbResult<Vec<DbExpense>>;

    /// Replace an expense owned by `user_id`. `None` when it does not exist or
    /// belongs to someone else.
    async fn update(&self, user_id: Uuid, id: Uuid, input: ExpenseInput) -> DbResult<Option<DbExpense>>;

    /// Returns whether an owned expense was removed
    async fn delete(&self, user_id: Uuid, id: Uuid) -> DbResult<bool>;
}
