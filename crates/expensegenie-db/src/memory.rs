//! In-memory stores
//!
//! Same contracts as the PostgreSQL repositories. Used for local development
//! without a database and by the test suites.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::GOAL_STATUS_ACTIVE;
use crate::store::{BudgetStore, ExpenseStore, GoalStore, UserStore};
use crate::{
    DbBudget, DbError, DbExpense, DbGoal, DbResult, DbUser, ExpenseInput, NewGoal, NewUser,
    VerificationSecrets,
};

/// A secret expires once `now > expires`; the SQL repositories use `expires >= now`
fn unexpired(expires: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires.map(|e| now <= e).unwrap_or(false)
}

// ============================================================================
// Users
// ============================================================================

#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<Uuid, DbUser>,
    // Serializes uniqueness check + insert
    create_lock: Mutex<()>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, pred: impl Fn(&DbUser) -> bool) -> Option<DbUser> {
        self.users
            .iter()
            .find(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
    }

    fn modify(&self, user_id: Uuid, f: impl FnOnce(&mut DbUser)) -> DbResult<()> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| DbError::NotFound(format!("User {}", user_id)))?;
        f(user.value_mut());
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new: NewUser) -> DbResult<DbUser> {
        let _guard = self
            .create_lock
            .lock()
            .map_err(|_| DbError::Connection("user store lock poisoned".to_string()))?;

        if self
            .find(|u| u.email == new.email || u.username == new.username)
            .is_some()
        {
            return Err(DbError::Duplicate("Email or username already in use".to_string()));
        }

        let now = Utc::now();
        let user = DbUser {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            is_email_verified: false,
            verification_code: Some(new.verification.code),
            verification_code_expires: Some(new.verification.code_expires),
            verification_token_hash: Some(new.verification.token_hash),
            verification_token_expires: Some(new.verification.token_expires),
            reset_token_hash: None,
            reset_token_expires: None,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbUser>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<DbUser>> {
        Ok(self.find(|u| u.email == email))
    }

    async fn find_by_email_or_username(&self, email: &str, username: &str) -> DbResult<Option<DbUser>> {
        Ok(self.find(|u| u.email == email || u.username == username))
    }

    async fn find_by_verification_code(&self, code: &str, now: DateTime<Utc>) -> DbResult<Option<DbUser>> {
        Ok(self.find(|u| {
            u.verification_code.as_deref() == Some(code) && unexpired(u.verification_code_expires, now)
        }))
    }

    async fn find_by_verification_token(&self, token_hash: &str, now: DateTime<Utc>) -> DbResult<Option<DbUser>> {
        Ok(self.find(|u| {
            u.verification_token_hash.as_deref() == Some(token_hash)
                && unexpired(u.verification_token_expires, now)
        }))
    }

    async fn find_by_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> DbResult<Option<DbUser>> {
        Ok(self.find(|u| {
            u.reset_token_hash.as_deref() == Some(token_hash) && unexpired(u.reset_token_expires, now)
        }))
    }

    async fn set_verification(&self, user_id: Uuid, secrets: VerificationSecrets) -> DbResult<()> {
        self.modify(user_id, |u| {
            u.verification_code = Some(secrets.code);
            u.verification_code_expires = Some(secrets.code_expires);
            u.verification_token_hash = Some(secrets.token_hash);
            u.verification_token_expires = Some(secrets.token_expires);
        })
    }

    async fn mark_verified(&self, user_id: Uuid) -> DbResult<()> {
        self.modify(user_id, |u| {
            u.is_email_verified = true;
            u.verification_code = None;
            u.verification_code_expires = None;
            u.verification_token_hash = None;
            u.verification_token_expires = None;
        })
    }

    async fn set_reset_token(&self, user_id: Uuid, token_hash: &str, expires: DateTime<Utc>) -> DbResult<()> {
        self.modify(user_id, |u| {
            u.reset_token_hash = Some(token_hash.to_string());
            u.reset_token_expires = Some(expires);
        })
    }

    async fn reset_password(&self, user_id: Uuid, password_hash: &str) -> DbResult<()> {
        self.modify(user_id, |u| {
            u.password_hash = password_hash.to_string();
            u.reset_token_hash = None;
            u.reset_token_expires = None;
        })
    }
}

// ============================================================================
// Budgets
// ============================================================================

#[derive(Default)]
pub struct MemoryBudgetStore {
    budgets: DashMap<Uuid, DbBudget>,
}

impl MemoryBudgetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BudgetStore for MemoryBudgetStore {
    async fn get(&self, user_id: Uuid) -> DbResult<Option<DbBudget>> {
        Ok(self.budgets.get(&user_id).map(|b| b.value().clone()))
    }

    async fn upsert(&self, user_id: Uuid, budgets: BTreeMap<String, Decimal>) -> DbResult<DbBudget> {
        let now = Utc::now();
        let mut entry = self.budgets.entry(user_id).or_insert_with(|| DbBudget {
            user_id,
            budgets: Json(BTreeMap::new()),
            created_at: now,
            updated_at: now,
        });
        entry.budgets = Json(budgets);
        entry.updated_at = now;
        Ok(entry.value().clone())
    }
}

// ============================================================================
// Goals
// ============================================================================

#[derive(Default)]
pub struct MemoryGoalStore {
    goals: DashMap<Uuid, DbGoal>,
}

impl MemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GoalStore for MemoryGoalStore {
    async fn create(&self, user_id: Uuid, goal: NewGoal) -> DbResult<DbGoal> {
        let now = Utc::now();
        let created = DbGoal {
            id: Uuid::new_v4(),
            user_id,
            goal_name: goal.goal_name,
            goal_amount: goal.goal_amount,
            months: goal.months,
            target_date: goal.target_date,
            current_savings: Decimal::ZERO,
            plan: Json(goal.plan),
            pricing_info: goal.pricing_info.map(Json),
            status: GOAL_STATUS_ACTIVE.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.goals.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_active(&self, user_id: Uuid) -> DbResult<Vec<DbGoal>> {
        let mut goals: Vec<DbGoal> = self
            .goals
            .iter()
            .filter(|g| g.user_id == user_id && g.status == GOAL_STATUS_ACTIVE)
            .map(|g| g.value().clone())
            .collect();
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(goals)
    }
}

// ============================================================================
// Expenses
// ============================================================================

#[derive(Default)]
pub struct MemoryExpenseStore {
    expenses: DashMap<Uuid, DbExpense>,
}

impl MemoryExpenseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenseStore for MemoryExpenseStore {
    async fn create(&self, user_id: Uuid, input: ExpenseInput) -> DbResult<DbExpense> {
        let now = Utc::now();
        let expense = DbExpense {
            id: Uuid::new_v4(),
            user_id,
            category: input.category,
            amount: input.amount,
            description: input.description,
            date: input.date,
            created_at: now,
            updated_at: now,
        };
        self.expenses.insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn list(&self, user_id: Uuid) -> DbResult<Vec<DbExpense>> {
        let mut expenses: Vec<DbExpense> = self
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.value().clone())
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(expenses)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, input: ExpenseInput) -> DbResult<Option<DbExpense>> {
        let Some(mut expense) = self.expenses.get_mut(&id) else {
            return Ok(None);
        };
        if expense.user_id != user_id {
            return Ok(None);
        }
        expense.category = input.category;
        expense.amount = input.amount;
        expense.description = input.description;
        expense.date = input.date;
        expense.updated_at = Utc::now();
        Ok(Some(expense.value().clone()))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> DbResult<bool> {
        Ok(self
            .expenses
            .remove_if(&id, |_, e| e.user_id == user_id)
            .is_some())
    }
}
