//! Budget repository

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::BudgetStore;
use crate::{DbBudget, DbResult};

pub struct BudgetRepo {
    pool: PgPool,
}

impl BudgetRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BudgetStore for BudgetRepo {
    async fn get(&self, user_id: Uuid) -> DbResult<Option<DbBudget>> {
        let budget = sqlx::query_as::<_, DbBudget>(
            r#"
            SELECT user_id, budgets, created_at, updated_at
            FROM budgets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(budget)
    }

    async fn upsert(&self, user_id: Uuid, budgets: BTreeMap<String, Decimal>) -> DbResult<DbBudget> {
        let budget = sqlx::query_as::<_, DbBudget>(
            r#"
            INSERT INTO budgets (user_id, budgets)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET budgets = EXCLUDED.budgets, updated_at = NOW()
            RETURNING user_id, budgets, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(Json(budgets))
        .fetch_one(&self.pool)
        .await?;

        Ok(budget)
    }
}
