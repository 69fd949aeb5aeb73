//! Expense repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::ExpenseStore;
use crate::{DbExpense, DbResult, ExpenseInput};

pub struct ExpenseRepo {
    pool: PgPool,
}

impl ExpenseRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseStore for ExpenseRepo {
    async fn create(&self, user_id: Uuid, input: ExpenseInput) -> DbResult<DbExpense> {
        let expense = sqlx::query_as::<_, DbExpense>(
            r#"
            INSERT INTO expenses (id, user_id, category, amount, description, date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, category, amount, description, date, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&input.category)
        .bind(input.amount)
        .bind(&input.description)
        .bind(input.date)
        .fetch_one(&self.pool)
        .await?;

        Ok(expense)
    }

    async fn list(&self, user_id: Uuid) -> DbResult<Vec<DbExpense>> {
        let expenses = sqlx::query_as::<_, DbExpense>(
            r#"
            SELECT id, user_id, category, amount, description, date, created_at, updated_at
            FROM expenses
            WHERE user_id = $1
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, input: ExpenseInput) -> DbResult<Option<DbExpense>> {
        let expense = sqlx::query_as::<_, DbExpense>(
            r#"
            UPDATE expenses
            SET category = $3, amount = $4, description = $5, date = $6, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, category, amount, description, date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&input.category)
        .bind(input.amount)
        .bind(&input.description)
        .bind(input.date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
