//! Savings goal repository

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::GOAL_STATUS_ACTIVE;
use crate::store::GoalStore;
use crate::{DbGoal, DbResult, NewGoal};

pub struct GoalRepo {
    pool: PgPool,
}

impl GoalRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GoalStore for GoalRepo {
    async fn create(&self, user_id: Uuid, goal: NewGoal) -> DbResult<DbGoal> {
        let created = sqlx::query_as::<_, DbGoal>(
            r#"
            INSERT INTO goals (
                id, user_id, goal_name, goal_amount, months, target_date,
                plan, pricing_info, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING
                id, user_id, goal_name, goal_amount, months, target_date,
                current_savings, plan, pricing_info, status, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&goal.goal_name)
        .bind(goal.goal_amount)
        .bind(goal.months)
        .bind(goal.target_date)
        .bind(Json(&goal.plan))
        .bind(goal.pricing_info.as_ref().map(Json))
        .bind(GOAL_STATUS_ACTIVE)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_active(&self, user_id: Uuid) -> DbResult<Vec<DbGoal>> {
        let goals = sqlx::query_as::<_, DbGoal>(
            r#"
            SELECT
                id, user_id, goal_name, goal_amount, months, target_date,
                current_savings, plan, pricing_info, status, created_at, updated_at
            FROM goals
            WHERE user_id = $1 AND status = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(GOAL_STATUS_ACTIVE)
        .fetch_all(&self.pool)
        .await?;

        Ok(goals)
    }
}
