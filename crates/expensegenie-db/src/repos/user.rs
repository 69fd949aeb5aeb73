//! User repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgQueryResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::UserStore;
use crate::{DbError, DbResult, DbUser, NewUser, VerificationSecrets};

const USER_COLUMNS: &str = r#"
    id, username, email, password_hash, is_email_verified,
    verification_code, verification_code_expires,
    verification_token_hash, verification_token_expires,
    reset_token_hash, reset_token_expires,
    created_at, updated_at
"#;

/// PostgreSQL-backed user accounts
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_where(&self, predicate: &str, value: &str, now: Option<DateTime<Utc>>) -> DbResult<Option<DbUser>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate} LIMIT 1");
        let mut query = sqlx::query_as::<_, DbUser>(&sql).bind(value);
        if let Some(now) = now {
            query = query.bind(now);
        }
        let user = query.fetch_optional(&self.pool).await?;
        Ok(user)
    }
}

fn ensure_updated(user_id: Uuid, result: PgQueryResult) -> DbResult<()> {
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("User {}", user_id)));
    }
    Ok(())
}

#[async_trait]
impl UserStore for UserRepo {
    async fn create(&self, user: NewUser) -> DbResult<DbUser> {
        let sql = format!(
            r#"
            INSERT INTO users (
                id, username, email, password_hash,
                verification_code, verification_code_expires,
                verification_token_hash, verification_token_expires
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, DbUser>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.verification.code)
            .bind(user.verification.code_expires)
            .bind(&user.verification.token_hash)
            .bind(user.verification.token_expires)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::from_insert(e, "Email or username already in use"))?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbUser>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, DbUser>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<DbUser>> {
        self.find_where("email = $1", email, None).await
    }

    async fn find_by_email_or_username(&self, email: &str, username: &str) -> DbResult<Option<DbUser>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR username = $2 LIMIT 1");
        let user = sqlx::query_as::<_, DbUser>(&sql)
            .bind(email)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_verification_code(&self, code: &str, now: DateTime<Utc>) -> DbResult<Option<DbUser>> {
        self.find_where(
            "verification_code = $1 AND verification_code_expires >= $2",
            code,
            Some(now),
        )
        .await
    }

    async fn find_by_verification_token(&self, token_hash: &str, now: DateTime<Utc>) -> DbResult<Option<DbUser>> {
        self.find_where(
            "verification_token_hash = $1 AND verification_token_expires >= $2",
            token_hash,
            Some(now),
        )
        .await
    }

    async fn find_by_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> DbResult<Option<DbUser>> {
        self.find_where(
            "reset_token_hash = $1 AND reset_token_expires >= $2",
            token_hash,
            Some(now),
        )
        .await
    }

    async fn set_verification(&self, user_id: Uuid, secrets: VerificationSecrets) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET verification_code = $2, verification_code_expires = $3,
                verification_token_hash = $4, verification_token_expires = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&secrets.code)
        .bind(secrets.code_expires)
        .bind(&secrets.token_hash)
        .bind(secrets.token_expires)
        .execute(&self.pool)
        .await?;

        ensure_updated(user_id, result)
    }

    async fn mark_verified(&self, user_id: Uuid) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_email_verified = TRUE,
                verification_code = NULL, verification_code_expires = NULL,
                verification_token_hash = NULL, verification_token_expires = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        ensure_updated(user_id, result)
    }

    async fn set_reset_token(&self, user_id: Uuid, token_hash: &str, expires: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $2, reset_token_expires = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires)
        .execute(&self.pool)
        .await?;

        ensure_updated(user_id, result)
    }

    async fn reset_password(&self, user_id: Uuid, password_hash: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, reset_token_hash = NULL, reset_token_expires = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        ensure_updated(user_id, result)
    }
}
