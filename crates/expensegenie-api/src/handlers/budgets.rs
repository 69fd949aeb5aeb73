//! Budget Handlers
//!
//! One budget map per user: category name to monthly limit.

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use expensegenie_auth::RequireAuth;
use expensegenie_core::default_budgets;

use crate::dto::{lenient_decimal, BudgetsResponse, UpdateBudgetsRequest, UpdateBudgetsResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::JsonBody;
use crate::state::AppState;

/// The caller's budgets; seeds the defaults on first read
#[utoipa::path(
    get,
    path = "/api/budgets/get",
    tag = "Budgets",
    responses(
        (status = 200, description = "Budget map", body = BudgetsResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_budgets(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> ApiResult<Json<BudgetsResponse>> {
    let existing = state
        .db
        .budgets
        .get(user.user_id)
        .await
        .map_err(|e| ApiError::internal("Server error fetching budgets", e))?;

    let budgets = match existing {
        Some(budget) => budget.budgets.0,
        None => {
            tracing::debug!(user_id = %user.user_id, "Seeding default budgets");
            state
                .db
                .budgets
                .upsert(user.user_id, default_budgets())
                .await
                .map_err(|e| ApiError::internal("Server error fetching budgets", e))?
                .budgets
                .0
        }
    };

    Ok(Json(BudgetsResponse { budgets }))
}

/// Replace the caller's budgets
#[utoipa::path(
    put,
    path = "/api/budgets/update",
    tag = "Budgets",
    request_body = UpdateBudgetsRequest,
    responses(
        (status = 200, description = "Budgets stored", body = UpdateBudgetsResponse),
        (status = 400, description = "Invalid budgets", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_budgets(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    JsonBody(request): JsonBody<UpdateBudgetsRequest>,
) -> ApiResult<Json<UpdateBudgetsResponse>> {
    let budgets = parse_budgets(request.budgets.as_ref())?;

    let stored = state
        .db
        .budgets
        .upsert(user.user_id, budgets)
        .await
        .map_err(|e| ApiError::internal("Server error updating budgets", e))?;

    tracing::info!(user_id = %user.user_id, categories = stored.amounts().len(), "Budgets updated");

    Ok(Json(UpdateBudgetsResponse {
        message: "Budgets updated successfully".to_string(),
        budgets: stored.budgets.0,
    }))
}

fn parse_budgets(value: Option<&Value>) -> ApiResult<BTreeMap<String, Decimal>> {
    let Some(Value::Object(entries)) = value else {
        return Err(ApiError::BadRequest("Invalid budgets data".to_string()));
    };

    entries
        .iter()
        .map(|(category, amount)| {
            let amount = match amount {
                Value::Number(_) => lenient_decimal(amount),
                _ => None,
            }
            .filter(|a| *a >= Decimal::ZERO)
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "Budget for {} must be a non-negative number",
                    category
                ))
            })?;
            Ok((category.clone(), amount))
        })
        .collect()
}
