//! Savings Goal Handlers

use axum::{extract::State, Json};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;

use expensegenie_auth::RequireAuth;
use expensegenie_core::GoalSpec;
use expensegenie_db::NewGoal;

use crate::dto::{GoalResponse, GoalsResponse, SaveGoalRequest, SaveGoalResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Active goals, newest first
#[utoipa::path(
    get,
    path = "/api/goals/get",
    tag = "Goals",
    responses(
        (status = 200, description = "Active goals", body = GoalsResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> ApiResult<Json<GoalsResponse>> {
    let goals = state
        .db
        .goals
        .list_active(user.user_id)
        .await
        .map_err(|e| ApiError::internal("Server error fetching goals", e))?;

    Ok(Json(GoalsResponse {
        goals: goals.into_iter().map(GoalResponse::from).collect(),
    }))
}

/// Store a goal together with the plan the client accepted
#[utoipa::path(
    post,
    path = "/api/goals/save",
    tag = "Goals",
    request_body = SaveGoalRequest,
    responses(
        (status = 200, description = "Goal saved", body = SaveGoalResponse),
        (status = 400, description = "Invalid goal", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn save_goal(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    ValidatedJson(request): ValidatedJson<SaveGoalRequest>,
) -> ApiResult<Json<SaveGoalResponse>> {
    if request.goal_amount <= Decimal::ZERO {
        return Err(ApiError::Validation(
            "Goal amount must be greater than 0".to_string(),
        ));
    }

    let spec = GoalSpec::new(
        Some(request.goal_name.clone()),
        request.goal_amount,
        request.months,
    )
    .map_err(|e| ApiError::Validation(e.to_string()))?;

    let goal = state
        .db
        .goals
        .create(
            user.user_id,
            NewGoal {
                goal_name: request.goal_name.trim().to_string(),
                goal_amount: spec.goal_amount,
                months: i32::try_from(spec.months)
                    .map_err(|_| ApiError::Validation("Months is out of range".to_string()))?,
                target_date: spec.target_date(Utc::now()),
                plan: request.plan,
                pricing_info: request.pricing_info.filter(|p| !p.is_null()),
            },
        )
        .await
        .map_err(|e| ApiError::internal("Server error saving goal", e))?;

    tracing::info!(user_id = %user.user_id, goal_id = %goal.id, "Goal saved");

    Ok(Json(SaveGoalResponse {
        message: "Goal saved successfully".to_string(),
        goal: GoalResponse::from(goal),
    }))
}
