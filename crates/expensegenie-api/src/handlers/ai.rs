//! AI Handlers
//!
//! Expense categorization and savings plans. Both endpoints keep working
//! without an AI provider: categorization falls back to keyword matching
//! and plans to the rule-based planner. Only the price search has no
//! local fallback.

use axum::{extract::State, Json};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

use expensegenie_auth::RequireAuth;
use expensegenie_core::{
    classify, rule_based_plan, GoalSpec, PricingInfo, SpendingRecord, SpendingSummary, MAX_AMOUNT,
};
use expensegenie_llm::LLMError;

use crate::dto::{
    is_truthy, lenient_decimal, present, CategorizeRequest, CategorizeResponse,
    GeneratePlanRequest, GeneratePlanResponse, PlanExpense,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::JsonBody;
use crate::state::AppState;

const CATEGORIZATIONS_TOTAL: &str = "expensegenie_categorizations_total";
const PLANS_GENERATED_TOTAL: &str = "expensegenie_plans_generated_total";

const PRICING_NOT_FOUND: &str = "Could not find pricing information. Please enter the amount manually.";
const PRICING_INVALID: &str = "Pricing search returned invalid data. Please enter the amount manually.";
const PRICING_UNAVAILABLE: &str = "Pricing search unavailable. Please enter amount manually or add GEMINI_API_KEY/OPENAI_API_KEY to environment variables.";

/// Suggest a category for an expense description
#[utoipa::path(
    post,
    path = "/api/ai/categorize",
    tag = "AI",
    request_body = CategorizeRequest,
    responses(
        (status = 200, description = "Suggested category", body = CategorizeResponse),
        (status = 400, description = "Description missing", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn categorize(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    JsonBody(request): JsonBody<CategorizeRequest>,
) -> ApiResult<Json<CategorizeResponse>> {
    let Some(description) = present(&request.description) else {
        return Err(ApiError::BadRequest("Description is required".to_string()));
    };

    let (category, source) = match state.advisor.categorize(description).await {
        Ok(routed) => (routed.value, "ai"),
        Err(e) => {
            tracing::debug!(user_id = %user.user_id, error = %e, "AI categorization unavailable, using keywords");
            (classify(description), "keyword")
        }
    };

    metrics::counter!(CATEGORIZATIONS_TOTAL, "source" => source).increment(1);

    Ok(Json(CategorizeResponse { category }))
}

/// Build a savings plan toward a goal from the caller's spending
#[utoipa::path(
    post,
    path = "/api/ai/generate-budget-plan",
    tag = "AI",
    request_body = GeneratePlanRequest,
    responses(
        (status = 200, description = "Savings plan", body = GeneratePlanResponse),
        (status = 400, description = "Invalid input or pricing failure", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn generate_budget_plan(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    JsonBody(request): JsonBody<GeneratePlanRequest>,
) -> ApiResult<Json<GeneratePlanResponse>> {
    let months = request.months.as_ref().and_then(parse_months);
    let (Some(months), Some(serde_json::Value::Array(expenses))) = (months, request.expenses.clone())
    else {
        return Err(ApiError::BadRequest(
            "Missing required fields: months and expenses are required".to_string(),
        ));
    };

    let amount_given = is_truthy(request.goal_amount.as_ref());
    let search_pricing = is_truthy(request.search_pricing.as_ref());
    if !amount_given && !search_pricing {
        return Err(ApiError::BadRequest(
            "Please enter a goal amount or enable price search".to_string(),
        ));
    }

    let goal_name = present(&request.goal_name).map(str::to_string);

    let pricing = match (&goal_name, search_pricing && !amount_given) {
        (Some(name), true) => Some(search_price(&state, name).await?),
        _ => None,
    };

    let goal_amount = pricing
        .as_ref()
        .map(|p| p.price)
        .or_else(|| request.goal_amount.as_ref().and_then(lenient_decimal))
        .filter(|amount| *amount > Decimal::ZERO)
        .ok_or_else(|| {
            ApiError::BadRequest(
                "Invalid goal amount. Please provide a valid amount greater than 0.".to_string(),
            )
        })?;

    let goal = GoalSpec::new(goal_name, goal_amount, months)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let records = expenses
        .into_iter()
        .map(|value| {
            serde_json::from_value::<PlanExpense>(value)
                .ok()
                .filter(|e| e.amount.abs() <= MAX_AMOUNT)
                .map(SpendingRecord::from)
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            ApiError::BadRequest("Each expense needs a category and a numeric amount".to_string())
        })?;
    let spending = SpendingSummary::from_records(&records);
    let budgets = request.current_budgets.unwrap_or_default();

    let ai_plan = if state.advisor.is_configured() {
        match state
            .advisor
            .generate_plan(&goal, &spending, &budgets, pricing.as_ref())
            .await
        {
            Ok(routed) => Some(routed),
            Err(e) => {
                tracing::warn!(user_id = %user.user_id, error = %e, "AI plan failed, using rule-based plan");
                None
            }
        }
    } else {
        None
    };

    let (plan, ai_generated) = match ai_plan {
        Some(routed) => (routed.value, true),
        None => (rule_based_plan(&goal, &spending, &budgets, &state.policy), false),
    };

    let source = if ai_generated { "ai" } else { "rule_based" };
    metrics::counter!(PLANS_GENERATED_TOTAL, "source" => source).increment(1);

    tracing::info!(
        user_id = %user.user_id,
        goal = %goal.display_name(),
        months = goal.months,
        achievable = plan.achievable,
        source,
        "Budget plan generated"
    );

    Ok(Json(GeneratePlanResponse {
        plan,
        ai_generated,
        pricing_info: pricing,
    }))
}

/// Price lookup; never falls back to a made-up amount
async fn search_price(state: &AppState, item_name: &str) -> ApiResult<PricingInfo> {
    match state.advisor.search_price(item_name).await {
        Ok(routed) => {
            tracing::info!(item = %item_name, price = %routed.value.price, provider = %routed.provider, "Price found");
            Ok(routed.value)
        }
        Err(e) => {
            tracing::warn!(item = %item_name, error = %e, "Price search failed");
            Err(pricing_error(e))
        }
    }
}

fn pricing_error(err: LLMError) -> ApiError {
    match err {
        LLMError::ProviderNotAvailable { .. } => ApiError::BadRequestDetails {
            message: PRICING_NOT_FOUND.to_string(),
            details: PRICING_UNAVAILABLE.to_string(),
        },
        LLMError::InvalidField { ref field, .. } if field == "price" => ApiError::BadRequestDetails {
            message: PRICING_INVALID.to_string(),
            details: err.to_string(),
        },
        other => ApiError::BadRequestDetails {
            message: PRICING_NOT_FOUND.to_string(),
            details: other.to_string(),
        },
    }
}

/// Whole number of months, at least one
fn parse_months(value: &serde_json::Value) -> Option<u32> {
    let months = lenient_decimal(value)?;
    if months < Decimal::ONE || !months.fract().is_zero() {
        return None;
    }
    // Out-of-range timelines are rejected by `GoalSpec`
    Some(months.to_u32().unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_months() {
        assert_eq!(parse_months(&json!(6)), Some(6));
        assert_eq!(parse_months(&json!("12")), Some(12));
        assert_eq!(parse_months(&json!(6.0)), Some(6));
        assert_eq!(parse_months(&json!(0)), None);
        assert_eq!(parse_months(&json!(2.5)), None);
        assert_eq!(parse_months(&json!(-3)), None);
        assert_eq!(parse_months(&json!("soon")), None);
        assert_eq!(parse_months(&json!(3_000_000_000u64)), Some(3_000_000_000));
        assert_eq!(parse_months(&json!("99999999999")), Some(u32::MAX));
    }

    #[test]
    fn test_pricing_errors_keep_details() {
        let err = pricing_error(LLMError::ProviderNotAvailable {
            provider: "none configured".into(),
        });
        match err {
            ApiError::BadRequestDetails { message, details } => {
                assert_eq!(message, PRICING_NOT_FOUND);
                assert!(details.contains("GEMINI_API_KEY/OPENAI_API_KEY"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = pricing_error(LLMError::InvalidField {
            field: "price".into(),
            message: "must be greater than 0".into(),
        });
        assert_eq!(err.to_string(), PRICING_INVALID);

        let err = pricing_error(LLMError::RequestFailed {
            message: "timeout".into(),
        });
        assert_eq!(err.to_string(), PRICING_NOT_FOUND);
    }
}
