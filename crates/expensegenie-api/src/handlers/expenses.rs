//! Expense Handlers
//!
//! CRUD over the caller's expenses and the dashboard summary. Every query
//! is scoped to the authenticated user; another user's id behaves like an
//! unknown one.

use axum::{extract::State, http::StatusCode, Json};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use expensegenie_auth::RequireAuth;
use expensegenie_core::{Category, SpendingRecord, SpendingSummary, MAX_AMOUNT};
use expensegenie_db::ExpenseInput;

use crate::dto::{
    DeleteExpenseRequest, EditExpenseRequest, ExpenseMutationResponse, ExpenseRequest,
    ExpenseResponse, ExpenseSummaryResponse, ExpensesResponse, MessageResponse, TopCategory,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{JsonBody, ValidatedJson};
use crate::state::AppState;

const EXPENSE_NOT_FOUND: &str = "Expense not found";

/// Record an expense
#[utoipa::path(
    post,
    path = "/api/expenses/add-expense",
    tag = "Expenses",
    request_body = ExpenseRequest,
    responses(
        (status = 201, description = "Expense created", body = ExpenseMutationResponse),
        (status = 400, description = "Invalid expense", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn add_expense(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    ValidatedJson(request): ValidatedJson<ExpenseRequest>,
) -> ApiResult<(StatusCode, Json<ExpenseMutationResponse>)> {
    let input = expense_input(request)?;

    let expense = state
        .db
        .expenses
        .create(user.user_id, input)
        .await
        .map_err(|e| ApiError::internal("Server error adding expense", e))?;

    tracing::info!(user_id = %user.user_id, expense_id = %expense.id, "Expense added");

    Ok((
        StatusCode::CREATED,
        Json(ExpenseMutationResponse {
            message: "Expense added successfully".to_string(),
            expense: ExpenseResponse::from(expense),
        }),
    ))
}

/// All of the caller's expenses, newest date first
#[utoipa::path(
    get,
    path = "/api/expenses/display-expense",
    tag = "Expenses",
    responses(
        (status = 200, description = "Expenses", body = ExpensesResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> ApiResult<Json<ExpensesResponse>> {
    let expenses = state
        .db
        .expenses
        .list(user.user_id)
        .await
        .map_err(|e| ApiError::internal("Server error fetching expenses", e))?;

    Ok(Json(ExpensesResponse {
        expenses: expenses.into_iter().map(ExpenseResponse::from).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/expenses/edit-expense",
    tag = "Expenses",
    request_body = EditExpenseRequest,
    responses(
        (status = 200, description = "Expense updated", body = ExpenseMutationResponse),
        (status = 400, description = "Invalid expense", body = crate::error::ErrorResponse),
        (status = 404, description = "Expense not found", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn edit_expense(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    ValidatedJson(request): ValidatedJson<EditExpenseRequest>,
) -> ApiResult<Json<ExpenseMutationResponse>> {
    let input = expense_input(request.fields())?;

    let expense = state
        .db
        .expenses
        .update(user.user_id, request.id, input)
        .await
        .map_err(|e| ApiError::internal("Server error updating expense", e))?
        .ok_or_else(|| ApiError::NotFound(EXPENSE_NOT_FOUND.to_string()))?;

    Ok(Json(ExpenseMutationResponse {
        message: "Expense updated successfully".to_string(),
        expense: ExpenseResponse::from(expense),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/delete-expense",
    tag = "Expenses",
    request_body = DeleteExpenseRequest,
    responses(
        (status = 200, description = "Expense deleted", body = MessageResponse),
        (status = 404, description = "Expense not found", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    JsonBody(request): JsonBody<DeleteExpenseRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = state
        .db
        .expenses
        .delete(user.user_id, request.id)
        .await
        .map_err(|e| ApiError::internal("Server error deleting expense", e))?;

    if !deleted {
        return Err(ApiError::NotFound(EXPENSE_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = %user.user_id, expense_id = %request.id, "Expense deleted");

    Ok(Json(MessageResponse::new("Expense deleted successfully")))
}

/// Dashboard totals
#[utoipa::path(
    get,
    path = "/api/expenses/summary",
    tag = "Expenses",
    responses(
        (status = 200, description = "Spending summary", body = ExpenseSummaryResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn expense_summary(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> ApiResult<Json<ExpenseSummaryResponse>> {
    let expenses = state
        .db
        .expenses
        .list(user.user_id)
        .await
        .map_err(|e| ApiError::internal("Server error fetching expenses", e))?;

    let records: Vec<SpendingRecord> = expenses
        .iter()
        .map(|e| SpendingRecord::new(e.category.clone(), e.amount, e.date.to_string()))
        .collect();
    let summary = SpendingSummary::from_records(&records);

    Ok(Json(ExpenseSummaryResponse {
        total_expenses: summary.total(),
        total_transactions: records.len(),
        top_category: summary.top_category().map(|(name, amount)| TopCategory {
            name: name.to_string(),
            amount,
        }),
        category_totals: summary.category_totals,
        monthly_totals: summary.monthly_totals,
    }))
}

/// Check the parts `validator` cannot express
fn expense_input(request: ExpenseRequest) -> ApiResult<ExpenseInput> {
    let category = Category::from_str(request.category.trim())
        .map_err(|_| ApiError::Validation(format!("Invalid category: {}", request.category)))?;

    if request.amount <= Decimal::ZERO {
        return Err(ApiError::Validation(
            "Please enter an amount greater than 0.".to_string(),
        ));
    }
    if request.amount > MAX_AMOUNT {
        return Err(ApiError::Validation(format!(
            "Amount must be at most {}",
            MAX_AMOUNT
        )));
    }

    Ok(ExpenseInput {
        category: category.as_str().to_string(),
        amount: request.amount,
        description: request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        date: request.date,
    })
}
