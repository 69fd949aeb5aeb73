//! OpenAPI Documentation

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use expensegenie_core::{BudgetCut, BudgetPlan, Category, PricingInfo, SpendingRecord};

use crate::dto;
use crate::error::ErrorResponse;
use crate::handlers;

/// ExpenseGenie API Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ExpenseGenie API",
        description = "Expense tracking, monthly budgets, savings goals and AI budget plans.",
        version = "1.0.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local Development")
    ),
    paths(
        // Health
        handlers::health::health_check,
        handlers::health::readiness_check,
        // Auth
        handlers::auth::dispatch,
        // AI
        handlers::ai::categorize,
        handlers::ai::generate_budget_plan,
        // Budgets
        handlers::budgets::get_budgets,
        handlers::budgets::update_budgets,
        // Goals
        handlers::goals::list_goals,
        handlers::goals::save_goal,
        // Expenses
        handlers::expenses::add_expense,
        handlers::expenses::list_expenses,
        handlers::expenses::edit_expense,
        handlers::expenses::delete_expense,
        handlers::expenses::expense_summary,
    ),
    components(
        schemas(
            // Common
            ErrorResponse,
            dto::MessageResponse,
            handlers::health::HealthResponse,
            handlers::health::ReadinessResponse,
            handlers::health::ComponentStatus,
            // Auth
            dto::SignupRequest,
            dto::SignupResponse,
            dto::LoginRequest,
            dto::LoginResponse,
            dto::VerifyEmailRequest,
            dto::VerifyEmailResponse,
            dto::EmailRequest,
            dto::ResetPasswordRequest,
            // AI
            dto::CategorizeRequest,
            dto::CategorizeResponse,
            dto::GeneratePlanRequest,
            dto::GeneratePlanResponse,
            Category,
            SpendingRecord,
            PricingInfo,
            BudgetPlan,
            BudgetCut,
            // Budgets
            dto::BudgetsResponse,
            dto::UpdateBudgetsRequest,
            dto::UpdateBudgetsResponse,
            // Goals
            dto::SaveGoalRequest,
            dto::SaveGoalResponse,
            dto::GoalResponse,
            dto::GoalsResponse,
            // Expenses
            dto::ExpenseRequest,
            dto::EditExpenseRequest,
            dto::DeleteExpenseRequest,
            dto::ExpenseResponse,
            dto::ExpensesResponse,
            dto::ExpenseMutationResponse,
            dto::ExpenseSummaryResponse,
            dto::TopCategory,
        )
    ),
    tags(
        (name = "Health", description = "Service health and status"),
        (name = "Authentication", description = "Signup, login, email verification and password reset"),
        (name = "AI", description = "Expense categorization and savings plans"),
        (name = "Budgets", description = "Monthly budget per category"),
        (name = "Goals", description = "Saved savings goals"),
        (name = "Expenses", description = "Expense records and dashboard summary")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Bearer JWT scheme
pub struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "ExpenseGenie API");
        assert!(spec.paths.paths.contains_key("/api/auth"));
        assert!(spec.paths.paths.contains_key("/api/ai/generate-budget-plan"));
    }

    #[test]
    fn test_openapi_json() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("\"bearer\""));
    }
}
