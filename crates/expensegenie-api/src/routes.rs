//! API Routes

use axum::{
    routing::{any, delete, get, post, put},
    Router,
};
use std::sync::Arc;

use expensegenie_auth::AuthService;

use crate::handlers;
use crate::state::AppState;

/// Everything under `/api`
pub fn api_routes(auth: &AuthService) -> Router<Arc<AppState>> {
    Router::new()
        // Public; the handler checks the method per action
        .route("/auth", any(handlers::auth::dispatch))
        .merge(protected_routes().route_layer(auth.layer()))
}

/// Routes that require a bearer token
fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        // AI
        .route("/ai/categorize", post(handlers::ai::categorize))
        .route(
            "/ai/generate-budget-plan",
            post(handlers::ai::generate_budget_plan),
        )
        // Budgets
        .route("/budgets/get", get(handlers::budgets::get_budgets))
        .route(
            "/budgets/update",
            put(handlers::budgets::update_budgets).post(handlers::budgets::update_budgets),
        )
        // Goals
        .route(
            "/goals",
            get(handlers::goals::list_goals).post(handlers::goals::save_goal),
        )
        .route("/goals/get", get(handlers::goals::list_goals))
        .route("/goals/save", post(handlers::goals::save_goal))
        // Expenses
        .route("/expenses/add-expense", post(handlers::expenses::add_expense))
        .route(
            "/expenses/display-expense",
            get(handlers::expenses::list_expenses),
        )
        .route("/expenses/edit-expense", put(handlers::expenses::edit_expense))
        .route(
            "/expenses/delete-expense",
            delete(handlers::expenses::delete_expense),
        )
        .route("/expenses/summary", get(handlers::expenses::expense_summary))
}

/// Create Swagger UI routes
pub fn swagger_routes() -> Router<Arc<AppState>> {
    use crate::openapi::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
