//! Application state shared across handlers

use std::sync::Arc;

use expensegenie_auth::AuthService;
use expensegenie_core::PolicyTable;
use expensegenie_db::Database;
use expensegenie_llm::BudgetAdvisor;
use expensegenie_mail::EmailService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: Arc<AuthService>,
    /// AI categorization, pricing and planning
    pub advisor: Arc<BudgetAdvisor>,
    pub email: Arc<EmailService>,
    /// Reduction rules for the rule-based planner
    pub policy: Arc<PolicyTable>,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        auth: Arc<AuthService>,
        advisor: Arc<BudgetAdvisor>,
        email: Arc<EmailService>,
    ) -> Self {
        Self {
            db,
            auth,
            advisor,
            email,
            policy: Arc::new(PolicyTable::default()),
        }
    }

    pub fn with_policy(mut self, policy: PolicyTable) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// In-memory stores, no AI providers, emails kept in memory
    #[cfg(test)]
    pub fn test() -> Self {
        use expensegenie_auth::AuthConfig;
        use expensegenie_mail::MemoryMailer;

        Self::new(
            Arc::new(Database::in_memory()),
            Arc::new(AuthService::new(AuthConfig::for_tests(
                "test-secret-key-at-least-32-bytes-long!!",
            ))),
            Arc::new(BudgetAdvisor::default()),
            Arc::new(EmailService::new(
                Arc::new(MemoryMailer::new()),
                "http://localhost:3000",
            )),
        )
    }
}
