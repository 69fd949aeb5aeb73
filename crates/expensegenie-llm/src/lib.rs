//! ExpenseGenie LLM - completion providers and the budget advisor
//!
//! ## Providers
//! - OpenAI (chat completions)
//! - Google Gemini (generateContent)
//!
//! Providers are tried in the configured priority order by [`LLMRouter`].
//! Every reply is treated as untrusted text: a JSON object is extracted
//! from it and validated before anything reaches the caller.
//!
//! [`BudgetAdvisor`] owns the three prompts the application uses:
//! expense categorization, market price search and savings-plan generation.

pub mod advisor;
pub mod extract;
pub mod prompts;
pub mod providers;
pub mod router;
pub mod types;

pub use advisor::*;
pub use extract::{extract_json_object, positive_decimal};
pub use providers::*;
pub use router::*;
pub use types::*;
