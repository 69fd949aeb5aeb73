//! Budget advisor
//!
//! Wraps an [`LLMRouter`] with the three requests the application makes.
//! Every reply is validated here; callers either get a well-formed value or
//! an [`LLMError`] and choose their own fallback.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use expensegenie_core::{BudgetCut, BudgetPlan, Category, GoalSpec, PricingInfo, SpendingSummary};

use crate::extract::{optional_text, positive_decimal};
use crate::prompts;
use crate::router::{LLMRouter, Routed};
use crate::types::*;

/// Used when a plan reply carries no motivation
pub const DEFAULT_MOTIVATION: &str = "You can do it!";

const CATEGORIZE_TEMPERATURE: f32 = 0.3;
const CATEGORIZE_MAX_TOKENS: u32 = 20;
const PRICING_TEMPERATURE: f32 = 0.3;
const PRICING_MAX_TOKENS: u32 = 200;
const PLAN_TEMPERATURE: f32 = 0.7;
const PLAN_MAX_TOKENS: u32 = 800;

#[derive(Clone, Default)]
pub struct BudgetAdvisor {
    router: LLMRouter,
}

impl BudgetAdvisor {
    pub fn new(router: LLMRouter) -> Self {
        Self { router }
    }

    pub fn is_configured(&self) -> bool {
        self.router.is_configured()
    }

    pub fn router(&self) -> &LLMRouter {
        &self.router
    }

    /// Ask for one of the nine categories. Replies naming anything else are
    /// rejected.
    pub async fn categorize(&self, description: &str) -> Result<Routed<Category>> {
        let request = CompletionRequest::prompt(prompts::categorize_prompt(description))
            .with_system(prompts::CATEGORIZE_SYSTEM)
            .with_temperature(CATEGORIZE_TEMPERATURE)
            .with_max_tokens(CATEGORIZE_MAX_TOKENS);

        self.router
            .route(request, |_, response| parse_category(&response.content))
            .await
    }

    /// Market price search for `item_name`
    pub async fn search_price(&self, item_name: &str) -> Result<Routed<PricingInfo>> {
        let request = CompletionRequest::prompt(prompts::pricing_prompt(item_name))
            .with_system(prompts::PRICING_SYSTEM)
            .with_temperature(PRICING_TEMPERATURE)
            .with_max_tokens(PRICING_MAX_TOKENS);

        self.router
            .complete_json(request, |kind, object| {
                parse_pricing(&object, item_name, kind)
            })
            .await
    }

    /// Full savings plan. The goal fields of the result always come from
    /// `goal`, never from the reply.
    pub async fn generate_plan(
        &self,
        goal: &GoalSpec,
        spending: &SpendingSummary,
        current_budgets: &BTreeMap<String, Decimal>,
        pricing: Option<&PricingInfo>,
    ) -> Result<Routed<BudgetPlan>> {
        let prompt = prompts::plan_prompt(goal, spending, current_budgets, pricing);
        let request = CompletionRequest::prompt(prompt)
            .with_system(prompts::PLAN_SYSTEM)
            .with_temperature(PLAN_TEMPERATURE)
            .with_max_tokens(PLAN_MAX_TOKENS);

        self.router
            .complete_json(request, |_, object| parse_plan(&object, goal))
            .await
    }
}

fn parse_category(content: &str) -> Result<Category> {
    let cleaned = content
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '`')
        .trim();

    Category::from_str(cleaned).map_err(|_| LLMError::InvalidField {
        field: "category".to_string(),
        message: format!("unknown category: {cleaned}"),
    })
}

fn parse_pricing(object: &Value, item_name: &str, kind: ProviderKind) -> Result<PricingInfo> {
    let price = positive_decimal(object, "price")?;

    Ok(PricingInfo {
        item_name: optional_text(object, "itemName").unwrap_or_else(|| item_name.to_string()),
        price,
        source: optional_text(object, "source")
            .unwrap_or_else(|| kind.research_label().to_string()),
        notes: optional_text(object, "notes"),
    })
}

fn parse_plan(object: &Value, goal: &GoalSpec) -> Result<BudgetPlan> {
    let cuts = match object.get("cuts") {
        Some(Value::Array(items)) => items
            .iter()
            .map(parse_cut)
            .collect::<Result<Vec<_>>>()?,
        _ => vec![],
    };

    let insights = match object.get("insights") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        _ => vec![],
    };

    Ok(BudgetPlan {
        goal_name: goal.display_name().to_string(),
        goal_amount: goal.goal_amount,
        months: goal.months,
        required_monthly_savings: goal.required_monthly_savings(),
        analysis: optional_text(object, "analysis"),
        cuts,
        total_savings: object
            .get("totalMonthlySavings")
            .and_then(as_decimal)
            .unwrap_or(Decimal::ZERO),
        motivation: optional_text(object, "motivation")
            .unwrap_or_else(|| DEFAULT_MOTIVATION.to_string()),
        achievable: !matches!(object.get("achievable"), Some(Value::Bool(false))),
        alternatives: optional_text(object, "alternatives"),
        insights,
    })
}

fn parse_cut(item: &Value) -> Result<BudgetCut> {
    let invalid = |field: &str, message: &str| LLMError::InvalidField {
        field: format!("cuts.{field}"),
        message: message.to_string(),
    };

    let category = optional_text(item, "category").ok_or_else(|| invalid("category", "missing"))?;
    let reduction = item
        .get("reduction")
        .and_then(as_decimal)
        .ok_or_else(|| invalid("reduction", "not a number"))?;
    if reduction < Decimal::ZERO {
        return Err(invalid("reduction", "must not be negative"));
    }
    let new_budget = item
        .get("newBudget")
        .and_then(as_decimal)
        .unwrap_or(Decimal::ZERO);

    Ok(BudgetCut {
        category,
        reduction,
        new_budget,
        tip: optional_text(item, "tip").unwrap_or_default(),
    })
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Decimal::from(i)),
            None => n.as_f64().and_then(Decimal::from_f64),
        },
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LLMProvider;
    use async_trait::async_trait;
    use expensegenie_core::SpendingRecord;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    struct Canned {
        kind: ProviderKind,
        reply: Result<String>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl Canned {
        fn new(kind: ProviderKind, reply: Result<String>) -> Arc<Self> {
            Arc::new(Self {
                kind,
                reply,
                seen: Mutex::new(vec![]),
            })
        }
    }

    #[async_trait]
    impl LLMProvider for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone().map(CompletionResponse::new)
        }
    }

    fn advisor(providers: Vec<Arc<dyn LLMProvider>>) -> BudgetAdvisor {
        BudgetAdvisor::new(LLMRouter::new(providers))
    }

    fn goal() -> GoalSpec {
        GoalSpec::new(Some("Laptop".into()), dec!(30000), 3).unwrap()
    }

    fn spending() -> SpendingSummary {
        SpendingSummary::from_records(&vec![SpendingRecord::new("Food", dec!(6000), "2024-03-01")])
    }

    #[tokio::test]
    async fn test_categorize_accepts_known_category() {
        let provider = Canned::new(ProviderKind::OpenAI, Ok("Personal Needs.".into()));
        let advisor = advisor(vec![provider.clone() as Arc<dyn LLMProvider>]);

        let routed = advisor.categorize("shampoo").await.unwrap();
        assert_eq!(routed.value, Category::PersonalNeeds);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].max_tokens, Some(20));
        assert_eq!(seen[0].temperature, Some(0.3));
        assert_eq!(seen[0].system.as_deref(), Some(prompts::CATEGORIZE_SYSTEM));
    }

    #[tokio::test]
    async fn test_categorize_rejects_unknown_category() {
        let provider = Canned::new(ProviderKind::OpenAI, Ok("Transportation".into()));
        let err = advisor(vec![provider as Arc<dyn LLMProvider>])
            .categorize("bus fare")
            .await
            .unwrap_err();
        assert!(matches!(err, LLMError::InvalidField { .. }));
    }

    #[tokio::test]
    async fn test_search_price_fills_defaults() {
        let provider = Canned::new(ProviderKind::Gemini, Ok("```json\n{\"price\": \"45999\"}\n```".into()));
        let routed = advisor(vec![provider as Arc<dyn LLMProvider>])
            .search_price("PS5 Slim")
            .await
            .unwrap();

        assert_eq!(routed.provider, ProviderKind::Gemini);
        assert_eq!(
            routed.value,
            PricingInfo {
                item_name: "PS5 Slim".into(),
                price: dec!(45999),
                source: "Gemini AI Market Research".into(),
                notes: None,
            }
        );
    }

    #[tokio::test]
    async fn test_search_price_rejects_zero_price() {
        let provider = Canned::new(ProviderKind::OpenAI, Ok("{\"itemName\": \"x\", \"price\": 0}".into()));
        let err = advisor(vec![provider as Arc<dyn LLMProvider>])
            .search_price("x")
            .await
            .unwrap_err();
        assert!(matches!(err, LLMError::InvalidField { ref field, .. } if field == "price"));
    }

    #[tokio::test]
    async fn test_search_price_without_providers() {
        let err = BudgetAdvisor::default().search_price("x").await.unwrap_err();
        assert!(matches!(err, LLMError::ProviderNotAvailable { .. }));
    }

    #[tokio::test]
    async fn test_generate_plan_normalizes_reply() {
        let reply = r#"Sure! {
            "analysis": "Food dominates.",
            "cuts": [{"category": "Food", "reduction": 1200, "newBudget": 3800, "tip": "Cook"}],
            "totalMonthlySavings": 1200,
            "insights": ["Food is 100% of spend", 7]
        }"#;
        let provider = Canned::new(ProviderKind::OpenAI, Ok(reply.into()));
        let budgets = BTreeMap::from([("Food".to_string(), dec!(5000))]);

        let routed = advisor(vec![provider.clone() as Arc<dyn LLMProvider>])
            .generate_plan(&goal(), &spending(), &budgets, None)
            .await
            .unwrap();
        let plan = routed.value;

        assert_eq!(plan.goal_name, "Laptop");
        assert_eq!(plan.goal_amount, dec!(30000));
        assert_eq!(plan.required_monthly_savings, dec!(10000));
        assert_eq!(plan.analysis.as_deref(), Some("Food dominates."));
        assert_eq!(plan.cuts.len(), 1);
        assert_eq!(plan.cuts[0].reduction, dec!(1200));
        assert_eq!(plan.total_savings, dec!(1200));
        assert_eq!(plan.motivation, DEFAULT_MOTIVATION);
        assert!(plan.achievable);
        assert_eq!(plan.alternatives, None);
        assert_eq!(plan.insights, vec!["Food is 100% of spend".to_string()]);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].max_tokens, Some(800));
        assert_eq!(seen[0].temperature, Some(0.7));
    }

    #[tokio::test]
    async fn test_generate_plan_respects_explicit_false() {
        let provider = Canned::new(
            ProviderKind::OpenAI,
            Ok("{\"achievable\": false, \"alternatives\": \"Extend to 6 months\"}".into()),
        );
        let plan = advisor(vec![provider as Arc<dyn LLMProvider>])
            .generate_plan(&goal(), &spending(), &BTreeMap::new(), None)
            .await
            .unwrap()
            .value;

        assert!(!plan.achievable);
        assert!(plan.cuts.is_empty());
        assert_eq!(plan.total_savings, Decimal::ZERO);
        assert_eq!(plan.alternatives.as_deref(), Some("Extend to 6 months"));
    }

    #[tokio::test]
    async fn test_generate_plan_rejects_negative_cut() {
        let provider = Canned::new(
            ProviderKind::OpenAI,
            Ok("{\"cuts\": [{\"category\": \"Food\", \"reduction\": -50}]}".into()),
        );
        let err = advisor(vec![provider as Arc<dyn LLMProvider>])
            .generate_plan(&goal(), &spending(), &BTreeMap::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LLMError::InvalidField { .. }));
    }

    #[tokio::test]
    async fn test_generate_plan_falls_through_providers() {
        let broken = Canned::new(ProviderKind::OpenAI, Ok("not json".into()));
        let working = Canned::new(ProviderKind::Gemini, Ok("{\"motivation\": \"Go!\"}".into()));
        let routed = advisor(vec![broken as Arc<dyn LLMProvider>, working])
            .generate_plan(&goal(), &spending(), &BTreeMap::new(), None)
            .await
            .unwrap();

        assert_eq!(routed.provider, ProviderKind::Gemini);
        assert_eq!(routed.value.motivation, "Go!");
    }
}
