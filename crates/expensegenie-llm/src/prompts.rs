//! Prompt text
//!
//! Amounts are Philippine pesos throughout.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use expensegenie_core::{round_currency, Category, GoalSpec, PricingInfo, SpendingSummary};

pub const CATEGORIZE_SYSTEM: &str = "You are a financial assistant that categorizes expenses. Respond with only ONE of these categories: Food, Education, Clothing, Housing, Personal Needs, Healthcare, Leisure, Bills, Other. No explanations, just the category name.";

pub const PRICING_SYSTEM: &str = "You are a helpful assistant that provides current market pricing information. Always respond with valid JSON only.";

pub const PLAN_SYSTEM: &str = "You are an expert financial advisor specializing in personalized budget planning. Always respond with valid JSON only, no additional text.";

pub fn categorize_prompt(description: &str) -> String {
    format!("Categorize this expense: \"{description}\"")
}

pub fn pricing_prompt(item_name: &str) -> String {
    format!(
        r#"What is the approximate current market price in Philippine Pesos (PHP/₱) for: "{item_name}"?

IMPORTANT: You must provide a realistic numeric price based on current market prices in the Philippines.

Example for "iPhone 15 Pro":
{{
  "itemName": "iPhone 15 Pro",
  "price": 65990,
  "source": "Based on typical Philippine retail prices",
  "notes": "128GB base model"
}}

Now provide the pricing for "{item_name}" in this EXACT JSON format (numbers only, no commas or currency symbols):
{{
  "itemName": "{item_name}",
  "price": <numeric_value_only>,
  "source": "brief source description",
  "notes": "optional notes"
}}"#
    )
}

pub fn plan_prompt(
    goal: &GoalSpec,
    spending: &SpendingSummary,
    current_budgets: &BTreeMap<String, Decimal>,
    pricing: Option<&PricingInfo>,
) -> String {
    let pricing_context = pricing
        .map(|p| {
            format!(
                "\n\nPricing Research: The item \"{}\" costs approximately ₱{} ({}).",
                p.item_name,
                group_thousands(p.price),
                p.source
            )
        })
        .unwrap_or_default();

    let spending_summary = spending
        .category_totals
        .iter()
        .map(|(category, total)| format!("{category}: ₱{}", round_currency(*total)))
        .collect::<Vec<_>>()
        .join(", ");

    let budgets = budgets_json(current_budgets);

    format!(
        r#"You are an expert financial advisor analyzing someone's budget to help them save for a specific goal.

GOAL DETAILS:
- Item: {item}
- Total Cost: ₱{cost}
- Timeline: {months} month(s)
- Required Monthly Savings: ₱{required}{pricing_context}

CURRENT FINANCIAL SITUATION:
- Average Monthly Spending: ₱{avg}
- Spending by Category: {spending_summary}
- Current Monthly Budgets: {budgets}

ANALYSIS REQUIRED:
1. Identify realistic areas to cut spending (max 30% per category, prioritize discretionary)
2. Calculate if the goal is achievable within the timeline
3. Provide specific, actionable tips for each recommended cut
4. Suggest alternative strategies if the goal seems too ambitious
5. Include a motivational insight based on their spending patterns

Valid categories: {categories}

Response Format (JSON only):
{{
  "analysis": "Brief overview of their spending habits",
  "cuts": [
    {{"category": "Food", "reduction": 500, "newBudget": 2500, "tip": "Meal prep on Sundays, pack lunch 4x/week"}}
  ],
  "totalMonthlySavings": 1500,
  "motivation": "Encouraging message with specific praise",
  "achievable": true,
  "alternatives": "Optional: Suggest if timeline should be extended",
  "insights": ["Spending pattern 1", "Opportunity 2"]
}}"#,
        item = goal.goal_name.as_deref().unwrap_or("their goal"),
        cost = group_thousands(goal.goal_amount),
        months = goal.months,
        required = round_currency(goal.required_monthly_savings()),
        avg = round_currency(spending.avg_monthly_spend()),
        categories = Category::ALL.map(|c| c.as_str()).join(", "),
    )
}

fn budgets_json(budgets: &BTreeMap<String, Decimal>) -> String {
    serde_json::to_string(budgets).unwrap_or_else(|_| "{}".to_string())
}

/// `65990.5` -> `65,990.5`
fn group_thousands(value: Decimal) -> String {
    let text = value.normalize().to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
