//! Savings plans
//!
//! [`GoalSpec`] validates the goal at the boundary so the recommender never
//! sees `months == 0`. [`rule_based_plan`] is the deterministic plan used
//! whenever no AI-generated plan is available.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::aggregate::SpendingSummary;
use crate::error::{CoreError, CoreResult};
use crate::feasibility::{evaluate, FeasibilityInput};
use crate::policy::PolicyTable;
use crate::recommend::{rank_discretionary, recommend_cuts, BudgetCut};

/// Name used when the caller gives none
pub const DEFAULT_GOAL_NAME: &str = "Your Goal";

/// Days per month when deriving a goal's target date
pub const DAYS_PER_MONTH: i64 = 30;

/// Longest goal timeline accepted
pub const MAX_GOAL_MONTHS: u32 = 600;

/// Largest money value storable in a `NUMERIC(14, 2)` column
pub const MAX_AMOUNT: Decimal = dec!(999999999999.99);

/// A validated savings goal
#[derive(Debug, Clone, PartialEq)]
pub struct GoalSpec {
    pub goal_name: Option<String>,
    pub goal_amount: Decimal,
    pub months: u32,
}

impl GoalSpec {
    pub fn new(goal_name: Option<String>, goal_amount: Decimal, months: u32) -> CoreResult<Self> {
        if months == 0 {
            return Err(CoreError::ZeroMonths);
        }
        if months > MAX_GOAL_MONTHS {
            return Err(CoreError::TooManyMonths(MAX_GOAL_MONTHS));
        }
        if goal_amount <= Decimal::ZERO {
            return Err(CoreError::InvalidGoalAmount);
        }
        if goal_amount > MAX_AMOUNT {
            return Err(CoreError::GoalAmountTooLarge(MAX_AMOUNT));
        }
        let goal_name = goal_name.filter(|n| !n.trim().is_empty());
        Ok(Self {
            goal_name,
            goal_amount,
            months,
        })
    }

    /// `goal_amount / months`
    pub fn required_monthly_savings(&self) -> Decimal {
        self.goal_amount / Decimal::from(self.months)
    }

    pub fn display_name(&self) -> &str {
        self.goal_name.as_deref().unwrap_or(DEFAULT_GOAL_NAME)
    }

    /// `now + months × 30 days`
    pub fn target_date(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(i64::from(self.months) * DAYS_PER_MONTH)
    }
}

/// Market price found by a pricing search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingInfo {
    pub item_name: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub source: String,
    pub notes: Option<String>,
}

/// Recommendation snapshot returned to the client and stored with a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPlan {
    pub goal_name: String,
    #[schema(value_type = f64)]
    pub goal_amount: Decimal,
    pub months: u32,
    #[schema(value_type = f64)]
    pub required_monthly_savings: Decimal,
    pub analysis: Option<String>,
    pub cuts: Vec<BudgetCut>,
    #[schema(value_type = f64)]
    pub total_savings: Decimal,
    pub motivation: String,
    pub achievable: bool,
    pub alternatives: Option<String>,
    pub insights: Vec<String>,
}

/// Build a plan from spending history alone
pub fn rule_based_plan(
    goal: &GoalSpec,
    spending: &SpendingSummary,
    current_budgets: &BTreeMap<String, Decimal>,
    policy: &PolicyTable,
) -> BudgetPlan {
    let required = goal.required_monthly_savings();
    let averages = &spending.category_monthly_average;

    let recommendation = recommend_cuts(required, current_budgets, averages, policy);
    let ranked = rank_discretionary(averages, policy);

    let feasibility = evaluate(&FeasibilityInput {
        savings_accumulated: recommendation.savings_accumulated,
        required_monthly_savings: required,
        months: goal.months,
        months_in_data: spending.months_in_data(),
        avg_monthly_spend: spending.avg_monthly_spend(),
        top_discretionary: ranked.first().map(|r| (r.name, r.avg_spend)),
    });

    BudgetPlan {
        goal_name: goal.display_name().to_string(),
        goal_amount: goal.goal_amount,
        months: goal.months,
        required_monthly_savings: required,
        analysis: Some(feasibility.analysis),
        cuts: recommendation.cuts,
        total_savings: recommendation.savings_accumulated,
        motivation: feasibility.motivation,
        achievable: feasibility.achievable,
        alternatives: feasibility.alternatives,
        insights: feasibility.insights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SpendingRecord;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_goal_validation() {
        assert_eq!(GoalSpec::new(None, dec!(1000), 0), Err(CoreError::ZeroMonths));
        assert_eq!(
            GoalSpec::new(None, Decimal::ZERO, 3),
            Err(CoreError::InvalidGoalAmount)
        );
        assert_eq!(
            GoalSpec::new(None, dec!(-5), 3),
            Err(CoreError::InvalidGoalAmount)
        );
        assert_eq!(
            GoalSpec::new(None, dec!(1000), 601),
            Err(CoreError::TooManyMonths(MAX_GOAL_MONTHS))
        );
        assert_eq!(
            GoalSpec::new(None, Decimal::MAX, 1),
            Err(CoreError::GoalAmountTooLarge(MAX_AMOUNT))
        );
        assert!(GoalSpec::new(None, MAX_AMOUNT, MAX_GOAL_MONTHS).is_ok());
    }

    #[test]
    fn test_required_savings_times_months_is_goal() {
        let goal = GoalSpec::new(Some("Laptop".into()), dec!(50000), 4).unwrap();
        assert_eq!(goal.required_monthly_savings(), dec!(12500));
        assert_eq!(goal.required_monthly_savings() * dec!(4), dec!(50000));

        let odd = GoalSpec::new(None, dec!(1000), 3).unwrap();
        let diff = (odd.required_monthly_savings() * dec!(3) - dec!(1000)).abs();
        assert!(diff < dec!(0.000001));
    }

    #[test]
    fn test_blank_name_uses_default() {
        let goal = GoalSpec::new(Some("  ".into()), dec!(10), 1).unwrap();
        assert_eq!(goal.display_name(), DEFAULT_GOAL_NAME);
    }

    #[test]
    fn test_target_date() {
        let goal = GoalSpec::new(None, dec!(10), 2).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            goal.target_date(now),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_rule_based_plan() {
        // One month of data: Food 6000, Leisure 2000, Clothing 1000, Housing 8000
        let records = vec![
            SpendingRecord::new("Food", dec!(6000), "2024-05-02"),
            SpendingRecord::new("Leisure", dec!(2000), "2024-05-10"),
            SpendingRecord::new("Clothing", dec!(1000), "2024-05-11"),
            SpendingRecord::new("Housing", dec!(8000), "2024-05-01"),
        ];
        let spending = SpendingSummary::from_records(&records);
        let goal = GoalSpec::new(Some("Bike".into()), dec!(3000), 2).unwrap();

        let plan = rule_based_plan(&goal, &spending, &BTreeMap::new(), &PolicyTable::default());

        assert_eq!(plan.goal_name, "Bike");
        assert_eq!(plan.required_monthly_savings, dec!(1500));
        assert_eq!(plan.cuts.len(), 2);
        assert_eq!(plan.total_savings, dec!(1500));
        assert!(plan.achievable);
        assert!(plan.alternatives.is_none());
        assert_eq!(
            plan.analysis.as_deref(),
            Some("Based on 1 months of data, your average monthly spending is ₱17000. Your goal is achievable with the recommended budget adjustments.")
        );
        assert_eq!(plan.insights, vec!["Food accounts for 35% of your monthly spending"]);

        let reductions: Decimal = plan.cuts.iter().map(|c| c.reduction).sum();
        assert_eq!(reductions, plan.total_savings);
    }

    #[test]
    fn test_plan_serializes_camel_case() {
        let goal = GoalSpec::new(None, dec!(100), 1).unwrap();
        let plan = rule_based_plan(&goal, &SpendingSummary::default(), &BTreeMap::new(), &PolicyTable::default());
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["goalName"], "Your Goal");
        assert!(json.get("requiredMonthlySavings").is_some());
        assert!(json.get("totalSavings").is_some());
        assert_eq!(json["achievable"], false);
    }
}
