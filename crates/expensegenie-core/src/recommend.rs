//! Budget-cut recommender
//!
//! Walks the discretionary categories from highest to lowest average spend
//! and proposes a cut in each until the required monthly savings are met.
//! Each cut is bounded by the category's policy percent of its current
//! budget and by the savings still needed, then rounded to a whole
//! currency unit.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::policy::PolicyTable;

/// A proposed reduction to one category's monthly budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCut {
    pub category: String,
    #[schema(value_type = f64)]
    pub reduction: Decimal,
    #[schema(value_type = f64)]
    pub new_budget: Decimal,
    #[serde(default)]
    pub tip: String,
}

/// Output of [`recommend_cuts`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutRecommendation {
    pub cuts: Vec<BudgetCut>,
    /// Sum of all `cuts[i].reduction`
    pub savings_accumulated: Decimal,
}

/// Round half away from zero to a whole currency unit
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// A discretionary category with its average spend and tie-break priority
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCategory<'a> {
    pub name: &'a str,
    pub avg_spend: Decimal,
    pub priority: usize,
}

/// Discretionary categories sorted by average spend, descending. Equal
/// spend is ordered by the policy table's priority.
pub fn rank_discretionary<'a>(
    averages: &'a BTreeMap<String, Decimal>,
    policy: &PolicyTable,
) -> Vec<RankedCategory<'a>> {
    let mut ranked: Vec<RankedCategory<'a>> = averages
        .iter()
        .filter_map(|(name, avg)| {
            policy.lookup(name).map(|(priority, _, _)| RankedCategory {
                name: name.as_str(),
                avg_spend: *avg,
                priority,
            })
        })
        .collect();

    ranked.sort_by(|a, b| match b.avg_spend.cmp(&a.avg_spend) {
        Ordering::Equal => a.priority.cmp(&b.priority),
        other => other,
    });
    ranked
}

/// Propose budget cuts that cover `required_monthly_savings`
///
/// A category missing from `current_budgets`, or budgeted at zero, uses its
/// average spend as the current budget.
pub fn recommend_cuts(
    required_monthly_savings: Decimal,
    current_budgets: &BTreeMap<String, Decimal>,
    averages: &BTreeMap<String, Decimal>,
    policy: &PolicyTable,
) -> CutRecommendation {
    let mut result = CutRecommendation::default();

    for ranked in rank_discretionary(averages, policy) {
        if result.savings_accumulated >= required_monthly_savings {
            break;
        }
        let Some((_, _, category_policy)) = policy.lookup(ranked.name) else {
            continue;
        };

        let current_budget = current_budgets
            .get(ranked.name)
            .copied()
            .filter(|b| !b.is_zero())
            .unwrap_or(ranked.avg_spend);
        let remaining_needed = required_monthly_savings - result.savings_accumulated;
        let percent = category_policy.percent_for(ranked.avg_spend);

        let potential = (current_budget * percent).min(remaining_needed);
        let reduction = round_currency(potential);

        if reduction > Decimal::ZERO {
            result.cuts.push(BudgetCut {
                category: ranked.name.to_string(),
                reduction,
                new_budget: round_currency(current_budget - reduction),
                tip: policy.tip(category_policy, percent, ranked.avg_spend),
            });
            result.savings_accumulated += reduction;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::policy::CategoryPolicy;
    use rust_decimal_macros::dec;

    fn averages(pairs: &[(&str, Decimal)]) -> BTreeMap<String, Decimal> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_food_then_leisure_scenario() {
        let avgs = averages(&[
            ("Food", dec!(6000)),
            ("Leisure", dec!(2000)),
            ("Clothing", dec!(1000)),
        ]);
        let result = recommend_cuts(dec!(1500), &BTreeMap::new(), &avgs, &PolicyTable::default());

        assert_eq!(result.cuts.len(), 2);
        assert_eq!(result.cuts[0].category, "Food");
        assert_eq!(result.cuts[0].reduction, dec!(1200));
        assert_eq!(result.cuts[0].new_budget, dec!(4800));
        assert_eq!(result.cuts[1].category, "Leisure");
        assert_eq!(result.cuts[1].reduction, dec!(300));
        assert_eq!(result.cuts[1].new_budget, dec!(1700));
        assert_eq!(result.savings_accumulated, dec!(1500));
    }

    #[test]
    fn test_zero_requirement_yields_nothing() {
        let avgs = averages(&[("Food", dec!(6000))]);
        let result = recommend_cuts(Decimal::ZERO, &BTreeMap::new(), &avgs, &PolicyTable::default());

        assert!(result.cuts.is_empty());
        assert_eq!(result.savings_accumulated, Decimal::ZERO);
    }

    #[test]
    fn test_total_equals_sum_of_reductions() {
        let avgs = averages(&[
            ("Food", dec!(3333.33)),
            ("Leisure", dec!(1234.56)),
            ("Clothing", dec!(987.65)),
            ("Other", dec!(456.78)),
            ("Personal Needs", dec!(321.09)),
        ]);
        let result = recommend_cuts(dec!(100000), &BTreeMap::new(), &avgs, &PolicyTable::default());

        let sum: Decimal = result.cuts.iter().map(|c| c.reduction).sum();
        assert_eq!(sum, result.savings_accumulated);
        assert_eq!(result.cuts.len(), 5);
        for cut in &result.cuts {
            assert_eq!(cut.reduction, cut.reduction.trunc());
        }
    }

    #[test]
    fn test_deterministic() {
        let avgs = averages(&[("Food", dec!(2000)), ("Leisure", dec!(2000)), ("Other", dec!(2000))]);
        let budgets = averages(&[("Leisure", dec!(2500))]);
        let policy = PolicyTable::default();

        let first = recommend_cuts(dec!(900), &budgets, &avgs, &policy);
        let second = recommend_cuts(dec!(900), &budgets, &avgs, &policy);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_follow_policy_priority() {
        let avgs = averages(&[("Other", dec!(1000)), ("Clothing", dec!(1000)), ("Leisure", dec!(1000))]);
        let ranked = rank_discretionary(&avgs, &PolicyTable::default());
        let names: Vec<_> = ranked.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Leisure", "Clothing", "Other"]);
    }

    #[test]
    fn test_non_discretionary_categories_are_ignored() {
        let avgs = averages(&[("Housing", dec!(20000)), ("Bills", dec!(8000)), ("Entertainment", dec!(900))]);
        let result = recommend_cuts(dec!(500), &BTreeMap::new(), &avgs, &PolicyTable::default());
        assert!(result.cuts.is_empty());
    }

    #[test]
    fn test_budget_overrides_average_unless_zero() {
        let avgs = averages(&[("Leisure", dec!(1000))]);
        let policy = PolicyTable::default();

        let budgets = averages(&[("Leisure", dec!(3000))]);
        let result = recommend_cuts(dec!(10000), &budgets, &avgs, &policy);
        assert_eq!(result.cuts[0].reduction, dec!(900));
        assert_eq!(result.cuts[0].new_budget, dec!(2100));

        let zeroed = averages(&[("Leisure", Decimal::ZERO)]);
        let result = recommend_cuts(dec!(10000), &zeroed, &avgs, &policy);
        assert_eq!(result.cuts[0].reduction, dec!(300));
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        // 0.25 * 1002 = 250.5 -> 251
        let avgs = averages(&[("Clothing", dec!(1002))]);
        let result = recommend_cuts(dec!(10000), &BTreeMap::new(), &avgs, &PolicyTable::default());
        assert_eq!(result.cuts[0].reduction, dec!(251));
        assert_eq!(result.cuts[0].new_budget, dec!(751));
    }

    #[test]
    fn test_tiny_cuts_are_skipped() {
        // 0.15 * 2 = 0.3 rounds to 0
        let avgs = averages(&[("Personal Needs", dec!(2))]);
        let result = recommend_cuts(dec!(100), &BTreeMap::new(), &avgs, &PolicyTable::default());
        assert!(result.cuts.is_empty());
    }

    #[test]
    fn test_substituted_policy() {
        let policy = PolicyTable::empty()
            .with(Category::Housing, CategoryPolicy::new(dec!(0.5)).with_tip("Get a roommate."));
        let avgs = averages(&[("Housing", dec!(10000)), ("Food", dec!(9000))]);
        let result = recommend_cuts(dec!(8000), &BTreeMap::new(), &avgs, &policy);

        assert_eq!(result.cuts.len(), 1);
        assert_eq!(result.cuts[0].category, "Housing");
        assert_eq!(result.cuts[0].reduction, dec!(5000));
        assert_eq!(result.cuts[0].tip, "Get a roommate.");
    }
}
