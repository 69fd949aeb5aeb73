//! Goal feasibility
//!
//! A plan is achievable when the proposed savings reach 90% of the required
//! monthly savings.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::recommend::round_currency;

/// Share of the required savings that still counts as achievable
pub const ACHIEVABLE_TOLERANCE: Decimal = dec!(0.9);

/// Spending below this multiple of the required savings is called lean
pub const LEAN_SPENDING_MULTIPLE: Decimal = dec!(1.5);

#[derive(Debug, Clone, PartialEq)]
pub struct FeasibilityInput<'a> {
    pub savings_accumulated: Decimal,
    pub required_monthly_savings: Decimal,
    /// Goal timeline, used for the extended-timeline suggestion
    pub months: u32,
    pub months_in_data: usize,
    pub avg_monthly_spend: Decimal,
    /// Highest-spend discretionary category and its monthly average
    pub top_discretionary: Option<(&'a str, Decimal)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feasibility {
    pub achievable: bool,
    pub analysis: String,
    pub alternatives: Option<String>,
    pub motivation: String,
    pub insights: Vec<String>,
}

pub fn evaluate(input: &FeasibilityInput<'_>) -> Feasibility {
    let achievable = input.savings_accumulated
        >= input.required_monthly_savings.saturating_mul(ACHIEVABLE_TOLERANCE);

    let verdict = if achievable {
        "Your goal is achievable with the recommended budget adjustments."
    } else {
        "This goal is ambitious given your current spending patterns."
    };
    let analysis = format!(
        "Based on {} months of data, your average monthly spending is ₱{}. {}",
        input.months_in_data,
        round_currency(input.avg_monthly_spend),
        verdict
    );

    let alternatives = (!achievable).then(|| {
        format!(
            "Consider extending your timeline to {} months, or look for additional income opportunities.",
            extended_timeline(input.months)
        )
    });

    let motivation = if achievable {
        format!(
            "Excellent! You can realistically save ₱{}/month. Stay focused and you'll reach your goal! 🎯",
            round_currency(input.savings_accumulated)
        )
    } else {
        "This goal requires significant changes. Consider breaking it into smaller milestones or extending your timeline.".to_string()
    };

    let mut insights = Vec::new();
    if let Some((name, avg)) = input.top_discretionary {
        if input.avg_monthly_spend > Decimal::ZERO {
            let share = round_currency(avg / input.avg_monthly_spend * dec!(100));
            insights.push(format!("{name} accounts for {share}% of your monthly spending"));
        }
    }
    if input.avg_monthly_spend < input.required_monthly_savings.saturating_mul(LEAN_SPENDING_MULTIPLE) {
        insights.push("Your spending is already lean - consider a longer timeline".to_string());
    }

    Feasibility {
        achievable,
        analysis,
        alternatives,
        motivation,
        insights,
    }
}

/// `ceil(months * 1.5)`, saturating at `u32::MAX`
pub fn extended_timeline(months: u32) -> u32 {
    let extended = (u64::from(months) * 3).div_ceil(2);
    u32::try_from(extended).unwrap_or(u32::MAX)
}
