//! Reduction policy table
//!
//! Which categories are discretionary, how much of each may be cut, and the
//! tip shown with a cut. The recommender only reads this table, so tests
//! and deployments can substitute their own.
//!
//! # Default table
//!
//! | Category       | Reduction                          |
//! |----------------|------------------------------------|
//! | Food           | 10%, or 20% above ₱5,000/month     |
//! | Leisure        | 30%                                |
//! | Clothing       | 25%                                |
//! | Other          | 20%                                |
//! | Personal Needs | 15%                                |
//!
//! Table order doubles as the tie-break priority when two categories have
//! the same average spend.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::category::Category;

/// Percent used when a policy gives none of its own
pub const DEFAULT_REDUCTION_PERCENT: Decimal = dec!(0.15);

/// Percent above which a category's intensive tip is used
pub const INTENSIVE_TIP_THRESHOLD: Decimal = dec!(0.15);

const FALLBACK_TIP: &str =
    "Look for creative ways to reduce spending in this category. Every small saving adds up!";

/// Higher reduction percent for categories with large average spend
#[derive(Debug, Clone, PartialEq)]
pub struct HighSpendTier {
    /// Average monthly spend strictly above which the tier applies
    pub above: Decimal,
    pub reduction_percent: Decimal,
}

/// Policy for a single discretionary category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPolicy {
    pub reduction_percent: Decimal,
    pub high_spend: Option<HighSpendTier>,
    pub tip: Option<String>,
    /// Used instead of `tip` when the effective percent exceeds
    /// [`INTENSIVE_TIP_THRESHOLD`]. `{avg}` is replaced with the rounded
    /// average monthly spend.
    pub intensive_tip: Option<String>,
}

impl CategoryPolicy {
    pub fn new(reduction_percent: Decimal) -> Self {
        Self {
            reduction_percent,
            high_spend: None,
            tip: None,
            intensive_tip: None,
        }
    }

    pub fn with_high_spend(mut self, above: Decimal, reduction_percent: Decimal) -> Self {
        self.high_spend = Some(HighSpendTier {
            above,
            reduction_percent,
        });
        self
    }

    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tip = Some(tip.into());
        self
    }

    pub fn with_intensive_tip(mut self, tip: impl Into<String>) -> Self {
        self.intensive_tip = Some(tip.into());
        self
    }

    /// Effective reduction percent for a given average monthly spend
    pub fn percent_for(&self, avg_spend: Decimal) -> Decimal {
        match &self.high_spend {
            Some(tier) if avg_spend > tier.above => tier.reduction_percent,
            _ => self.reduction_percent,
        }
    }

    fn tip_for(&self, percent: Decimal, avg_spend: Decimal) -> Option<String> {
        if percent > INTENSIVE_TIP_THRESHOLD {
            if let Some(template) = &self.intensive_tip {
                let avg = crate::recommend::round_currency(avg_spend);
                return Some(template.replace("{avg}", &avg.to_string()));
            }
        }
        self.tip.clone()
    }
}

/// Ordered table of discretionary categories
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTable {
    entries: Vec<(Category, CategoryPolicy)>,
    fallback_tip: String,
}

impl PolicyTable {
    /// Empty table; nothing is discretionary
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            fallback_tip: FALLBACK_TIP.to_string(),
        }
    }

    /// Add or replace a category. New categories go to the end of the
    /// priority order.
    pub fn with(mut self, category: Category, policy: CategoryPolicy) -> Self {
        match self.entries.iter_mut().find(|(c, _)| *c == category) {
            Some(entry) => entry.1 = policy,
            None => self.entries.push((category, policy)),
        }
        self
    }

    pub fn with_fallback_tip(mut self, tip: impl Into<String>) -> Self {
        self.fallback_tip = tip.into();
        self
    }

    /// Look up a category by its exact display name, returning its priority
    /// index alongside the policy
    pub fn lookup(&self, name: &str) -> Option<(usize, Category, &CategoryPolicy)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, (c, _))| c.as_str() == name)
            .map(|(i, (c, p))| (i, *c, p))
    }

    pub fn is_discretionary(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }

    /// Tip for a cut, falling back to the table's generic tip
    pub fn tip(&self, policy: &CategoryPolicy, percent: Decimal, avg_spend: Decimal) -> String {
        policy
            .tip_for(percent, avg_spend)
            .unwrap_or_else(|| self.fallback_tip.clone())
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        PolicyTable::empty()
            .with(
                Category::Food,
                CategoryPolicy::new(dec!(0.10))
                    .with_high_spend(dec!(5000), dec!(0.20))
                    .with_tip("Cook at home more often, use grocery lists to avoid impulse buys, and try batch cooking to save time and money.")
                    .with_intensive_tip("Your food spending (₱{avg}/month) has room for optimization. Try meal prepping on weekends, bringing lunch 4-5x/week, and limiting dining out to special occasions."),
            )
            .with(
                Category::Leisure,
                CategoryPolicy::new(dec!(0.30))
                    .with_tip("Focus on free or low-cost activities: hiking, free museum days, library resources, YouTube workouts instead of gym, game nights with friends."),
            )
            .with(
                Category::Clothing,
                CategoryPolicy::new(dec!(0.25))
                    .with_tip("Implement a 30-day rule before non-essential purchases. Shop end-of-season sales. Try thrift stores and clothing swaps. Focus on versatile, quality pieces."),
            )
            .with(
                Category::Other,
                CategoryPolicy::new(dec!(0.20))
                    .with_tip("Track every expense for one month to identify hidden spending. Use the 24-hour rule for impulse purchases. Set up automatic transfers to savings right after payday."),
            )
            .with(
                Category::PersonalNeeds,
                CategoryPolicy::new(DEFAULT_REDUCTION_PERCENT)
                    .with_tip("Switch to generic brands (often same quality, 30-50% cheaper). Stock up during sales. Use cashback apps. Make your own cleaning products."),
            )
    }
}
