//! Expense categories
//!
//! The nine category names are an external contract shared with clients and
//! stored verbatim in the database, so their spelling never changes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CoreError;

/// Spending category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum Category {
    Food,
    Education,
    Clothing,
    Housing,
    #[serde(rename = "Personal Needs")]
    PersonalNeeds,
    Healthcare,
    Leisure,
    Bills,
    Other,
}

impl Category {
    /// All categories in declaration order
    pub const ALL: [Category; 9] = [
        Category::Food,
        Category::Education,
        Category::Clothing,
        Category::Housing,
        Category::PersonalNeeds,
        Category::Healthcare,
        Category::Leisure,
        Category::Bills,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Education => "Education",
            Category::Clothing => "Clothing",
            Category::Housing => "Housing",
            Category::PersonalNeeds => "Personal Needs",
            Category::Healthcare => "Healthcare",
            Category::Leisure => "Leisure",
            Category::Bills => "Bills",
            Category::Other => "Other",
        }
    }

    /// Monthly limit seeded for a user who has never saved budgets
    pub fn default_budget(&self) -> Decimal {
        match self {
            Category::Food => dec!(5000),
            Category::Education => dec!(3000),
            Category::Clothing => dec!(2000),
            Category::Housing => dec!(10000),
            Category::PersonalNeeds => dec!(2000),
            Category::Healthcare => dec!(3000),
            Category::Leisure => dec!(2000),
            Category::Bills => dec!(5000),
            Category::Other => dec!(1000),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    /// Exact, case-sensitive match on the display name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

/// The budget map a new user starts with
pub fn default_budgets() -> BTreeMap<String, Decimal> {
    Category::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), c.default_budget()))
        .collect()
}
