//! Spending aggregation

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One expense as seen by the aggregator
///
/// `date` is an ISO-8601 style string; only its `YYYY-MM` prefix is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SpendingRecord {
    pub category: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub date: String,
}

impl SpendingRecord {
    pub fn new(category: impl Into<String>, amount: Decimal, date: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            amount,
            date: date.into(),
        }
    }

    /// `YYYY-MM` bucket, or the whole string when it is shorter than that
    pub fn month_key(&self) -> &str {
        self.date.get(..7).unwrap_or(&self.date)
    }
}

/// Totals and averages over a set of expenses
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    /// Sum of amounts per category name
    pub category_totals: BTreeMap<String, Decimal>,
    /// Sum of amounts per `YYYY-MM`
    pub monthly_totals: BTreeMap<String, Decimal>,
    /// `category_totals[c] / months_in_data()`
    pub category_monthly_average: BTreeMap<String, Decimal>,
}

impl SpendingSummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a SpendingRecord>,
    {
        let mut category_totals: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut monthly_totals: BTreeMap<String, Decimal> = BTreeMap::new();

        for record in records {
            *category_totals.entry(record.category.clone()).or_default() += record.amount;
            *monthly_totals.entry(record.month_key().to_string()).or_default() += record.amount;
        }

        let months = Decimal::from(monthly_totals.len().max(1));
        let category_monthly_average = category_totals
            .iter()
            .map(|(category, total)| (category.clone(), *total / months))
            .collect();

        Self {
            category_totals,
            monthly_totals,
            category_monthly_average,
        }
    }

    /// Distinct months observed, never less than 1
    pub fn months_in_data(&self) -> usize {
        self.monthly_totals.len().max(1)
    }

    pub fn total(&self) -> Decimal {
        self.monthly_totals.values().copied().sum()
    }

    pub fn avg_monthly_spend(&self) -> Decimal {
        self.total() / Decimal::from(self.months_in_data())
    }

    /// Category with the largest total; ties go to the alphabetically first name
    pub fn top_category(&self) -> Option<(&str, Decimal)> {
        self.category_totals
            .iter()
            .fold(None, |best: Option<(&str, Decimal)>, (name, total)| match best {
                Some((_, best_total)) if best_total >= *total => best,
                _ => Some((name.as_str(), *total)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> Vec<SpendingRecord> {
        vec![
            SpendingRecord::new("Food", dec!(1200), "2024-01-05"),
            SpendingRecord::new("Food", dec!(800), "2024-02-11T08:00:00Z"),
            SpendingRecord::new("Leisure", dec!(500), "2024-02-20"),
            SpendingRecord::new("Bills", dec!(2500.50), "2024-03-01"),
        ]
    }

    #[test]
    fn test_totals_partition_amounts() {
        let records = sample();
        let summary = SpendingSummary::from_records(&records);

        let by_category: Decimal = summary.category_totals.values().copied().sum();
        let by_input: Decimal = records.iter().map(|r| r.amount).sum();
        assert_eq!(by_category, by_input);
        assert_eq!(summary.total(), by_input);
    }

    #[test]
    fn test_monthly_buckets_and_averages() {
        let summary = SpendingSummary::from_records(&sample());

        assert_eq!(summary.months_in_data(), 3);
        assert_eq!(summary.monthly_totals["2024-02"], dec!(1300));
        assert_eq!(summary.category_totals["Food"], dec!(2000));
        assert_eq!(summary.category_monthly_average["Leisure"], dec!(500) / dec!(3));
        assert_eq!(summary.avg_monthly_spend(), dec!(5000.50) / dec!(3));
    }

    #[test]
    fn test_empty_input_guards_denominator() {
        let summary = SpendingSummary::from_records(&Vec::<SpendingRecord>::new());

        assert!(summary.category_totals.is_empty());
        assert!(summary.monthly_totals.is_empty());
        assert_eq!(summary.months_in_data(), 1);
        assert_eq!(summary.avg_monthly_spend(), Decimal::ZERO);
        assert!(summary.top_category().is_none());
    }

    #[test]
    fn test_category_names_are_not_normalized() {
        let records = vec![
            SpendingRecord::new("Food", dec!(10), "2024-01-01"),
            SpendingRecord::new("food", dec!(20), "2024-01-02"),
        ];
        let summary = SpendingSummary::from_records(&records);

        assert_eq!(summary.category_totals.len(), 2);
        assert_eq!(summary.category_totals["food"], dec!(20));
    }

    #[test]
    fn test_short_dates_use_whole_string() {
        let record = SpendingRecord::new("Other", dec!(1), "2024");
        assert_eq!(record.month_key(), "2024");
    }

    #[test]
    fn test_top_category() {
        let summary = SpendingSummary::from_records(&sample());
        assert_eq!(summary.top_category(), Some(("Bills", dec!(2500.50))));
    }
}
