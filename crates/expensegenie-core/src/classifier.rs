//! Keyword classifier
//!
//! Lower-cases the description and returns the first category, in
//! declaration order, whose keyword list has a substring hit. The first
//! match wins even when a later category would match more keywords.

use crate::category::Category;

const FOOD: &[&str] = &[
    "food", "restaurant", "grocery", "cafe", "lunch", "dinner", "breakfast", "snack", "meal",
    "pizza", "burger", "coffee", "tea", "jollibee", "mcdo", "market",
];

const EDUCATION: &[&str] = &[
    "book", "course", "tuition", "school", "university", "class", "education", "training",
    "seminar", "workshop", "udemy", "coursera",
];

const CLOTHING: &[&str] = &[
    "clothes", "shirt", "pants", "shoes", "dress", "jacket", "fashion", "apparel", "nike",
    "adidas", "uniqlo", "h&m",
];

const HOUSING: &[&str] = &[
    "rent", "mortgage", "apartment", "condo", "house", "furniture", "repair", "maintenance",
    "home depot", "ikea",
];

const PERSONAL_NEEDS: &[&str] = &[
    "soap", "shampoo", "toothpaste", "hygiene", "personal care", "grooming", "haircut", "salon",
    "barber",
];

const HEALTHCARE: &[&str] = &[
    "doctor", "hospital", "medicine", "pharmacy", "medical", "health", "clinic", "dentist",
    "vaccine", "checkup", "mercury drug",
];

const LEISURE: &[&str] = &[
    "movie", "game", "entertainment", "concert", "hobby", "spotify", "netflix", "gaming", "gym",
    "travel", "vacation", "cinema",
];

const BILLS: &[&str] = &[
    "electricity", "water", "internet", "phone", "bill", "utility", "cable", "subscription",
    "meralco", "pldt", "globe", "smart",
];

/// Keyword lists in match order. `Other` has none and is the default.
const KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Food, FOOD),
    (Category::Education, EDUCATION),
    (Category::Clothing, CLOTHING),
    (Category::Housing, HOUSING),
    (Category::PersonalNeeds, PERSONAL_NEEDS),
    (Category::Healthcare, HEALTHCARE),
    (Category::Leisure, LEISURE),
    (Category::Bills, BILLS),
];

/// Classify a free-text description. Never fails.
pub fn classify(description: &str) -> Category {
    let text = description.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_category_matches_its_keywords() {
        assert_eq!(classify("Jollibee lunch"), Category::Food);
        assert_eq!(classify("Udemy Rust course"), Category::Education);
        assert_eq!(classify("New running shoes"), Category::Clothing);
        assert_eq!(classify("Monthly rent"), Category::Housing);
        assert_eq!(classify("Haircut at the barber"), Category::PersonalNeeds);
        assert_eq!(classify("Mercury Drug vitamins"), Category::Healthcare);
        assert_eq!(classify("Netflix"), Category::Leisure);
        assert_eq!(classify("MERALCO electricity"), Category::Bills);
    }

    #[test]
    fn test_unmatched_is_other() {
        assert_eq!(classify("random thing"), Category::Other);
        assert_eq!(classify(""), Category::Other);
    }

    #[test]
    fn test_first_category_in_order_wins() {
        // "coffee" (Food) and "book" (Education) both match
        assert_eq!(classify("coffee table book"), Category::Food);
        // "game" (Leisure) and "bill" (Bills) both match
        assert_eq!(classify("game bill"), Category::Leisure);
    }

    #[test]
    fn test_substring_matching() {
        // "steak" contains "tea"
        assert_eq!(classify("Steakhouse"), Category::Food);
        // "GLOBE" matches case-insensitively
        assert_eq!(classify("GLOBE postpaid"), Category::Bills);
    }

    #[test]
    fn test_keyword_lists_are_non_empty() {
        for (category, words) in KEYWORDS {
            assert!(!words.is_empty(), "{category} has no keywords");
            for word in *words {
                assert_eq!(classify(word), *category_for_first_hit(word));
            }
        }
    }

    fn category_for_first_hit(word: &str) -> &'static Category {
        &KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| word.contains(w)))
            .expect("keyword matches itself")
            .0
    }
}
