//! Category suggestion for free-text descriptions.
//!
//! [`CategorySuggester`] is the seam for any classifier (a remote model, a
//! trained lookup...). [`KeywordSuggester`] is the built-in one: it works
//! offline against the user's own categories.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Category, CategoryIcon,
    util::{category_key, levenshtein},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub category_id: Uuid,
    pub name: String,
    /// In `[0, 1]`.
    pub confidence: f64,
}

pub trait CategorySuggester: Send + Sync {
    /// Pick one of `categories` for `description`, or `None` when nothing fits.
    fn suggest(&self, description: &str, categories: &[Category]) -> Option<CategorySuggestion>;
}

const NAME_MATCH_CONFIDENCE: f64 = 0.9;
const KEYWORD_CONFIDENCE: f64 = 0.7;
const FUZZY_CONFIDENCE: f64 = 0.5;

/// Words hinting at an icon's theme. Compared against normalized tokens.
const ICON_KEYWORDS: &[(CategoryIcon, &[&str])] = &[
    (
        CategoryIcon::Food,
        &[
            "food", "lunch", "dinner", "breakfast", "restaurant", "cafe", "coffee", "grocery",
            "groceries", "pizza", "burger", "snack", "makan", "supermarket",
        ],
    ),
    (
        CategoryIcon::Transport,
        &[
            "taxi", "uber", "grab", "gojek", "bus", "train", "fuel", "gas", "petrol", "parking",
            "toll", "metro", "bensin",
        ],
    ),
    (
        CategoryIcon::Shopping,
        &["shop", "shopping", "clothes", "shoes", "mall", "amazon", "store", "market"],
    ),
    (
        CategoryIcon::Housing,
        &["rent", "mortgage", "apartment", "furniture", "repair", "house"],
    ),
    (
        CategoryIcon::Entertainment,
        &["movie", "cinema", "netflix", "spotify", "game", "concert", "music", "ticket"],
    ),
    (
        CategoryIcon::Health,
        &["doctor", "pharmacy", "medicine", "hospital", "dentist", "gym", "clinic"],
    ),
    (
        CategoryIcon::Education,
        &["school", "course", "tuition", "book", "books", "university", "class"],
    ),
    (
        CategoryIcon::Salary,
        &["salary", "payroll", "wage", "wages", "paycheck", "bonus", "gaji"],
    ),
    (CategoryIcon::Gift, &["gift", "present", "donation", "birthday"]),
    (
        CategoryIcon::Travel,
        &["flight", "hotel", "airbnb", "travel", "trip", "vacation", "holiday"],
    ),
    (
        CategoryIcon::Bills,
        &["electricity", "water", "internet", "phone", "bill", "bills", "subscription", "utility"],
    ),
    (
        CategoryIcon::Savings,
        &["savings", "saving", "deposit", "invest", "investment"],
    ),
];

/// Offline suggester.
///
/// In order of preference:
/// 1. the description mentions a category name;
/// 2. a description word belongs to the keyword list of a category's icon;
/// 3. a description word is within a small edit distance of a category name.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordSuggester;

impl KeywordSuggester {
    fn suggestion(category: &Category, confidence: f64) -> CategorySuggestion {
        CategorySuggestion {
            category_id: category.id,
            name: category.name.clone(),
            confidence,
        }
    }

    fn fuzzy_threshold(len: usize) -> usize {
        match len {
            0..=3 => 0,
            4..=6 => 1,
            _ => 2,
        }
    }
}

impl CategorySuggester for KeywordSuggester {
    fn suggest(&self, description: &str, categories: &[Category]) -> Option<CategorySuggestion> {
        let text = category_key(description)?;
        let padded = format!(" {text} ");
        let tokens: Vec<&str> = text.split(' ').collect();

        let keyed: Vec<(&Category, String)> = categories
            .iter()
            .filter_map(|c| category_key(&c.name).map(|key| (c, key)))
            .collect();

        // Longest mention wins so "fast food" beats "food".
        if let Some((category, _)) = keyed
            .iter()
            .filter(|(_, key)| padded.contains(&format!(" {key} ")))
            .max_by_key(|(_, key)| key.len())
        {
            return Some(Self::suggestion(category, NAME_MATCH_CONFIDENCE));
        }

        for token in &tokens {
            for (icon, words) in ICON_KEYWORDS {
                if !words.contains(token) {
                    continue;
                }
                if let Some(category) = categories.iter().find(|c| c.icon == *icon) {
                    return Some(Self::suggestion(category, KEYWORD_CONFIDENCE));
                }
            }
        }

        keyed
            .iter()
            .flat_map(|(category, key)| {
                tokens.iter().filter_map(move |token| {
                    let distance = levenshtein(token, key);
                    let limit = Self::fuzzy_threshold(key.chars().count());
                    (limit > 0 && distance <= limit).then_some((*category, distance))
                })
            })
            .min_by_key(|(_, distance)| *distance)
            .map(|(category, _)| Self::suggestion(category, FUZZY_CONFIDENCE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, icon: CategoryIcon) -> Category {
        Category {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            icon,
        }
    }

    fn categories() -> Vec<Category> {
        vec![
            category("Food", CategoryIcon::Food),
            category("Fast Food", CategoryIcon::Food),
            category("Transport", CategoryIcon::Transport),
            category("Salary", CategoryIcon::Salary),
            category("Other", CategoryIcon::Other),
        ]
    }

    #[test]
    fn name_mention_has_highest_confidence() {
        let cats = categories();
        let got = KeywordSuggester.suggest("Monthly SALARY march", &cats).unwrap();
        assert_eq!(got.name, "Salary");
        assert_eq!(got.confidence, NAME_MATCH_CONFIDENCE);
    }

    #[test]
    fn longest_name_mention_wins() {
        let cats = categories();
        let got = KeywordSuggester.suggest("fast food downtown", &cats).unwrap();
        assert_eq!(got.name, "Fast Food");
    }

    #[test]
    fn icon_keywords_map_to_matching_category() {
        let cats = categories();
        let got = KeywordSuggester.suggest("Uber to the airport", &cats).unwrap();
        assert_eq!(got.name, "Transport");
        assert_eq!(got.confidence, KEYWORD_CONFIDENCE);
    }

    #[test]
    fn typos_fall_back_to_fuzzy_match() {
        let cats = categories();
        let got = KeywordSuggester.suggest("transprt card topup", &cats).unwrap();
        assert_eq!(got.name, "Transport");
        assert_eq!(got.confidence, FUZZY_CONFIDENCE);
    }

    #[test]
    fn unrelated_text_yields_nothing() {
        let cats = categories();
        assert!(KeywordSuggester.suggest("zzz qqq", &cats).is_none());
        assert!(KeywordSuggester.suggest("   ", &cats).is_none());
        assert!(KeywordSuggester.suggest("lunch", &[]).is_none());
    }
}
