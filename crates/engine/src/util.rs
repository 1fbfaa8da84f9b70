//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so the engine enforces consistent invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Trim a required name, collapsing inner whitespace runs.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let display = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if display.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(display)
}

/// Comparison key for wallet names: whitespace collapsed, composed, lowercase.
pub(crate) fn wallet_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .nfc()
        .flat_map(char::to_lowercase)
        .collect()
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Comparison key for category names: accents stripped, lowercase,
/// punctuation folded into single spaces.
///
/// Returns `None` when nothing alphanumeric is left.
pub(crate) fn category_key(input: &str) -> Option<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

pub(crate) fn require_category_key(input: &str) -> ResultEngine<String> {
    category_key(input).ok_or_else(|| {
        EngineError::InvalidInput(format!("invalid category name \"{}\"", input.trim()))
    })
}

/// Lowercased, trimmed email with a minimal shape check.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(EngineError::InvalidInput(format!(
            "invalid email address \"{}\"",
            value.trim()
        )));
    }
    Ok(email)
}

pub(crate) fn levenshtein(left: &str, right: &str) -> usize {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();

    if left.is_empty() {
        return right.len();
    }
    if right.is_empty() {
        return left.len();
    }

    let mut costs: Vec<usize> = (0..=right.len()).collect();

    for (i, left_char) in left.iter().enumerate() {
        let mut last_cost = i;
        costs[0] = i + 1;
        for (j, right_char) in right.iter().enumerate() {
            let next_cost = costs[j + 1];
            let mut cost = if left_char == right_char {
                last_cost
            } else {
                last_cost + 1
            };
            cost = cost.min(costs[j] + 1).min(next_cost + 1);
            costs[j + 1] = cost;
            last_cost = next_cost;
        }
    }

    costs[right.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_collapsed() {
        assert_eq!(
            normalize_required_name("  Main   account ", "wallet").unwrap(),
            "Main account"
        );
        assert!(normalize_required_name("   ", "wallet").is_err());
    }

    #[test]
    fn wallet_keys_fold_unicode_case() {
        assert_eq!(wallet_key("Épargne"), wallet_key("épargne"));
        assert_eq!(wallet_key("E\u{301}pargne"), "épargne");
        assert_eq!(wallet_key("  Main   ACCOUNT "), "main account");
        assert_ne!(wallet_key("Épargne"), wallet_key("Epargne"));
    }

    #[test]
    fn category_keys_fold_case_and_accents() {
        assert_eq!(category_key("Café & Bar").as_deref(), Some("cafe bar"));
        assert_eq!(category_key("  FOOD ").as_deref(), Some("food"));
        assert_eq!(category_key("🍔"), None);
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email(" Alice@Example.COM ").unwrap(), "alice@example.com");
        assert!(normalize_email("alice").is_err());
        assert!(normalize_email("alice@localhost").is_err());
        assert!(normalize_email("@example.com").is_err());
    }

    #[test]
    fn levenshtein_distance() {
        assert_eq!(levenshtein("food", "food"), 0);
        assert_eq!(levenshtein("food", "fod"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }
}
