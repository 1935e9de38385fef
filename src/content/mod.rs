//! Heuristics that separate genuine review text from page chrome.
//!
//! [`is_non_review_content`] is the gate every extraction layer and the batch
//! processor pass fragments through. It is a pure predicate: no I/O, no model
//! calls, same answer for the same input.
//!
//! [`cleanup`] holds the coarser record-level pass applied to finished
//! results and to imported CSV files.

pub mod cleanup;

use once_cell::sync::Lazy;
use regex::RegexSet;

pub use cleanup::{clean_records, is_listing_noise, CleanReport};

static BOILERPLATE: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)^Certified Buyer$",
        r"(?i)^\d+ months? ago$",
        r"(?i)^[0-5]★$",
        r"(?i)^\d+\.\d+★$",
        r"(?i)^Most (Helpful|Recent)$",
        r"(?i)^ABOUT Contact Us$",
        r"(?i)^Terms Of Use$",
        r"(?i)^Privacy$",
        r"(?i)^Copyright ©",
        r"(?i)^All Rights Reserved$",
    ])
    .expect("boilerplate patterns are valid")
});

/// Words that, on their own, are site navigation rather than review text.
pub const NAVIGATION_TERMS: &[&str] = &[
    "home", "about", "contact", "login", "register", "cart", "checkout", "account", "profile",
    "settings", "help", "support", "faq", "search", "menu", "categories", "products", "services",
    "blog", "news",
];

const MIN_WORDS: usize = 4;
const MIN_ALPHA_RATIO: f64 = 0.4;
const ALPHA_RATIO_MIN_LEN: usize = 20;

/// Returns true when `text` should be rejected as page noise.
///
/// Expects whitespace-normalized input. Rules, first match wins:
/// boilerplate patterns, a short run of navigation terms, fewer than four
/// words, or a symbol/number-heavy string longer than 20 characters.
pub fn is_non_review_content(text: &str) -> bool {
    if BOILERPLATE.is_match(text) {
        return true;
    }

    let lower = text.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();

    if !words.is_empty()
        && words.len() <= 2
        && words.iter().all(|w| NAVIGATION_TERMS.contains(w))
    {
        return true;
    }

    if words.len() < MIN_WORDS {
        return true;
    }

    let total = text.chars().count();
    let alpha = text.chars().filter(|c| c.is_alphabetic()).count();
    let ratio = if total == 0 {
        0.0
    } else {
        alpha as f64 / total as f64
    };

    ratio < MIN_ALPHA_RATIO && total > ALPHA_RATIO_MIN_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certified_buyer_rejected() {
        assert!(is_non_review_content("Certified Buyer"));
        assert!(is_non_review_content("certified buyer"));
    }

    #[test]
    fn test_short_fragment_rejected() {
        assert!(is_non_review_content("ok"));
        assert!(is_non_review_content("pretty good phone"));
        assert!(is_non_review_content(""));
    }

    #[test]
    fn test_navigation_terms_rejected() {
        assert!(is_non_review_content("Home"));
        assert!(is_non_review_content("login cart"));
    }

    #[test]
    fn test_boilerplate_patterns_rejected() {
        assert!(is_non_review_content("3 months ago"));
        assert!(is_non_review_content("1 month ago"));
        assert!(is_non_review_content("4★"));
        assert!(is_non_review_content("4.5★"));
        assert!(is_non_review_content("Most Helpful"));
        assert!(is_non_review_content("Copyright © 2024 Shop Ltd, all rights"));
    }

    #[test]
    fn test_symbol_heavy_text_rejected() {
        assert!(is_non_review_content("$ 12.99 | 4.5 / 5 | 1,204 # 88% ++"));
    }

    #[test]
    fn test_real_review_accepted() {
        assert!(!is_non_review_content(
            "The battery lasts two full days and the screen is bright outdoors."
        ));
        assert!(!is_non_review_content("Arrived late but works fine"));
    }

    #[test]
    fn test_short_numeric_text_not_judged_by_ratio() {
        // Four words, under the ratio length floor
        assert!(!is_non_review_content("5 5 5 ok"));
    }
}
