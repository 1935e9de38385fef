use once_cell::sync::Lazy;
use regex::RegexSet;

use crate::domain::ReviewRecord;

static LISTING_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        // Shop navigation and price filters
        r"^Shop by (Price|Features|Identity)",
        r"Under \d+",
        r"Above \d+",
        // Product listings
        r"^[a-zA-Z]+ (Headphones|Speakers|Earbuds|Soundbars|Smartwatch|Power Bank)",
        r"^\w+ [A-Z]\w+ \d+",
        // Footer
        r"^© \d+ .* All Rights Reserved",
        r"^Address Unit No",
        r"^For Consumer Complaints",
        // Q&A blocks
        r"^Q\.\s",
        r"^Net Content \d+ UNIT",
        // Promotions
        r"^Get \d+% OFF",
        r"^Redeem upto \d+% off",
        r"^Most Recent Highest Rating Lowest Rating",
        r"^Download user manual",
    ])
    .expect("listing patterns are valid")
});

const SPEC_INDICATORS: &[&str] = &[
    "equipped with",
    "designed for",
    "features",
    "technology",
    "battery capacity",
];

const NAV_TERMS: &[&str] = &[
    "home", "about", "contact", "login", "register", "cart", "checkout", "search",
];

/// Outcome of a clean-up pass over finished records.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub kept: Vec<ReviewRecord>,
    pub removed: usize,
}

/// Returns true for rows that slipped past extraction but are shop chrome:
/// category menus, product listings, spec sheets, footers and promotions.
pub fn is_listing_noise(text: &str) -> bool {
    if LISTING_PATTERNS.is_match(text) {
        return true;
    }

    let lower = text.to_lowercase();

    if text.chars().count() > 100
        && (text.contains("mAh") || text.contains("Bluetooth"))
        && (lower.contains("hours") || lower.contains("playback"))
        && SPEC_INDICATORS.iter().any(|i| lower.contains(i))
    {
        return true;
    }

    let words: Vec<&str> = lower.split_whitespace().collect();
    if words.len() <= 3 && words.iter().any(|w| NAV_TERMS.contains(w)) {
        return true;
    }

    text.contains('|') && (lower.contains("wireless") || lower.contains("bluetooth"))
}

/// Drops records whose text is listing noise, keeping the rest in order.
pub fn clean_records(records: Vec<ReviewRecord>) -> CleanReport {
    let original = records.len();
    let kept: Vec<ReviewRecord> = records
        .into_iter()
        .filter(|r| !is_listing_noise(&r.text))
        .collect();

    CleanReport {
        removed: original - kept.len(),
        kept,
    }
}
