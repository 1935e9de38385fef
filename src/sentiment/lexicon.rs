//! Fixed phrase lists behind the lexical overrides.
//!
//! Matching is case-insensitive substring search over the whole text.
//! Multi-word entries ("not worth", "never arrived") count as one hit, and
//! an entry listed twice counts twice when it occurs.

pub const NEGATIVE_PHRASES: &[&str] = &[
    "bad", "terrible", "awful", "worst", "hate", "disappointed", "refund", "complaint", "poor",
    "horrible", "useless", "waste", "scam", "fraud", "not happy", "disgusted", "furious",
    "never again", "don't use", "do not use", "lies", "liar", "rob", "steal", "not worth",
    "avoid", "flopped", "faeces", "not working", "damaged", "broken", "delayed", "late",
    "never arrived", "worst service", "unresolved", "lack of", "not received", "missing",
    "stolen", "refuse to", "not delivering", "never get", "charging me", "unfairly charged",
    "manipulate", "failed", "cutting off", "useless", "baffled", "not sure where to begin",
    "not accommodating", "don't do", "expensive", "always delayed", "not worth it",
    "fake reviews", "not happy with", "shedded", "bald spots", "awful", "worst", "not fit",
    "doesn't allow returns", "not happy with", "hacked", "lost every", "never shopping",
    "still charging", "dictator", "greatly disappointed",
];

pub const POSITIVE_PHRASES: &[&str] = &[
    "love", "great", "excellent", "amazing", "wonderful", "best", "fantastic", "good",
    "helpful", "recommend", "satisfied", "happy with", "perfect", "awesome", "brilliant",
    "outstanding", "superb", "exceptional", "impressive", "thank you", "sorted", "amazing",
    "definitely recommend",
];

/// Words that flip a positive phrase ("not good", "didn't love").
pub const NEGATION_WORDS: &[&str] = &["not", "don't", "doesn't", "didn't", "won't", "can't"];

/// Unambiguous words for the short-text shortcut.
pub const STRONG_NEGATIVE: &[&str] = &["worst", "terrible", "awful", "bad"];
pub const STRONG_POSITIVE: &[&str] = &["good", "great", "excellent", "love"];

/// Second look at a generic index-1 ("positive") model prediction.
pub const POSITIVE_DOUBT_WORDS: &[&str] = &["not", "don't", "bad", "worst", "terrible", "awful"];

/// Default sarcasm indicators; configurable via `[sentiment]`.
pub const DEFAULT_SARCASM_INDICATORS: &[&str] = &[
    "makes sense, right",
    "still amazon is a good",
    "i love shopping in amazon. the delivery of amazon is always delayed",
    "the prices of amazon is also expensive. still amazon is a good",
];

/// Number of `phrases` that occur in `lower` (already lowercased).
pub fn count_matches(lower: &str, phrases: &[&str]) -> usize {
    phrases.iter().filter(|p| lower.contains(*p)).count()
}

pub fn contains_any(lower: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| lower.contains(p))
}

/// True when any negation word occurs anywhere in `lower`, inside longer
/// words included ("nothing" carries "not").
pub fn has_negation(lower: &str) -> bool {
    contains_any(lower, NEGATION_WORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_matches_counts_each_entry_once() {
        let lower = "worst worst terrible";
        assert_eq!(count_matches(lower, &["worst", "terrible", "awful"]), 2);
    }

    #[test]
    fn test_repeated_entries_weigh_double() {
        assert_eq!(count_matches("amazing", POSITIVE_PHRASES), 2);
        assert_eq!(count_matches("useless", NEGATIVE_PHRASES), 2);
        // "not happy with" also carries "not happy"
        assert_eq!(count_matches("not happy with it", NEGATIVE_PHRASES), 3);
        // "worst" twice plus "worst service"
        assert_eq!(count_matches("worst service", NEGATIVE_PHRASES), 3);
    }

    #[test]
    fn test_multi_word_phrase() {
        assert_eq!(count_matches("it never arrived at all", NEGATIVE_PHRASES), 1);
    }

    #[test]
    fn test_negation_matches_inside_words() {
        assert!(has_negation("i did not like it"));
        assert!(has_negation("i don't recommend"));
        assert!(has_negation("nothing but great things"));
        assert!(has_negation("a notable upgrade"));
        assert!(!has_negation("works great every day"));
    }
}
