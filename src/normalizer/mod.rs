use once_cell::sync::Lazy;
use regex::Regex;

// "BO Bonnie US • 1 review 13 hours ago"
static USER_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{1,2}\s+[\w\s]+•\s+\d+\s+reviews?\s+.*?ago").expect("valid header pattern")
});

static DATE_OF_EXPERIENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Date of experience:.*?$").expect("valid date pattern"));

static TRAILING_UI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Useful\s+Share\s*$").expect("valid trailing pattern"));

/// Collapses every whitespace run to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips reviewer headers, "Date of experience" suffixes and trailing
/// "Useful Share" affordances.
///
/// Rules are reapplied until nothing changes, so the result is a fixed point:
/// `clean_text(&clean_text(x)) == clean_text(x)`.
pub fn clean_text(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let text = USER_HEADER.replace(text, "");
    let text = DATE_OF_EXPERIENCE.replace(&text, "");
    let text = TRAILING_UI.replace(&text, "");
    text.trim().to_string()
}

/// Cuts `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
