use std::collections::HashSet;
use std::sync::Mutex;

/// Normalized texts already claimed by some batch in the current run.
///
/// Shared by every worker; `claim` is an atomic check-and-insert, so a text
/// appearing in two concurrent batches produces at most one record.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: Mutex<HashSet<String>>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `text` had not been seen before
    pub fn claim(&self, text: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        if seen.contains(text) {
            return false;
        }
        seen.insert(text.to_string())
    }

    pub fn contains(&self, text: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(text)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
