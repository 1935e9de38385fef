use std::collections::HashSet;
use std::fmt;

/// Where a scrape session is in its lifecycle.
///
/// States only move forward; `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    Init,
    Loaded,
    ConsentHandled,
    ContentExpanded,
    Extracted,
    Done,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Done | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Init => "init",
            SessionState::Loaded => "loaded",
            SessionState::ConsentHandled => "consent-handled",
            SessionState::ContentExpanded => "content-expanded",
            SessionState::Extracted => "extracted",
            SessionState::Done => "done",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Distinct fragments in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct FragmentSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl FragmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the fragment was already present
    pub fn insert(&mut self, fragment: String) -> bool {
        if self.seen.contains(&fragment) {
            return false;
        }
        self.seen.insert(fragment.clone());
        self.order.push(fragment);
        true
    }

    /// Insert every fragment, returning how many were new
    pub fn extend<I: IntoIterator<Item = String>>(&mut self, fragments: I) -> usize {
        fragments
            .into_iter()
            .filter(|f| self.insert(f.clone()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// One page visit: the URL, how far it got, and what it collected.
#[derive(Debug, Clone)]
pub struct ScrapeSession {
    pub url: String,
    state: SessionState,
    pub scrolls: usize,
    pub expanded: usize,
    pub fragments: FragmentSet,
}

impl ScrapeSession {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            state: SessionState::Init,
            scrolls: 0,
            expanded: 0,
            fragments: FragmentSet::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Move to `next`. Backward moves and moves out of a terminal state are
    /// ignored and reported as `false`.
    pub fn advance(&mut self, next: SessionState) -> bool {
        if self.state.is_terminal() || next <= self.state {
            return false;
        }
        tracing::debug!(url = %self.url, from = %self.state, to = %next, "Session state change");
        self.state = next;
        true
    }

    pub fn fail(&mut self) {
        self.advance(SessionState::Failed);
    }

    pub fn into_fragments(self) -> Vec<String> {
        self.fragments.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_set_keeps_first_seen_order() {
        let mut set = FragmentSet::new();
        assert!(set.insert("b".into()));
        assert!(set.insert("a".into()));
        assert!(!set.insert("b".into()));
        assert_eq!(set.extend(vec!["c".into(), "a".into()]), 1);
        assert_eq!(set.into_vec(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_session_moves_forward_only() {
        let mut session = ScrapeSession::new("https://example.com");
        assert_eq!(session.state(), SessionState::Init);
        assert!(session.advance(SessionState::Loaded));
        assert!(session.advance(SessionState::ContentExpanded));
        assert!(!session.advance(SessionState::ConsentHandled));
        assert_eq!(session.state(), SessionState::ContentExpanded);
    }

    #[test]
    fn test_terminal_states_stick() {
        let mut session = ScrapeSession::new("https://example.com");
        session.advance(SessionState::Loaded);
        session.fail();
        assert_eq!(session.state(), SessionState::Failed);
        assert!(!session.advance(SessionState::Done));

        let mut done = ScrapeSession::new("https://example.com");
        assert!(done.advance(SessionState::Done));
        done.fail();
        assert_eq!(done.state(), SessionState::Done);
    }
}
