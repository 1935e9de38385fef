use crate::scraper::{Locator, ScrollTarget};

/// Resolves a locator to an element array and tests rendered visibility.
const PRELUDE: &str = r#"
    const find = (kind, query) => {
        if (kind === 'xpath') {
            const snap = document.evaluate(
                query, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
            const out = [];
            for (let i = 0; i < snap.snapshotLength; i++) {
                const node = snap.snapshotItem(i);
                if (node instanceof Element) out.push(node);
            }
            return out;
        }
        return Array.from(document.querySelectorAll(query));
    };
    const visible = el =>
        !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);
"#;

fn locator_args(locator: &Locator) -> (String, String) {
    let kind = if locator.is_xpath() { "xpath" } else { "css" };
    // JSON string literals are valid JS string literals
    let query = serde_json::to_string(locator.query()).unwrap_or_else(|_| "\"\"".to_string());
    (format!("'{}'", kind), query)
}

/// Rendered text of each visible match, trimmed.
pub fn element_texts(locator: &Locator) -> String {
    let (kind, query) = locator_args(locator);
    format!(
        r#"
        (() => {{
            {PRELUDE}
            return find({kind}, {query})
                .filter(visible)
                .map(el => (el.innerText || '').trim());
        }})()
        "#
    )
}

pub fn visible_count(locator: &Locator) -> String {
    let (kind, query) = locator_args(locator);
    format!(
        r#"
        (() => {{
            {PRELUDE}
            return find({kind}, {query}).filter(visible).length;
        }})()
        "#
    )
}

/// Clicks through the DOM rather than synthesized input, so overlays
/// covering the element do not swallow the click.
pub fn click_visible(locator: &Locator, index: usize) -> String {
    let (kind, query) = locator_args(locator);
    format!(
        r#"
        (() => {{
            {PRELUDE}
            const els = find({kind}, {query}).filter(visible);
            if ({index} >= els.length) return false;
            els[{index}].click();
            return true;
        }})()
        "#
    )
}

/// Set on every expander clicked through [`expand_next`].
pub const EXPANDED_MARK: &str = "data-reviewlens-expanded";

/// Clicks the first visible match not clicked before and marks it.
///
/// Marking happens before the click, so a control that stays on the page or
/// throws is never clicked twice, and controls that vanish do not shift the
/// ones behind them out of reach.
pub fn expand_next(locator: &Locator) -> String {
    let (kind, query) = locator_args(locator);
    format!(
        r#"
        (() => {{
            {PRELUDE}
            const el = find({kind}, {query})
                .filter(visible)
                .find(el => !el.hasAttribute('{EXPANDED_MARK}'));
            if (!el) return false;
            el.setAttribute('{EXPANDED_MARK}', '1');
            el.click();
            return true;
        }})()
        "#
    )
}

pub fn scroll_to(target: ScrollTarget) -> &'static str {
    match target {
        ScrollTarget::Top => "(() => { window.scrollTo(0, 0); return true; })()",
        ScrollTarget::Bottom => {
            "(() => { window.scrollTo(0, document.body ? document.body.scrollHeight : 0); return true; })()"
        }
    }
}

pub const PAGE_HEIGHT: &str = "(() => document.body ? document.body.scrollHeight : 0)()";

pub const BODY_TEXT: &str = "(() => document.body ? document.body.innerText : '')()";
