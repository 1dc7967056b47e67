//! GridDriver - Abstract Browser Automation Trait
//!
//! Every grid operation goes through this trait, so the same inspection code
//! runs against a real Chromium page (`CdpDriver`, feature `browser`) or the
//! in-memory [`MockDriver`](crate::mock::MockDriver).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  TableInspector / waits / candidates                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  GridDriver (count, is_visible, read_text, click, fill, eval) │
//! ├───────────────────────────────┬──────────────────────────────┤
//! │  CdpDriver                    │  MockDriver                  │
//! │  chromiumoxide + JS queries   │  selector-keyed fake DOM     │
//! └───────────────────────────────┴──────────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::locator::Selector;
use crate::result::ProbeResult;

/// Abstract driver trait for browser automation
///
/// Selectors are resolved lazily on every call; implementations must not
/// cache matches between calls.
#[async_trait]
pub trait GridDriver: Send + Sync {
    /// Number of elements currently matching `selector`
    async fn count(&self, selector: &Selector) -> ProbeResult<usize>;

    /// Whether the first match is rendered and visible
    async fn is_visible(&self, selector: &Selector) -> ProbeResult<bool>;

    /// Rendered text of every match, in document order
    async fn read_all_text(&self, selector: &Selector) -> ProbeResult<Vec<String>>;

    /// Click the first match
    async fn click(&self, selector: &Selector) -> ProbeResult<()>;

    /// Replace the value of the first match and fire input events
    async fn fill(&self, selector: &Selector, text: &str) -> ProbeResult<()>;

    /// Evaluate a script in the page context
    async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value>;

    /// Rendered text of the first match, if any
    async fn read_text(&self, selector: &Selector) -> ProbeResult<Option<String>> {
        Ok(self.read_all_text(selector).await?.into_iter().next())
    }
}

/// Page scripts used by JavaScript-evaluating drivers
///
/// Each script is a self-contained expression returning JSON.
#[derive(Debug, Clone, Copy)]
pub struct DriverScripts;

impl DriverScripts {
    /// Number of matches
    #[must_use]
    pub fn count(selector: &Selector) -> String {
        selector.to_count_js()
    }

    /// `true` when the first match has a box and is not hidden by style
    #[must_use]
    pub fn is_visible(selector: &Selector) -> String {
        format!(
            "(() => {{ const el = ({})[0]; if (!el) return false; \
             const r = el.getBoundingClientRect(); const s = window.getComputedStyle(el); \
             return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; }})()",
            selector.to_elements_js()
        )
    }

    /// Array of rendered texts
    #[must_use]
    pub fn read_all_text(selector: &Selector) -> String {
        format!(
            "({}).map(el => el.innerText ?? el.textContent ?? '')",
            selector.to_elements_js()
        )
    }

    /// Click the first match; evaluates to `false` when nothing matched
    #[must_use]
    pub fn click(selector: &Selector) -> String {
        format!(
            "(() => {{ const el = ({})[0]; if (!el) return false; \
             el.scrollIntoView({{ block: 'center' }}); el.click(); return true; }})()",
            selector.to_elements_js()
        )
    }

    /// Set the value through the native setter so framework listeners fire
    #[must_use]
    pub fn fill(selector: &Selector, text: &str) -> String {
        let value = serde_json::Value::String(text.to_string());
        format!(
            "(() => {{ const el = ({})[0]; if (!el) return false; el.focus(); \
             const proto = Object.getPrototypeOf(el); \
             const desc = Object.getOwnPropertyDescriptor(proto, 'value'); \
             if (desc && desc.set) {{ desc.set.call(el, {value}); }} else {{ el.value = {value}; }} \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }})()",
            selector.to_elements_js()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod script_tests {
        use super::*;

        #[test]
        fn test_count_script() {
            let js = DriverScripts::count(&Selector::css("tbody tr"));
            assert!(js.contains("querySelectorAll(\"tbody tr\")"));
            assert!(js.ends_with(".length"));
        }

        #[test]
        fn test_visibility_script_checks_style() {
            let js = DriverScripts::is_visible(&Selector::css(".spinner"));
            assert!(js.contains("getBoundingClientRect"));
            assert!(js.contains("visibility !== 'hidden'"));
            assert!(js.contains("return false"));
        }

        #[test]
        fn test_text_script_maps_inner_text() {
            let js = DriverScripts::read_all_text(&Selector::css("th"));
            assert!(js.contains(".map(el => el.innerText"));
        }

        #[test]
        fn test_click_script_scrolls_first() {
            let js = DriverScripts::click(&Selector::css("th").nth(2));
            assert!(js.contains("scrollIntoView"));
            assert!(js.contains(".slice(2, 3)"));
        }

        #[test]
        fn test_fill_script_escapes_text() {
            let js = DriverScripts::fill(&Selector::css("input"), "O'Brien \"Jr\"");
            assert!(js.contains(r#""O'Brien \"Jr\"""#));
            assert!(js.contains("new Event('input'"));
            assert!(js.contains("new Event('change'"));
        }
    }
}
