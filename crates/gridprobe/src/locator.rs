//! Selector descriptors for locating grid elements.
//!
//! A [`Selector`] is a lazy description of zero or more elements. It is never
//! resolved ahead of time: drivers compile it to a JavaScript expression that
//! evaluates to an array of elements, so every read observes the live page.
//!
//! # Design Philosophy
//!
//! - **Relative queries**: `within` scopes a child selector to each match of
//!   a parent, so one grid's selectors never leak into another grid
//! - **Accessibility first**: role + accessible name selectors mirror how the
//!   EMR screens expose their grids
//! - **Fluent API**: chainable methods for building nested selectors

use serde::{Deserialize, Serialize};

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "table.patients thead th")
    Css(String),
    /// XPath expression
    XPath(String),
    /// Elements whose own text contains the string
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// ARIA role with optional accessible name
    Role {
        /// Role name (explicit `role` attribute or implicit tag role)
        role: String,
        /// Accessible name to match (aria-label or text), substring match
        name: Option<String>,
    },
    /// The `index`-th match of `base` (zero-based)
    Nth {
        /// Selector to index into
        base: Box<Selector>,
        /// Zero-based index
        index: usize,
    },
    /// `child` resolved relative to every match of `parent`
    Within {
        /// Scoping selector
        parent: Box<Selector>,
        /// Selector evaluated inside each parent match
        child: Box<Selector>,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a role selector without an accessible name
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: None,
        }
    }

    /// Create a role selector filtered by accessible name
    #[must_use]
    pub fn role_named(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: Some(name.into()),
        }
    }

    /// Select the `index`-th match of this selector
    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        Self::Nth {
            base: Box::new(self),
            index,
        }
    }

    /// Select the first match of this selector
    #[must_use]
    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Resolve `child` relative to each match of this selector
    #[must_use]
    pub fn within(self, child: Selector) -> Self {
        Self::Within {
            parent: Box::new(self),
            child: Box::new(child),
        }
    }

    /// JavaScript expression evaluating to an array of matching elements
    #[must_use]
    pub fn to_elements_js(&self) -> String {
        self.elements_js("document", 0)
    }

    /// JavaScript expression evaluating to the number of matches
    #[must_use]
    pub fn to_count_js(&self) -> String {
        format!("({}).length", self.to_elements_js())
    }

    fn elements_js(&self, root: &str, depth: usize) -> String {
        match self {
            Self::Css(css) => format!("Array.from({root}.querySelectorAll({css:?}))"),
            Self::XPath(expr) => format!(
                "(() => {{ const r = document.evaluate({expr:?}, {root}, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 return Array.from({{ length: r.snapshotLength }}, (_, i) => r.snapshotItem(i)); }})()"
            ),
            Self::Text(text) => format!(
                "Array.from({root}.querySelectorAll('*')).filter(el => \
                 Array.from(el.childNodes).some(n => n.nodeType === 3 && n.textContent.includes({text:?})))"
            ),
            Self::TestId(id) => {
                let css = format!("[data-testid=\"{id}\"]");
                format!("Array.from({root}.querySelectorAll({css:?}))")
            }
            Self::Role { role, name } => {
                let css = role_css(role);
                let base = format!("Array.from({root}.querySelectorAll({css:?}))");
                match name {
                    Some(name) => format!(
                        "{base}.filter(el => ((el.getAttribute('aria-label') || el.textContent) || '').includes({name:?}))"
                    ),
                    None => base,
                }
            }
            Self::Nth { base, index } => {
                let base = base.elements_js(root, depth);
                format!("({base}).slice({index}, {})", index + 1)
            }
            Self::Within { parent, child } => {
                let var = format!("p{depth}");
                let parent = parent.elements_js(root, depth + 1);
                let child = child.elements_js(&var, depth + 1);
                format!("({parent}).flatMap({var} => {child})")
            }
        }
    }
}

/// CSS matching an ARIA role explicitly or through the tag's implicit role
fn role_css(role: &str) -> String {
    let implicit = match role {
        "button" => Some("button, input[type=button], input[type=submit]"),
        "columnheader" => Some("th"),
        "row" => Some("tr"),
        "cell" | "gridcell" => Some("td"),
        "table" | "grid" => Some("table"),
        "link" => Some("a[href]"),
        "textbox" => Some("input:not([type]), input[type=text], textarea"),
        "combobox" => Some("select"),
        "option" => Some("option"),
        "progressbar" => Some("progress"),
        _ => None,
    };
    match implicit {
        Some(tags) => format!("[role=\"{role}\"], {tags}"),
        None => format!("[role=\"{role}\"]"),
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::XPath(expr) => write!(f, "xpath={expr}"),
            Self::Text(text) => write!(f, "text={text}"),
            Self::TestId(id) => write!(f, "test-id={id}"),
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role={role}[name={name:?}]"),
            Self::Nth { base, index } => write!(f, "{base} >> nth={index}"),
            Self::Within { parent, child } => write!(f, "{parent} >> {child}"),
        }
    }
}

impl From<&str> for Selector {
    fn from(css: &str) -> Self {
        Self::css(css)
    }
}
