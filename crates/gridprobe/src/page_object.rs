//! Page Object Model Support
//!
//! A page object names the grids on one screen and keeps that screen's own
//! selectors, so the shared [`TableInspector`](crate::table::TableInspector)
//! never has to guess at markup.

use std::collections::HashMap;

use crate::driver::GridDriver;
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::table::TableHandle;
use crate::wait::{self, WaitOptions};

/// Default page load timeout (30 seconds)
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 30_000;

/// Trait for page objects representing one screen of the application.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct ReferralsPage {
///     referrals: TableHandle,
/// }
///
/// impl PageObject for ReferralsPage {
///     fn url_pattern(&self) -> &str {
///         "/clients/:id/referrals"
///     }
///
///     fn grid(&self, name: &str) -> Option<&TableHandle> {
///         (name == "referrals").then_some(&self.referrals)
///     }
/// }
/// ```
pub trait PageObject: std::fmt::Debug + Send + Sync {
    /// URL pattern that matches this page (e.g., "/login", "/clients/:id")
    fn url_pattern(&self) -> &str;

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// How long to wait for the page to become ready
    fn load_timeout_ms(&self) -> u64 {
        DEFAULT_LOAD_TIMEOUT_MS
    }

    /// Element whose visibility means the page is ready
    fn ready_marker(&self) -> Option<&Selector> {
        None
    }

    /// Grid registered under `name`
    fn grid(&self, name: &str) -> Option<&TableHandle>;

    /// Whether `url` is this page
    fn matches_url(&self, url: &str) -> bool {
        UrlMatcher::new(self.url_pattern()).matches(url)
    }
}

/// Wait for a page's ready marker, if it has one
pub async fn wait_loaded<D, P>(driver: &D, page: &P, poll_interval_ms: u64) -> ProbeResult<()>
where
    D: GridDriver + ?Sized,
    P: PageObject + ?Sized,
{
    let Some(marker) = page.ready_marker() else {
        return Ok(());
    };
    let options = WaitOptions::new(page.load_timeout_ms(), poll_interval_ms);
    if wait::wait_visible(driver, marker, &options).await.success {
        tracing::debug!(page = page.page_name(), "page ready");
        Ok(())
    } else {
        Err(ProbeError::LocatorNotFound {
            selector: marker.to_string(),
            timeout_ms: options.timeout_ms,
        })
    }
}

/// Builder for creating page objects with grids
#[derive(Debug, Clone)]
pub struct PageObjectBuilder {
    name: Option<String>,
    url_pattern: String,
    grids: HashMap<String, TableHandle>,
    ready_marker: Option<Selector>,
    load_timeout_ms: u64,
}

impl Default for PageObjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PageObjectBuilder {
    /// Create a new page object builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            url_pattern: String::new(),
            grids: HashMap::new(),
            ready_marker: None,
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
        }
    }

    /// Set the page name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the URL pattern
    #[must_use]
    pub fn with_url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_pattern = pattern.into();
        self
    }

    /// Register a grid under its handle's name
    #[must_use]
    pub fn with_grid(mut self, handle: TableHandle) -> Self {
        let _ = self.grids.insert(handle.name.clone(), handle);
        self
    }

    /// Set the ready marker
    #[must_use]
    pub fn with_ready_marker(mut self, selector: Selector) -> Self {
        self.ready_marker = Some(selector);
        self
    }

    /// Set the load timeout
    #[must_use]
    pub const fn with_load_timeout(mut self, timeout_ms: u64) -> Self {
        self.load_timeout_ms = timeout_ms;
        self
    }

    /// Build a simple page object
    #[must_use]
    pub fn build(self) -> SimplePageObject {
        SimplePageObject {
            name: self.name,
            url_pattern: self.url_pattern,
            grids: self.grids,
            ready_marker: self.ready_marker,
            load_timeout_ms: self.load_timeout_ms,
        }
    }
}

/// A simple generic page object implementation
#[derive(Debug, Clone)]
pub struct SimplePageObject {
    name: Option<String>,
    url_pattern: String,
    grids: HashMap<String, TableHandle>,
    ready_marker: Option<Selector>,
    load_timeout_ms: u64,
}

impl SimplePageObject {
    /// Create a page object with no grids
    #[must_use]
    pub fn new(url_pattern: impl Into<String>) -> Self {
        PageObjectBuilder::new().with_url_pattern(url_pattern).build()
    }

    /// Add a grid
    pub fn add_grid(&mut self, handle: TableHandle) {
        let _ = self.grids.insert(handle.name.clone(), handle);
    }

    /// Registered grid names, sorted
    #[must_use]
    pub fn grid_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.grids.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PageObject for SimplePageObject {
    fn url_pattern(&self) -> &str {
        &self.url_pattern
    }

    fn page_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url_pattern)
    }

    fn load_timeout_ms(&self) -> u64 {
        self.load_timeout_ms
    }

    fn ready_marker(&self) -> Option<&Selector> {
        self.ready_marker.as_ref()
    }

    fn grid(&self, name: &str) -> Option<&TableHandle> {
        self.grids.get(name)
    }
}

/// Page object registry for managing multiple pages
#[derive(Debug, Default)]
pub struct PageRegistry {
    pages: Vec<(String, Box<dyn PageObject>)>,
}

impl PageRegistry {
    /// Create a new page registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page object; a later registration replaces an earlier one
    pub fn register<T: PageObject + 'static>(&mut self, name: impl Into<String>, page: T) {
        let name = name.into();
        self.pages.retain(|(existing, _)| *existing != name);
        self.pages.push((name, Box::new(page)));
    }

    /// Get a page by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn PageObject> {
        self.pages
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.as_ref())
    }

    /// First registered page whose pattern matches `url`
    #[must_use]
    pub fn find_by_url(&self, url: &str) -> Option<(&str, &dyn PageObject)> {
        self.pages
            .iter()
            .find(|(_, p)| p.matches_url(url))
            .map(|(n, p)| (n.as_str(), p.as_ref()))
    }

    /// List all registered pages in registration order
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.pages.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Get the number of registered pages
    #[must_use]
    pub fn count(&self) -> usize {
        self.pages.len()
    }
}

/// URL pattern matcher for page objects
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

/// Path part of a URL: no scheme, host, query or fragment
fn url_path(url: &str) -> &str {
    let without_origin = match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            rest.find('/').map_or("", |slash| &rest[slash..])
        }
        None => url,
    };
    let end = without_origin
        .find(['?', '#'])
        .unwrap_or(without_origin.len());
    &without_origin[..end]
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/login`
    /// - Wildcards: `/clients/*`
    /// - Named parameters: `/clients/:id`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    fn path_segments(url: &str) -> Vec<&str> {
        url_path(url).split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Check if a URL (absolute or path-only) matches the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let url_segments = Self::path_segments(url);
        // wildcards and parameters each consume exactly one segment
        url_segments.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&url_segments)
                .all(|(segment, actual)| match segment {
                    UrlSegment::Literal(lit) => lit == actual,
                    UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
                })
    }

    /// Extract parameters from a URL
    #[must_use]
    pub fn extract_params(&self, url: &str) -> HashMap<String, String> {
        let url_segments = Self::path_segments(url);
        self.segments
            .iter()
            .zip(url_segments)
            .filter_map(|(segment, value)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), value.to_string())),
                _ => None,
            })
            .collect()
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;

    fn referrals_page() -> SimplePageObject {
        PageObjectBuilder::new()
            .with_name("followup referrals")
            .with_url_pattern("/clients/:id/referrals")
            .with_grid(TableHandle::material_table(
                "referrals",
                Selector::test_id("followup-referrals"),
            ))
            .with_ready_marker(Selector::text("Followup Referrals"))
            .with_load_timeout(50)
            .build()
    }

    mod page_object_builder_tests {
        use super::*;

        #[test]
        fn test_builder_with_grids() {
            let page = referrals_page();
            assert_eq!(page.page_name(), "followup referrals");
            assert_eq!(page.load_timeout_ms(), 50);
            assert!(page.grid("referrals").is_some());
            assert!(page.grid("appointments").is_none());
            assert_eq!(page.grid_names(), vec!["referrals"]);
        }

        #[test]
        fn test_default_builder() {
            let page = PageObjectBuilder::default().build();
            assert!(page.url_pattern().is_empty());
            assert_eq!(page.load_timeout_ms(), DEFAULT_LOAD_TIMEOUT_MS);
            assert!(page.ready_marker().is_none());
        }

        #[test]
        fn test_add_grid() {
            let mut page = SimplePageObject::new("/dashboard");
            page.add_grid(TableHandle::html_table("appointments", Selector::css("#appts")));
            page.add_grid(TableHandle::aria_grid("alerts", Selector::role("grid")));
            assert_eq!(page.grid_names(), vec!["alerts", "appointments"]);
            assert_eq!(page.page_name(), "/dashboard");
        }
    }

    mod page_registry_tests {
        use super::*;

        #[test]
        fn test_register_and_get() {
            let mut registry = PageRegistry::new();
            registry.register("referrals", referrals_page());
            registry.register("dashboard", SimplePageObject::new("/dashboard"));

            assert_eq!(registry.count(), 2);
            assert_eq!(registry.list(), vec!["referrals", "dashboard"]);
            assert!(registry.get("referrals").is_some());
            assert!(registry.get("nonexistent").is_none());
        }

        #[test]
        fn test_register_replaces() {
            let mut registry = PageRegistry::new();
            registry.register("home", SimplePageObject::new("/"));
            registry.register("home", SimplePageObject::new("/home"));
            assert_eq!(registry.count(), 1);
            assert_eq!(registry.get("home").map(|p| p.url_pattern()), Some("/home"));
        }

        #[test]
        fn test_find_by_url() {
            let mut registry = PageRegistry::new();
            registry.register("dashboard", SimplePageObject::new("/dashboard"));
            registry.register("referrals", referrals_page());

            let (name, page) = registry
                .find_by_url("https://emr.example.test/clients/42/referrals?tab=open")
                .unwrap();
            assert_eq!(name, "referrals");
            assert!(page.grid("referrals").is_some());
            assert!(registry.find_by_url("/settings").is_none());
        }
    }

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_literal_match() {
            let matcher = UrlMatcher::new("/login");
            assert!(matcher.matches("/login"));
            assert!(!matcher.matches("/register"));
            assert!(!matcher.matches("/login/extra"));
        }

        #[test]
        fn test_wildcard_and_parameter() {
            assert!(UrlMatcher::new("/clients/*").matches("/clients/abc"));
            assert!(!UrlMatcher::new("/clients/*").matches("/clients"));
            assert!(UrlMatcher::new("/clients/:id").matches("/clients/7"));
        }

        #[test]
        fn test_absolute_urls_use_path_only() {
            let matcher = UrlMatcher::new("/clients/:id");
            assert!(matcher.matches("http://localhost:3000/clients/9#notes"));
            assert!(!matcher.matches("http://localhost:3000"));
            assert!(UrlMatcher::new("/").matches("https://emr.example.test"));
        }

        #[test]
        fn test_extract_params() {
            let matcher = UrlMatcher::new("/clients/:id/referrals/:referral_id");
            let params = matcher.extract_params("https://x.test/clients/42/referrals/100?sort=due");
            assert_eq!(params.get("id"), Some(&"42".to_string()));
            assert_eq!(params.get("referral_id"), Some(&"100".to_string()));
            assert_eq!(matcher.pattern(), "/clients/:id/referrals/:referral_id");
        }
    }

    mod loading_tests {
        use super::*;

        #[tokio::test]
        async fn test_ready_marker_visible() {
            let driver = MockDriver::new();
            driver.set_texts(&Selector::text("Followup Referrals"), ["Followup Referrals"]);
            assert!(wait_loaded(&driver, &referrals_page(), 5).await.is_ok());
        }

        #[tokio::test]
        async fn test_ready_marker_missing() {
            let driver = MockDriver::new();
            let err = wait_loaded(&driver, &referrals_page(), 5).await.unwrap_err();
            assert!(matches!(err, ProbeError::LocatorNotFound { timeout_ms: 50, .. }));
        }

        #[tokio::test]
        async fn test_no_marker_is_ready() {
            let driver = MockDriver::new();
            assert!(wait_loaded(&driver, &SimplePageObject::new("/"), 5).await.is_ok());
        }
    }
}
