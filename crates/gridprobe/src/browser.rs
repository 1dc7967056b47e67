//! Chromium-backed [`GridDriver`].
//!
//! When compiled with the `browser` feature, [`CdpDriver`] drives a real
//! Chromium page through chromiumoxide. Every driver call evaluates one of
//! the [`DriverScripts`](crate::driver::DriverScripts) expressions against
//! the live DOM, so selectors are always resolved fresh.

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
            viewport_width: 1280,
            viewport_height: 800,
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }
}

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening, clippy::missing_errors_doc)]
mod cdp {
    use super::BrowserConfig;
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::handler::viewport::Viewport;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    use crate::driver::{DriverScripts, GridDriver};
    use crate::locator::Selector;
    use crate::result::{ProbeError, ProbeResult};

    /// Chromium page driven over CDP
    #[derive(Debug)]
    pub struct CdpDriver {
        config: BrowserConfig,
        browser: Arc<Mutex<CdpBrowser>>,
        page: Arc<Mutex<CdpPage>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl CdpDriver {
        /// Launch Chromium and open a blank page
        pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder().viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Viewport::default()
            });
            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                })?;
            tracing::info!(headless = config.headless, "browser launched");

            Ok(Self {
                config,
                browser: Arc::new(Mutex::new(browser)),
                page: Arc::new(Mutex::new(page)),
                handle,
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Navigate and wait for the load event
        pub async fn goto(&self, url: &str) -> ProbeResult<()> {
            let page = self.page.lock().await;
            page.goto(url)
                .await
                .map_err(|e| ProbeError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            tracing::debug!(url, "navigated");
            Ok(())
        }

        /// Current page URL
        pub async fn url(&self) -> ProbeResult<Option<String>> {
            let page = self.page.lock().await;
            page.url().await.map_err(ProbeError::driver)
        }

        /// Close the browser and stop the event loop
        pub async fn close(self) -> ProbeResult<()> {
            let mut browser = self.browser.lock().await;
            let closed = browser.close().await.map_err(ProbeError::driver);
            let _ = browser.wait().await;
            self.handle.abort();
            closed.map(|_| ())
        }

        async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> ProbeResult<T> {
            let page = self.page.lock().await;
            let result = page.evaluate(script).await.map_err(ProbeError::driver)?;
            result.into_value().map_err(ProbeError::driver)
        }
    }

    #[async_trait]
    impl GridDriver for CdpDriver {
        async fn count(&self, selector: &Selector) -> ProbeResult<usize> {
            self.eval(&DriverScripts::count(selector)).await
        }

        async fn is_visible(&self, selector: &Selector) -> ProbeResult<bool> {
            self.eval(&DriverScripts::is_visible(selector)).await
        }

        async fn read_all_text(&self, selector: &Selector) -> ProbeResult<Vec<String>> {
            self.eval(&DriverScripts::read_all_text(selector)).await
        }

        async fn click(&self, selector: &Selector) -> ProbeResult<()> {
            if self.eval::<bool>(&DriverScripts::click(selector)).await? {
                Ok(())
            } else {
                Err(ProbeError::LocatorNotFound {
                    selector: selector.to_string(),
                    timeout_ms: 0,
                })
            }
        }

        async fn fill(&self, selector: &Selector, text: &str) -> ProbeResult<()> {
            if self.eval::<bool>(&DriverScripts::fill(selector, text)).await? {
                Ok(())
            } else {
                Err(ProbeError::LocatorNotFound {
                    selector: selector.to_string(),
                    timeout_ms: 0,
                })
            }
        }

        async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value> {
            self.eval(script).await
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::CdpDriver;
