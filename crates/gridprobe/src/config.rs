//! Inspection configuration
//!
//! Timeouts and grid defaults, loadable from YAML and overridable from the
//! environment.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;

/// Default header row timeout (5 seconds)
pub const DEFAULT_HEADER_TIMEOUT_MS: u64 = 5_000;

/// Default stability timeout for loading indicators (10 seconds)
pub const DEFAULT_STABILITY_TIMEOUT_MS: u64 = 10_000;

/// Sentinel rendered by material-table grids with no data
pub const NO_RECORDS_TEXT: &str = "No records to display";

/// Hint appended to sortable material-table header labels
pub const SORT_HINT_TEXT: &str = "Press Enter to sort";

/// Environment override prefix
pub const ENV_PREFIX: &str = "GRIDPROBE_";

/// Configuration for grid inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Wait for the header row to become visible
    pub header_timeout_ms: u64,
    /// Wait for data rows to become visible
    pub rows_timeout_ms: u64,
    /// Window in which a loading indicator is expected to appear after a click
    pub loading_appear_timeout_ms: u64,
    /// Wait for a loading indicator to disappear
    pub stability_timeout_ms: u64,
    /// Fixed delay after a sort settles
    pub settle_ms: u64,
    /// Polling interval for all waits
    pub poll_interval_ms: u64,
    /// Row cap applied when a caller passes no explicit `max_rows`
    pub default_max_rows: Option<usize>,
    /// Cell texts that mark an empty-state row
    pub empty_state_texts: Vec<String>,
    /// Sort-affordance hints stripped from header labels
    pub header_hint_suffixes: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            header_timeout_ms: DEFAULT_HEADER_TIMEOUT_MS,
            rows_timeout_ms: DEFAULT_HEADER_TIMEOUT_MS,
            loading_appear_timeout_ms: 1_000,
            stability_timeout_ms: DEFAULT_STABILITY_TIMEOUT_MS,
            settle_ms: 250,
            poll_interval_ms: 50,
            default_max_rows: None,
            empty_state_texts: vec![NO_RECORDS_TEXT.to_string()],
            header_hint_suffixes: vec![SORT_HINT_TEXT.to_string()],
        }
    }
}

impl ProbeConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document; missing fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file and apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::from_yaml_str(&text)?;
        config.apply_env()?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "loaded probe config");
        Ok(config)
    }

    /// Apply `GRIDPROBE_*` overrides from the process environment
    pub fn apply_env(&mut self) -> ProbeResult<()> {
        self.apply_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Apply overrides from any key lookup (keys without the prefix)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ProbeResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut u64); 6] = [
            ("HEADER_TIMEOUT_MS", &mut self.header_timeout_ms),
            ("ROWS_TIMEOUT_MS", &mut self.rows_timeout_ms),
            ("LOADING_APPEAR_TIMEOUT_MS", &mut self.loading_appear_timeout_ms),
            ("STABILITY_TIMEOUT_MS", &mut self.stability_timeout_ms),
            ("SETTLE_MS", &mut self.settle_ms),
            ("POLL_INTERVAL_MS", &mut self.poll_interval_ms),
        ];
        for (key, field) in fields {
            if let Some(raw) = lookup(key) {
                *field = raw.trim().parse().map_err(|_| ProbeError::Config {
                    message: format!("{ENV_PREFIX}{key} must be milliseconds, got {raw:?}"),
                })?;
            }
        }
        if let Some(raw) = lookup("MAX_ROWS") {
            let rows = raw.trim().parse().map_err(|_| ProbeError::Config {
                message: format!("{ENV_PREFIX}MAX_ROWS must be a row count, got {raw:?}"),
            })?;
            self.default_max_rows = Some(rows);
        }
        self.validate()
    }

    /// Reject settings that would make every wait spin or never poll
    pub fn validate(&self) -> ProbeResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(ProbeError::Config {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        if self.default_max_rows == Some(0) {
            return Err(ProbeError::Config {
                message: "default_max_rows must be greater than zero when set".to_string(),
            });
        }
        Ok(())
    }

    /// Set header timeout
    #[must_use]
    pub const fn with_header_timeout(mut self, timeout_ms: u64) -> Self {
        self.header_timeout_ms = timeout_ms;
        self
    }

    /// Set rows timeout
    #[must_use]
    pub const fn with_rows_timeout(mut self, timeout_ms: u64) -> Self {
        self.rows_timeout_ms = timeout_ms;
        self
    }

    /// Set loading indicator appear window
    #[must_use]
    pub const fn with_loading_appear_timeout(mut self, timeout_ms: u64) -> Self {
        self.loading_appear_timeout_ms = timeout_ms;
        self
    }

    /// Set stability timeout
    #[must_use]
    pub const fn with_stability_timeout(mut self, timeout_ms: u64) -> Self {
        self.stability_timeout_ms = timeout_ms;
        self
    }

    /// Set settle delay
    #[must_use]
    pub const fn with_settle(mut self, settle_ms: u64) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set default row cap
    #[must_use]
    pub const fn with_default_max_rows(mut self, rows: usize) -> Self {
        self.default_max_rows = Some(rows);
        self
    }

    /// Add an empty-state sentinel text
    #[must_use]
    pub fn with_empty_state_text(mut self, text: impl Into<String>) -> Self {
        self.empty_state_texts.push(text.into());
        self
    }

    /// Fast settings for in-memory drivers
    #[must_use]
    pub fn fast() -> Self {
        Self {
            header_timeout_ms: 200,
            rows_timeout_ms: 200,
            loading_appear_timeout_ms: 30,
            stability_timeout_ms: 200,
            settle_ms: 0,
            poll_interval_ms: 5,
            ..Self::default()
        }
    }

    /// Wait options for the header row
    #[must_use]
    pub const fn header_wait(&self) -> WaitOptions {
        WaitOptions::new(self.header_timeout_ms, self.poll_interval_ms)
    }

    /// Wait options for data rows
    #[must_use]
    pub const fn rows_wait(&self) -> WaitOptions {
        WaitOptions::new(self.rows_timeout_ms, self.poll_interval_ms)
    }

    /// Wait options for a loading indicator to show up
    #[must_use]
    pub const fn appear_wait(&self) -> WaitOptions {
        WaitOptions::new(self.loading_appear_timeout_ms, self.poll_interval_ms)
    }

    /// Wait options for a loading indicator to go away
    #[must_use]
    pub const fn stability_wait(&self) -> WaitOptions {
        WaitOptions::new(self.stability_timeout_ms, self.poll_interval_ms)
    }
}
