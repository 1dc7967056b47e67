//! Gridprobe: grid verification for browser-driven end-to-end suites
//!
//! Reads column headers and column values from rendered data grids, clicks
//! header sort affordances, and checks that the resulting column order is
//! monotonic under lexical, numeric or date comparison.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   ┌────────────┐    ┌────────────────┐    ┌────────────┐        │
//! │   │ Page       │    │ TableInspector │    │ GridDriver │        │
//! │   │ objects    │───►│ + TableHandle  │───►│ (CDP/mock) │        │
//! │   └────────────┘    └───────┬────────┘    └────────────┘        │
//! │                             ▼                                   │
//! │                  verify_column_sorted (pure)                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let driver = CdpDriver::launch(BrowserConfig::default()).await?;
//! driver.goto("https://emr.example.test/referrals").await?;
//!
//! let table = TableHandle::material_table("referrals", Selector::test_id("followup-referrals"));
//! let inspector = TableInspector::new(&driver);
//! let report = inspector
//!     .test_column_sorting_by_name(&table, "Due Date", ComparisonSemantics::Date)
//!     .await?;
//! assert!(report.passed());
//! ```

#![warn(missing_docs)]

mod attempt;
mod browser;
mod config;
mod console;
mod driver;
mod locator;
mod logging;
/// In-memory driver and fake grids for tests
pub mod mock;
mod page_object;
mod report;
mod result;
mod sort;
mod table;
mod wait;

pub use attempt::{attempt_candidates, search_and_pick, CandidateHit};
#[cfg(feature = "browser")]
pub use browser::CdpDriver;
pub use browser::BrowserConfig;
pub use config::{
    ProbeConfig, DEFAULT_HEADER_TIMEOUT_MS, DEFAULT_STABILITY_TIMEOUT_MS, ENV_PREFIX,
    NO_RECORDS_TEXT, SORT_HINT_TEXT,
};
pub use console::{capture_console_errors, install_console_capture, ERROR_BUFFER};
pub use driver::{DriverScripts, GridDriver};
pub use locator::Selector;
pub use logging::{init_json_tracing, init_tracing, DEFAULT_FILTER};
pub use page_object::{
    wait_loaded, PageObject, PageObjectBuilder, PageRegistry, SimplePageObject, UrlMatcher,
    DEFAULT_LOAD_TIMEOUT_MS,
};
pub use report::{ColumnSortReport, ResetOutcome};
pub use result::{ProbeError, ProbeResult};
pub use sort::{
    sorted_values, verify_column_sorted, ComparisonSemantics, SortDirection,
    SortVerificationResult, SortViolation,
};
pub use table::{normalize_header_label, CellValue, ColumnHeader, TableHandle, TableInspector};
pub use wait::{
    settle, wait_for_stable, wait_for_value, wait_hidden, wait_until, wait_visible, Stability,
    WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};

/// Everything needed to write a grid test
pub mod prelude {
    pub use super::mock::{MockDriver, MockGrid, SortCycle};
    pub use super::{
        attempt_candidates, init_tracing, search_and_pick, ColumnSortReport, ComparisonSemantics,
        GridDriver, PageObject, PageObjectBuilder, ProbeConfig, ProbeError, ProbeResult,
        ResetOutcome, Selector, SortDirection, TableHandle, TableInspector,
    };
    #[cfg(feature = "browser")]
    pub use super::{BrowserConfig, CdpDriver};
}
