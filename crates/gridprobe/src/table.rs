//! Table inspection: headers, column values, click-to-sort, sort checks.
//!
//! A [`TableHandle`] carries one call site's selectors for one grid. The
//! [`TableInspector`] re-reads the live page on every call; nothing read from
//! a grid is cached between operations.
//!
//! Operations on one table must not overlap: a read issued while a sort
//! click is still settling may observe a transitional order. The inspector
//! serializes click → stability wait → read within each call, but callers
//! own the ordering between calls.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{ProbeConfig, NO_RECORDS_TEXT, SORT_HINT_TEXT};
use crate::driver::GridDriver;
use crate::locator::Selector;
use crate::report::{ColumnSortReport, ResetOutcome};
use crate::result::{ProbeError, ProbeResult};
use crate::sort::{verify_column_sorted, ComparisonSemantics, SortDirection, SortVerificationResult};
use crate::wait::{self, Stability};

/// A rendered column header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnHeader {
    /// Zero-based column index
    pub index: usize,
    /// Normalized label
    pub label: String,
}

/// Raw text of one data cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellValue {
    /// Zero-based index among rendered rows (including skipped ones)
    pub row_index: usize,
    /// Zero-based column index
    pub column_index: usize,
    /// Trimmed cell text
    pub text: String,
}

/// Selectors locating one grid on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableHandle {
    /// Name used in logs and reports
    pub name: String,
    /// Grid container
    pub root: Selector,
    /// Header cells, relative to `root`
    pub header_cells: Selector,
    /// Clickable sort affordance, relative to a header cell
    pub sort_target: Option<Selector>,
    /// Data rows, relative to `root`
    pub rows: Selector,
    /// Cells, relative to a row
    pub cells: Selector,
    /// Loading indicator shown while the grid re-sorts (page-wide)
    pub loading: Option<Selector>,
    /// Texts marking an empty-state row
    pub empty_state_texts: Vec<String>,
    /// Hints stripped from header labels
    pub header_hints: Vec<String>,
}

impl TableHandle {
    /// Plain `<table>` with `thead th` headers and `tbody tr` rows
    #[must_use]
    pub fn html_table(name: impl Into<String>, root: Selector) -> Self {
        Self {
            name: name.into(),
            root,
            header_cells: Selector::css("thead th"),
            sort_target: None,
            rows: Selector::css("tbody tr"),
            cells: Selector::css("td"),
            loading: None,
            empty_state_texts: Vec::new(),
            header_hints: Vec::new(),
        }
    }

    /// MUI material-table grid with its sort label, spinner and sentinels
    #[must_use]
    pub fn material_table(name: impl Into<String>, root: Selector) -> Self {
        Self {
            sort_target: Some(Selector::css(".MuiTableSortLabel-root")),
            loading: Some(Selector::css(".MuiCircularProgress-root")),
            empty_state_texts: vec![NO_RECORDS_TEXT.to_string()],
            header_hints: vec![SORT_HINT_TEXT.to_string()],
            ..Self::html_table(name, root)
        }
    }

    /// ARIA grid built from `role` attributes
    #[must_use]
    pub fn aria_grid(name: impl Into<String>, root: Selector) -> Self {
        Self {
            header_cells: Selector::role("columnheader"),
            rows: Selector::css("[role=\"row\"]"),
            cells: Selector::css("[role=\"gridcell\"], [role=\"cell\"]"),
            ..Self::html_table(name, root)
        }
    }

    /// Override the header cell selector
    #[must_use]
    pub fn with_header_cells(mut self, selector: Selector) -> Self {
        self.header_cells = selector;
        self
    }

    /// Override the sort affordance selector
    #[must_use]
    pub fn with_sort_target(mut self, selector: Selector) -> Self {
        self.sort_target = Some(selector);
        self
    }

    /// Override the row selector
    #[must_use]
    pub fn with_rows(mut self, selector: Selector) -> Self {
        self.rows = selector;
        self
    }

    /// Override the cell selector
    #[must_use]
    pub fn with_cells(mut self, selector: Selector) -> Self {
        self.cells = selector;
        self
    }

    /// Set the loading indicator
    #[must_use]
    pub fn with_loading(mut self, selector: Selector) -> Self {
        self.loading = Some(selector);
        self
    }

    /// Add an empty-state sentinel
    #[must_use]
    pub fn with_empty_state_text(mut self, text: impl Into<String>) -> Self {
        self.empty_state_texts.push(text.into());
        self
    }

    /// Add a header hint to strip
    #[must_use]
    pub fn with_header_hint(mut self, hint: impl Into<String>) -> Self {
        self.header_hints.push(hint.into());
        self
    }

    /// All header cells
    #[must_use]
    pub fn header_cells_selector(&self) -> Selector {
        self.root.clone().within(self.header_cells.clone())
    }

    /// One header cell
    #[must_use]
    pub fn header_cell(&self, column: usize) -> Selector {
        self.header_cells_selector().nth(column)
    }

    /// What to click to sort `column`
    #[must_use]
    pub fn sort_target(&self, column: usize) -> Selector {
        match &self.sort_target {
            Some(target) => self.header_cell(column).within(target.clone()),
            None => self.header_cell(column),
        }
    }

    /// All data rows
    #[must_use]
    pub fn rows_selector(&self) -> Selector {
        self.root.clone().within(self.rows.clone())
    }

    /// Cells of one row
    #[must_use]
    pub fn row_cells(&self, row: usize) -> Selector {
        self.rows_selector().nth(row).within(self.cells.clone())
    }
}

/// Strip sort hints and collapse whitespace in a rendered header label
#[must_use]
pub fn normalize_header_label<S: AsRef<str>>(raw: &str, hints: &[S]) -> String {
    let mut label = raw.to_string();
    for hint in hints {
        let hint = hint.as_ref();
        if !hint.is_empty() {
            label = label.replace(hint, " ");
        }
    }
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reads and verifies grids through a [`GridDriver`]
#[derive(Debug)]
pub struct TableInspector<'d, D: GridDriver + ?Sized> {
    driver: &'d D,
    config: ProbeConfig,
}

impl<'d, D: GridDriver + ?Sized> TableInspector<'d, D> {
    /// Create an inspector with default configuration
    pub fn new(driver: &'d D) -> Self {
        Self::with_config(driver, ProbeConfig::default())
    }

    /// Create an inspector with explicit configuration
    pub fn with_config(driver: &'d D, config: ProbeConfig) -> Self {
        Self { driver, config }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    fn is_empty_state(&self, table: &TableHandle, text: &str) -> bool {
        table
            .empty_state_texts
            .iter()
            .chain(&self.config.empty_state_texts)
            .any(|sentinel| text.eq_ignore_ascii_case(sentinel.trim()))
    }

    /// Ordered, normalized header labels.
    ///
    /// Returns an empty vector (and logs `LocatorNotFound`) when the header
    /// row does not render within the header timeout.
    pub async fn get_column_headers(&self, table: &TableHandle) -> Vec<ColumnHeader> {
        let selector = table.header_cells_selector();
        let options = self.config.header_wait();
        if !wait::wait_visible(self.driver, &selector, &options).await.success {
            let err = ProbeError::LocatorNotFound {
                selector: selector.to_string(),
                timeout_ms: options.timeout_ms,
            };
            tracing::warn!(table = %table.name, error = %err, "header row not found");
            return Vec::new();
        }

        let raw = match self.driver.read_all_text(&selector).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(table = %table.name, error = %e, "failed to read headers");
                return Vec::new();
            }
        };

        let hints: Vec<&str> = table
            .header_hints
            .iter()
            .chain(&self.config.header_hint_suffixes)
            .map(String::as_str)
            .collect();
        let headers: Vec<ColumnHeader> = raw
            .iter()
            .enumerate()
            .map(|(index, text)| ColumnHeader {
                index,
                label: normalize_header_label(text, hints.as_slice()),
            })
            .collect();
        tracing::debug!(table = %table.name, count = headers.len(), "read column headers");
        headers
    }

    /// Index of the header whose normalized label matches `name`
    /// (case-insensitive)
    pub async fn column_index(&self, table: &TableHandle, name: &str) -> Option<usize> {
        let wanted = normalize_header_label::<&str>(name, &[]).to_lowercase();
        self.get_column_headers(table)
            .await
            .into_iter()
            .find(|h| h.label.to_lowercase() == wanted)
            .map(|h| h.index)
    }

    /// Cells of one column in row order.
    ///
    /// Rows too short for `column_index` and single-cell empty-state rows are
    /// skipped, as are cells whose own text is the empty-state text. At most `max_rows` cells are returned (falling back
    /// to the configured default).
    pub async fn get_cells(
        &self,
        table: &TableHandle,
        column_index: usize,
        max_rows: Option<usize>,
    ) -> Vec<CellValue> {
        let limit = max_rows.or(self.config.default_max_rows);
        if limit == Some(0) {
            return Vec::new();
        }

        let rows = table.rows_selector();
        let options = self.config.rows_wait();
        if !wait::wait_visible(self.driver, &rows, &options).await.success {
            let err = ProbeError::LocatorNotFound {
                selector: rows.to_string(),
                timeout_ms: options.timeout_ms,
            };
            tracing::warn!(table = %table.name, error = %err, "no rows rendered");
            return Vec::new();
        }

        let row_count = match self.driver.count(&rows).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(table = %table.name, error = %e, "failed to count rows");
                return Vec::new();
            }
        };

        let mut cells = Vec::new();
        for row_index in 0..row_count {
            if limit.is_some_and(|max| cells.len() >= max) {
                break;
            }
            let texts = match self.driver.read_all_text(&table.row_cells(row_index)).await {
                Ok(texts) => texts,
                Err(e) => {
                    tracing::debug!(table = %table.name, row_index, error = %e, "skipping unreadable row");
                    continue;
                }
            };
            if let [only] = texts.as_slice() {
                if self.is_empty_state(table, only.trim()) {
                    continue;
                }
            }
            let Some(text) = texts.get(column_index) else {
                continue;
            };
            if self.is_empty_state(table, text.trim()) {
                continue;
            }
            cells.push(CellValue {
                row_index,
                column_index,
                text: text.trim().to_string(),
            });
        }
        tracing::debug!(table = %table.name, column_index, count = cells.len(), "read column cells");
        cells
    }

    /// Text values of one column in row order (see [`Self::get_cells`])
    pub async fn get_column_values(
        &self,
        table: &TableHandle,
        column_index: usize,
        max_rows: Option<usize>,
    ) -> Vec<String> {
        self.get_cells(table, column_index, max_rows)
            .await
            .into_iter()
            .map(|cell| cell.text)
            .collect()
    }

    /// Click a header's sort affordance and wait for the grid to settle.
    ///
    /// Fails only when the header never renders or the click itself fails.
    /// A loading indicator that outlives the stability timeout is logged as
    /// `UnstableState` and the call returns normally.
    pub async fn click_column_header(
        &self,
        table: &TableHandle,
        column_index: usize,
    ) -> ProbeResult<()> {
        let header = table.header_cell(column_index);
        let options = self.config.header_wait();
        if !wait::wait_visible(self.driver, &header, &options).await.success {
            return Err(ProbeError::LocatorNotFound {
                selector: header.to_string(),
                timeout_ms: options.timeout_ms,
            });
        }

        self.driver.click(&table.sort_target(column_index)).await?;
        tracing::debug!(table = %table.name, column_index, "clicked column header");

        if let Some(loading) = &table.loading {
            let outcome = wait::wait_for_stable(
                self.driver,
                loading,
                &self.config.appear_wait(),
                &self.config.stability_wait(),
            )
            .await;
            if outcome == Stability::Unstable {
                let err = ProbeError::UnstableState {
                    selector: loading.to_string(),
                    timeout_ms: self.config.stability_timeout_ms,
                };
                tracing::warn!(table = %table.name, error = %err, "continuing with unsettled grid");
            }
        }
        wait::settle(self.config.settle_ms).await;
        Ok(())
    }

    /// Check that `values` are ordered (pure, see [`verify_column_sorted`])
    #[must_use]
    pub fn verify_column_sorted(
        &self,
        values: &[String],
        direction: SortDirection,
        semantics: ComparisonSemantics,
    ) -> SortVerificationResult {
        verify_column_sorted(values, direction, semantics)
    }

    async fn sort_step(
        &self,
        table: &TableHandle,
        column_index: usize,
        column_name: &str,
        direction: SortDirection,
        semantics: ComparisonSemantics,
        report: &mut ColumnSortReport,
    ) -> ProbeResult<()> {
        self.click_column_header(table, column_index).await?;
        let values = self.get_column_values(table, column_index, None).await;
        if values.is_empty() {
            report.warn(format!("no values after {direction} sort of '{column_name}'"));
        }
        let result = verify_column_sorted(&values, direction, semantics).for_column(column_index);
        report.record(result.clone());
        if let Some(violation) = result.violation {
            return Err(ProbeError::ComparisonFailure {
                column: column_name.to_string(),
                direction,
                position: violation.position,
                left: violation.left,
                right: violation.right,
                observed: result.observed_values,
            });
        }
        tracing::info!(table = %table.name, column = column_name, %direction, count = values.len(), "column sorted");
        Ok(())
    }

    /// Sort a column ascending, then descending, then click once more.
    ///
    /// An out-of-order ascending or descending read fails with
    /// [`ProbeError::ComparisonFailure`]. The third click's order is
    /// application-defined: a mismatch with the baseline is only a warning.
    pub async fn test_column_sorting(
        &self,
        table: &TableHandle,
        column_index: usize,
        column_name: &str,
        semantics: ComparisonSemantics,
    ) -> ProbeResult<ColumnSortReport> {
        let started = Instant::now();
        let mut report = ColumnSortReport::new(&table.name, column_index, column_name, semantics);

        let baseline = self.get_column_values(table, column_index, None).await;
        report.baseline.clone_from(&baseline);

        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            self.sort_step(table, column_index, column_name, direction, semantics, &mut report)
                .await?;
        }

        self.click_column_header(table, column_index).await?;
        let after_reset = self.get_column_values(table, column_index, None).await;
        if after_reset == baseline {
            report.reset = ResetOutcome::Restored;
        } else {
            report.reset = ResetOutcome::Differs {
                observed: after_reset,
            };
            report.warn(format!(
                "third click on '{column_name}' did not restore the original order"
            ));
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(table = %table.name, summary = %report.summary(), "column sorting verified");
        Ok(report)
    }

    /// [`Self::test_column_sorting`] addressing the column by header label
    pub async fn test_column_sorting_by_name(
        &self,
        table: &TableHandle,
        column_name: &str,
        semantics: ComparisonSemantics,
    ) -> ProbeResult<ColumnSortReport> {
        let Some(column_index) = self.column_index(table, column_name).await else {
            return Err(ProbeError::LocatorNotFound {
                selector: format!("{} column '{column_name}'", table.header_cells_selector()),
                timeout_ms: self.config.header_timeout_ms,
            });
        };
        self.test_column_sorting(table, column_index, column_name, semantics)
            .await
    }
}
