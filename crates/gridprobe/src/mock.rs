//! In-memory driver for unit and integration tests.
//!
//! [`MockDriver`] keeps a selector-keyed fake DOM: every selector maps to the
//! texts of its matches. Click and fill handlers mutate that state, which is
//! enough to model a sortable grid ([`MockGrid`]) with a loading spinner, a
//! search box that populates a dropdown, or any other sequence of UI states.
//!
//! Selectors are matched structurally, so tests must ask for exactly the
//! selectors the code under test builds (use the [`TableHandle`] helpers).

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::driver::GridDriver;
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::sort::{ComparisonSemantics, SortDirection};
use crate::table::TableHandle;

type ClickHandler = Arc<dyn Fn(&mut MockState) + Send + Sync>;
type FillHandler = Arc<dyn Fn(&mut MockState, &str) + Send + Sync>;

/// Mutable fake page behind a [`MockDriver`]
#[derive(Default)]
pub struct MockState {
    texts: HashMap<Selector, Vec<String>>,
    visibility: HashMap<Selector, VecDeque<bool>>,
    values: HashMap<Selector, String>,
    js_results: Vec<(String, serde_json::Value)>,
    click_handlers: HashMap<Selector, ClickHandler>,
    fill_handlers: HashMap<Selector, FillHandler>,
    grids: Vec<MountedGrid>,
    history: Vec<String>,
}

impl std::fmt::Debug for MockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockState")
            .field("texts", &self.texts)
            .field("values", &self.values)
            .field("grids", &self.grids.len())
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl MockState {
    /// Render `texts` as the matches of `selector`
    pub fn set_texts<I, S>(&mut self, selector: &Selector, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let _ = self
            .texts
            .insert(selector.clone(), texts.into_iter().map(Into::into).collect());
    }

    /// Remove every match of `selector`
    pub fn clear(&mut self, selector: &Selector) {
        let _ = self.texts.remove(selector);
    }

    /// Script successive `is_visible` answers; the last answer repeats
    pub fn script_visibility<I>(&mut self, selector: &Selector, answers: I)
    where
        I: IntoIterator<Item = bool>,
    {
        let _ = self
            .visibility
            .insert(selector.clone(), answers.into_iter().collect());
    }

    /// Current value of a filled input
    #[must_use]
    pub fn value(&self, selector: &Selector) -> Option<&str> {
        self.values.get(selector).map(String::as_str)
    }

    fn is_visible(&mut self, selector: &Selector) -> bool {
        if let Some(queue) = self.visibility.get_mut(selector) {
            return if queue.len() > 1 {
                queue.pop_front().unwrap_or(false)
            } else {
                queue.front().copied().unwrap_or(false)
            };
        }
        self.texts.get(selector).is_some_and(|t| !t.is_empty())
    }

    fn click_grid_header(&mut self, grid: usize, column: usize) {
        let Some(mounted) = self.grids.get_mut(grid) else {
            return;
        };
        mounted.clicks += 1;
        mounted.sorted = match (mounted.grid.cycle, mounted.sorted) {
            (SortCycle::Ignore, current) => current,
            (SortCycle::ResetOnThirdClick, Some((c, SortDirection::Descending)))
                if c == column =>
            {
                None
            }
            (_, Some((c, direction))) if c == column => Some((c, direction.reversed())),
            (_, _) => Some((column, SortDirection::Ascending)),
        };
        let spinner = mounted
            .handle
            .loading
            .clone()
            .filter(|_| mounted.grid.spinner_polls > 0)
            .map(|sel| (sel, mounted.grid.spinner_polls));
        self.render_grid(grid);
        if let Some((loading, polls)) = spinner {
            let answers: Vec<bool> = std::iter::repeat(true)
                .take(polls)
                .chain(std::iter::once(false))
                .collect();
            self.script_visibility(&loading, answers);
        }
    }

    fn render_grid(&mut self, grid: usize) {
        let Some(mounted) = self.grids.get(grid) else {
            return;
        };
        let handle = mounted.handle.clone();
        let headers = mounted.grid.headers.clone();
        let rows = mounted.displayed_rows();
        let empty_text = mounted.grid.empty_text.clone();

        self.set_texts(&handle.header_cells_selector(), headers.clone());
        for (i, header) in headers.iter().enumerate() {
            self.set_texts(&handle.header_cell(i), [header.clone()]);
            let target = handle.sort_target(i);
            if target != handle.header_cell(i) {
                self.set_texts(&target, [header.clone()]);
            }
        }

        if rows.is_empty() {
            self.set_texts(&handle.rows_selector(), [empty_text.clone()]);
            self.set_texts(&handle.row_cells(0), [empty_text]);
        } else {
            self.set_texts(&handle.rows_selector(), rows.iter().map(|r| r.join("\t")));
            for (i, cells) in rows.iter().enumerate() {
                self.set_texts(&handle.row_cells(i), cells.clone());
            }
        }
    }
}

/// How a mock grid reacts to repeated clicks on the same header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortCycle {
    /// unsorted → ascending → descending → unsorted (material-table)
    #[default]
    ResetOnThirdClick,
    /// ascending ↔ descending
    Toggle,
    /// Clicks never reorder rows
    Ignore,
}

/// A sortable grid rendered by [`MockDriver::mount_grid`]
#[derive(Debug, Clone)]
pub struct MockGrid {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    semantics: HashMap<usize, ComparisonSemantics>,
    cycle: SortCycle,
    spinner_polls: usize,
    empty_text: String,
}

impl MockGrid {
    /// Create a grid with the given rendered header labels
    #[must_use]
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            semantics: HashMap::new(),
            cycle: SortCycle::default(),
            spinner_polls: 0,
            empty_text: crate::config::NO_RECORDS_TEXT.to_string(),
        }
    }

    /// Append a data row
    #[must_use]
    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// How the application orders a column when sorting it
    #[must_use]
    pub fn with_column_semantics(mut self, column: usize, semantics: ComparisonSemantics) -> Self {
        let _ = self.semantics.insert(column, semantics);
        self
    }

    /// Set the click cycle
    #[must_use]
    pub const fn with_cycle(mut self, cycle: SortCycle) -> Self {
        self.cycle = cycle;
        self
    }

    /// Keep the loading indicator visible for `polls` checks after each click
    #[must_use]
    pub const fn with_spinner(mut self, polls: usize) -> Self {
        self.spinner_polls = polls;
        self
    }

    /// Text of the empty-state row
    #[must_use]
    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = text.into();
        self
    }
}

#[derive(Debug)]
struct MountedGrid {
    handle: TableHandle,
    grid: MockGrid,
    sorted: Option<(usize, SortDirection)>,
    clicks: usize,
}

impl MountedGrid {
    fn displayed_rows(&self) -> Vec<Vec<String>> {
        let mut rows = self.grid.rows.clone();
        if let Some((column, direction)) = self.sorted {
            let semantics = self
                .grid
                .semantics
                .get(&column)
                .copied()
                .unwrap_or_default();
            rows.sort_by(|a, b| {
                let left = a.get(column).map_or("", String::as_str);
                let right = b.get(column).map_or("", String::as_str);
                let ord = semantics.compare(left, right);
                match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }
        rows
    }
}

/// Mock driver for unit testing
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver with an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Render `texts` as the matches of `selector`
    pub fn set_texts<I, S>(&self, selector: &Selector, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state().set_texts(selector, texts);
    }

    /// Remove every match of `selector`
    pub fn clear(&self, selector: &Selector) {
        self.state().clear(selector);
    }

    /// Script successive `is_visible` answers; the last answer repeats
    pub fn script_visibility<I>(&self, selector: &Selector, answers: I)
    where
        I: IntoIterator<Item = bool>,
    {
        self.state().script_visibility(selector, answers);
    }

    /// Run `handler` whenever `selector` is clicked
    pub fn on_click<F>(&self, selector: &Selector, handler: F)
    where
        F: Fn(&mut MockState) + Send + Sync + 'static,
    {
        let _ = self
            .state()
            .click_handlers
            .insert(selector.clone(), Arc::new(handler));
    }

    /// Run `handler` whenever `selector` is filled
    pub fn on_fill<F>(&self, selector: &Selector, handler: F)
    where
        F: Fn(&mut MockState, &str) + Send + Sync + 'static,
    {
        let _ = self
            .state()
            .fill_handlers
            .insert(selector.clone(), Arc::new(handler));
    }

    /// Answer `evaluate` calls whose script contains `pattern`
    pub fn set_js_result(&self, pattern: impl Into<String>, result: serde_json::Value) {
        self.state().js_results.push((pattern.into(), result));
    }

    /// Render a sortable grid at the selectors described by `handle`
    pub fn mount_grid(&self, handle: &TableHandle, grid: MockGrid) {
        let mut state = self.state();
        let index = state.grids.len();
        let columns = grid.headers.len();
        state.grids.push(MountedGrid {
            handle: handle.clone(),
            grid,
            sorted: None,
            clicks: 0,
        });
        for column in 0..columns {
            let handler: ClickHandler =
                Arc::new(move |state: &mut MockState| state.click_grid_header(index, column));
            let _ = state
                .click_handlers
                .insert(handle.sort_target(column), handler);
        }
        state.render_grid(index);
    }

    /// Total header clicks received by the grid mounted under `name`
    #[must_use]
    pub fn grid_clicks(&self, name: &str) -> usize {
        self.state()
            .grids
            .iter()
            .filter(|g| g.handle.name == name)
            .map(|g| g.clicks)
            .sum()
    }

    /// Current value of a filled input
    #[must_use]
    pub fn value_of(&self, selector: &Selector) -> Option<String> {
        self.state().value(selector).map(str::to_string)
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state().history.iter().any(|c| c.starts_with(method))
    }
}

#[async_trait]
impl GridDriver for MockDriver {
    async fn count(&self, selector: &Selector) -> ProbeResult<usize> {
        Ok(self.state().texts.get(selector).map_or(0, Vec::len))
    }

    async fn is_visible(&self, selector: &Selector) -> ProbeResult<bool> {
        Ok(self.state().is_visible(selector))
    }

    async fn read_all_text(&self, selector: &Selector) -> ProbeResult<Vec<String>> {
        Ok(self.state().texts.get(selector).cloned().unwrap_or_default())
    }

    async fn click(&self, selector: &Selector) -> ProbeResult<()> {
        let mut state = self.state();
        state.history.push(format!("click:{selector}"));
        if let Some(handler) = state.click_handlers.get(selector).cloned() {
            handler(&mut *state);
            return Ok(());
        }
        if state.texts.contains_key(selector) {
            return Ok(());
        }
        Err(ProbeError::LocatorNotFound {
            selector: selector.to_string(),
            timeout_ms: 0,
        })
    }

    async fn fill(&self, selector: &Selector, text: &str) -> ProbeResult<()> {
        let mut state = self.state();
        state.history.push(format!("fill:{selector}={text}"));
        let _ = state.values.insert(selector.clone(), text.to_string());
        if let Some(handler) = state.fill_handlers.get(selector).cloned() {
            handler(&mut *state, text);
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value> {
        let mut state = self.state();
        state.history.push("evaluate".to_string());
        state
            .js_results
            .iter()
            .find(|(pattern, _)| script.contains(pattern.as_str()))
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ProbeError::driver("no mock result for script"))
    }
}
