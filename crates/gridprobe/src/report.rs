//! Sort verification reports

use serde::{Deserialize, Serialize};

use crate::result::ProbeResult;
use crate::sort::{ComparisonSemantics, SortDirection, SortVerificationResult};

/// What the third header click did to the row order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResetOutcome {
    /// Third click was not performed
    #[default]
    Skipped,
    /// Order matched the pre-sort baseline
    Restored,
    /// Order differed from the baseline
    Differs {
        /// Values read after the third click
        observed: Vec<String>,
    },
}

/// Outcome of a full click-to-sort cycle on one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSortReport {
    /// Table name
    pub table: String,
    /// Column index
    pub column_index: usize,
    /// Column label used in messages
    pub column_name: String,
    /// Comparison used for both directions
    pub semantics: ComparisonSemantics,
    /// Values before the first click
    pub baseline: Vec<String>,
    /// Result after the first click
    pub ascending: Option<SortVerificationResult>,
    /// Result after the second click
    pub descending: Option<SortVerificationResult>,
    /// Result of the third click
    pub reset: ResetOutcome,
    /// Non-fatal observations
    pub warnings: Vec<String>,
    /// Wall-clock time for the cycle
    pub elapsed_ms: u64,
}

impl ColumnSortReport {
    /// Start an empty report
    #[must_use]
    pub fn new(
        table: impl Into<String>,
        column_index: usize,
        column_name: impl Into<String>,
        semantics: ComparisonSemantics,
    ) -> Self {
        Self {
            table: table.into(),
            column_index,
            column_name: column_name.into(),
            semantics,
            baseline: Vec::new(),
            ascending: None,
            descending: None,
            reset: ResetOutcome::Skipped,
            warnings: Vec::new(),
            elapsed_ms: 0,
        }
    }

    /// Store a verification under its direction
    pub fn record(&mut self, result: SortVerificationResult) {
        match result.direction {
            SortDirection::Ascending => self.ascending = Some(result),
            SortDirection::Descending => self.descending = Some(result),
        }
    }

    /// Record and log a non-fatal observation
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(table = %self.table, column = %self.column_name, "{message}");
        self.warnings.push(message);
    }

    /// Both directions were verified and sorted
    #[must_use]
    pub fn passed(&self) -> bool {
        [&self.ascending, &self.descending]
            .iter()
            .all(|r| r.as_ref().is_some_and(|r| r.is_sorted))
    }

    /// One-line human summary
    #[must_use]
    pub fn summary(&self) -> String {
        let status = if self.passed() { "PASS" } else { "FAIL" };
        let reset = match &self.reset {
            ResetOutcome::Skipped => "reset skipped",
            ResetOutcome::Restored => "reset restored",
            ResetOutcome::Differs { .. } => "reset differs",
        };
        format!(
            "{status} {}[{}] '{}' ({}): {reset}, {} warning(s), {}ms",
            self.table,
            self.column_index,
            self.column_name,
            self.semantics,
            self.warnings.len(),
            self.elapsed_ms
        )
    }

    /// Pretty JSON for artifacts
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
