//! Sort-order verification for column values.
//!
//! Pure functions only: nothing here touches the browser. Values are compared
//! pairwise under a [`ComparisonSemantics`] and checked against a
//! [`SortDirection`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Date-only formats, two-digit years before four-digit ones
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d", "%d-%b-%Y", "%b %d, %Y", "%B %d, %Y",
];

/// Date-time formats; `%Y` also takes two digits, so `%y` variants go first
const DATE_TIME_FORMATS: &[&str] = &[
    "%m/%d/%y %I:%M %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Expected ordering of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest value first
    Ascending,
    /// Largest value first
    Descending,
}

impl SortDirection {
    /// The other direction
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Whether an adjacent pair with ordering `ord` respects this direction
    #[must_use]
    pub fn accepts(self, ord: Ordering) -> bool {
        match self {
            Self::Ascending => ord != Ordering::Greater,
            Self::Descending => ord != Ordering::Less,
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascending => write!(f, "ascending"),
            Self::Descending => write!(f, "descending"),
        }
    }
}

/// How two cell texts are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonSemantics {
    /// Locale-style string comparison
    #[default]
    Lexical,
    /// Numbers after stripping currency, separators and units
    Numeric,
    /// Calendar dates; unparseable values sort after every valid date
    Date,
}

impl ComparisonSemantics {
    /// Compare two cell texts under these semantics
    #[must_use]
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Lexical => compare_lexical(a, b),
            Self::Numeric => match (parse_numeric(a), parse_numeric(b)) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => compare_lexical(a, b),
            },
            Self::Date => match (parse_date(a), parse_date(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => compare_lexical(a, b),
            },
        }
    }
}

impl std::fmt::Display for ComparisonSemantics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Numeric => write!(f, "numeric"),
            Self::Date => write!(f, "date"),
        }
    }
}

/// First adjacent pair found out of order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortViolation {
    /// Index of `left` in the observed sequence
    pub position: usize,
    /// Value at `position`
    pub left: String,
    /// Value at `position + 1`
    pub right: String,
}

/// Outcome of one sort verification, immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortVerificationResult {
    /// Column the values came from, when known
    pub column_index: Option<usize>,
    /// Direction that was checked
    pub direction: SortDirection,
    /// Semantics used for comparison
    pub semantics: ComparisonSemantics,
    /// Every observed value in row order
    pub observed_values: Vec<String>,
    /// Whether every adjacent pair respects `direction`
    pub is_sorted: bool,
    /// First offending pair, if any
    pub violation: Option<SortViolation>,
}

impl SortVerificationResult {
    /// Attach the column index the values were read from
    #[must_use]
    pub fn for_column(mut self, column_index: usize) -> Self {
        self.column_index = Some(column_index);
        self
    }
}

/// Check that `values` are ordered in `direction` under `semantics`.
///
/// Stops at the first violating pair but always keeps the full sequence for
/// diagnostics. Never fails: callers decide what an unsorted result means.
#[must_use]
pub fn verify_column_sorted(
    values: &[String],
    direction: SortDirection,
    semantics: ComparisonSemantics,
) -> SortVerificationResult {
    let violation = values.windows(2).enumerate().find_map(|(position, pair)| {
        let ord = semantics.compare(&pair[0], &pair[1]);
        (!direction.accepts(ord)).then(|| SortViolation {
            position,
            left: pair[0].clone(),
            right: pair[1].clone(),
        })
    });

    SortVerificationResult {
        column_index: None,
        direction,
        semantics,
        observed_values: values.to_vec(),
        is_sorted: violation.is_none(),
        violation,
    }
}

/// Return `values` sorted in `direction` under `semantics` (stable)
#[must_use]
pub fn sorted_values(
    values: &[String],
    direction: SortDirection,
    semantics: ComparisonSemantics,
) -> Vec<String> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| {
        let ord = semantics.compare(a, b);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    sorted
}

/// Collation levels: base letters, then accents, then case (lowercase first)
fn compare_lexical(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.trim(), b.trim());
    let (da, db) = (decomposed_lowercase(a), decomposed_lowercase(b));
    base_letters(&da)
        .cmp(base_letters(&db))
        .then_with(|| da.cmp(&db))
        .then_with(|| b.cmp(a))
}

/// Lowercased canonical decomposition
fn decomposed_lowercase(text: &str) -> String {
    text.nfd().collect::<String>().to_lowercase()
}

/// Characters of a decomposed string without combining marks
fn base_letters(decomposed: &str) -> impl Iterator<Item = char> + '_ {
    decomposed.chars().filter(|c| !is_combining_mark(*c))
}

fn numeric_noise() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| Regex::new(r"[^0-9.\-]").expect("static regex"))
}

/// Keep digits, `.` and `-`, then parse
pub(crate) fn parse_numeric(text: &str) -> Option<f64> {
    let cleaned = numeric_noise().replace_all(text, "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a calendar date, with or without a time component
pub(crate) fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}
