//! Browser console error capture
//!
//! Best-effort diagnostics only. The page may reload, block script hooks or
//! never install the buffer; every failure here degrades to "no errors seen"
//! plus a debug log, and nothing in this module should decide a test outcome.

use crate::driver::GridDriver;

/// Page-global buffer that collects `console.error` arguments
pub const ERROR_BUFFER: &str = "window.console._errors";

/// Hook `console.error` so its arguments accumulate in [`ERROR_BUFFER`]
#[must_use]
pub fn install_script() -> String {
    format!(
        "(() => {{ if ({ERROR_BUFFER}) return false; {ERROR_BUFFER} = []; \
         const original = console.error.bind(console); \
         console.error = (...args) => {{ {ERROR_BUFFER}.push(args.map(String).join(' ')); original(...args); }}; \
         return true; }})()"
    )
}

/// Read the buffer as a JSON array
#[must_use]
pub fn capture_script() -> String {
    format!("Array.from({ERROR_BUFFER} || [])")
}

/// Install the `console.error` hook.
///
/// Returns whether a new hook was installed; `false` also covers an existing
/// hook and evaluation failures.
pub async fn install_console_capture<D>(driver: &D) -> bool
where
    D: GridDriver + ?Sized,
{
    match driver.evaluate(&install_script()).await {
        Ok(value) => value.as_bool().unwrap_or(false),
        Err(e) => {
            tracing::debug!(error = %e, "console capture not installed");
            false
        }
    }
}

/// Errors collected by the hook so far; empty on any failure
pub async fn capture_console_errors<D>(driver: &D) -> Vec<String>
where
    D: GridDriver + ?Sized,
{
    let value = match driver.evaluate(&capture_script()).await {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "console errors unavailable");
            return Vec::new();
        }
    };
    let Some(items) = value.as_array() else {
        tracing::debug!(%value, "console error buffer is not an array");
        return Vec::new();
    };
    let errors: Vec<String> = items
        .iter()
        .map(|item| match item.as_str() {
            Some(text) => text.to_string(),
            None => item.to_string(),
        })
        .collect();
    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "captured console errors");
    }
    errors
}
