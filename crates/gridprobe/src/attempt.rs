//! Attempt-with-candidates
//!
//! Bounded search over candidate inputs: try each in order until one
//! succeeds. This is not a transient-failure retry; a candidate that fails is
//! never tried again.

use std::future::Future;

use crate::driver::GridDriver;
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{self, WaitOptions};

/// First candidate that satisfied the predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateHit<C, T> {
    /// Zero-based position in the candidate sequence
    pub index: usize,
    /// The successful candidate
    pub candidate: C,
    /// What the predicate produced for it
    pub output: T,
}

/// Try `candidates` in order with `predicate`.
///
/// `Ok(Some(_))` ends the search. `Ok(None)` and `Err(_)` move on to the next
/// candidate (errors are logged at debug level). Running out of candidates
/// yields [`ProbeError::CandidatesExhausted`].
pub async fn attempt_candidates<C, T, I, F, Fut>(
    candidates: I,
    mut predicate: F,
) -> ProbeResult<CandidateHit<C, T>>
where
    I: IntoIterator<Item = C>,
    C: Clone + std::fmt::Debug,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let mut tried = 0;
    for (index, candidate) in candidates.into_iter().enumerate() {
        tried += 1;
        match predicate(candidate.clone()).await {
            Ok(Some(output)) => {
                tracing::debug!(index, ?candidate, "candidate accepted");
                return Ok(CandidateHit {
                    index,
                    candidate,
                    output,
                });
            }
            Ok(None) => tracing::debug!(index, ?candidate, "candidate rejected"),
            Err(e) => tracing::debug!(index, ?candidate, error = %e, "candidate failed"),
        }
    }
    Err(ProbeError::CandidatesExhausted { tried })
}

/// Type each search term into `input` until `option` entries appear, then
/// click the first option.
///
/// Returns the accepted term and the text of the option that was clicked.
pub async fn search_and_pick<D, I, S>(
    driver: &D,
    input: &Selector,
    option: &Selector,
    terms: I,
    options: &WaitOptions,
) -> ProbeResult<CandidateHit<String, String>>
where
    D: GridDriver + ?Sized,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let first = option.clone().first();
    let hit = attempt_candidates(terms.into_iter().map(Into::into), |term: String| {
        let first = first.clone();
        async move {
            driver.fill(input, &term).await?;
            let text = wait::wait_for_value(options, || async {
                let text = driver.read_text(&first).await?;
                Ok::<_, ProbeError>(text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()))
            })
            .await;
            Ok::<_, ProbeError>(text)
        }
    })
    .await?;

    driver.click(&first).await?;
    tracing::info!(term = %hit.candidate, option = %hit.output, "picked search result");
    Ok(hit)
}
