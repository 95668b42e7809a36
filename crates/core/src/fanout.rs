//! Bounded, order-preserving fan-out with all-settle semantics.
//!
//! Every task runs to completion and reports its own `Result`; one failure
//! never cancels or hides its siblings. Results come back in input order
//! regardless of completion order.

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Run `tasks` with at most `limit` in flight and collect every result.
///
/// A `limit` of `0` is treated as `1`.
pub async fn settle_all<I, F, T, E>(tasks: I, limit: usize) -> Vec<Result<T, E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    stream::iter(tasks)
        .buffered(limit.max(1))
        .collect()
        .await
}

/// Split settled results into successes and failures, keeping their indices.
pub fn partition_settled<T, E>(results: Vec<Result<T, E>>) -> (Vec<(usize, T)>, Vec<(usize, E)>) {
    let mut ok = Vec::new();
    let mut err = Vec::new();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(value) => ok.push((index, value)),
            Err(e) => err.push((index, e)),
        }
    }
    (ok, err)
}
