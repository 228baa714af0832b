//! Bounded external calls
//!
//! Every call that may block on I/O (connectivity probe, model request, geocode
//! lookup) runs through [`call_with_deadline`]. The caller decides what a timeout
//! means; nothing here retries.

use std::future::Future;
use std::time::Duration;

use crate::{error::QueryError, Result};

/// Outcome of a call bounded by a deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deadline<T> {
    /// The call finished in time with this value
    Completed(T),
    /// The limit elapsed first; the call was dropped
    TimedOut(Duration),
}

impl<T> Deadline<T> {
    /// Whether the limit elapsed
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Deadline::TimedOut(_))
    }

    /// Value if the call completed
    pub fn completed(self) -> Option<T> {
        match self {
            Deadline::Completed(value) => Some(value),
            Deadline::TimedOut(_) => None,
        }
    }
}

impl<T> Deadline<Result<T>> {
    /// Flatten into a single result, mapping a timeout to [`QueryError::Timeout`]
    pub fn into_result(self) -> Result<T> {
        match self {
            Deadline::Completed(result) => result,
            Deadline::TimedOut(limit) => Err(QueryError::Timeout(limit)),
        }
    }
}

/// Run `future` for at most `limit`.
pub async fn call_with_deadline<F>(limit: Duration, future: F) -> Deadline<F::Output>
where
    F: Future,
{
    match tokio::time::timeout(limit, future).await {
        Ok(value) => Deadline::Completed(value),
        Err(_) => Deadline::TimedOut(limit),
    }
}
