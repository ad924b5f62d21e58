//! `RetryPolicy` implementation for `BackoffPolicy`.

use std::future::Future;

use crate::application::cancel::Cancellation;
use crate::application::ports::{RetryPolicy, Retryable};
use crate::domain::BackoffPolicy;
use crate::domain::ExecError;

impl Retryable for ExecError {
    fn is_retryable(&self) -> bool {
        ExecError::is_retryable(self)
    }

    fn cancelled() -> Self {
        ExecError::Cancelled
    }
}

impl RetryPolicy for BackoffPolicy {
    async fn run<T, E, F, Fut>(&self, cancel: &Cancellation, mut attempt: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::fmt::Display,
    {
        let max = self.attempts();
        let mut n = 1;
        loop {
            if cancel.is_cancelled() {
                return Err(E::cancelled());
            }
            let err = match attempt(n).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if !err.is_retryable() || n >= max {
                return Err(err);
            }

            n += 1;
            let wait = self.backoff(n);
            tracing::warn!(attempt = n - 1, max, error = %err, ?wait, "attempt failed, retrying");
            tokio::select! {
                () = tokio::time::sleep(wait) => {}
                () = cancel.cancelled() => return Err(E::cancelled()),
            }
        }
    }
}
