//! Cancellation scope shared by the collaborator calls of one request.
//!
//! A [`RequestScope`] is derived from a parent [`CancellationToken`] and
//! carries an absolute deadline, so the budget covers every call made under
//! it, not each call separately. Dropping the scope cancels its token.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("request scope was cancelled")]
    Cancelled,
    #[error("request scope deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug)]
pub struct RequestScope {
    token: CancellationToken,
    deadline: Instant,
}

impl RequestScope {
    /// Child scope of `parent` (or of a fresh root token) expiring after `timeout`.
    pub fn derive(parent: Option<&CancellationToken>, timeout: Duration) -> Self {
        let token = parent
            .map(CancellationToken::child_token)
            .unwrap_or_else(CancellationToken::new);

        Self {
            token,
            deadline: Instant::now() + timeout,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `fut` until it completes, the scope is cancelled, or the
    /// deadline passes, whichever comes first. The future is dropped on
    /// cancellation or expiry.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, ScopeError>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ScopeError::Cancelled),
            _ = sleep_until(self.deadline) => Err(ScopeError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_within_budget() {
        let scope = RequestScope::derive(None, Duration::from_secs(5));
        let out = scope.run(async { 42 }).await;

        assert_eq!(out, Ok(42));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_is_shared_across_calls() {
        let scope = RequestScope::derive(None, Duration::from_secs(5));

        let first = scope.run(tokio::time::sleep(Duration::from_secs(3))).await;
        assert_eq!(first, Ok(()));

        // 3s already spent; another 3s overruns the 5s budget.
        let second = scope.run(tokio::time::sleep(Duration::from_secs(3))).await;
        assert_eq!(second, Err(ScopeError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn parent_cancellation_aborts_in_flight_call() {
        let parent = CancellationToken::new();
        let scope = RequestScope::derive(Some(&parent), Duration::from_secs(60));

        let cancel = parent.clone();
        tokio::spawn(async move { cancel.cancel() });

        let out = scope.run(std::future::pending::<()>()).await;
        assert_eq!(out, Err(ScopeError::Cancelled));
        assert!(scope.is_cancelled());
    }

    #[tokio::test]
    async fn drop_releases_child_but_not_parent() {
        let parent = CancellationToken::new();
        let scope = RequestScope::derive(Some(&parent), Duration::from_secs(5));
        let child = scope.token().clone();

        drop(scope);

        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn already_cancelled_parent_short_circuits() {
        let parent = CancellationToken::new();
        parent.cancel();

        let scope = RequestScope::derive(Some(&parent), Duration::from_secs(5));
        let out = scope.run(async { 1 }).await;

        assert_eq!(out, Err(ScopeError::Cancelled));
    }
}
