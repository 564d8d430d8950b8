//! Cancellation and deadlines for a single search.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Carries the cancellation signal and optional deadline of one search.
///
/// Cloning shares the underlying token, so cancelling any clone stops
/// every search holding it.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    token: CancellationToken,
    deadline: Option<Instant>,
    budget: Option<Duration>,
}

impl SearchContext {
    /// A context that is never cancelled unless [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().timeout(timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        let budget = deadline.saturating_duration_since(Instant::now());
        Self {
            deadline: Some(deadline),
            budget: Some(budget),
            ..Self::default()
        }
    }

    /// Derive a context sharing this one's token, bounded by `timeout`.
    pub fn timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now().checked_add(timeout);
        Self {
            token: self.token.clone(),
            deadline,
            budget: deadline.map(|_| timeout),
        }
    }

    /// Wrap an existing token, e.g. one tied to a signal handler.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `Ok` while the search may continue.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(self.expired()),
            _ => Ok(()),
        }
    }

    /// Resolves once the search must stop, with the reason.
    pub async fn done(&self) -> Error {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Error::Cancelled,
                    _ = tokio::time::sleep_until(deadline.into()) => self.expired(),
                }
            }
            None => {
                self.token.cancelled().await;
                Error::Cancelled
            }
        }
    }

    fn expired(&self) -> Error {
        let millis = self.budget.unwrap_or_default().as_millis();
        Error::Timeout {
            millis: u64::try_from(millis).unwrap_or(u64::MAX),
        }
    }
}
