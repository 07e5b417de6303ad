// Bounded polling: repeat a fetch until its result matches, time runs out,
// or the caller cancels

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep_until, timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::telemetry::generate_correlation_id;

/// Result of a finished poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Matched(T),
    TimedOut,
    Cancelled,
}

impl<T> PollOutcome<T> {
    pub fn matched(self) -> Option<T> {
        match self {
            PollOutcome::Matched(value) => Some(value),
            PollOutcome::TimedOut | PollOutcome::Cancelled => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError<E> {
    #[error("fetch attempt {attempt} failed: {error}")]
    FetchFailed { attempt: u32, error: E },
}

/// What a failed fetch attempt does to the poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchErrorPolicy {
    /// Log the failure and keep polling until the deadline
    #[default]
    Continue,
    /// Stop and return the failure
    Abort,
}

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub timeout: Duration,
    pub interval: Duration,
    pub on_error: FetchErrorPolicy,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            interval: Duration::from_secs(1),
            on_error: FetchErrorPolicy::Continue,
        }
    }
}

/// Repeats a fetch until `matcher` accepts its value.
///
/// One fetch is outstanding at a time and every attempt is preceded by a
/// wait of one interval. Once cancelled, the service stays cancelled.
pub struct PollService<T> {
    matcher: Box<dyn Fn(&T) -> bool + Send + Sync>,
    on_error: FetchErrorPolicy,
    cancel: CancellationToken,
}

impl<T> std::fmt::Debug for PollService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollService")
            .field("on_error", &self.on_error)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl<T> PollService<T> {
    pub fn new(matcher: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            matcher: Box::new(matcher),
            on_error: FetchErrorPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_error_policy(mut self, policy: FetchErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Replaces the service's own token, e.g. with a child of a caller-owned one
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Interrupts a running poll before its next attempt
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this service from another task
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Polls with the timeout, interval and error policy from `settings`
    pub async fn poll_with<F, Fut, E>(
        &self,
        fetch: F,
        settings: &PollSettings,
    ) -> Result<PollOutcome<T>, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        self.run(fetch, settings.timeout, settings.interval, settings.on_error)
            .await
    }

    /// Polls until a fetched value matches, `timeout` elapses or the service
    /// is cancelled.
    ///
    /// No attempt is started if it would fire after the deadline. A fetch that
    /// is still running at the deadline is abandoned and the poll times out.
    pub async fn poll<F, Fut, E>(
        &self,
        fetch: F,
        timeout: Duration,
        interval: Duration,
    ) -> Result<PollOutcome<T>, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        self.run(fetch, timeout, interval, self.on_error).await
    }

    async fn run<F, Fut, E>(
        &self,
        mut fetch: F,
        timeout: Duration,
        interval: Duration,
        on_error: FetchErrorPolicy,
    ) -> Result<PollOutcome<T>, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let poll_id = generate_correlation_id();
        let deadline = Instant::now() + timeout;
        let mut attempt: u32 = 0;

        debug!(poll.id = %poll_id, ?timeout, ?interval, "Starting poll");

        loop {
            if self.cancel.is_cancelled() {
                info!(poll.id = %poll_id, attempts = attempt, "Poll cancelled");
                return Ok(PollOutcome::Cancelled);
            }

            let next_attempt = Instant::now() + interval;
            if next_attempt > deadline {
                info!(poll.id = %poll_id, attempts = attempt, "Poll timed out");
                return Ok(PollOutcome::TimedOut);
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(poll.id = %poll_id, attempts = attempt, "Poll cancelled while waiting");
                    return Ok(PollOutcome::Cancelled);
                }
                _ = sleep_until(next_attempt) => {}
            }

            attempt += 1;
            let fetched = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(poll.id = %poll_id, attempt, "Poll cancelled during fetch");
                    return Ok(PollOutcome::Cancelled);
                }
                fetched = timeout_at(deadline, fetch()) => fetched,
            };

            match fetched {
                Err(_) => {
                    info!(poll.id = %poll_id, attempt, "Fetch still running at deadline, poll timed out");
                    return Ok(PollOutcome::TimedOut);
                }
                Ok(Ok(value)) => {
                    if (self.matcher)(&value) {
                        info!(poll.id = %poll_id, attempt, "Poll matched");
                        return Ok(PollOutcome::Matched(value));
                    }
                    debug!(poll.id = %poll_id, attempt, "Fetched value did not match");
                }
                Ok(Err(error)) => match on_error {
                    FetchErrorPolicy::Continue => {
                        warn!(poll.id = %poll_id, attempt, "Fetch failed, polling on: {}", error);
                    }
                    FetchErrorPolicy::Abort => {
                        warn!(poll.id = %poll_id, attempt, "Fetch failed, aborting poll: {}", error);
                        return Err(PollError::FetchFailed { attempt, error });
                    }
                },
            }
        }
    }
}
