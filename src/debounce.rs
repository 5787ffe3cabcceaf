//! Trailing-edge debounce for search box input.
//!
//! The relay is a small state machine driven by whoever owns the event loop:
//! `trigger` arms or re-arms the deadline, `poll_at` fires once the deadline
//! has passed, and `wait` suspends until then without blocking other work.
//! The callback is swapped in with `set_callback` and is only looked up when
//! the relay fires, so the most recently supplied one always runs.

use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Pending { deadline: Instant },
}

pub struct DebouncedRelay<T> {
    quiet_period: Duration,
    state: RelayState,
    callback: Option<Box<dyn FnMut() -> T>>,
    disposed: bool,
}

impl<T> DebouncedRelay<T> {
    pub fn new(quiet_period: Duration) -> Self {
        DebouncedRelay {
            quiet_period,
            state: RelayState::Idle,
            callback: None,
            disposed: false,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> RelayState {
        self.state
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, RelayState::Pending { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            RelayState::Idle => None,
            RelayState::Pending { deadline } => Some(deadline),
        }
    }

    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut() -> T + 'static,
    {
        if !self.disposed {
            self.callback = Some(Box::new(callback));
        }
    }

    pub fn trigger(&mut self) {
        self.trigger_at(Instant::now());
    }

    /// Restarts the quiet period from `now`.
    pub fn trigger_at(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        self.state = RelayState::Pending {
            deadline: now + self.quiet_period,
        };
    }

    /// Runs the current callback if the deadline has passed.
    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        match self.state {
            RelayState::Pending { deadline } if now >= deadline => {
                self.state = RelayState::Idle;
                self.callback.as_mut().map(|callback| callback())
            }
            _ => None,
        }
    }

    /// Drops any pending invocation, leaving the callback in place.
    pub fn cancel(&mut self) {
        self.state = RelayState::Idle;
    }

    /// Suspends until the pending deadline, then fires. Never resolves while
    /// idle, which makes it safe to use as a `tokio::select!` branch.
    pub async fn wait(&mut self) -> Option<T> {
        match self.deadline() {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.poll_at(deadline)
            }
            None => std::future::pending().await,
        }
    }

    /// Cancels the pending invocation for good. Later calls are no-ops.
    pub fn dispose(&mut self) {
        self.state = RelayState::Idle;
        self.callback = None;
        self.disposed = true;
    }
}

impl<T> Default for DebouncedRelay<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}
