//! The two filter stages between a state change and a request: a quiet-window
//! debounce followed by a structural-equality gate.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Tracks when the latest pending value becomes eligible to pass.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// A newer value arrived; restart the quiet window.
    pub fn touch(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves once the quiet window of the pending value elapses.
    /// Never resolves while nothing is pending.
    pub async fn elapsed(&self) {
        match self.deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }
}

/// Passes a value only when it differs from the last value it passed.
#[derive(Debug)]
pub struct DistinctGate<T> {
    last: Option<T>,
}

impl<T> Default for DistinctGate<T> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<T: PartialEq + Clone> DistinctGate<T> {
    pub fn admit(&mut self, value: &T) -> bool {
        if self.last.as_ref() == Some(value) {
            return false;
        }
        self.last = Some(value.clone());
        true
    }

    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }
}
