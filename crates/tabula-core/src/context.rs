// Rust guideline compliant 2026-02-06

//! Per-request execution context.

use crate::{Error, Result};
use std::time::{Duration, Instant};

/// Request-scoped timing information.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    started: Instant,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Creates a context without a deadline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            deadline: None,
        }
    }

    /// Creates a context that expires after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: timeout.map(|timeout| started + timeout),
        }
    }

    /// Returns the time elapsed since the request started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fails if the deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeadlineExceeded` once the deadline is reached.
    pub fn check(&self) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Err(Error::DeadlineExceeded(self.elapsed().as_millis()))
            }
            _ => Ok(()),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_deadline_never_expires() {
        assert!(RequestContext::new().check().is_ok());
    }

    #[test]
    fn test_zero_timeout_expires() {
        let context = RequestContext::with_timeout(Some(Duration::ZERO));
        assert!(matches!(context.check(), Err(Error::DeadlineExceeded(_))));
    }
}
