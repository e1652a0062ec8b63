use std::time::Duration;

/// How long and how often to check a source for readiness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            timeout: Some(Duration::from_secs(10)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitStatus {
    Ready,
    Pending,
    TimedOut,
}

/// Cooperative readiness poll for `target`, driven by the caller's clock.
///
/// Nothing blocks: the owner calls [`MediaWait::poll`] once per tick and the wait only checks
/// the source when its poll interval has elapsed. Dropping the wait cancels it.
#[derive(Clone, Debug)]
pub struct MediaWait<T> {
    target: T,
    started: Duration,
    next_poll: Duration,
    policy: WaitPolicy,
}

impl<T> MediaWait<T> {
    /// The first poll is due immediately.
    pub fn new(target: T, now: Duration, policy: WaitPolicy) -> Self {
        Self {
            target,
            started: now,
            next_poll: now,
            policy,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    pub fn poll(&mut self, now: Duration, is_ready: impl FnOnce(&T) -> bool) -> WaitStatus {
        if now < self.next_poll {
            return WaitStatus::Pending;
        }
        if is_ready(&self.target) {
            return WaitStatus::Ready;
        }
        if let Some(timeout) = self.policy.timeout
            && now.saturating_sub(self.started) >= timeout
        {
            return WaitStatus::TimedOut;
        }
        self.next_poll = now + self.policy.poll_interval.max(Duration::from_millis(1));
        WaitStatus::Pending
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/wait.rs"]
mod tests;
