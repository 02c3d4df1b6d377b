//! Self-scheduling status poller.
//!
//! The poller never runs on its own thread. It only answers two questions
//! for the event loop: "is a poll due now?" and "when is the next one?".
//! A cycle is started with [`Poller::take_due`] and must be closed with
//! [`Poller::settle`] before another can start, so cycles never overlap.
//!
//! Delays are a fixed two-tier policy: the normal interval after a
//! successful poll, a longer one after a failure. No growth, no cap on
//! the number of retries.

use std::time::{Duration, Instant};

use crate::config::schema::PollingConfig;

/// Delay before the next poll, by outcome of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub on_success: Duration,
    pub on_failure: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            on_success: Duration::from_secs(10),
            on_failure: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &PollingConfig) -> Self {
        Self {
            on_success: Duration::from_secs(config.interval_secs),
            on_failure: Duration::from_secs(config.retry_secs),
        }
    }

    pub fn delay_after(&self, succeeded: bool) -> Duration {
        if succeeded {
            self.on_success
        } else {
            self.on_failure
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollState {
    /// Waiting for `due`.
    Scheduled { due: Instant },
    /// A poll is out; `refresh` records a refresh asked for meanwhile.
    InFlight { refresh: bool },
}

#[derive(Debug, Clone)]
pub struct Poller {
    policy: RetryPolicy,
    state: PollState,
}

impl Poller {
    /// A poller whose first cycle is due immediately.
    pub fn new(policy: RetryPolicy, now: Instant) -> Self {
        Self {
            policy,
            state: PollState::Scheduled { due: now },
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Start a cycle if one is due. Returns `true` when the caller must
    /// issue the status request.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.state {
            PollState::Scheduled { due } if due <= now => {
                self.state = PollState::InFlight { refresh: false };
                true
            }
            _ => false,
        }
    }

    /// Close the in-flight cycle and schedule the next one. Returns the
    /// delay chosen, or `None` if no cycle was in flight.
    pub fn settle(&mut self, succeeded: bool, now: Instant) -> Option<Duration> {
        let PollState::InFlight { refresh } = self.state else {
            return None;
        };
        let delay = if refresh {
            Duration::ZERO
        } else {
            self.policy.delay_after(succeeded)
        };
        self.state = PollState::Scheduled { due: now + delay };
        Some(delay)
    }

    /// Ask for a poll as soon as possible without starting a second chain:
    /// a scheduled cycle is pulled forward, an in-flight one is followed
    /// immediately by another.
    pub fn refresh(&mut self, now: Instant) {
        match &mut self.state {
            PollState::Scheduled { due } => {
                if *due > now {
                    *due = now;
                }
            }
            PollState::InFlight { refresh } => *refresh = true,
        }
    }

    /// When the next cycle is due, or `None` while one is in flight.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            PollState::Scheduled { due } => Some(due),
            PollState::InFlight { .. } => None,
        }
    }

    pub fn in_flight(&self) -> bool {
        matches!(self.state, PollState::InFlight { .. })
    }
}
