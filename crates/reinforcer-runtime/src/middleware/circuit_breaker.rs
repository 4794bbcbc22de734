// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Rejects calls while a dependency is failing.
//!
//! While closed, outcomes are recorded over a rolling window. The breaker
//! opens once the window holds at least `minimum_requests` outcomes and the
//! error percentage reaches the threshold. While open every call is rejected
//! with [`Error::CircuitOpen`]. After `open_wait` the breaker lets calls
//! through half-open: `half_open_successes` successes close it, a single
//! failure opens it again.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::runner::{Call, Middleware, Runner, SharedRunner, middleware as boxed};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Error percentage (0-100) that opens the breaker.
    pub error_percent_threshold: u8,
    /// Outcomes required in the window before the breaker may open.
    pub minimum_requests: u32,
    /// How long the breaker stays open before probing.
    pub open_wait: Duration,
    /// Successes required while half-open to close again.
    pub half_open_successes: u32,
    /// Length of the rolling outcome window.
    pub window: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            error_percent_threshold: 50,
            minimum_requests: 20,
            open_wait: Duration::from_secs(5),
            half_open_successes: 1,
            window: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open { since: Instant },
    HalfOpen { successes: u32 },
}

struct Breaker {
    state: State,
    outcomes: VecDeque<(Instant, bool)>,
}

impl Breaker {
    fn prune(&mut self, now: Instant, window: Duration) {
        while self
            .outcomes
            .front()
            .is_some_and(|(at, _)| now.duration_since(*at) > window)
        {
            self.outcomes.pop_front();
        }
    }

    fn open(&mut self, now: Instant) {
        self.state = State::Open { since: now };
        self.outcomes.clear();
    }
}

struct CircuitBreakerRunner {
    config: CircuitBreakerConfig,
    breaker: Mutex<Breaker>,
    inner: SharedRunner,
}

impl CircuitBreakerRunner {
    /// Decides whether a call may go through, moving open to half-open once
    /// the open wait has elapsed.
    fn admit(&self, now: Instant) -> Result<()> {
        let mut breaker = self.breaker.lock();
        if let State::Open { since } = breaker.state {
            if now.duration_since(since) < self.config.open_wait {
                return Err(Error::CircuitOpen);
            }
            info!("Circuit breaker half-open");
            breaker.state = State::HalfOpen { successes: 0 };
        }
        Ok(())
    }

    fn record(&self, now: Instant, success: bool) {
        let mut breaker = self.breaker.lock();
        match breaker.state {
            State::HalfOpen { successes } if success => {
                let successes = successes + 1;
                if successes >= self.config.half_open_successes {
                    info!("Circuit breaker closed");
                    breaker.state = State::Closed;
                    breaker.outcomes.clear();
                } else {
                    breaker.state = State::HalfOpen { successes };
                }
            }
            State::HalfOpen { .. } => {
                warn!("Circuit breaker reopened by failed probe");
                breaker.open(now);
            }
            State::Closed => {
                breaker.outcomes.push_back((now, success));
                breaker.prune(now, self.config.window);
                let total = breaker.outcomes.len();
                let failures = breaker.outcomes.iter().filter(|(_, ok)| !ok).count();
                let enough = total >= self.config.minimum_requests as usize;
                if enough && failures * 100 >= total * usize::from(self.config.error_percent_threshold) {
                    warn!(total, failures, "Circuit breaker opened");
                    breaker.open(now);
                }
            }
            // Opened by a concurrent call.
            State::Open { .. } => {}
        }
    }

    #[cfg(test)]
    fn state(&self) -> State {
        self.breaker.lock().state
    }
}

impl Runner for CircuitBreakerRunner {
    fn run(&self, ctx: &Context, call: &mut Call<'_>) -> Result<()> {
        self.admit(Instant::now())?;
        let result = self.inner.run(ctx, call);
        self.record(Instant::now(), result.is_ok());
        result
    }
}

pub fn middleware(config: CircuitBreakerConfig) -> Middleware {
    boxed(move |inner| {
        Arc::new(CircuitBreakerRunner {
            config,
            breaker: Mutex::new(Breaker {
                state: State::Closed,
                outcomes: VecDeque::new(),
            }),
            inner,
        })
    })
}
