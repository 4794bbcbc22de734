// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Re-runs failed calls with exponential, jittered backoff.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::runner::{Call, Middleware, Runner, SharedRunner, middleware as boxed};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Largest doubling applied to `wait_base`.
const MAX_BACKOFF_SHIFT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Extra attempts after the first one.
    pub times: u32,
    /// Wait before the first retry; doubles on every further retry.
    pub wait_base: Duration,
    /// Always wait exactly `wait_base`.
    pub disable_backoff: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            times: 3,
            wait_base: Duration::from_millis(20),
            disable_backoff: false,
        }
    }
}

impl RetryConfig {
    /// Wait before retry number `retry` (zero based). With backoff it is
    /// drawn from `[base·2ⁿ/2, base·2ⁿ]`.
    fn wait(&self, retry: u32) -> Duration {
        if self.disable_backoff {
            return self.wait_base;
        }
        let max = self
            .wait_base
            .saturating_mul(1 << retry.min(MAX_BACKOFF_SHIFT));
        let min = max / 2;
        rand::thread_rng().gen_range(min..=max)
    }
}

struct RetryRunner {
    config: RetryConfig,
    inner: SharedRunner,
}

impl Runner for RetryRunner {
    fn run(&self, ctx: &Context, call: &mut Call<'_>) -> Result<()> {
        let mut retry = 0;
        loop {
            let err = match self.inner.run(ctx, call) {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            if let Some(done) = ctx.err() {
                return Err(done);
            }
            if retry >= self.config.times {
                warn!(attempts = retry + 1, %err, "Retries exhausted");
                return Err(Error::RetriesExhausted {
                    attempts: retry + 1,
                    last: Box::new(err),
                });
            }
            let wait = self.config.wait(retry);
            debug!(attempt = retry + 1, ?wait, %err, "Retrying call");
            ctx.sleep(wait)?;
            retry += 1;
        }
    }
}

pub fn middleware(config: RetryConfig) -> Middleware {
    boxed(move |inner| Arc::new(RetryRunner { config, inner }))
}
