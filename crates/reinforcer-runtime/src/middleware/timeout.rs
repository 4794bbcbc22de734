// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Bounds the duration of a call.
//!
//! The inner chain runs under a child context whose deadline is the timeout.
//! Calls are not interrupted: a call that observes its context can stop
//! early, and any call that completes after the deadline is reported as
//! [`Error::Timeout`].

use crate::context::Context;
use crate::error::{Error, Result};
use crate::runner::{Call, Middleware, Runner, SharedRunner, middleware as boxed};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub timeout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
        }
    }
}

struct TimeoutRunner {
    config: TimeoutConfig,
    inner: SharedRunner,
}

impl Runner for TimeoutRunner {
    fn run(&self, ctx: &Context, call: &mut Call<'_>) -> Result<()> {
        let (child, cancel) = Context::with_timeout(ctx, self.config.timeout);
        let result = self.inner.run(&child, call);
        let timed_out = child.deadline().is_some_and(|d| Instant::now() >= d);
        cancel.cancel();

        // The caller's own deadline or cancellation is not ours to report.
        if timed_out && ctx.err().is_none() {
            warn!(timeout = ?self.config.timeout, "Call timed out");
            return Err(Error::Timeout(self.config.timeout));
        }
        result
    }
}

pub fn middleware(config: TimeoutConfig) -> Middleware {
    boxed(move |inner| Arc::new(TimeoutRunner { config, inner }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{chain, run_with};

    fn runner(timeout: Duration) -> SharedRunner {
        chain(&[middleware(TimeoutConfig { timeout })])
    }

    #[test]
    fn fast_call_succeeds() {
        let r = runner(Duration::from_secs(5));
        assert!(run_with(r.as_ref(), &Context::background(), |_| Ok(())).is_ok());
    }

    #[test]
    fn slow_call_times_out() {
        let r = runner(Duration::from_millis(10));
        let err = run_with(r.as_ref(), &Context::background(), |_| {
            std::thread::sleep(Duration::from_millis(30));
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Timeout(t) if t == Duration::from_millis(10)));
    }

    #[test]
    fn call_sees_deadline_and_can_stop_early() {
        let r = runner(Duration::from_millis(20));
        let err = run_with(r.as_ref(), &Context::background(), |ctx| {
            assert!(ctx.deadline().is_some());
            ctx.sleep(Duration::from_secs(10))?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[test]
    fn cancelled_caller_is_reported_as_is() {
        let (ctx, cancel) = Context::with_cancel(&Context::background());
        cancel.cancel();
        let r = runner(Duration::from_secs(5));
        let err = run_with(r.as_ref(), &ctx, |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
