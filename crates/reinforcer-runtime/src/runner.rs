// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Runners and middleware composition.
//!
//! A [`Runner`] executes a call under some policy. Middlewares wrap an inner
//! runner into an outer one; [`chain`] composes them around the terminal
//! [`CallRunner`] so that the first middleware is the outermost.

use crate::context::Context;
use crate::error::{BoxError, Error, Result};
use std::sync::Arc;
use tracing::trace;

/// The wrapped call. It receives the context of the innermost runner.
pub type Call<'a> = dyn FnMut(&Context) -> std::result::Result<(), BoxError> + 'a;

/// Executes a call under a resiliency policy.
pub trait Runner: Send + Sync {
    /// Runs `call`, possibly several times, and reports the outcome.
    ///
    /// # Errors
    ///
    /// Returns the call's own error, or the error of the policy that stopped
    /// it (timeout, exhausted retries, open circuit, done context).
    fn run(&self, ctx: &Context, call: &mut Call<'_>) -> Result<()>;
}

/// A runner shared between call sites and threads.
pub type SharedRunner = Arc<dyn Runner>;

/// Wraps an inner runner into an outer one.
pub type Middleware = Box<dyn Fn(SharedRunner) -> SharedRunner + Send + Sync>;

/// Boxes a middleware constructor.
pub fn middleware<F>(f: F) -> Middleware
where
    F: Fn(SharedRunner) -> SharedRunner + Send + Sync + 'static,
{
    Box::new(f)
}

/// The terminal runner: invokes the call once.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallRunner;

impl Runner for CallRunner {
    fn run(&self, ctx: &Context, call: &mut Call<'_>) -> Result<()> {
        if let Some(err) = ctx.err() {
            trace!(%err, "Context done, skipping call");
            return Err(err);
        }
        call(ctx).map_err(Error::Call)
    }
}

/// Composes `middlewares` around a [`CallRunner`], first one outermost.
pub fn chain(middlewares: &[Middleware]) -> SharedRunner {
    middlewares
        .iter()
        .rev()
        .fold(Arc::new(CallRunner) as SharedRunner, |inner, mw| mw(inner))
}

/// Runs a closure through `runner` without naming the call type.
///
/// # Errors
///
/// See [`Runner::run`].
pub fn run_with<F>(runner: &dyn Runner, ctx: &Context, mut call: F) -> Result<()>
where
    F: FnMut(&Context) -> std::result::Result<(), BoxError>,
{
    runner.run(ctx, &mut call)
}
