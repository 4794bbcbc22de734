// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Cancellation contexts threaded through every runner.
//!
//! A [`Context`] is done once it is cancelled or its deadline passes.
//! Cancelling a context cancels every context derived from it, and a derived
//! context never outlives its parent's deadline.
//!
//! ```
//! use reinforcer_runtime::context::Context;
//! use std::time::Duration;
//!
//! let (ctx, cancel) = Context::with_timeout(&Context::background(), Duration::from_secs(5));
//! let (child, _) = Context::with_cancel(&ctx);
//! cancel.cancel();
//! assert!(child.is_done());
//! ```

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Done {
    Cancelled,
    DeadlineExceeded,
}

impl Done {
    fn error(self) -> Error {
        match self {
            Self::Cancelled => Error::Cancelled,
            Self::DeadlineExceeded => Error::DeadlineExceeded,
        }
    }
}

#[derive(Default)]
struct State {
    done: Option<Done>,
    children: Vec<Weak<Inner>>,
}

struct Inner {
    deadline: Option<Instant>,
    state: Mutex<State>,
    wake: Condvar,
}

impl Inner {
    fn new(deadline: Option<Instant>) -> Arc<Self> {
        Arc::new(Self {
            deadline,
            state: Mutex::new(State::default()),
            wake: Condvar::new(),
        })
    }

    fn deadline_passed(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    fn cancel(&self, reason: Done) {
        let children = {
            let mut state = self.state.lock();
            if state.done.is_some() {
                return;
            }
            // An expired context keeps reporting its deadline.
            let reason = if self.deadline_passed(Instant::now()) {
                Done::DeadlineExceeded
            } else {
                reason
            };
            state.done = Some(reason);
            std::mem::take(&mut state.children)
        };
        self.wake.notify_all();
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel(reason);
        }
    }
}

/// A cancellation signal with an optional deadline.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

/// Cancels the context it was created with, and its descendants.
#[derive(Clone)]
pub struct CancelHandle {
    inner: Arc<Inner>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.inner.cancel(Done::Cancelled);
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle").finish_non_exhaustive()
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self {
            inner: Inner::new(None),
        }
    }

    /// A child of `parent` that can be cancelled on its own.
    #[must_use]
    pub fn with_cancel(parent: &Context) -> (Self, CancelHandle) {
        Self::derive(parent, None)
    }

    /// A child of `parent` that is done at `deadline` at the latest.
    #[must_use]
    pub fn with_deadline(parent: &Context, deadline: Instant) -> (Self, CancelHandle) {
        Self::derive(parent, Some(deadline))
    }

    /// A child of `parent` that is done after `timeout` at the latest.
    #[must_use]
    pub fn with_timeout(parent: &Context, timeout: Duration) -> (Self, CancelHandle) {
        Self::derive(parent, Instant::now().checked_add(timeout))
    }

    fn derive(parent: &Context, deadline: Option<Instant>) -> (Self, CancelHandle) {
        let deadline = match (parent.inner.deadline, deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let inner = Inner::new(deadline);

        let parent_done = {
            let mut state = parent.inner.state.lock();
            if state.done.is_none() {
                state.children.retain(|c| c.strong_count() > 0);
                state.children.push(Arc::downgrade(&inner));
            }
            state.done
        };
        if let Some(reason) = parent_done {
            inner.cancel(reason);
        }

        let handle = CancelHandle {
            inner: Arc::clone(&inner),
        };
        (Self { inner }, handle)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Why the context is done, or `None` while it is live.
    pub fn err(&self) -> Option<Error> {
        if let Some(done) = self.inner.state.lock().done {
            return Some(done.error());
        }
        self.inner
            .deadline_passed(Instant::now())
            .then_some(Error::DeadlineExceeded)
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Blocks for `duration`, waking early when the context is done.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] or [`Error::DeadlineExceeded`] if the
    /// context is done before `duration` has elapsed.
    pub fn sleep(&self, duration: Duration) -> Result<()> {
        let wake_at = Instant::now().checked_add(duration);
        let mut state = self.inner.state.lock();
        loop {
            if let Some(done) = state.done {
                return Err(done.error());
            }
            let now = Instant::now();
            if self.inner.deadline_passed(now) {
                return Err(Error::DeadlineExceeded);
            }
            if wake_at.is_some_and(|w| now >= w) {
                return Ok(());
            }
            match (wake_at, self.inner.deadline) {
                (Some(w), Some(d)) => {
                    self.inner.wake.wait_until(&mut state, w.min(d));
                }
                (Some(t), None) | (None, Some(t)) => {
                    self.inner.wake.wait_until(&mut state, t);
                }
                (None, None) => self.inner.wake.wait(&mut state),
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("deadline", &self.inner.deadline)
            .field("done", &self.inner.state.lock().done)
            .finish()
    }
}
