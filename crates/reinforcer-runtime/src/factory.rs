// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Memoized runner chains keyed by call-site name.

use crate::runner::{Middleware, SharedRunner, chain};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builds one runner chain per call-site name and hands out that same chain
/// on every later request.
///
/// Lookups of known names take a shared read lock only. The first request
/// for a name builds the chain under the write lock; concurrent first
/// requests still build it exactly once.
pub struct RunnerFactory {
    runners: RwLock<HashMap<String, SharedRunner>>,
    middlewares: Vec<Middleware>,
}

impl RunnerFactory {
    /// A factory composing `middlewares`, first one outermost.
    pub fn new(middlewares: Vec<Middleware>) -> Self {
        Self {
            runners: RwLock::new(HashMap::new()),
            middlewares,
        }
    }

    /// The runner for `name`, built on first use.
    pub fn get_runner(&self, name: &str) -> SharedRunner {
        // Fast path: already built
        {
            let runners = self.runners.read();
            if let Some(runner) = runners.get(name) {
                return Arc::clone(runner);
            }
        }

        let mut runners = self.runners.write();

        // Double-check after acquiring write lock
        if let Some(runner) = runners.get(name) {
            return Arc::clone(runner);
        }

        debug!(name, middlewares = self.middlewares.len(), "Building runner chain");
        let runner = chain(&self.middlewares);
        runners.insert(name.to_string(), Arc::clone(&runner));
        runner
    }

    /// Number of chains built so far.
    pub fn len(&self) -> usize {
        self.runners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.read().is_empty()
    }
}

impl Default for RunnerFactory {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for RunnerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerFactory")
            .field("runners", &self.len())
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}
