// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Reinforcer runtime.
//!
//! **DDD Context:** Dispatch
//!
//! The dispatcher behind reinforced proxies. A proxy asks the
//! [`RunnerFactory`] for the runner registered under a call-site name and
//! runs its delegate call through it. Each runner is a chain of middlewares
//! (timeout, retry, circuit breaker) around the call, built once per name and
//! shared by every later call.
//!
//! ```
//! use reinforcer_runtime::prelude::*;
//! use reinforcer_runtime::middleware::retry::{self, RetryConfig};
//!
//! let factory = RunnerFactory::new(vec![retry::middleware(RetryConfig::default())]);
//! let runner = factory.get_runner("GetUser");
//! run_with(runner.as_ref(), &Context::background(), |_| Ok(())).unwrap();
//! ```

pub mod context;
pub mod error;
pub mod factory;
pub mod middleware;
pub mod proxy;
pub mod runner;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::context::{CancelHandle, Context};
    pub use crate::error::{BoxError, Error};
    pub use crate::factory::RunnerFactory;
    pub use crate::proxy::{CallError, ErrorPredicate, Proxy};
    pub use crate::runner::{Middleware, Runner, SharedRunner, run_with};
}
