// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Resiliency middlewares.
//!
//! Each module exposes a config type and a `middleware(config)` constructor
//! for use with [`RunnerFactory`](crate::factory::RunnerFactory):
//!
//! ```
//! use reinforcer_runtime::factory::RunnerFactory;
//! use reinforcer_runtime::middleware::{retry, timeout};
//! use std::time::Duration;
//!
//! let factory = RunnerFactory::new(vec![
//!     timeout::middleware(timeout::TimeoutConfig { timeout: Duration::from_millis(100) }),
//!     retry::middleware(retry::RetryConfig { times: 10, ..Default::default() }),
//! ]);
//! # let _ = factory;
//! ```

pub mod circuit_breaker;
pub mod retry;
pub mod timeout;
