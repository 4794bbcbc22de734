// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Call helpers for hand-written proxies.
//!
//! [`Proxy`] mirrors the wiring of a generated proxy: every call runs
//! through the runner registered under its call-site name, and an error
//! predicate decides which delegate errors the runner gets to see.
//!
//! A delegate error the predicate rejects is held back. The runner is told
//! the call succeeded, so no middleware retries it, and the proxy returns it
//! as [`CallError::NonRetryable`]. Errors the predicate accepts are left to
//! the runner, whose final verdict comes back as [`CallError::Runner`].

use crate::context::Context;
use crate::error::{BoxError, Error};
use crate::factory::RunnerFactory;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Decides whether an error returned by the named method may be retried.
pub type ErrorPredicate = Arc<dyn Fn(&str, &BoxError) -> bool + Send + Sync>;

/// The default predicate: every error is retryable.
pub fn retry_all_errors() -> ErrorPredicate {
    Arc::new(|_: &str, _: &BoxError| true)
}

/// Outcome of a failed proxied call.
#[derive(Debug, Error)]
pub enum CallError {
    /// The delegate failed with an error the predicate rejected.
    #[error(transparent)]
    NonRetryable(BoxError),

    /// The runner chain failed the call.
    #[error(transparent)]
    Runner(#[from] Error),

    /// A middleware reported success without invoking the delegate.
    #[error("runner completed without invoking {0}")]
    NotInvoked(String),
}

/// Runs delegate calls through a shared [`RunnerFactory`].
#[derive(Clone)]
pub struct Proxy {
    factory: Arc<RunnerFactory>,
    error_predicate: ErrorPredicate,
}

impl Proxy {
    pub fn new(factory: Arc<RunnerFactory>) -> Self {
        Self {
            factory,
            error_predicate: retry_all_errors(),
        }
    }

    #[must_use]
    pub fn with_retryable_error_predicate(mut self, predicate: ErrorPredicate) -> Self {
        self.error_predicate = predicate;
        self
    }

    /// Runs `call` through the runner for `name`, classifying its errors.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::NonRetryable`] for the first rejected delegate
    /// error, or [`CallError::Runner`] when the chain gives up.
    pub fn call_retryable<T, F>(&self, ctx: &Context, name: &str, mut call: F) -> Result<T, CallError>
    where
        F: FnMut(&Context) -> Result<T, BoxError>,
    {
        let mut value = None;
        let mut non_retryable = None;
        let runner = self.factory.get_runner(name);
        let result = runner.run(ctx, &mut |ctx: &Context| {
            // A held-back error ends the call even if the chain asks for
            // another attempt.
            if non_retryable.is_some() {
                return Ok(());
            }
            match call(ctx) {
                Ok(v) => {
                    value = Some(v);
                    Ok(())
                }
                Err(err) if (self.error_predicate)(name, &err) => {
                    value = None;
                    Err(err)
                }
                Err(err) => {
                    value = None;
                    non_retryable = Some(err);
                    Ok(())
                }
            }
        });

        if let Some(err) = non_retryable {
            return Err(CallError::NonRetryable(err));
        }
        result?;
        value.ok_or_else(|| CallError::NotInvoked(name.to_string()))
    }

    /// Runs a call without a result through the runner for `name`.
    ///
    /// # Panics
    ///
    /// Panics if the runner chain fails: the call has no way to report it.
    pub fn call_no_return<F>(&self, ctx: &Context, name: &str, mut call: F)
    where
        F: FnMut(&Context),
    {
        let runner = self.factory.get_runner(name);
        if let Err(err) = runner.run(ctx, &mut |ctx: &Context| {
            call(ctx);
            Ok(())
        }) {
            panic!("{name}: {err}");
        }
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("factory", &self.factory)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::retry::{self, RetryConfig};
    use crate::middleware::timeout::{self, TimeoutConfig};
    use std::time::Duration;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct Failure(&'static str);

    fn retrying_proxy(times: u32) -> Proxy {
        Proxy::new(Arc::new(RunnerFactory::new(vec![retry::middleware(RetryConfig {
            times,
            wait_base: Duration::from_millis(1),
            disable_backoff: true,
        })])))
    }

    fn only_transient() -> ErrorPredicate {
        Arc::new(|_: &str, err: &BoxError| err.to_string() == "transient")
    }

    #[test]
    fn retryable_errors_are_retried_until_success() {
        let proxy = retrying_proxy(5);
        let mut attempts = 0;
        let greeting = proxy
            .call_retryable(&Context::background(), "GenerateGreeting", |_| {
                attempts += 1;
                if attempts < 3 {
                    Err(Box::new(Failure("transient")) as BoxError)
                } else {
                    Ok("Hello, Christian!".to_string())
                }
            })
            .unwrap();
        assert_eq!(greeting, "Hello, Christian!");
        assert_eq!(attempts, 3);
    }

    #[test]
    fn non_retryable_error_short_circuits() {
        let proxy = retrying_proxy(5).with_retryable_error_predicate(only_transient());
        let mut attempts = 0;
        let err = proxy
            .call_retryable(&Context::background(), "SayHello", |_| -> Result<(), BoxError> {
                attempts += 1;
                Err(Box::new(Failure("permanent")))
            })
            .unwrap_err();
        assert_eq!(attempts, 1);
        assert!(matches!(err, CallError::NonRetryable(_)));
        assert_eq!(err.to_string(), "permanent");
    }

    #[test]
    fn exhaustion_is_the_runner_error() {
        let proxy = retrying_proxy(2).with_retryable_error_predicate(only_transient());
        let mut attempts = 0;
        let err = proxy
            .call_retryable(&Context::background(), "SayHello", |_| -> Result<(), BoxError> {
                attempts += 1;
                Err(Box::new(Failure("transient")))
            })
            .unwrap_err();
        assert_eq!(attempts, 3);
        assert!(matches!(
            err,
            CallError::Runner(Error::RetriesExhausted { attempts: 3, .. })
        ));
    }

    #[test]
    fn predicate_sees_method_name() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let proxy = retrying_proxy(0).with_retryable_error_predicate(Arc::new(move |name: &str, _: &BoxError| {
            recorder.lock().push(name.to_string());
            false
        }));
        let _ = proxy.call_retryable(&Context::background(), "GetUser", |_| -> Result<(), BoxError> {
            Err("nope".into())
        });
        assert_eq!(*seen.lock(), vec!["GetUser".to_string()]);
    }

    #[test]
    fn no_return_call_runs_once() {
        let proxy = retrying_proxy(3);
        let mut calls = 0;
        proxy.call_no_return(&Context::background(), "MethodWithWildcard", |_| calls += 1);
        assert_eq!(calls, 1);
    }

    #[test]
    #[should_panic(expected = "MethodWithWildcard: timeout")]
    fn no_return_call_panics_on_runner_failure() {
        let proxy = Proxy::new(Arc::new(RunnerFactory::new(vec![timeout::middleware(
            TimeoutConfig {
                timeout: Duration::from_millis(5),
            },
        )])));
        proxy.call_no_return(&Context::background(), "MethodWithWildcard", |_| {
            std::thread::sleep(Duration::from_millis(20));
        });
    }
}
