// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Runtime errors.

use std::time::Duration;
use thiserror::Error;

/// Error type returned by the wrapped call.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by a runner chain.
#[derive(Debug, Error)]
pub enum Error {
    /// The context was cancelled.
    #[error("context canceled")]
    Cancelled,

    /// The context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The call did not complete within the timeout middleware's budget.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// The circuit breaker is rejecting calls.
    #[error("circuit breaker is open")]
    CircuitOpen,

    /// Every attempt of the retry middleware failed.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<Error>,
    },

    /// The wrapped call itself failed.
    #[error(transparent)]
    Call(BoxError),
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, Error>;
