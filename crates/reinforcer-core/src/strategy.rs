// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Generation strategy selection.
//!
//! **DDD Context:** Code Generation
//!
//! | Returns | `ignore_no_return` | Strategy |
//! |---|---|---|
//! | none | `true` | [`GenerationStrategy::PassThrough`] |
//! | none | `false` | [`GenerationStrategy::NoReturnWrap`] |
//! | includes an error | any | [`GenerationStrategy::RetryableWrap`] |
//! | no error | any | [`GenerationStrategy::PassThrough`] |

use crate::method::Method;
use std::fmt;

/// How the proxy body of a method is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationStrategy {
    /// Direct call to the delegate, no dispatcher involvement.
    PassThrough,
    /// Dispatcher-wrapped call that panics on dispatcher failure.
    NoReturnWrap,
    /// Dispatcher-wrapped call with error classification and retries.
    RetryableWrap,
}

impl fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PassThrough => "pass-through",
            Self::NoReturnWrap => "no-return",
            Self::RetryableWrap => "retryable",
        })
    }
}

/// Selects the strategy for `method`.
///
/// `ignore_no_return` only affects methods without return values.
pub fn select(method: &Method, ignore_no_return: bool) -> GenerationStrategy {
    if method.return_types.is_empty() {
        if ignore_no_return {
            GenerationStrategy::PassThrough
        } else {
            GenerationStrategy::NoReturnWrap
        }
    } else if method.returns_error {
        GenerationStrategy::RetryableWrap
    } else {
        GenerationStrategy::PassThrough
    }
}
