// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Dispatcher-wrapped proxy methods for delegates that return nothing.
//!
//! The original contract has no channel to report a dispatcher failure, so
//! the generated proxy panics with the dispatcher's error.

use super::{Emitter, delegate_call, receiver_header, run_header};
use crate::codegen::document::{Document, block};
use crate::docvec;
use crate::method::Method;
use crate::types::Imports;

/// Emits a method that runs the delegate through the dispatcher and panics if
/// the dispatcher reports an error.
#[derive(Debug, Clone, Copy)]
pub struct NoReturn<'a> {
    method: &'a Method,
    struct_name: &'a str,
    receiver_name: &'a str,
}

impl<'a> NoReturn<'a> {
    /// # Panics
    ///
    /// Panics if `method` has an error return.
    pub fn new(method: &'a Method, struct_name: &'a str, receiver_name: &'a str) -> Self {
        assert!(
            method.return_error_index.is_none(),
            "method {} returns an error and cannot be wrapped as a no-return method",
            method.name
        );
        Self {
            method,
            struct_name,
            receiver_name,
        }
    }
}

impl Emitter for NoReturn<'_> {
    fn declaration(&self, imports: &Imports) -> Document<'_> {
        let run = docvec![
            block(
                docvec![run_header(self.method, self.receiver_name)],
                vec![
                    docvec![delegate_call(self.method, self.receiver_name)],
                    docvec!["return nil"],
                ],
            ),
            ")",
        ];
        block(
            docvec![receiver_header(
                self.method,
                self.struct_name,
                self.receiver_name,
                imports
            )],
            vec![
                run,
                block(docvec!["if err != nil"], vec![docvec!["panic(err)"]]),
            ],
        )
    }
}
