// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Retryable proxy methods for delegates that return an error.
//!
//! The generated closure classifies every delegate error with the proxy's
//! error predicate. Retry-worthy errors are surfaced to the dispatcher, which
//! owns their fate (another attempt, success, exhaustion). Anything else is
//! parked in `nonRetryableErr` and the closure reports success, so the
//! dispatcher stops immediately and the proxy returns the parked error.

use super::{Emitter, delegate_call, receiver_header, run_header};
use crate::codegen::document::{Document, block};
use crate::docvec;
use crate::method::Method;
use crate::types::Imports;

const ERR_VAR: &str = "err";
const NON_RETRYABLE_ERR_VAR: &str = "nonRetryableErr";

/// Emits a method whose delegate call can be retried on error.
#[derive(Debug, Clone, Copy)]
pub struct Retryable<'a> {
    method: &'a Method,
    struct_name: &'a str,
    receiver_name: &'a str,
    error_index: usize,
}

impl<'a> Retryable<'a> {
    /// # Panics
    ///
    /// Panics if `method` does not return an error.
    pub fn new(method: &'a Method, struct_name: &'a str, receiver_name: &'a str) -> Self {
        let error_index = match method.return_error_index {
            Some(index) if method.returns_error => index,
            _ => panic!(
                "method {} does not return an error and is thus not retryable",
                method.name
            ),
        };
        Self {
            method,
            struct_name,
            receiver_name,
            error_index,
        }
    }

    /// Result holder names: `r{i}` for values, `err` for the error slot.
    fn holders(&self) -> Vec<String> {
        (0..self.method.return_types.len())
            .map(|i| {
                if i == self.error_index {
                    ERR_VAR.to_string()
                } else {
                    format!("r{i}")
                }
            })
            .collect()
    }
}

impl Emitter for Retryable<'_> {
    fn declaration(&self, imports: &Imports) -> Document<'_> {
        let holders = self.holders();
        let mut statements = vec![docvec!["var ", NON_RETRYABLE_ERR_VAR, " error"]];
        for (i, ty) in self.method.return_types.iter().enumerate() {
            if i != self.error_index {
                statements.push(docvec![format!("var r{i} {}", ty.render(imports))]);
            }
        }

        let constant = self.method.constant_ref();
        let closure = vec![
            docvec!["var err error"],
            docvec![format!(
                "{} = {}",
                holders.join(", "),
                delegate_call(self.method, self.receiver_name)
            )],
            block(
                docvec![format!(
                    "if {}.errorPredicate({constant}, {ERR_VAR})",
                    self.receiver_name
                )],
                vec![docvec!["return ", ERR_VAR]],
            ),
            docvec![NON_RETRYABLE_ERR_VAR, " = ", ERR_VAR],
            docvec!["return nil"],
        ];
        statements.push(docvec![
            block(docvec![run_header(self.method, self.receiver_name)], closure),
            ")",
        ]);

        let mut non_retryable_returns = holders.clone();
        non_retryable_returns[self.error_index] = NON_RETRYABLE_ERR_VAR.to_string();
        statements.push(block(
            docvec!["if ", NON_RETRYABLE_ERR_VAR, " != nil"],
            vec![docvec![format!("return {}", non_retryable_returns.join(", "))]],
        ));
        statements.push(docvec![format!("return {}", holders.join(", "))]);

        block(
            docvec![receiver_header(
                self.method,
                self.struct_name,
                self.receiver_name,
                imports
            )],
            statements,
        )
    }
}
