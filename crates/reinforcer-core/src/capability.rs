// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Capability contracts used to classify parameters and results.
//!
//! **DDD Context:** Signature Normalization
//!
//! Two contracts drive normalization:
//!
//! - **error**: a single no-argument method `Error() string`.
//! - **context**: the deadline/cancellation contract of `context.Context`:
//!   `Deadline() (time.Time, bool)`, `Done() <-chan struct{}`, `Err() error`
//!   and `Value(interface{}) interface{}`.
//!
//! A type satisfies a contract by exact identity with the canonical type
//! (`error`, `context.Context`) or by structurally implementing every method
//! of the contract.

use crate::descriptor::{ChanDir, MethodDescriptor, ParamDescriptor, TypeDescriptor};
use std::sync::LazyLock;

static ERROR_CONTRACT: LazyLock<Vec<MethodDescriptor>> = LazyLock::new(|| {
    vec![MethodDescriptor::new("Error").returning(vec![TypeDescriptor::basic("string")])]
});

static CONTEXT_CONTRACT: LazyLock<Vec<MethodDescriptor>> = LazyLock::new(|| {
    vec![
        MethodDescriptor::new("Deadline").returning(vec![
            TypeDescriptor::named(Some("time"), "Time"),
            TypeDescriptor::basic("bool"),
        ]),
        MethodDescriptor::new("Done").returning(vec![TypeDescriptor::chan(
            TypeDescriptor::Struct { fields: Vec::new() },
            ChanDir::Recv,
        )]),
        MethodDescriptor::new("Err").returning(vec![TypeDescriptor::error()]),
        MethodDescriptor::new("Value")
            .with_params(vec![ParamDescriptor::new(
                "key",
                TypeDescriptor::empty_interface(),
            )])
            .returning(vec![TypeDescriptor::empty_interface()]),
    ]
});

/// The methods a type must provide to be treated as an error.
pub fn error_contract() -> &'static [MethodDescriptor] {
    &ERROR_CONTRACT
}

/// The methods a type must provide to be treated as a cancellation context.
pub fn context_contract() -> &'static [MethodDescriptor] {
    &CONTEXT_CONTRACT
}

/// Whether every method of `contract` is present, with an identical
/// signature, in the method set of `ty`.
pub fn implements(ty: &TypeDescriptor, contract: &[MethodDescriptor]) -> bool {
    let method_set = ty.method_set();
    contract
        .iter()
        .all(|required| method_set.iter().any(|m| m.same_signature(required)))
}

/// Whether `ty` satisfies the error contract.
pub fn is_error_type(ty: &TypeDescriptor) -> bool {
    if matches!(ty, TypeDescriptor::Named { package: None, name, .. } if name == "error") {
        return true;
    }
    implements(ty, error_contract())
}

/// Whether `ty` satisfies the context contract.
pub fn is_context_type(ty: &TypeDescriptor) -> bool {
    if matches!(
        ty,
        TypeDescriptor::Named { package: Some(package), name, .. }
            if package == "context" && name == "Context"
    ) {
        return true;
    }
    implements(ty, context_contract())
}
