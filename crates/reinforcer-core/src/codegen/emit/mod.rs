// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Proxy method emitters, one per [`GenerationStrategy`].
//!
//! **DDD Context:** Code Generation
//!
//! Every emitter renders a method on the generated proxy type
//! (`func (r *Proxy) Name(...) ...`) that eventually calls the injected
//! `delegate`. Emitters whose strategy has a precondition on the method's
//! error return check it in their constructor and panic on violation: the
//! strategy selector never produces such a pairing, so hitting one is a bug in
//! the caller.

mod noret;
mod passthrough;
mod retryable;

pub use noret::NoReturn;
pub use passthrough::PassThrough;
pub use retryable::Retryable;

use super::document::Document;
use crate::method::Method;
use crate::strategy::GenerationStrategy;
use crate::types::Imports;

/// Renders a proxy method declaration.
pub trait Emitter {
    /// The full `func` declaration, with package-qualified types rendered
    /// through `imports`.
    fn declaration(&self, imports: &Imports) -> Document<'_>;
}

/// Builds the emitter for `strategy`.
///
/// # Panics
///
/// Panics if `method` does not satisfy the precondition of `strategy`
/// (see [`NoReturn::new`] and [`Retryable::new`]).
pub fn emitter_for<'a>(
    strategy: GenerationStrategy,
    method: &'a Method,
    struct_name: &'a str,
    receiver_name: &'a str,
) -> Box<dyn Emitter + 'a> {
    match strategy {
        GenerationStrategy::PassThrough => {
            Box::new(PassThrough::new(method, struct_name, receiver_name))
        }
        GenerationStrategy::NoReturnWrap => {
            Box::new(NoReturn::new(method, struct_name, receiver_name))
        }
        GenerationStrategy::RetryableWrap => {
            Box::new(Retryable::new(method, struct_name, receiver_name))
        }
    }
}

/// `Name(params) results`, as used in proxy declarations and in the
/// generated delegate interface.
pub fn method_signature(method: &Method, imports: &Imports) -> String {
    let params: Vec<String> = method
        .parameters
        .iter()
        .map(|p| format!("{} {}", p.name, p.ty.render(imports)))
        .collect();
    format!(
        "{}({}){}",
        method.name,
        params.join(", "),
        results(method, imports)
    )
}

fn results(method: &Method, imports: &Imports) -> String {
    match method.return_types.as_slice() {
        [] => String::new(),
        [single] => format!(" {}", single.render(imports)),
        many => {
            let rendered: Vec<String> = many.iter().map(|t| t.render(imports)).collect();
            format!(" ({})", rendered.join(", "))
        }
    }
}

/// `func (r *Proxy) Name(params) results`.
fn receiver_header(
    method: &Method,
    struct_name: &str,
    receiver_name: &str,
    imports: &Imports,
) -> String {
    format!(
        "func ({receiver_name} *{struct_name}) {}",
        method_signature(method, imports)
    )
}

/// `r.delegate.Name(args)`.
fn delegate_call(method: &Method, receiver_name: &str) -> String {
    format!(
        "{receiver_name}.delegate.{}({})",
        method.name,
        method.call_arguments().join(", ")
    )
}

/// `r.run(ctx, Parent.Name, func(ctx context.Context) error`, the opening of a
/// dispatcher invocation; the closure body and `})` follow.
fn run_header(method: &Method, receiver_name: &str) -> String {
    format!(
        "err := {receiver_name}.run({}, {}, func({} context.Context) error",
        method.context_argument(),
        method.constant_ref(),
        method.closure_context_name()
    )
}
