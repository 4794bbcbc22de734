// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Pass-through proxy methods: a direct call to the delegate.

use super::{Emitter, delegate_call, receiver_header};
use crate::codegen::document::{Document, block};
use crate::docvec;
use crate::method::Method;
use crate::types::Imports;

/// Emits a method that forwards to the delegate without any middleware.
#[derive(Debug, Clone, Copy)]
pub struct PassThrough<'a> {
    method: &'a Method,
    struct_name: &'a str,
    receiver_name: &'a str,
}

impl<'a> PassThrough<'a> {
    pub fn new(method: &'a Method, struct_name: &'a str, receiver_name: &'a str) -> Self {
        Self {
            method,
            struct_name,
            receiver_name,
        }
    }
}

impl Emitter for PassThrough<'_> {
    fn declaration(&self, imports: &Imports) -> Document<'_> {
        let call = delegate_call(self.method, self.receiver_name);
        let statement = if self.method.return_types.is_empty() {
            docvec![call]
        } else {
            docvec!["return ", call]
        };
        block(
            docvec![receiver_header(
                self.method,
                self.struct_name,
                self.receiver_name,
                imports
            )],
            vec![statement],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{MethodDescriptor, ParamDescriptor, TypeDescriptor};

    fn render(raw: &MethodDescriptor) -> String {
        let m = Method::normalize("Parent", raw).unwrap();
        PassThrough::new(&m, "resilient", "r")
            .declaration(&Imports::new())
            .to_pretty_string()
    }

    #[test]
    fn forwards_arguments_and_returns() {
        let raw = MethodDescriptor::new("MyFunction")
            .with_params(vec![
                ParamDescriptor::new("ctx", TypeDescriptor::context()),
                ParamDescriptor::new("myArg", TypeDescriptor::basic("string")),
            ])
            .returning(vec![TypeDescriptor::basic("string")]);
        assert_eq!(
            render(&raw),
            "func (r *resilient) MyFunction(ctx context.Context, arg1 string) string {\n\
             \treturn r.delegate.MyFunction(ctx, arg1)\n\
             }"
        );
    }

    #[test]
    fn no_args_no_return() {
        assert_eq!(
            render(&MethodDescriptor::new("MyFunction")),
            "func (r *resilient) MyFunction() {\n\tr.delegate.MyFunction()\n}"
        );
    }

    #[test]
    fn forwards_variadic_with_spread() {
        let raw = MethodDescriptor::new("Log")
            .with_params(vec![
                ParamDescriptor::new("format", TypeDescriptor::basic("string")),
                ParamDescriptor::new("args", TypeDescriptor::slice(TypeDescriptor::empty_interface())),
            ])
            .variadic();
        assert_eq!(
            render(&raw),
            "func (r *resilient) Log(arg0 string, arg1 ...interface{}) {\n\
             \tr.delegate.Log(arg0, arg1...)\n\
             }"
        );
    }

    #[test]
    fn error_returning_method_can_still_pass_through() {
        let raw = MethodDescriptor::new("Close").returning(vec![TypeDescriptor::error()]);
        assert_eq!(
            render(&raw),
            "func (r *resilient) Close() error {\n\treturn r.delegate.Close()\n}"
        );
    }
}
