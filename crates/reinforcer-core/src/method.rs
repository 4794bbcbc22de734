// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Signature normalization.
//!
//! **DDD Context:** Signature Normalization
//!
//! [`Method::normalize`] turns a raw [`MethodDescriptor`] into the [`Method`]
//! model consumed by the strategy selector and the emitters:
//!
//! - The first parameter satisfying the context contract becomes `ctx`.
//! - Every other parameter is renamed `arg{i}`, `i` being its position in
//!   the signature.
//! - The first result satisfying the error contract becomes the error
//!   return; a second one fails normalization.
//! - All parameter and result types are translated eagerly, so a `Method`
//!   always renders.

use crate::capability::{is_context_type, is_error_type};
use crate::descriptor::MethodDescriptor;
use crate::types::{self, TypeError, TypeExpr};
use thiserror::Error;

/// Name of the context parameter in generated signatures.
pub const CONTEXT_PARAM_NAME: &str = "ctx";

/// Errors produced while normalizing a method signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MethodError {
    #[error("multiple errors returned by method signature {method}")]
    MultipleErrors { method: String },

    #[error("failed to convert parameter {index} of {method}: {source}")]
    Parameter {
        method: String,
        index: usize,
        #[source]
        source: TypeError,
    },

    #[error("failed to convert result {index} of {method}: {source}")]
    Result {
        method: String,
        index: usize,
        #[source]
        source: TypeError,
    },
}

/// A parameter of a normalized method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeExpr,
}

/// The normalized model of one contract method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Name of the contract declaring this method.
    pub parent_type_name: String,
    pub name: String,
    pub has_context: bool,
    pub context_parameter: Option<usize>,
    pub has_variadic: bool,
    pub parameters: Vec<Parameter>,
    pub return_types: Vec<TypeExpr>,
    pub returns_error: bool,
    pub return_error_index: Option<usize>,
}

impl Method {
    /// Normalizes `raw`, a method of the contract named `parent_type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`MethodError::MultipleErrors`] when more than one result is
    /// error-shaped, and [`MethodError::Parameter`] / [`MethodError::Result`]
    /// when a type cannot be translated.
    pub fn normalize(parent_type_name: &str, raw: &MethodDescriptor) -> Result<Self, MethodError> {
        let mut method = Self {
            parent_type_name: parent_type_name.to_string(),
            name: raw.name.clone(),
            has_context: false,
            context_parameter: None,
            has_variadic: raw.variadic,
            parameters: Vec::with_capacity(raw.params.len()),
            return_types: Vec::with_capacity(raw.results.len()),
            returns_error: false,
            return_error_index: None,
        };

        let last_index = raw.params.len().saturating_sub(1);
        for (index, param) in raw.params.iter().enumerate() {
            if !method.has_context && is_context_type(&param.ty) {
                method.has_context = true;
                method.context_parameter = Some(index);
                method.parameters.push(Parameter {
                    name: CONTEXT_PARAM_NAME.to_string(),
                    ty: TypeExpr::context(),
                });
                continue;
            }

            let variadic = raw.variadic && index == last_index;
            let ty = types::render(&param.ty, variadic).map_err(|source| MethodError::Parameter {
                method: raw.name.clone(),
                index,
                source,
            })?;
            method.parameters.push(Parameter {
                name: format!("arg{index}"),
                ty,
            });
        }

        for (index, result) in raw.results.iter().enumerate() {
            let ty = types::render(result, false).map_err(|source| MethodError::Result {
                method: raw.name.clone(),
                index,
                source,
            })?;
            if is_error_type(result) {
                if method.return_error_index.is_some() {
                    return Err(MethodError::MultipleErrors {
                        method: raw.name.clone(),
                    });
                }
                method.returns_error = true;
                method.return_error_index = Some(index);
            }
            method.return_types.push(ty);
        }

        Ok(method)
    }

    /// Parameter names in declaration order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    /// Arguments forwarding this method's parameters to the delegate, with
    /// the spread operator on a variadic final parameter.
    pub fn call_arguments(&self) -> Vec<String> {
        let last = self.parameters.len().saturating_sub(1);
        self.parameters
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if self.has_variadic && i == last {
                    format!("{}...", p.name)
                } else {
                    p.name.clone()
                }
            })
            .collect()
    }

    /// Reference to this method's dispatcher call-site constant.
    pub fn constant_ref(&self) -> String {
        format!("{}Methods.{}", self.parent_type_name, self.name)
    }

    /// The context expression handed to the dispatcher: the method's own
    /// context, or a background context when it has none.
    pub fn context_argument(&self) -> &'static str {
        if self.has_context {
            CONTEXT_PARAM_NAME
        } else {
            "context.Background()"
        }
    }

    /// Name of the context parameter inside the dispatcher closure.
    pub fn closure_context_name(&self) -> &'static str {
        if self.has_context {
            CONTEXT_PARAM_NAME
        } else {
            "_"
        }
    }
}
