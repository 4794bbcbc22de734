// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Raw method and type descriptors produced by the type resolver.
//!
//! **DDD Context:** Contract Resolution
//!
//! Descriptors are the resolver's view of a service contract: an ordered list
//! of methods, each with parameter and result [`TypeDescriptor`]s. They are
//! deliberately richer than what the code generator can render. Shapes such as
//! arrays, function types and anonymous structs can be described (so a
//! resolver never has to lie about a signature) but the translator in
//! [`crate::types`] rejects them.
//!
//! Descriptors deserialize from the contract manifests read by
//! [`crate::loader`]:
//!
//! ```json
//! { "kind": "pointer", "elem": { "kind": "named", "package": "os", "name": "File" } }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a channel type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanDir {
    /// `chan T`
    #[default]
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// A named field of an anonymous struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

/// Recursive description of a type appearing in a method signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// A predeclared primitive such as `string`, `int64` or `bool`.
    Basic { name: String },
    /// A declared type, optionally qualified by its package path.
    ///
    /// `methods` is the method set of the type, used by structural
    /// capability checks. Type identity only considers `package` and `name`.
    Named {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        package: Option<String>,
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        methods: Vec<MethodDescriptor>,
    },
    Pointer { elem: Box<TypeDescriptor> },
    Slice { elem: Box<TypeDescriptor> },
    Array { len: u64, elem: Box<TypeDescriptor> },
    Map {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    Chan {
        elem: Box<TypeDescriptor>,
        #[serde(default)]
        dir: ChanDir,
    },
    /// An anonymous structural contract (`interface{ ... }`).
    Interface {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        methods: Vec<MethodDescriptor>,
    },
    /// A polymorphic placeholder (type parameter).
    TypeParam { name: String },
    Func {
        #[serde(default)]
        params: Vec<TypeDescriptor>,
        #[serde(default)]
        results: Vec<TypeDescriptor>,
        #[serde(default)]
        variadic: bool,
    },
    Struct {
        #[serde(default)]
        fields: Vec<FieldDescriptor>,
    },
}

impl TypeDescriptor {
    #[must_use]
    pub fn basic(name: &str) -> Self {
        Self::Basic {
            name: name.to_string(),
        }
    }

    /// A named type declared in `package` (or predeclared when `None`).
    #[must_use]
    pub fn named(package: Option<&str>, name: &str) -> Self {
        Self::Named {
            package: package.map(String::from),
            name: name.to_string(),
            methods: Vec::new(),
        }
    }

    /// The predeclared `error` type, including its `Error() string` method.
    #[must_use]
    pub fn error() -> Self {
        Self::named(None, "error").with_methods(vec![MethodDescriptor::new("Error").returning(
            vec![Self::basic("string")],
        )])
    }

    /// `context.Context`.
    #[must_use]
    pub fn context() -> Self {
        Self::named(Some("context"), "Context")
            .with_methods(crate::capability::context_contract().to_vec())
    }

    #[must_use]
    pub fn pointer(elem: Self) -> Self {
        Self::Pointer {
            elem: Box::new(elem),
        }
    }

    #[must_use]
    pub fn slice(elem: Self) -> Self {
        Self::Slice {
            elem: Box::new(elem),
        }
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    #[must_use]
    pub fn chan(elem: Self, dir: ChanDir) -> Self {
        Self::Chan {
            elem: Box::new(elem),
            dir,
        }
    }

    /// `interface{}`.
    #[must_use]
    pub fn empty_interface() -> Self {
        Self::Interface {
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn type_param(name: &str) -> Self {
        Self::TypeParam {
            name: name.to_string(),
        }
    }

    /// Replaces the method set of a named type or anonymous interface.
    ///
    /// Other shapes have no method set of their own and are returned as-is.
    #[must_use]
    pub fn with_methods(mut self, method_set: Vec<MethodDescriptor>) -> Self {
        match &mut self {
            Self::Named { methods, .. } | Self::Interface { methods } => *methods = method_set,
            _ => {}
        }
        self
    }

    /// The methods callable on a value of this type.
    ///
    /// Pointers expose the method set of the type they point to.
    pub fn method_set(&self) -> &[MethodDescriptor] {
        match self {
            Self::Named { methods, .. } | Self::Interface { methods } => methods.as_slice(),
            Self::Pointer { elem } => match elem.as_ref() {
                Self::Named { methods, .. } => methods.as_slice(),
                _ => &[],
            },
            _ => &[],
        }
    }

    /// Type identity: named types are identical when package and name match,
    /// composite types when their components are identical.
    pub fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Basic { name: a }, Self::Basic { name: b })
            | (Self::TypeParam { name: a }, Self::TypeParam { name: b }) => a == b,
            (
                Self::Named {
                    package: pa,
                    name: na,
                    ..
                },
                Self::Named {
                    package: pb,
                    name: nb,
                    ..
                },
            ) => pa == pb && na == nb,
            (Self::Pointer { elem: a }, Self::Pointer { elem: b })
            | (Self::Slice { elem: a }, Self::Slice { elem: b }) => a.identical(b),
            (Self::Array { len: la, elem: a }, Self::Array { len: lb, elem: b }) => {
                la == lb && a.identical(b)
            }
            (Self::Map { key: ka, value: va }, Self::Map { key: kb, value: vb }) => {
                ka.identical(kb) && va.identical(vb)
            }
            (Self::Chan { elem: a, dir: da }, Self::Chan { elem: b, dir: db }) => {
                da == db && a.identical(b)
            }
            (Self::Interface { methods: a }, Self::Interface { methods: b }) => {
                a.len() == b.len()
                    && a.iter().all(|m| b.iter().any(|n| m.same_signature(n)))
            }
            (
                Self::Func {
                    params: pa,
                    results: ra,
                    variadic: va,
                },
                Self::Func {
                    params: pb,
                    results: rb,
                    variadic: vb,
                },
            ) => va == vb && all_identical(pa, pb) && all_identical(ra, rb),
            (Self::Struct { fields: a }, Self::Struct { fields: b }) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|(x, y)| x.name == y.name && x.ty.identical(&y.ty))
            }
            _ => false,
        }
    }
}

/// Go's predeclared type identifiers. These never take a package qualifier.
const PREDECLARED: &[&str] = &[
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32",
    "float64", "int", "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr",
];

impl TypeDescriptor {
    /// Qualifies every unqualified, non-predeclared named type with
    /// `package`, recursing through composite types.
    pub fn qualify_local(&mut self, package: &str) {
        match self {
            Self::Named {
                package: qualifier,
                name,
                methods,
            } => {
                if qualifier.is_none() && !PREDECLARED.contains(&name.as_str()) {
                    *qualifier = Some(package.to_string());
                }
                for method in methods {
                    method.qualify_local(package);
                }
            }
            Self::Pointer { elem }
            | Self::Slice { elem }
            | Self::Array { elem, .. }
            | Self::Chan { elem, .. } => elem.qualify_local(package),
            Self::Map { key, value } => {
                key.qualify_local(package);
                value.qualify_local(package);
            }
            Self::Interface { methods } => {
                for method in methods {
                    method.qualify_local(package);
                }
            }
            Self::Func { params, results, .. } => {
                for ty in params.iter_mut().chain(results) {
                    ty.qualify_local(package);
                }
            }
            Self::Struct { fields } => {
                for field in fields {
                    field.ty.qualify_local(package);
                }
            }
            Self::Basic { .. } | Self::TypeParam { .. } => {}
        }
    }
}

fn all_identical(a: &[TypeDescriptor], b: &[TypeDescriptor]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.identical(y))
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { name } | Self::TypeParam { name } => f.write_str(name),
            Self::Named {
                package: Some(package),
                name,
                ..
            } => write!(f, "{package}.{name}"),
            Self::Named { name, .. } => f.write_str(name),
            Self::Pointer { elem } => write!(f, "*{elem}"),
            Self::Slice { elem } => write!(f, "[]{elem}"),
            Self::Array { len, elem } => write!(f, "[{len}]{elem}"),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
            Self::Chan { elem, dir } => match dir {
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
            },
            Self::Interface { methods } if methods.is_empty() => f.write_str("interface{}"),
            Self::Interface { methods } => {
                f.write_str("interface{ ")?;
                for (i, method) in methods.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    f.write_str(&method.name)?;
                    f.write_str("(...)")?;
                }
                f.write_str(" }")
            }
            Self::Func { .. } => f.write_str("func(...)"),
            Self::Struct { fields } if fields.is_empty() => f.write_str("struct{}"),
            Self::Struct { .. } => f.write_str("struct{ ... }"),
        }
    }
}

/// A method parameter as reported by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl ParamDescriptor {
    #[must_use]
    pub fn new(name: &str, ty: TypeDescriptor) -> Self {
        Self {
            name: Some(name.to_string()),
            ty,
        }
    }

    #[must_use]
    pub fn unnamed(ty: TypeDescriptor) -> Self {
        Self { name: None, ty }
    }
}

/// A raw method signature: name, ordered parameters, ordered results, and
/// whether the last parameter is variadic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,
    #[serde(default)]
    pub results: Vec<TypeDescriptor>,
    #[serde(default)]
    pub variadic: bool,
}

impl MethodDescriptor {
    /// A nullary method with no results.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: Vec::new(),
            results: Vec::new(),
            variadic: false,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<ParamDescriptor>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn returning(mut self, results: Vec<TypeDescriptor>) -> Self {
        self.results = results;
        self
    }

    /// Marks the last parameter as variadic. It must be slice-shaped.
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Qualifies the unqualified local named types of every parameter and
    /// result with `package`.
    pub fn qualify_local(&mut self, package: &str) {
        for param in &mut self.params {
            param.ty.qualify_local(package);
        }
        for result in &mut self.results {
            result.qualify_local(package);
        }
    }

    /// Same name, variadic flag and identical parameter/result types.
    /// Parameter names are ignored.
    pub fn same_signature(&self, other: &Self) -> bool {
        self.name == other.name
            && self.variadic == other.variadic
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty.identical(&b.ty))
            && all_identical(&self.results, &other.results)
    }
}
