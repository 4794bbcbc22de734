// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Type-descriptor translation.
//!
//! **DDD Context:** Signature Normalization
//!
//! [`render`] turns a [`TypeDescriptor`] into a [`TypeExpr`], the renderable
//! type expression used in generated signatures. Translation is total over a
//! closed set of shapes:
//!
//! | Descriptor | Expression |
//! |---|---|
//! | basic / type parameter | name |
//! | named | `pkg.Name` (bare name when predeclared) |
//! | pointer | `*T` |
//! | slice | `[]T` (`...T` in variadic position) |
//! | map | `map[K]V` |
//! | chan | `chan T`, `chan<- T`, `<-chan T` |
//! | empty interface | `interface{}` |
//!
//! Every other shape is a [`TypeError`]; callers never render partially.

use crate::descriptor::{ChanDir, TypeDescriptor};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors produced while translating a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The descriptor's shape has no rendering.
    #[error("type not handled: {0}")]
    NotHandled(String),

    /// Variadic position on something that is not a slice.
    #[error("expected variadic parameter to be a slice, got {0}")]
    VariadicNotSlice(String),
}

/// A renderable type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// An unqualified identifier: primitives, predeclared types, type
    /// parameters and `interface{}`.
    Ident(String),
    /// A type qualified by the import path of its package.
    Qual { path: String, name: String },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// Spread form of a variadic final parameter.
    Variadic(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    Chan(ChanDir, Box<TypeExpr>),
}

impl TypeExpr {
    #[must_use]
    pub fn ident(name: &str) -> Self {
        Self::Ident(name.to_string())
    }

    #[must_use]
    pub fn qual(path: &str, name: &str) -> Self {
        Self::Qual {
            path: path.to_string(),
            name: name.to_string(),
        }
    }

    /// `context.Context`.
    #[must_use]
    pub fn context() -> Self {
        Self::qual("context", "Context")
    }

    /// Adds every import path referenced by this expression to `imports`.
    pub fn collect_imports(&self, imports: &mut Imports) {
        match self {
            Self::Ident(_) => {}
            Self::Qual { path, .. } => imports.add(path),
            Self::Pointer(elem) | Self::Slice(elem) | Self::Variadic(elem) | Self::Chan(_, elem) => {
                elem.collect_imports(imports);
            }
            Self::Map(key, value) => {
                key.collect_imports(imports);
                value.collect_imports(imports);
            }
        }
    }

    /// Renders the expression, qualifying packages with their alias in
    /// `imports`.
    pub fn render(&self, imports: &Imports) -> String {
        let mut out = String::new();
        self.render_to(&mut out, imports);
        out
    }

    fn render_to(&self, out: &mut String, imports: &Imports) {
        match self {
            Self::Ident(name) => out.push_str(name),
            Self::Qual { path, name } => {
                out.push_str(&imports.alias(path));
                out.push('.');
                out.push_str(name);
            }
            Self::Pointer(elem) => {
                out.push('*');
                elem.render_to(out, imports);
            }
            Self::Slice(elem) => {
                out.push_str("[]");
                elem.render_to(out, imports);
            }
            Self::Variadic(elem) => {
                out.push_str("...");
                elem.render_to(out, imports);
            }
            Self::Map(key, value) => {
                out.push_str("map[");
                key.render_to(out, imports);
                out.push(']');
                value.render_to(out, imports);
            }
            Self::Chan(dir, elem) => {
                out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                elem.render_to(out, imports);
            }
        }
    }
}

impl fmt::Display for TypeExpr {
    /// Renders with guessed package aliases (no import table).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&Imports::default()))
    }
}

/// Import table of a generated source unit: import path → package alias.
///
/// Aliases are guessed from the last path segment. When two paths guess the
/// same alias the later one gets a numeric suffix (`sub`, `sub2`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Imports {
    aliases: BTreeMap<String, String>,
}

impl Imports {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path`, assigning it a unique alias on first sight.
    pub fn add(&mut self, path: &str) {
        if self.aliases.contains_key(path) {
            return;
        }
        let base = guess_alias(path);
        let mut alias = base.clone();
        let mut n = 2;
        while self.aliases.values().any(|a| *a == alias) {
            alias = format!("{base}{n}");
            n += 1;
        }
        self.aliases.insert(path.to_string(), alias);
    }

    /// The alias of `path`, or its guessed alias if it was never registered.
    pub fn alias(&self, path: &str) -> String {
        self.aliases
            .get(path)
            .cloned()
            .unwrap_or_else(|| guess_alias(path))
    }

    /// `(path, alias)` pairs sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(p, a)| (p.as_str(), a.as_str()))
    }
}

/// Guesses the package name of an import path: the last segment, lowercased,
/// with a `go-` prefix and non-identifier characters removed.
pub fn guess_alias(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or(path);
    let last = last.strip_prefix("go-").unwrap_or(last);
    let alias: String = last
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase();
    if alias.is_empty() || alias.starts_with(|c: char| c.is_ascii_digit()) {
        format!("pkg{alias}")
    } else {
        alias
    }
}

/// Translates `desc` into a type expression.
///
/// With `variadic` set the descriptor must be a slice and renders in spread
/// form.
///
/// # Errors
///
/// Returns [`TypeError`] for descriptors outside the renderable set:
/// arrays, function types, anonymous structs, interfaces with declared
/// methods, or a variadic descriptor that is not a slice.
pub fn render(desc: &TypeDescriptor, variadic: bool) -> Result<TypeExpr, TypeError> {
    if variadic {
        return match desc {
            TypeDescriptor::Slice { elem } => Ok(TypeExpr::Variadic(Box::new(render(elem, false)?))),
            other => Err(TypeError::VariadicNotSlice(other.to_string())),
        };
    }

    match desc {
        TypeDescriptor::Basic { name } | TypeDescriptor::TypeParam { name } => {
            Ok(TypeExpr::Ident(name.clone()))
        }
        TypeDescriptor::Named {
            package: Some(package),
            name,
            ..
        } => Ok(TypeExpr::qual(package, name)),
        TypeDescriptor::Named { name, .. } => Ok(TypeExpr::Ident(name.clone())),
        TypeDescriptor::Pointer { elem } => Ok(TypeExpr::Pointer(Box::new(render(elem, false)?))),
        TypeDescriptor::Slice { elem } => Ok(TypeExpr::Slice(Box::new(render(elem, false)?))),
        TypeDescriptor::Map { key, value } => Ok(TypeExpr::Map(
            Box::new(render(key, false)?),
            Box::new(render(value, false)?),
        )),
        TypeDescriptor::Chan { elem, dir } => {
            Ok(TypeExpr::Chan(*dir, Box::new(render(elem, false)?)))
        }
        TypeDescriptor::Interface { methods } if methods.is_empty() => {
            Ok(TypeExpr::ident("interface{}"))
        }
        TypeDescriptor::Interface { .. } => Err(TypeError::NotHandled(format!(
            "inline interface with methods ({desc})"
        ))),
        TypeDescriptor::Array { .. } | TypeDescriptor::Func { .. } | TypeDescriptor::Struct { .. } => {
            Err(TypeError::NotHandled(desc.to_string()))
        }
    }
}
