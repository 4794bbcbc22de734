// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Document tree for Go source generation.
//!
//! **DDD Context:** Code Generation
//!
//! Emitters return `Document` values instead of writing to a buffer with
//! manual indentation tracking. Documents are rendered in a final pass with
//! gofmt-style tab indentation.
//!
//! # Example
//!
//! ```
//! use reinforcer_core::codegen::document::{block, Document};
//! use reinforcer_core::docvec;
//!
//! let doc = block(docvec!["if err != nil"], vec![docvec!["panic(err)"]]);
//! assert_eq!(doc.to_pretty_string(), "if err != nil {\n\tpanic(err)\n}");
//! ```

/// Indentation step, in tabs.
pub const INDENT: usize = 1;

/// A pretty-printable document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document<'a> {
    /// A borrowed string.
    Str(&'a str),
    /// An owned string.
    String(String),
    /// A newline followed by current indentation.
    Line,
    /// Increase indentation for nested content.
    Nest(usize, Box<Document<'a>>),
    /// A sequence of documents.
    Vec(Vec<Document<'a>>),
    /// Empty document.
    Nil,
}

/// Coerce a value into a `Document`.
pub trait Documentable<'a> {
    fn to_doc(self) -> Document<'a>;
}

impl<'a> Documentable<'a> for &'a str {
    fn to_doc(self) -> Document<'a> {
        Document::Str(self)
    }
}

impl<'a> Documentable<'a> for String {
    fn to_doc(self) -> Document<'a> {
        Document::String(self)
    }
}

impl<'a> Documentable<'a> for Document<'a> {
    fn to_doc(self) -> Document<'a> {
        self
    }
}

impl<'a> Documentable<'a> for Vec<Document<'a>> {
    fn to_doc(self) -> Document<'a> {
        Document::Vec(self)
    }
}

/// Join multiple documents together in a vector.
///
/// Each element is converted to a `Document` via the `Documentable` trait.
/// No separator is inserted.
///
/// ```
/// use reinforcer_core::docvec;
///
/// let doc = docvec!["return ", "nil"];
/// assert_eq!(doc.to_pretty_string(), "return nil");
/// ```
#[macro_export]
macro_rules! docvec {
    () => {
        $crate::codegen::document::Document::Vec(Vec::new())
    };

    ($first:expr $(,)?) => {
        $crate::codegen::document::Document::Vec(
            vec![$crate::codegen::document::Documentable::to_doc($first)]
        )
    };

    ($first:expr, $($rest:expr),+ $(,)?) => {
        match $crate::codegen::document::Documentable::to_doc($first) {
            $crate::codegen::document::Document::Vec(mut vec) => {
                $(
                    vec.push($crate::codegen::document::Documentable::to_doc($rest));
                )*
                $crate::codegen::document::Document::Vec(vec)
            },
            first => {
                $crate::codegen::document::Document::Vec(
                    vec![first, $($crate::codegen::document::Documentable::to_doc($rest)),+]
                )
            }
        }
    };
}

/// A mandatory newline followed by indentation.
#[must_use]
pub fn line() -> Document<'static> {
    Document::Line
}

/// An empty document.
#[must_use]
pub fn nil() -> Document<'static> {
    Document::Nil
}

/// Increases indentation for the inner document.
#[must_use]
pub fn nest(indent: usize, doc: Document<'_>) -> Document<'_> {
    Document::Nest(indent, Box::new(doc))
}

/// Joins documents with a separator between each pair.
#[must_use]
pub fn join<'a>(
    docs: impl IntoIterator<Item = Document<'a>>,
    separator: &Document<'a>,
) -> Document<'a> {
    let docs: Vec<_> = docs.into_iter().collect();
    if docs.is_empty() {
        return Document::Nil;
    }
    let mut result = Vec::with_capacity(docs.len() * 2 - 1);
    let mut first = true;
    for doc in docs {
        if !first {
            result.push(separator.clone());
        }
        result.push(doc);
        first = false;
    }
    Document::Vec(result)
}

/// Concatenates documents without any separator.
#[must_use]
pub fn concat<'a>(docs: impl IntoIterator<Item = Document<'a>>) -> Document<'a> {
    Document::Vec(docs.into_iter().collect())
}

/// A brace-delimited block: `header {`, one indented line per statement,
/// then `}`.
#[must_use]
pub fn block<'a>(header: Document<'a>, statements: Vec<Document<'a>>) -> Document<'a> {
    delimited(header, " {", "}", statements)
}

/// `header` and `open`, one indented line per item, then `close` on its own
/// line. Composite literals use `"{"` and import groups `" ("`.
#[must_use]
pub fn delimited<'a>(
    header: Document<'a>,
    open: &'a str,
    close: &'a str,
    items: Vec<Document<'a>>,
) -> Document<'a> {
    let body = concat(items.into_iter().map(|s| docvec![line(), s]));
    docvec![header, open, nest(INDENT, body), line(), close]
}

impl Document<'_> {
    /// Renders the document to a string.
    #[must_use]
    pub fn to_pretty_string(&self) -> String {
        let mut output = String::new();
        self.render_to(&mut output, 0);
        output
    }

    fn render_to(&self, output: &mut String, indent: usize) {
        match self {
            Document::Str(s) => output.push_str(s),
            Document::String(s) => output.push_str(s),
            Document::Nil => {}
            Document::Line => {
                output.push('\n');
                write_indent(output, indent);
            }
            Document::Nest(extra, doc) => {
                doc.render_to(output, indent + extra);
            }
            Document::Vec(docs) => {
                for doc in docs {
                    doc.render_to(output, indent);
                }
            }
        }
    }
}

fn write_indent(output: &mut String, indent: usize) {
    for _ in 0..indent {
        output.push('\t');
    }
}
