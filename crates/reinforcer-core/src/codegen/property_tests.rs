// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for signature normalization and code generation.
//!
//! 1. **Translation is total** over the renderable shapes and rejects every
//!    tree containing an unrenderable one.
//! 2. **Normalization is faithful**: parameter and result counts are kept,
//!    the error flag matches the error position.
//! 3. **Strategy table** holds for every normalized method.
//! 4. **`generate` emits every method** once in the proxy and in the
//!    constants table.
//!
//! **DDD Context:** Code Generation

use proptest::prelude::*;

use crate::codegen::{Config, FileConfig, generate};
use crate::descriptor::{ChanDir, MethodDescriptor, ParamDescriptor, TypeDescriptor};
use crate::method::Method;
use crate::strategy::{GenerationStrategy, select};
use crate::types;

// ============================================================================
// Generators
// ============================================================================

const BASIC_NAMES: &[&str] = &["string", "int", "int64", "bool", "float64", "byte", "rune"];

fn value_leaf() -> impl Strategy<Value = TypeDescriptor> {
    prop_oneof![
        prop::sample::select(BASIC_NAMES).prop_map(TypeDescriptor::basic),
        Just(TypeDescriptor::empty_interface()),
        Just(TypeDescriptor::named(Some("github.com/acme/sub"), "User")),
        Just(TypeDescriptor::named(Some("time"), "Duration")),
        Just(TypeDescriptor::type_param("T")),
    ]
}

fn chan_dir() -> impl Strategy<Value = ChanDir> {
    prop_oneof![Just(ChanDir::Both), Just(ChanDir::Send), Just(ChanDir::Recv)]
}

/// Renderable, never error-shaped at the top level.
fn value_type() -> impl Strategy<Value = TypeDescriptor> {
    value_leaf().prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(TypeDescriptor::pointer),
            inner.clone().prop_map(TypeDescriptor::slice),
            (inner.clone(), inner.clone()).prop_map(|(k, v)| TypeDescriptor::map(k, v)),
            (inner, chan_dir()).prop_map(|(e, d)| TypeDescriptor::chan(e, d)),
        ]
    })
}

fn unrenderable_leaf() -> impl Strategy<Value = TypeDescriptor> {
    prop_oneof![
        Just(TypeDescriptor::Array {
            len: 16,
            elem: Box::new(TypeDescriptor::basic("byte")),
        }),
        Just(TypeDescriptor::Func {
            params: Vec::new(),
            results: vec![TypeDescriptor::error()],
            variadic: false,
        }),
        Just(TypeDescriptor::Struct { fields: Vec::new() }),
        Just(TypeDescriptor::empty_interface().with_methods(vec![MethodDescriptor::new("Close")])),
    ]
}

/// An unrenderable shape buried under renderable wrappers.
fn unrenderable_type() -> impl Strategy<Value = TypeDescriptor> {
    (unrenderable_leaf(), prop::collection::vec(0..3u8, 0..4)).prop_map(|(leaf, wrappers)| {
        wrappers.into_iter().fold(leaf, |ty, w| match w {
            0 => TypeDescriptor::pointer(ty),
            1 => TypeDescriptor::slice(ty),
            _ => TypeDescriptor::map(TypeDescriptor::basic("string"), ty),
        })
    })
}

/// A renderable method with an optional leading context and an optional
/// error result at an arbitrary position.
fn method(name: String) -> impl Strategy<Value = MethodDescriptor> {
    (
        any::<bool>(),
        prop::collection::vec(value_type(), 0..4),
        prop::collection::vec(value_type(), 0..3),
        prop::option::of(0..3usize),
    )
        .prop_map(move |(ctx, params, mut results, error_at)| {
            let mut all = Vec::new();
            if ctx {
                all.push(ParamDescriptor::new("ctx", TypeDescriptor::context()));
            }
            all.extend(params.into_iter().map(ParamDescriptor::unnamed));
            if let Some(at) = error_at {
                results.insert(at.min(results.len()), TypeDescriptor::error());
            }
            MethodDescriptor::new(&name).with_params(all).returning(results)
        })
}

fn methods() -> impl Strategy<Value = Vec<MethodDescriptor>> {
    (1..6usize).prop_flat_map(|n| {
        (0..n)
            .map(|i| method(format!("Method{i}")))
            .collect::<Vec<_>>()
    })
}

fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(256),
        ..default
    }
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: every renderable tree translates.
    #[test]
    fn renderable_types_translate(ty in value_type()) {
        let expr = types::render(&ty, false);
        prop_assert!(expr.is_ok(), "failed to render {ty}: {expr:?}");
    }

    /// Property 1b: any unrenderable shape fails the whole tree.
    #[test]
    fn unrenderable_types_fail(ty in unrenderable_type()) {
        prop_assert!(types::render(&ty, false).is_err());
    }

    /// Property 2: normalization keeps arity and finds the error slot.
    #[test]
    fn normalization_is_faithful(raw in method("Fn".to_string())) {
        let m = Method::normalize("Svc", &raw).unwrap();
        prop_assert_eq!(m.parameters.len(), raw.params.len());
        prop_assert_eq!(m.return_types.len(), raw.results.len());
        prop_assert_eq!(m.returns_error, m.return_error_index.is_some());
        if let Some(index) = m.return_error_index {
            prop_assert_eq!(m.return_types[index].to_string(), "error");
        }
        prop_assert_eq!(m.has_context, m.parameters.first().is_some_and(|p| p.name == "ctx"));
        for (i, p) in m.parameters.iter().enumerate().skip(usize::from(m.has_context)) {
            prop_assert_eq!(&p.name, &format!("arg{i}"));
        }
    }

    /// Property 3: the strategy table.
    #[test]
    fn strategy_table_holds(raw in method("Fn".to_string()), ignore in any::<bool>()) {
        let m = Method::normalize("Svc", &raw).unwrap();
        let expected = match (m.return_types.is_empty(), m.returns_error, ignore) {
            (true, _, true) => GenerationStrategy::PassThrough,
            (true, _, false) => GenerationStrategy::NoReturnWrap,
            (false, true, _) => GenerationStrategy::RetryableWrap,
            (false, false, _) => GenerationStrategy::PassThrough,
        };
        prop_assert_eq!(select(&m, ignore), expected);
    }

    /// Property 4: every method is emitted and named in the constants table.
    #[test]
    fn generate_emits_every_method(methods in methods(), ignore in any::<bool>()) {
        let names: Vec<String> = methods.iter().map(|m| m.name.clone()).collect();
        let config = Config::new("reinforced")
            .with_ignore_no_return_methods(ignore)
            .with_file(FileConfig::new("Svc", "Svc", methods));
        let generated = generate(&config).unwrap();
        let contents = &generated.files[0].contents;
        for name in &names {
            let declaration = format!("func (s *Svc) {name}(");
            prop_assert_eq!(contents.matches(&declaration).count(), 1);
            let constant = format!("\t{name}:");
            prop_assert!(generated.constants.contains(&constant));
        }
        if contents.contains(".run(") {
            prop_assert!(contents.contains("import \"context\"") || contents.contains("\t\"context\""));
        }
    }
}
