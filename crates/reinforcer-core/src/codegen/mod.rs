// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Resilient proxy code generation.
//!
//! **DDD Context:** Code Generation
//!
//! [`generate`] turns a set of service contracts into Go source units:
//!
//! - one unit per contract holding the proxy type, its constructor and one
//!   proxy method per contract method;
//! - a shared **common** unit with the dispatcher wiring (`base`, `run`,
//!   `Option`, `RetryAllErrors`);
//! - a **constants** unit with one `<Type>Methods` table per contract whose
//!   entries are the dispatcher call-site names.
//!
//! # Example
//!
//! ```
//! use reinforcer_core::codegen::{Config, FileConfig, generate};
//! use reinforcer_core::descriptor::{MethodDescriptor, TypeDescriptor};
//!
//! let close = MethodDescriptor::new("Close").returning(vec![TypeDescriptor::error()]);
//! let generated = generate(
//!     &Config::new("reinforced").with_file(FileConfig::new("Closer", "Closer", vec![close])),
//! )?;
//! assert!(generated.files[0].contents.contains("func (c *Closer) Close() error {"));
//! # Ok::<(), reinforcer_core::codegen::CodeGenError>(())
//! ```

pub mod document;
pub mod emit;

#[cfg(test)]
mod property_tests;

use crate::descriptor::MethodDescriptor;
use crate::docvec;
use crate::method::{Method, MethodError};
use crate::strategy::{self, GenerationStrategy};
use crate::types::Imports;
use document::{Document, block, delimited, join, line};
use emit::{emitter_for, method_signature};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// First line of every generated unit.
pub const GENERATED_HEADER: &str = "// Code generated by reinforcer, DO NOT EDIT.";

/// Import path of the runner contract the generated code depends on.
pub const RUNNER_PACKAGE: &str = "github.com/slok/goresilience";

/// Errors that can occur during code generation.
#[derive(Debug, Error)]
pub enum CodeGenError {
    /// A method signature of a contract could not be normalized.
    #[error("failed to generate {type_name}: {source}")]
    Method {
        type_name: String,
        #[source]
        source: MethodError,
    },

    /// The same method name appears twice in one contract.
    #[error("duplicate method {method} in {type_name}")]
    DuplicateMethod { type_name: String, method: String },

    /// The output package name is not a valid identifier.
    #[error("invalid output package name {0:?}")]
    InvalidPackageName(String),
}

/// Result type for code generation operations.
pub type Result<T> = std::result::Result<T, CodeGenError>;

/// One contract to generate a proxy for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    /// Name of the contract in its source package.
    pub src_type_name: String,
    /// Name of the generated proxy type.
    pub out_type_name: String,
    /// Raw method descriptors, in declaration order.
    pub methods: Vec<MethodDescriptor>,
}

impl FileConfig {
    pub fn new(src_type_name: &str, out_type_name: &str, methods: Vec<MethodDescriptor>) -> Self {
        Self {
            src_type_name: src_type_name.to_string(),
            out_type_name: out_type_name.to_string(),
            methods,
        }
    }
}

/// Options for a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Package name of the generated code.
    pub out_pkg: String,
    /// Pass no-return methods straight through instead of wrapping them.
    pub ignore_no_return_methods: bool,
    pub files: Vec<FileConfig>,
}

impl Config {
    pub fn new(out_pkg: &str) -> Self {
        Self {
            out_pkg: out_pkg.to_string(),
            ignore_no_return_methods: false,
            files: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_ignore_no_return_methods(mut self, enabled: bool) -> Self {
        self.ignore_no_return_methods = enabled;
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: FileConfig) -> Self {
        self.files.push(file);
        self
    }
}

/// Generated source for one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub type_name: String,
    pub contents: String,
}

/// The output of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub common: String,
    pub constants: String,
    pub files: Vec<GeneratedFile>,
}

/// A contract whose methods have all been normalized.
struct NormalizedType<'a> {
    config: &'a FileConfig,
    methods: Vec<(Method, GenerationStrategy)>,
}

/// Generates the proxies, common unit and constants unit for `config`.
///
/// Every method of every contract is normalized before anything is
/// rendered, so a failure produces no output at all.
///
/// # Errors
///
/// Returns [`CodeGenError`] if the package name is invalid, a contract
/// declares a method twice, or a signature cannot be normalized.
#[instrument(skip_all, fields(out_pkg = %config.out_pkg, types = config.files.len()))]
pub fn generate(config: &Config) -> Result<Generated> {
    if !is_identifier(&config.out_pkg) {
        return Err(CodeGenError::InvalidPackageName(config.out_pkg.clone()));
    }

    let normalized = config
        .files
        .iter()
        .map(|file| normalize_type(file, config.ignore_no_return_methods))
        .collect::<Result<Vec<_>>>()?;

    let files = normalized
        .iter()
        .map(|ty| {
            info!(type_name = %ty.config.out_type_name, "Generating proxy");
            GeneratedFile {
                type_name: ty.config.out_type_name.clone(),
                contents: proxy_unit(&config.out_pkg, ty),
            }
        })
        .collect();

    Ok(Generated {
        common: common_unit(&config.out_pkg),
        constants: constants_unit(&config.out_pkg, &normalized),
        files,
    })
}

fn normalize_type(file: &FileConfig, ignore_no_return: bool) -> Result<NormalizedType<'_>> {
    let mut seen = HashSet::new();
    let mut methods = Vec::with_capacity(file.methods.len());
    for raw in &file.methods {
        if !seen.insert(raw.name.as_str()) {
            return Err(CodeGenError::DuplicateMethod {
                type_name: file.src_type_name.clone(),
                method: raw.name.clone(),
            });
        }
        let method =
            Method::normalize(&file.out_type_name, raw).map_err(|source| CodeGenError::Method {
                type_name: file.src_type_name.clone(),
                source,
            })?;
        let strategy = strategy::select(&method, ignore_no_return);
        debug!(method = %method.name, %strategy, "Selected generation strategy");
        methods.push((method, strategy));
    }
    Ok(NormalizedType {
        config: file,
        methods,
    })
}

fn header(out_pkg: &str) -> Document<'_> {
    docvec![GENERATED_HEADER, line(), line(), "package ", out_pkg, line()]
}

fn imports_block(imports: &Imports) -> Document<'static> {
    let mut specs: Vec<Document<'static>> = imports
        .iter()
        .map(|(path, alias)| {
            let last = path.rsplit('/').next().unwrap_or(path);
            if alias == last {
                Document::String(format!("\"{path}\""))
            } else {
                Document::String(format!("{alias} \"{path}\""))
            }
        })
        .collect();
    match specs.len() {
        0 => document::nil(),
        1 => docvec![line(), "import ", specs.remove(0), line()],
        _ => docvec![line(), delimited(docvec!["import"], " (", ")", specs), line()],
    }
}

fn receiver_name(type_name: &str) -> String {
    type_name
        .chars()
        .next()
        .map_or_else(|| "p".to_string(), |c| c.to_lowercase().collect())
}

fn proxy_unit(out_pkg: &str, ty: &NormalizedType<'_>) -> String {
    let type_name = ty.config.out_type_name.as_str();
    let receiver = receiver_name(type_name);
    let target = format!("target{type_name}");

    let mut imports = Imports::new();
    let wraps = ty
        .methods
        .iter()
        .any(|(_, s)| *s != GenerationStrategy::PassThrough);
    if wraps {
        imports.add("context");
    }
    for (method, _) in &ty.methods {
        for param in &method.parameters {
            param.ty.collect_imports(&mut imports);
        }
        for ret in &method.return_types {
            ret.collect_imports(&mut imports);
        }
    }

    let interface = block(
        docvec!["type ", target.clone(), " interface"],
        ty.methods
            .iter()
            .map(|(m, _)| Document::String(method_signature(m, &imports)))
            .collect(),
    );

    let proxy_struct = docvec![
        format!(
            "// {type_name} is a reinforced proxy of {}",
            ty.config.src_type_name
        ),
        line(),
        block(
            docvec!["type ", type_name, " struct"],
            vec![docvec!["*base"], docvec!["delegate ", target.clone()]],
        ),
    ];

    let base = delimited(
        docvec!["base: &base"],
        "{",
        "}",
        vec![
            docvec!["errorPredicate: RetryAllErrors,"],
            docvec!["runnerFactory:  runnerFactory,"],
        ],
    );
    let literal = delimited(
        docvec![format!("{receiver} := &{type_name}")],
        "{",
        "}",
        vec![docvec![base, ","], docvec!["delegate: delegate,"]],
    );
    let constructor = docvec![
        format!("// New{type_name} creates a {type_name} whose calls to delegate run through runnerFactory"),
        line(),
        block(
            docvec![format!(
                "func New{type_name}(delegate {target}, runnerFactory runnerFactory, options ...Option) *{type_name}"
            )],
            vec![
                literal,
                block(
                    docvec!["for _, opt := range options"],
                    vec![docvec![format!("opt({receiver}.base)")]],
                ),
                docvec![format!("return {receiver}")],
            ],
        ),
    ];

    let mut sections = vec![interface, proxy_struct, constructor];
    for (method, strategy) in &ty.methods {
        let emitter = emitter_for(*strategy, method, type_name, &receiver);
        sections.push(Document::String(
            emitter.declaration(&imports).to_pretty_string(),
        ));
    }

    docvec![
        header(out_pkg),
        imports_block(&imports),
        line(),
        join(sections, &docvec![line(), line()]),
        line(),
    ]
    .to_pretty_string()
}

fn common_unit(out_pkg: &str) -> String {
    let mut imports = Imports::new();
    imports.add("context");
    imports.add(RUNNER_PACKAGE);

    let sections = vec![
        docvec![
            "// RetryAllErrors is the default error predicate, it classifies every error as retryable",
            line(),
            block(
                docvec!["var RetryAllErrors = func(_ string, _ error) bool"],
                vec![docvec!["return true"]],
            ),
        ],
        docvec![
            "// Option configures a reinforced proxy",
            line(),
            "type Option func(*base)",
        ],
        docvec![
            "// WithRetryableErrorPredicate sets the predicate that decides which errors are retried",
            line(),
            block(
                docvec!["func WithRetryableErrorPredicate(fn func(string, error) bool) Option"],
                vec![block(
                    docvec!["return func(o *base)"],
                    vec![docvec!["o.errorPredicate = fn"]],
                )],
            ),
        ],
        block(
            docvec!["type runnerFactory interface"],
            vec![docvec!["GetRunner(name string) goresilience.Runner"]],
        ),
        block(
            docvec!["type base struct"],
            vec![
                docvec!["errorPredicate func(string, error) bool"],
                docvec!["runnerFactory  runnerFactory"],
            ],
        ),
        block(
            docvec!["func (b *base) run(ctx context.Context, name string, fn func(ctx context.Context) error) error"],
            vec![docvec!["return b.runnerFactory.GetRunner(name).Run(ctx, fn)"]],
        ),
    ];

    docvec![
        header(out_pkg),
        imports_block(&imports),
        line(),
        join(sections, &docvec![line(), line()]),
        line(),
    ]
    .to_pretty_string()
}

fn constants_unit(out_pkg: &str, types: &[NormalizedType<'_>]) -> String {
    let mut sorted: Vec<&NormalizedType<'_>> = types.iter().collect();
    sorted.sort_by(|a, b| a.config.out_type_name.cmp(&b.config.out_type_name));

    let sections = sorted.into_iter().map(|ty| {
        let type_name = ty.config.out_type_name.as_str();
        let mut names: Vec<&str> = ty.methods.iter().map(|(m, _)| m.name.as_str()).collect();
        names.sort_unstable();
        let width = names.iter().map(|n| n.len()).max().unwrap_or(0);

        let fields = names
            .iter()
            .map(|name| Document::String(format!("{name:<width$} string")))
            .collect();
        let values = names
            .iter()
            .map(|name| {
                let key = format!("{name}:");
                Document::String(format!("{key:<w$} \"{name}\",", w = width + 1))
            })
            .collect();

        docvec![
            format!("// {type_name}Methods are the methods in {type_name}"),
            line(),
            block(docvec![format!("var {type_name}Methods = struct")], fields),
            delimited(document::nil(), "{", "}", values),
        ]
    });

    docvec![
        header(out_pkg),
        line(),
        join(sections, &docvec![line(), line()]),
        line(),
    ]
    .to_pretty_string()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ParamDescriptor, TypeDescriptor};

    fn client_methods() -> Vec<MethodDescriptor> {
        let ctx = || ParamDescriptor::new("ctx", TypeDescriptor::context());
        let name = || ParamDescriptor::new("name", TypeDescriptor::basic("string"));
        vec![
            MethodDescriptor::new("SayHello")
                .with_params(vec![ctx(), name()])
                .returning(vec![TypeDescriptor::error()]),
            MethodDescriptor::new("GenerateGreeting")
                .with_params(vec![ctx(), name()])
                .returning(vec![TypeDescriptor::basic("string"), TypeDescriptor::error()]),
        ]
    }

    #[test]
    fn generates_constants_table() {
        let config = Config::new("reinforced")
            .with_file(FileConfig::new("Service", "Service", vec![MethodDescriptor::new("GetData")]))
            .with_file(FileConfig::new("Client", "Client", client_methods()));
        let generated = generate(&config).unwrap();
        assert_eq!(
            generated.constants,
            "// Code generated by reinforcer, DO NOT EDIT.

package reinforced

// ClientMethods are the methods in Client
var ClientMethods = struct {
\tGenerateGreeting string
\tSayHello         string
}{
\tGenerateGreeting: \"GenerateGreeting\",
\tSayHello:         \"SayHello\",
}

// ServiceMethods are the methods in Service
var ServiceMethods = struct {
\tGetData string
}{
\tGetData: \"GetData\",
}
"
        );
    }

    #[test]
    fn generates_common_unit() {
        let generated = generate(&Config::new("reinforced")).unwrap();
        assert_eq!(
            generated.common,
            "// Code generated by reinforcer, DO NOT EDIT.

package reinforced

import (
\t\"context\"
\t\"github.com/slok/goresilience\"
)

// RetryAllErrors is the default error predicate, it classifies every error as retryable
var RetryAllErrors = func(_ string, _ error) bool {
\treturn true
}

// Option configures a reinforced proxy
type Option func(*base)

// WithRetryableErrorPredicate sets the predicate that decides which errors are retried
func WithRetryableErrorPredicate(fn func(string, error) bool) Option {
\treturn func(o *base) {
\t\to.errorPredicate = fn
\t}
}

type runnerFactory interface {
\tGetRunner(name string) goresilience.Runner
}

type base struct {
\terrorPredicate func(string, error) bool
\trunnerFactory  runnerFactory
}

func (b *base) run(ctx context.Context, name string, fn func(ctx context.Context) error) error {
\treturn b.runnerFactory.GetRunner(name).Run(ctx, fn)
}
"
        );
    }

    #[test]
    fn generates_proxy_unit() {
        let config = Config::new("reinforced").with_file(FileConfig::new("Client", "Client", client_methods()));
        let generated = generate(&config).unwrap();
        assert_eq!(generated.files.len(), 1);
        let file = &generated.files[0];
        assert_eq!(file.type_name, "Client");
        assert!(file.contents.starts_with(
            "// Code generated by reinforcer, DO NOT EDIT.\n\npackage reinforced\n\nimport \"context\"\n\n"
        ));
        assert!(file.contents.contains(
            "type targetClient interface {
\tSayHello(ctx context.Context, arg1 string) error
\tGenerateGreeting(ctx context.Context, arg1 string) (string, error)
}"
        ));
        assert!(file.contents.contains(
            "type Client struct {
\t*base
\tdelegate targetClient
}"
        ));
        assert!(file.contents.contains(
            "func NewClient(delegate targetClient, runnerFactory runnerFactory, options ...Option) *Client {
\tc := &Client{
\t\tbase: &base{
\t\t\terrorPredicate: RetryAllErrors,
\t\t\trunnerFactory:  runnerFactory,
\t\t},
\t\tdelegate: delegate,
\t}
\tfor _, opt := range options {
\t\topt(c.base)
\t}
\treturn c
}"
        ));
        let say_hello = file.contents.find("func (c *Client) SayHello(").unwrap();
        let greeting = file.contents.find("func (c *Client) GenerateGreeting(").unwrap();
        assert!(say_hello < greeting);
        assert!(file.contents.ends_with("\treturn r0, err\n}\n"));
    }

    #[test]
    fn pass_through_only_proxy_needs_no_context_import() {
        let methods = vec![
            MethodDescriptor::new("Name").returning(vec![TypeDescriptor::basic("string")]),
            MethodDescriptor::new("Reset"),
        ];
        let config = Config::new("reinforced")
            .with_ignore_no_return_methods(true)
            .with_file(FileConfig::new("Named", "Named", methods));
        let contents = &generate(&config).unwrap().files[0].contents;
        assert!(!contents.contains("import"));
        assert!(contents.contains("func (n *Named) Reset() {\n\tn.delegate.Reset()\n}"));
    }

    #[test]
    fn imports_referenced_packages_with_aliases() {
        let methods = vec![
            MethodDescriptor::new("GetUser")
                .with_params(vec![ParamDescriptor::new("ctx", TypeDescriptor::context())])
                .returning(vec![
                    TypeDescriptor::pointer(TypeDescriptor::named(Some("github.com/acme/go-users"), "User")),
                    TypeDescriptor::error(),
                ]),
            MethodDescriptor::new("SaveFile")
                .with_params(vec![ParamDescriptor::new(
                    "f",
                    TypeDescriptor::pointer(TypeDescriptor::named(Some("os"), "File")),
                )])
                .returning(vec![TypeDescriptor::error()]),
        ];
        let config = Config::new("reinforced").with_file(FileConfig::new("Store", "Store", methods));
        let contents = &generate(&config).unwrap().files[0].contents;
        assert!(contents.contains(
            "import (
\t\"context\"
\tusers \"github.com/acme/go-users\"
\t\"os\"
)"
        ));
        assert!(contents.contains("GetUser(ctx context.Context) (*users.User, error)"));
        assert!(contents.contains("SaveFile(arg0 *os.File) error"));
    }

    #[test]
    fn normalization_failure_produces_no_output() {
        let bad = MethodDescriptor::new("Broken")
            .returning(vec![TypeDescriptor::error(), TypeDescriptor::error()]);
        let config = Config::new("reinforced")
            .with_file(FileConfig::new("Client", "Client", client_methods()))
            .with_file(FileConfig::new("Bad", "Bad", vec![bad]));
        let err = generate(&config).unwrap_err();
        assert!(matches!(
            err,
            CodeGenError::Method {
                ref type_name,
                source: MethodError::MultipleErrors { .. },
            } if type_name == "Bad"
        ));
    }

    #[test]
    fn duplicate_method_names_are_rejected() {
        let config = Config::new("reinforced").with_file(FileConfig::new(
            "Locker",
            "Locker",
            vec![MethodDescriptor::new("Lock"), MethodDescriptor::new("Lock")],
        ));
        assert!(matches!(
            generate(&config),
            Err(CodeGenError::DuplicateMethod { .. })
        ));
    }

    #[test]
    fn invalid_package_name_is_rejected() {
        assert!(matches!(
            generate(&Config::new("not-a-package")),
            Err(CodeGenError::InvalidPackageName(_))
        ));
        assert!(generate(&Config::new("_internal2")).is_ok());
    }

    #[test]
    fn receiver_name_is_lowercased_initial() {
        assert_eq!(receiver_name("Client"), "c");
        assert_eq!(receiver_name("SomeOtherClient"), "s");
    }
}
