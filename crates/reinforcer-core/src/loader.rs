// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Contract discovery from manifests.
//!
//! **DDD Context:** Contract Resolution
//!
//! A manifest describes the declared types of one package:
//!
//! ```json
//! {
//!   "package": "github.com/acme/client",
//!   "types": [
//!     { "name": "Client", "kind": "interface", "methods": [
//!       { "name": "SayHello", "params": [
//!           { "name": "ctx", "type": { "kind": "named", "package": "context", "name": "Context" } },
//!           { "name": "name", "type": { "kind": "basic", "name": "string" } }
//!         ],
//!         "results": [{ "kind": "named", "name": "error" }] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! The same document can be written as TOML. In [`LoadMode::File`] a single
//! manifest is read; in [`LoadMode::Package`] every `.json` and `.toml`
//! manifest of a directory forms one package scope.
//!
//! Type names are selected with expressions: an expression containing a
//! regex metacharacter is used as a regex, anything else must match a whole
//! word. Interfaces are always targetable, structs only when they expose at
//! least one exported method.

use crate::descriptor::MethodDescriptor;
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Characters that turn a target expression into a regex.
const REGEX_CHARS: &str = "\\.+*?()|[]{}^$";

/// How a source path is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// The path is a single manifest file.
    File,
    /// The path is a directory of manifests forming one package.
    Package,
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Interface,
    Struct,
    Other,
}

/// A declared type in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeManifest {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

/// The declared types of one package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    pub package: String,
    #[serde(default)]
    pub types: Vec<TypeManifest>,
}

/// A discovered, targetable type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    pub name: String,
    pub methods: Vec<MethodDescriptor>,
}

/// A single problem found while reading manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported manifest format: {0}")]
    UnsupportedFormat(Utf8PathBuf),

    #[error("{path} declares package {found}, expected {expected}")]
    PackageMismatch {
        path: Utf8PathBuf,
        expected: String,
        found: String,
    },

    #[error("type {name} declared more than once in package {package}")]
    DuplicateType { package: String, name: String },
}

/// Every error found during one load.
#[derive(Debug, Error)]
#[error("errors during loading:\n{}", numbered(.errors))]
pub struct LoadingError {
    pub errors: Vec<ManifestError>,
}

fn numbered(errors: &[ManifestError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("\t{i}: {err}\n"))
        .collect()
}

/// Errors returned by a [`Loader`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to compile expression {expression:?}: {source}")]
    InvalidExpression {
        expression: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Loading(#[from] LoadingError),

    #[error("package not found in {0}")]
    PackageNotFound(Utf8PathBuf),

    #[error("{0} not found")]
    NotFound(String),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Discovers targetable types, keyed by type name.
pub trait Loader {
    /// Loads every targetable type under `path`.
    fn load_all(&self, path: &Utf8Path, mode: LoadMode) -> Result<BTreeMap<String, LoadResult>> {
        self.load_matched(path, &[".*".to_string()], mode)
    }

    /// Loads the targetable types under `path` whose names match any of
    /// `expressions`.
    fn load_matched(
        &self,
        path: &Utf8Path,
        expressions: &[String],
        mode: LoadMode,
    ) -> Result<BTreeMap<String, LoadResult>>;
}

/// Loads JSON and TOML contract manifests from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestLoader;

impl ManifestLoader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Loads the single type called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] if no targetable type has that name.
    pub fn load_one(&self, path: &Utf8Path, name: &str, mode: LoadMode) -> Result<LoadResult> {
        let mut results = self.load_matched(path, &[format!(r"\b{name}\b")], mode)?;
        results
            .remove(name)
            .ok_or_else(|| LoadError::NotFound(name.to_string()))
    }

    fn read(&self, path: &Utf8Path, mode: LoadMode) -> Result<Manifest> {
        match mode {
            LoadMode::File => read_manifest(path).map_err(|e| LoadingError { errors: vec![e] }.into()),
            LoadMode::Package => self.read_package(path),
        }
    }

    fn read_package(&self, dir: &Utf8Path) -> Result<Manifest> {
        let entries = dir.read_dir_utf8().map_err(|source| LoadingError {
            errors: vec![ManifestError::Io {
                path: dir.to_path_buf(),
                source,
            }],
        })?;

        let mut paths = Vec::new();
        let mut errors = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) if is_manifest(entry.path()) => paths.push(entry.path().to_path_buf()),
                Ok(_) => {}
                Err(source) => errors.push(ManifestError::Io {
                    path: dir.to_path_buf(),
                    source,
                }),
            }
        }
        paths.sort();

        let mut merged: Option<Manifest> = None;
        for path in paths {
            let manifest = match read_manifest(&path) {
                Ok(manifest) => manifest,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            match merged.as_mut() {
                None => merged = Some(manifest),
                Some(package) if package.package != manifest.package => {
                    errors.push(ManifestError::PackageMismatch {
                        path,
                        expected: package.package.clone(),
                        found: manifest.package,
                    });
                }
                Some(package) => package.types.extend(manifest.types),
            }
        }

        if !errors.is_empty() {
            return Err(LoadingError { errors }.into());
        }
        merged.ok_or_else(|| LoadError::PackageNotFound(dir.to_path_buf()))
    }
}

impl Loader for ManifestLoader {
    #[instrument(skip(self), fields(path = %path))]
    fn load_matched(
        &self,
        path: &Utf8Path,
        expressions: &[String],
        mode: LoadMode,
    ) -> Result<BTreeMap<String, LoadResult>> {
        let filter = expr_to_filter(expressions)?;
        let manifest = self.read(path, mode)?;

        let mut seen = BTreeSet::new();
        let mut errors = Vec::new();
        for ty in &manifest.types {
            if !seen.insert(ty.name.as_str()) {
                errors.push(ManifestError::DuplicateType {
                    package: manifest.package.clone(),
                    name: ty.name.clone(),
                });
            }
        }
        if !errors.is_empty() {
            return Err(LoadingError { errors }.into());
        }

        let matching: Vec<&TypeManifest> = manifest
            .types
            .iter()
            .filter(|ty| filter.is_match(&ty.name))
            .collect();
        info!(
            types = %matching.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", "),
            "Matching types to target expressions"
        );

        let mut results = BTreeMap::new();
        for ty in matching {
            match ty.kind {
                TypeKind::Interface => {
                    info!(name = %ty.name, "Discovered interface type");
                    results.insert(ty.name.clone(), LoadResult {
                        name: ty.name.clone(),
                        methods: qualified(ty.methods.iter(), &manifest.package),
                    });
                }
                TypeKind::Struct => {
                    info!(name = %ty.name, "Discovered struct type");
                    let exported = ty.methods.iter().filter(|m| {
                        let exported = is_exported(&m.name);
                        if !exported {
                            debug!(method = %m.name, "Ignoring unexported method");
                        }
                        exported
                    });
                    let methods = qualified(exported, &manifest.package);
                    if !methods.is_empty() {
                        results.insert(ty.name.clone(), LoadResult {
                            name: ty.name.clone(),
                            methods,
                        });
                    }
                }
                TypeKind::Other => {
                    debug!(name = %ty.name, "Ignoring matching type, not an interface nor struct type");
                }
            }
        }
        Ok(results)
    }
}

/// Clones `methods`, qualifying the manifest's own unqualified named types
/// with `package`.
fn qualified<'a>(
    methods: impl Iterator<Item = &'a MethodDescriptor>,
    package: &str,
) -> Vec<MethodDescriptor> {
    methods
        .map(|m| {
            let mut m = m.clone();
            m.qualify_local(package);
            m
        })
        .collect()
}

fn is_manifest(path: &Utf8Path) -> bool {
    matches!(path.extension(), Some("json" | "toml"))
}

fn read_manifest(path: &Utf8Path) -> std::result::Result<Manifest, ManifestError> {
    let source = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match path.extension() {
        Some("json") => serde_json::from_str(&source).map_err(|source| ManifestError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Some("toml") => toml::from_str(&source).map_err(|source| ManifestError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        _ => Err(ManifestError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn is_exported(name: &str) -> bool {
    name.starts_with(|c: char| c.is_uppercase())
}

/// Builds one regex out of target expressions. Plain names match whole
/// words only.
///
/// # Errors
///
/// Returns [`LoadError::InvalidExpression`] if the joined expression does
/// not compile.
pub fn expr_to_filter(expressions: &[String]) -> Result<Regex> {
    let expression = expressions
        .iter()
        .map(|expr| {
            if expr.contains(|c: char| REGEX_CHARS.contains(c)) {
                expr.clone()
            } else {
                format!(r"\b{expr}\b")
            }
        })
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&expression).map_err(|source| LoadError::InvalidExpression { expression, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use tempfile::TempDir;

    const CLIENT_JSON: &str = r#"{
  "package": "github.com/acme/client",
  "types": [
    { "name": "Client", "kind": "interface", "methods": [
      { "name": "SayHello",
        "params": [
          { "name": "ctx", "type": { "kind": "named", "package": "context", "name": "Context" } },
          { "name": "name", "type": { "kind": "basic", "name": "string" } }
        ],
        "results": [{ "kind": "named", "name": "error" }] }
    ] },
    { "name": "ClientImpl", "kind": "struct", "methods": [
      { "name": "SayHello" },
      { "name": "helper" }
    ] },
    { "name": "hidden", "kind": "struct", "methods": [{ "name": "internal" }] },
    { "name": "Greeting", "kind": "other" }
  ]
}"#;

    const SERVICE_TOML: &str = r#"
package = "github.com/acme/client"

[[types]]
name = "Service"
kind = "interface"

[[types.methods]]
name = "GetData"
results = [{ kind = "basic", name = "string" }, { kind = "named", name = "error" }]
"#;

    fn write(dir: &TempDir, name: &str, contents: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn names(results: &BTreeMap<String, LoadResult>) -> Vec<&str> {
        results.keys().map(String::as_str).collect()
    }

    #[test]
    fn load_all_skips_structs_without_exported_methods_and_other_kinds() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "client.json", CLIENT_JSON);
        let results = ManifestLoader::new().load_all(&path, LoadMode::File).unwrap();
        assert_eq!(names(&results), vec!["Client", "ClientImpl"]);
        let methods: Vec<_> = results["ClientImpl"].methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["SayHello"]);
        assert_eq!(results["Client"].methods[0].params.len(), 2);
    }

    #[test]
    fn plain_names_match_whole_words() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "client.json", CLIENT_JSON);
        let results = ManifestLoader::new()
            .load_matched(&path, &["Client".to_string()], LoadMode::File)
            .unwrap();
        assert_eq!(names(&results), vec!["Client"]);
    }

    #[test]
    fn regex_expressions_are_used_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "client.json", CLIENT_JSON);
        let results = ManifestLoader::new()
            .load_matched(&path, &["Client.*".to_string()], LoadMode::File)
            .unwrap();
        assert_eq!(names(&results), vec!["Client", "ClientImpl"]);
    }

    #[test]
    fn load_one_finds_or_reports_missing() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "client.json", CLIENT_JSON);
        let loader = ManifestLoader::new();
        assert_eq!(loader.load_one(&path, "Client", LoadMode::File).unwrap().name, "Client");
        let err = loader.load_one(&path, "Missing", LoadMode::File).unwrap_err();
        assert_eq!(err.to_string(), "Missing not found");
    }

    #[test]
    fn package_mode_merges_json_and_toml_manifests() {
        let dir = TempDir::new().unwrap();
        write(&dir, "client.json", CLIENT_JSON);
        write(&dir, "service.toml", SERVICE_TOML);
        write(&dir, "README.md", "not a manifest");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let results = ManifestLoader::new().load_all(&root, LoadMode::Package).unwrap();
        assert_eq!(names(&results), vec!["Client", "ClientImpl", "Service"]);
        assert_eq!(results["Service"].methods[0].results.len(), 2);
    }

    #[test]
    fn empty_package_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let err = ManifestLoader::new().load_all(&root, LoadMode::Package).unwrap_err();
        assert!(matches!(err, LoadError::PackageNotFound(_)));
    }

    #[test]
    fn loading_errors_are_aggregated() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.json", "{ not json");
        write(&dir, "b.toml", "package = ");
        write(&dir, "c.json", r#"{ "package": "other" }"#);
        write(&dir, "d.json", r#"{ "package": "different" }"#);
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let err = ManifestLoader::new().load_all(&root, LoadMode::Package).unwrap_err();
        let LoadError::Loading(loading) = err else {
            panic!("expected LoadingError, got {err:?}");
        };
        assert_eq!(loading.errors.len(), 3);
        assert!(matches!(loading.errors[2], ManifestError::PackageMismatch { .. }));
        let message = loading.to_string();
        assert!(message.starts_with("errors during loading:\n\t0: failed to parse"));
    }

    #[test]
    fn local_named_types_are_qualified_with_the_manifest_package() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "files.json",
            r#"{ "package": "github.com/acme/files", "types": [
                { "name": "File", "kind": "struct" },
                { "name": "Store", "kind": "interface", "methods": [
                  { "name": "Save",
                    "params": [
                      { "name": "f", "type": { "kind": "pointer", "elem": { "kind": "named", "name": "File" } } },
                      { "name": "opts", "type": { "kind": "map",
                        "key": { "kind": "basic", "name": "string" },
                        "value": { "kind": "named", "name": "any" } } }
                    ],
                    "results": [{ "kind": "named", "name": "error" }] }
                ] }
            ] }"#,
        );
        let results = ManifestLoader::new().load_all(&path, LoadMode::File).unwrap();
        let save = &results["Store"].methods[0];
        assert_eq!(save.params[0].ty.to_string(), "*github.com/acme/files.File");
        assert_eq!(save.params[1].ty.to_string(), "map[string]any");
        assert_eq!(save.results[0], TypeDescriptor::named(None, "error"));
    }

    #[test]
    fn duplicate_type_names_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "dup.json",
            r#"{ "package": "p", "types": [
                { "name": "A", "kind": "interface" },
                { "name": "A", "kind": "interface" }
            ] }"#,
        );
        let err = ManifestLoader::new().load_all(&path, LoadMode::File).unwrap_err();
        assert!(err.to_string().contains("type A declared more than once"));
    }

    #[test]
    fn missing_file_is_a_loading_error() {
        let err = ManifestLoader::new()
            .load_all(Utf8Path::new("/nonexistent/contract.json"), LoadMode::File)
            .unwrap_err();
        assert!(matches!(err, LoadError::Loading(_)));
    }

    #[test]
    fn expressions_are_or_joined() {
        let filter = expr_to_filter(&["Client".to_string(), "Serv.*".to_string()]).unwrap();
        assert_eq!(filter.as_str(), r"\bClient\b|Serv.*");
        assert!(filter.is_match("Service"));
        assert!(!filter.is_match("ClientImpl"));
    }

    #[test]
    fn invalid_regex_is_reported() {
        let err = expr_to_filter(&["Client(".to_string()]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidExpression { .. }));
    }
}
