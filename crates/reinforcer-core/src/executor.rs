// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Orchestrates discovery and generation across several sources.
//!
//! **DDD Context:** Code Generation

use crate::codegen::{self, CodeGenError, Config, FileConfig, Generated};
use crate::loader::{LoadError, LoadMode, LoadResult, Loader};
use camino::Utf8PathBuf;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{info, instrument};

/// Errors returned by [`Executor::execute`].
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("multiple types with same name discovered with name {0}")]
    DuplicateType(String),

    #[error("no targetable types were discovered")]
    NoTargetableTypesFound,

    #[error(transparent)]
    CodeGen(#[from] CodeGenError),
}

/// Input parameters of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    /// Manifest files eligible for targeting.
    pub sources: Vec<Utf8PathBuf>,
    /// Manifest directories eligible for targeting, one package each.
    pub source_packages: Vec<Utf8PathBuf>,
    /// Target expressions; plain names or regexes.
    pub targets: Vec<String>,
    /// Target every discovered type, ignoring `targets`.
    pub targets_all: bool,
    /// Package name of the generated code.
    pub out_pkg: String,
    /// Pass methods without results straight through.
    pub ignore_no_return_methods: bool,
}

/// Loads contracts with a [`Loader`] and feeds them to the generator.
#[derive(Debug)]
pub struct Executor<L> {
    loader: L,
}

impl<L: Loader> Executor<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Discovers the targeted types of every source and generates their
    /// proxies.
    ///
    /// # Errors
    ///
    /// Fails if loading fails, if a type name is discovered in more than one
    /// source, if nothing was targeted, or if generation fails.
    #[instrument(skip_all, fields(out_pkg = %params.out_pkg))]
    pub fn execute(&self, params: &Parameters) -> Result<Generated, ExecuteError> {
        let sources = params
            .sources
            .iter()
            .map(|p| (p, LoadMode::File))
            .chain(params.source_packages.iter().map(|p| (p, LoadMode::Package)));

        let mut discovered = HashSet::new();
        let mut config = Config::new(&params.out_pkg)
            .with_ignore_no_return_methods(params.ignore_no_return_methods);
        for (path, mode) in sources {
            let matched: BTreeMap<String, LoadResult> = if params.targets_all {
                self.loader.load_all(path, mode)?
            } else {
                self.loader.load_matched(path, &params.targets, mode)?
            };
            info!(source = %path, types = matched.len(), "Loaded source");

            for (name, result) in matched {
                if !discovered.insert(name.clone()) {
                    return Err(ExecuteError::DuplicateType(name));
                }
                config = config.with_file(FileConfig::new(&name, &name, result.methods));
            }
        }

        if config.files.is_empty() {
            return Err(ExecuteError::NoTargetableTypesFound);
        }
        Ok(codegen::generate(&config)?)
    }
}
