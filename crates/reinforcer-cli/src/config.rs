// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Generation options from flags and `reinforcer.toml`.
//!
//! **DDD Context:** Configuration
//!
//! Every flag can also be set in the config file under the same key. A flag
//! given on the command line replaces the file's value.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use reinforcer_core::executor::Parameters;
use serde::Deserialize;
use std::fs;

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "reinforcer.toml";

const DEFAULT_OUT_PKG: &str = "reinforced";
const DEFAULT_OUTPUT_DIR: &str = "./reinforced";

/// Options shared by the command line and the config file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Args, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Contract manifest to scan for target types (repeatable)
    #[arg(long, value_name = "FILE")]
    pub src: Vec<String>,

    /// Directory of contract manifests loaded as one package (repeatable)
    #[arg(long, value_name = "DIR")]
    pub srcpkg: Vec<String>,

    /// Type name or regular expression to generate a proxy for (repeatable)
    #[arg(long, value_name = "EXPR")]
    pub target: Vec<String>,

    /// Generate proxies for every targetable type in the sources
    #[arg(long)]
    pub targetall: bool,

    /// Package name of the generated code [default: reinforced]
    #[arg(long, value_name = "NAME")]
    pub outpkg: Option<String>,

    /// Directory to write the generated code to [default: ./reinforced]
    #[arg(long, value_name = "DIR")]
    pub outputdir: Option<String>,

    /// Pass methods without results straight through instead of wrapping
    /// them; wrapped methods panic when the middleware fails
    #[arg(long)]
    pub ignorenoret: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// A validated generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub parameters: Parameters,
    /// Absolute directory the generated files are written to.
    pub output_dir: Utf8PathBuf,
    pub debug: bool,
}

impl Options {
    /// These options, falling back to `file` for anything left unset.
    #[must_use]
    pub fn with_fallback(self, file: Options) -> Options {
        fn list(flag: Vec<String>, file: Vec<String>) -> Vec<String> {
            if flag.is_empty() { file } else { flag }
        }
        Options {
            src: list(self.src, file.src),
            srcpkg: list(self.srcpkg, file.srcpkg),
            target: list(self.target, file.target),
            targetall: self.targetall || file.targetall,
            outpkg: self.outpkg.or(file.outpkg),
            outputdir: self.outputdir.or(file.outputdir),
            ignorenoret: self.ignorenoret || file.ignorenoret,
            debug: self.debug || file.debug,
        }
    }

    /// Validates the options, resolving relative paths against `cwd`.
    ///
    /// # Errors
    ///
    /// Fails when no source or no target is given.
    pub fn into_settings(self, cwd: &Utf8Path) -> Result<Settings> {
        if self.src.is_empty() && self.srcpkg.is_empty() {
            miette::bail!("No sources given; use --src or --srcpkg");
        }
        if self.target.is_empty() && !self.targetall {
            miette::bail!("No targets given; use --target or --targetall");
        }

        let resolve = |p: &String| absolute(cwd, Utf8Path::new(p));
        let output_dir = self.outputdir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR);
        Ok(Settings {
            parameters: Parameters {
                sources: self.src.iter().map(resolve).collect(),
                source_packages: self.srcpkg.iter().map(resolve).collect(),
                targets: self.target,
                targets_all: self.targetall,
                out_pkg: self.outpkg.unwrap_or_else(|| DEFAULT_OUT_PKG.to_string()),
                ignore_no_return_methods: self.ignorenoret,
            },
            output_dir: absolute(cwd, Utf8Path::new(output_dir)),
            debug: self.debug,
        })
    }
}

/// `path` made absolute against `cwd`, without `.` segments.
fn absolute(cwd: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    cwd.join(path).components().collect()
}

/// Reads the config file named by `--config`, or `reinforcer.toml` in `cwd`
/// if there is one.
///
/// Returns the path that was read along with its options.
///
/// # Errors
///
/// Fails if the file cannot be read or is not a valid config.
pub fn load(explicit: Option<&Utf8Path>, cwd: &Utf8Path) -> Result<Option<(Utf8PathBuf, Options)>> {
    let path = match explicit {
        Some(path) => cwd.join(path),
        None => {
            let path = cwd.join(CONFIG_FILE_NAME);
            if !path
                .try_exists()
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to stat config '{path}'"))?
            {
                return Ok(None);
            }
            path
        }
    };

    let content = fs::read_to_string(&path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read config '{path}'"))?;
    let options = toml::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse config '{path}'"))?;
    Ok(Some((path, options)))
}
