// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Reinforcer command-line interface.
//!
//! This is the main entry point for the `reinforcer` command. It generates
//! proxies that run every call of a service contract through resiliency
//! middleware (circuit breaker, retries, timeouts).

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod generate;

/// Generates the reinforced middleware code
#[derive(Debug, Parser)]
#[command(name = "reinforcer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file [default: reinforcer.toml in the working directory]
    #[arg(long, value_name = "FILE")]
    config: Option<Utf8PathBuf>,

    #[command(flatten)]
    options: config::Options,
}

fn main() -> Result<()> {
    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let cwd = Utf8PathBuf::try_from(std::env::current_dir().into_diagnostic()?)
        .into_diagnostic()
        .wrap_err("Working directory is not valid UTF-8")?;

    let file = config::load(cli.config.as_deref(), &cwd)?;
    let (config_path, options) = match file {
        Some((path, file_options)) => (Some(path), cli.options.with_fallback(file_options)),
        None => (None, cli.options),
    };
    let settings = options.into_settings(&cwd)?;

    init_tracing(settings.debug);
    if let Some(path) = config_path.as_deref().map(Utf8Path::as_str) {
        info!(path, "Using config file");
    }

    generate::run(&settings)
}

fn init_tracing(debug: bool) {
    let default_directive = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}
