// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Generate proxies and write them to the output directory.

use crate::config::Settings;
use miette::{Context, IntoDiagnostic, Result};
use reinforcer_core::executor::Executor;
use reinforcer_core::loader::ManifestLoader;
use reinforcer_core::writer::Writer;
use tracing::info;

/// Runs a generation with `settings`.
pub fn run(settings: &Settings) -> Result<()> {
    let generated = Executor::new(ManifestLoader::new())
        .execute(&settings.parameters)
        .into_diagnostic()
        .wrap_err("Failed to generate proxies")?;

    Writer::to_filesystem()
        .write(&settings.output_dir, &generated)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write proxies to '{}'", settings.output_dir))?;

    info!(
        proxies = generated.files.len(),
        dir = %settings.output_dir,
        "Generated reinforced proxies"
    );
    Ok(())
}
