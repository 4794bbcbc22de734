// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Writes generated units to an output location.
//!
//! **DDD Context:** Code Generation

use crate::codegen::Generated;
use camino::{Utf8Path, Utf8PathBuf};
use heck::ToSnakeCase;
use std::collections::BTreeMap;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, instrument};

/// File holding the dispatcher wiring shared by every proxy.
pub const COMMON_FILE_NAME: &str = "reinforcer_common.go";

/// File holding the method name constants.
pub const CONSTANTS_FILE_NAME: &str = "reinforcer_constants.go";

/// Errors that can occur while writing generated code.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Storage the generated files are written to.
pub trait OutputProvider {
    /// A writer for `path`, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the target cannot be created.
    fn output_target(&mut self, path: &Utf8Path) -> io::Result<Box<dyn Write + '_>>;
}

/// Writes to the local filesystem, creating missing directories.
#[derive(Debug, Clone, Default)]
pub struct FsOutputProvider {
    base: Option<Utf8PathBuf>,
}

impl FsOutputProvider {
    /// Resolves relative paths against the current working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `base`.
    #[must_use]
    pub fn with_base(base: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn resolve(&self, path: &Utf8Path) -> io::Result<Utf8PathBuf> {
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        let base = match &self.base {
            Some(base) => base.clone(),
            None => Utf8PathBuf::try_from(std::env::current_dir()?)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
        };
        Ok(base.join(path))
    }
}

impl OutputProvider for FsOutputProvider {
    fn output_target(&mut self, path: &Utf8Path) -> io::Result<Box<dyn Write + '_>> {
        let full = self.resolve(path)?;
        if let Some(dir) = full.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file = std::fs::File::create(&full)?;
        Ok(Box::new(io::BufWriter::new(file)))
    }
}

/// Keeps every written file in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct BufferOutputProvider {
    pub buffers: BTreeMap<Utf8PathBuf, Vec<u8>>,
}

impl BufferOutputProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The content written to `path`, if any and if it is UTF-8.
    pub fn contents(&self, path: impl AsRef<Utf8Path>) -> Option<&str> {
        self.buffers
            .get(path.as_ref())
            .and_then(|b| std::str::from_utf8(b).ok())
    }
}

impl OutputProvider for BufferOutputProvider {
    fn output_target(&mut self, path: &Utf8Path) -> io::Result<Box<dyn Write + '_>> {
        let buffer = self.buffers.entry(path.to_path_buf()).or_default();
        buffer.clear();
        Ok(Box::new(buffer))
    }
}

/// Names the file a proxy type is written to.
pub trait FileNameStrategy {
    /// The file name for `type_name`, without extension.
    fn file_name(&self, type_name: &str) -> String;
}

/// `SomeOtherClient` → `some_other_client`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCase;

impl FileNameStrategy for SnakeCase {
    fn file_name(&self, type_name: &str) -> String {
        type_name.to_snake_case()
    }
}

/// Writes [`Generated`] units through an [`OutputProvider`].
#[derive(Debug)]
pub struct Writer<P, N = SnakeCase> {
    output: P,
    naming: N,
}

impl Writer<FsOutputProvider> {
    /// Filesystem output with snake case file names.
    #[must_use]
    pub fn to_filesystem() -> Self {
        Self::new(FsOutputProvider::new(), SnakeCase)
    }
}

impl<P: OutputProvider, N: FileNameStrategy> Writer<P, N> {
    pub fn new(output: P, naming: N) -> Self {
        Self { output, naming }
    }

    /// Writes the common unit, the constants unit and one file per proxy
    /// into `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] on the first file that cannot be written.
    #[instrument(skip_all, fields(dir = %dir))]
    pub fn write(&mut self, dir: &Utf8Path, generated: &Generated) -> Result<(), WriteError> {
        self.write_to(&dir.join(COMMON_FILE_NAME), &generated.common)?;
        self.write_to(&dir.join(CONSTANTS_FILE_NAME), &generated.constants)?;
        for file in &generated.files {
            let name = format!("{}.go", self.naming.file_name(&file.type_name));
            self.write_to(&dir.join(name), &file.contents)?;
        }
        Ok(())
    }

    fn write_to(&mut self, path: &Utf8Path, contents: &str) -> Result<(), WriteError> {
        debug!(%path, "Writing generated file");
        let mut target = self
            .output
            .output_target(path)
            .map_err(|source| WriteError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        target
            .write_all(contents.as_bytes())
            .and_then(|()| target.flush())
            .map_err(|source| WriteError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Consumes the writer, returning its output provider.
    pub fn into_output(self) -> P {
        self.output
    }
}
