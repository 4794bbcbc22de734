// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Reinforcer core.
//!
//! This crate turns service contracts into resilient Go proxies:
//! - Contract resolution (manifest loading, target matching)
//! - Signature normalization (context detection, error-slot location, type
//!   translation)
//! - Strategy selection (pass-through, no-return wrap, retryable wrap)
//! - Code generation (proxy, common and constants units)
//!
//! Every generated proxy method that needs resilience calls
//! `runnerFactory.GetRunner(name)`, the dispatcher contract implemented in
//! Rust by the `reinforcer-runtime` crate.

pub mod capability;
pub mod codegen;
pub mod descriptor;
pub mod executor;
pub mod loader;
pub mod method;
pub mod strategy;
pub mod types;
pub mod writer;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::codegen::{Config, FileConfig, Generated, generate};
    pub use crate::descriptor::{MethodDescriptor, ParamDescriptor, TypeDescriptor};
    pub use crate::executor::{Executor, Parameters};
    pub use crate::loader::{LoadMode, Loader, ManifestLoader};
    pub use crate::method::Method;
    pub use crate::strategy::GenerationStrategy;
    pub use crate::writer::Writer;
}
