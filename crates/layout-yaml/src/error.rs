/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

use thiserror::Error;
use yaml_rust2::{EmitError, ScanError};

pub type Result<T> = std::result::Result<T, LayoutYamlError>;

/// Failures reading or writing layout text.
///
/// The parser's message is the error's source; print the chain (`{:#}` with
/// anyhow) to see it.
#[derive(Debug, Error)]
pub enum LayoutYamlError {
    #[error("YAML error")]
    Yaml(#[from] ScanError),

    #[error("Overrides not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("YAML output error")]
    Emit(#[from] EmitError),
}
