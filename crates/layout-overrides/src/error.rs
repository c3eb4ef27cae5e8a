/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for filter patterns.
//!
//! Malformed data never aborts an override run. A pattern that fails to
//! compile keeps its error for inspection and simply never matches.

use thiserror::Error;

/// Why a `/pattern/flags` filter value could not be compiled.
#[derive(Debug, Clone, Error)]
pub enum PatternError {
    /// A flag letter outside `dgimsuvy`.
    #[error("Unsupported regex flag '{flag}'")]
    UnknownFlag { flag: char },

    /// The same flag letter given twice.
    #[error("Regex flag '{flag}' given more than once")]
    DuplicateFlag { flag: char },

    /// `u` and `v` are mutually exclusive.
    #[error("Regex flags 'u' and 'v' cannot be combined")]
    ConflictingFlags,

    /// The pattern body is not a valid regular expression.
    #[error("Invalid regex pattern: {0}")]
    Syntax(String),
}
