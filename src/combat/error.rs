//! Error types for combat data loading.

use thiserror::Error;

/// Errors that can occur when loading attack definitions.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// Directory or file could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// A hit volume has unusable dimensions.
    #[error("Invalid hit volume {index} in attack '{attack}': {details}")]
    InvalidHitVolume {
        attack: String,
        index: usize,
        details: String,
    },
}
