//! Error types for the mingpian-core library.
//!
//! The card parsing pipeline itself never fails: every stage either fills a
//! field or leaves it empty. These errors cover the surfaces around it
//! (persisted correction rules, configuration files).

use thiserror::Error;

/// Main error type for the mingpian library.
#[derive(Error, Debug)]
pub enum MingpianError {
    /// Rule store error.
    #[error("rule store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by the key-value store backing custom correction rules.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to read or write the backing file.
    #[error("failed to access store: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file or a stored value is not valid JSON.
    #[error("invalid store contents: {0}")]
    Serde(#[from] serde_json::Error),

    /// The backing file holds JSON that is not an object of string values.
    #[error("store file is not a JSON object of strings")]
    Layout,
}

/// Errors reported by the external recognizer before the parser runs.
///
/// The parser is never invoked when one of these occurs; they exist so hosts
/// can surface a consistent message for a failed capture.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionError {
    /// The captured image could not be decoded or preprocessed.
    #[error("image could not be processed")]
    ImageProcessingFailed,

    /// Recognition ran but produced no text.
    #[error("no text found in image")]
    NoTextFound,

    /// The recognizer itself failed.
    #[error("text recognition failed")]
    RecognitionFailed,
}

/// Result type for the mingpian library.
pub type Result<T> = std::result::Result<T, MingpianError>;
