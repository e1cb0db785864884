use thiserror::Error;

use crate::browser::error::BrowserError;

/// The only failures a caller ever sees. Navigation, extraction and naming
/// problems are absorbed into the result instead.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No browser could be acquired for the request.
    #[error("generation failed: browser unavailable: {0}")]
    Infrastructure(#[from] BrowserError),

    /// Rejected before any browser was launched.
    #[error("invalid generation request: {0}")]
    InvalidRequest(String),
}
