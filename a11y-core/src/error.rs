//! Error types for overlay operations.

use thiserror::Error;

/// Result type for overlay operations.
pub type A11yResult<T> = Result<T, A11yError>;

/// Errors that can occur in overlay operations.
///
/// Overlays never hand these to game code; they are logged and the overlay
/// degrades to an unannounced or unfocusable control instead.
#[derive(Debug, Error)]
pub enum A11yError {
    /// A DOM backend call failed.
    #[error("DOM operation failed: {0}")]
    Dom(String),

    /// The element is no longer attached to the document.
    #[error("Element is detached from the document")]
    Detached,

    /// A required host object (window, document, container) is missing.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}
