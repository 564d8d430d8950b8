//! Error types for cdx.

use thiserror::Error;

/// Result type alias for cdx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Exit status used when a search finishes without finding the symbol.
pub const EXIT_NOT_FOUND: i32 = 3;

/// Exit status used when a search is cancelled or runs out of time.
pub const EXIT_CANCELLED: i32 = 4;

/// Main error type for cdx.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Search Outcomes =====
    #[error("No definition found for {symbol}")]
    NotFound { symbol: String },

    #[error("Cancelled: search was cancelled")]
    Cancelled,

    #[error("Timeout: search exceeded its {millis}ms deadline")]
    Timeout { millis: u64 },

    // ===== Input Errors =====
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // ===== I/O Errors =====
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ===== Internal Errors =====
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a not-found error for the given symbol.
    pub fn not_found(symbol: impl Into<String>) -> Self {
        Self::NotFound {
            symbol: symbol.into(),
        }
    }

    /// The symbol carried by a not-found error.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::NotFound { symbol } => Some(symbol),
            _ => None,
        }
    }

    /// Check if the search completed without a match.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the search was stopped by cancellation or its deadline.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout { .. })
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_not_found() {
            EXIT_NOT_FOUND
        } else if self.is_cancellation() {
            EXIT_CANCELLED
        } else {
            1
        }
    }
}
