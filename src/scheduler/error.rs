//! Image load error types.
//!
//! Failures are reported asynchronously through `on_error` callbacks and
//! completion channels. Queue and loader operations never fail.

use thiserror::Error;

/// Errors that can occur while fetching an image.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("Failed to load image: {url} ({reason})")]
    Fetch { url: String, reason: String },

    #[error("Failed to load image: {url} (unsupported url)")]
    UnsupportedUrl { url: String },
}

impl LoadError {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// The url that failed to load.
    pub fn url(&self) -> &str {
        match self {
            Self::Fetch { url, .. } | Self::UnsupportedUrl { url } => url,
        }
    }
}
