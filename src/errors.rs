/*!
 * Error types for the autoshorts application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with remote service APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors raised while assembling and rendering a video.
///
/// None of these are retried: a failed render is surfaced to the caller,
/// which decides whether to fetch assets again and start over.
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// A referenced media file is not on disk
    #[error("Missing asset: {}", .0.display())]
    MissingAsset(PathBuf),

    /// The candidate clip list was empty
    #[error("No B-roll assets provided")]
    NoAssets,

    /// A media file exists but cannot be placed on the timeline
    #[error("Unusable asset {}: {reason}", path.display())]
    InvalidAsset {
        /// Offending file
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// A duration argument was zero, negative or not finite
    #[error("Invalid duration: {0}")]
    InvalidDuration(f64),

    /// ffprobe failed or returned something unreadable
    #[error("Probe failed: {0}")]
    Probe(String),

    /// Duration mismatch between picture and sound, or an encode failure
    #[error("Render failed: {0}")]
    Render(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a remote provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from video assembly
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
