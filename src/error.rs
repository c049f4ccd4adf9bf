//! Error types
//!
//! Startup configuration errors are fatal; filesystem and API errors are
//! reported to the user and the shell keeps running.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Problems detected while building the configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Perplexity API key not found. Please set the {0} environment variable.")]
    MissingApiKey(&'static str),
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

/// Failures of a single filesystem command
#[derive(Debug, Error)]
pub enum FsError {
    #[error("Directory not found: {input} (resolved to {resolved})")]
    DirectoryNotFound { input: String, resolved: PathBuf },
    #[error("Not a directory: {input} (resolved to {resolved})")]
    NotADirectory { input: String, resolved: PathBuf },
    #[error("File or directory not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("File or directory already exists: {0}")]
    AlreadyExists(String),
    #[error("Directory not empty: {0}. Recursive removal is not supported.")]
    DirectoryNotEmpty(String),
    #[error("Invalid characters or path components in name: {0}")]
    InvalidName(String),
    #[error("Usage: {0}")]
    MissingArgument(&'static str),
    #[error("Error {action} '{name}': {source}")]
    Io {
        action: &'static str,
        name: String,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Map an I/O error onto the closest user-facing variant
    pub fn from_io(action: &'static str, name: &str, path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(name.to_string()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(name.to_string()),
            _ => Self::Io {
                action,
                name: name.to_string(),
                source,
            },
        }
    }
}

/// Failures of a request to the hosted completion endpoint
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: could not connect to the Perplexity API. {0}")]
    Network(String),
    #[error("Request timed out. The Perplexity API might be slow or unreachable.")]
    Timeout,
    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("Could not decode API response: {0}")]
    Decode(String),
    #[error("No response received from the model.")]
    EmptyResponse,
    #[error("Could not build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::Client(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Failures of the interactive loop itself
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}
