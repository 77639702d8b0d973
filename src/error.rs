//! Error handling and custom error types
//!
//! Provides unified error handling across the client using thiserror.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Remote path cannot be blank")]
    EmptyPath,

    #[error("Local file error: {} {reason}", .path.display())]
    LocalFile { path: PathBuf, reason: String },

    #[error("Remote file not found: {0}")]
    NotFound(String),

    #[error("Unexpected response (status {status}) for {path}")]
    Response { status: u16, path: String },

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Storage service unavailable: {message}")]
    ServiceUnavailable {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn local_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::LocalFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
