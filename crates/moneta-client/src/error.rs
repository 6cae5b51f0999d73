//! Error types for moneta-client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {message}")]
    Build { message: String },

    #[error("Token file {path}: {message}")]
    TokenFile { path: String, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;
