//! Error types for the identity attribute cache

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid TTL: {0} (must be a positive number of minutes)")]
    InvalidTtl(i64),

    #[error("Subject identifier cannot be empty")]
    EmptySubjectId,

    #[error("Invalid subject pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Authentication failed for '{0}'")]
    AuthenticationFailed(String),

    #[error("Identity transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;
