//! Error types for the consent controller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Policy endpoint returned status {0}")]
    PolicyStatus(u16),

    #[error("Malformed policy response: {0}")]
    MalformedPolicy(String),

    #[error("Missing element: #{0}")]
    MissingElement(String),

    #[error("Cookie store unavailable")]
    CookieStoreUnavailable,

    #[error("Cookie store error: {0}")]
    CookieStore(String),

    #[error("Stylesheet error: {0}")]
    Stylesheet(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
