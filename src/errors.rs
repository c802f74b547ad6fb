//! Error type for the REST API boundary.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced while talking to the storefront backend.
///
/// A transport failure means the exchange never completed; a rejection
/// means the server answered with a non-success status, possibly carrying
/// a human-readable `message` in its body. Callers surface the server's
/// message verbatim when one is present.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (connection, timeout, body decode).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server rejected the request with status {status}")]
    Rejected {
        status: StatusCode,
        /// `message` (or `error`) field of the response body, if any.
        message: Option<String>,
    },

    /// A request payload could not be encoded.
    #[error("could not encode request payload: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    /// The server-provided message, when the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The server's own message when present, else `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}
