//! # Design
//!
//! - Keep error messages constant while carrying context fields for debugging.
//! - Decode the backend `{"detail": ...}` envelope once, here.
//! - Callers branch on variants, never on message text.

use reqwest::{Response, StatusCode};
use stegroup_api_models::ErrorBody;
use thiserror::Error;

/// Result alias for service calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures raised while talking to the grouping service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be constructed.
    #[error("failed to build http client")]
    ClientBuild {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The request identifier could not be encoded as a header.
    #[error("invalid request identifier")]
    InvalidRequestId {
        /// Offending identifier.
        value: String,
    },
    /// A request URL could not be built from the base URL.
    #[error("invalid request url")]
    InvalidUrl {
        /// Relative path that failed to join.
        path: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The request never produced a response.
    #[error("request failed")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("server rejected request")]
    Status {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Diagnostic from the error body, when one was present.
        detail: Option<String>,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode response")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Operation the failure belongs to, when known.
    #[must_use]
    pub const fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Decode { operation, .. } => Some(*operation),
            Self::ClientBuild { .. } | Self::InvalidRequestId { .. } | Self::InvalidUrl { .. } => {
                None
            }
        }
    }

    /// HTTP status returned by the server, if the request got that far.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }

    /// True for 4xx answers that describe a problem with the request itself.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// One-line diagnostic including context fields.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::ClientBuild { source } => format!("{self}: {source}"),
            Self::InvalidRequestId { value } => format!("{self}: '{value}'"),
            Self::InvalidUrl { path, source } => format!("{self} '{path}': {source}"),
            Self::Transport { operation, source } | Self::Decode { operation, source } => {
                format!("{self} ({operation}): {source}")
            }
            Self::Status {
                operation,
                status,
                detail,
            } => detail.as_ref().map_or_else(
                || format!("{self} ({operation}): status {status}"),
                |detail| format!("{self} ({operation}): {detail} (status {status})"),
            ),
        }
    }

    /// Classify a non-success response into [`ApiError::Status`].
    pub async fn from_response(operation: &'static str, response: Response) -> Self {
        let status = response.status();
        let bytes = response.bytes().await.unwrap_or_default();
        Self::Status {
            operation,
            status: status.as_u16(),
            detail: detail_from_body(status, &bytes),
        }
    }
}

fn detail_from_body(status: StatusCode, bytes: &[u8]) -> Option<String> {
    if let Ok(body) = serde_json::from_slice::<ErrorBody>(bytes) {
        return Some(body.message());
    }
    let text = String::from_utf8_lossy(bytes).trim().to_string();
    if text.is_empty() {
        status.canonical_reason().map(str::to_string)
    } else {
        Some(text)
    }
}
