/// Error Handling Module
///
/// Unified error types for the client. It covers:
/// 1. Domain-specific error types (validation, credential storage, token refresh)
/// 2. The unified `ApiError` every public operation returns
/// 3. Conversions used for `?` control flow
/// 4. Error message extraction from backend error bodies

use std::error::Error as StdError;
use std::fmt;

use reqwest::StatusCode;

use crate::client::ApiResponse;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for form input checked before hitting the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
    PasswordMismatch,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::PasswordMismatch => write!(f, "passwords do not match"),
        }
    }
}

impl StdError for ValidationError {}

/// Credential persistence errors
#[derive(Debug)]
pub enum CredentialError {
    Io(std::io::Error),
    Serialization(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Io(e) => write!(f, "Credential storage I/O error: {}", e),
            CredentialError::Serialization(msg) => {
                write!(f, "Credential serialization error: {}", msg)
            }
        }
    }
}

impl StdError for CredentialError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CredentialError::Io(e) => Some(e),
            CredentialError::Serialization(_) => None,
        }
    }
}

impl From<std::io::Error> for CredentialError {
    fn from(err: std::io::Error) -> Self {
        CredentialError::Io(err)
    }
}

impl From<serde_json::Error> for CredentialError {
    fn from(err: serde_json::Error) -> Self {
        CredentialError::Serialization(err.to_string())
    }
}

/// Reasons a token refresh attempt did not produce a new access token.
///
/// Never returned to callers: every variant ends the session.
#[derive(Debug)]
pub enum RefreshError {
    MissingRefreshToken,
    Rejected(StatusCode),
    Transport(reqwest::Error),
    MalformedResponse(String),
    Storage(CredentialError),
    SessionReplaced,
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshError::MissingRefreshToken => write!(f, "No refresh token stored"),
            RefreshError::Rejected(status) => {
                write!(f, "Refresh endpoint rejected the token ({})", status)
            }
            RefreshError::Transport(e) => write!(f, "Refresh request failed: {}", e),
            RefreshError::MalformedResponse(msg) => {
                write!(f, "Refresh response was malformed: {}", msg)
            }
            RefreshError::Storage(e) => write!(f, "Could not store the new token: {}", e),
            RefreshError::SessionReplaced => {
                write!(f, "Session changed while the refresh was in flight")
            }
        }
    }
}

impl StdError for RefreshError {}

/// ============================================================================
/// 2. UNIFIED CLIENT ERROR TYPE
/// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    /// No response was received
    Network(reqwest::Error),
    /// A 401 that could not be recovered. `logged_out` is set when no
    /// session is left: credentials cleared and the login redirect fired, by
    /// this call or a concurrent one. It stays unset when a newer login
    /// replaced the request's session while it was refreshing.
    AuthExpired {
        response: ApiResponse,
        logged_out: bool,
    },
    /// Any other non-2xx response, as seen by the typed wrappers
    Application { status: StatusCode, message: String },
    Decode(String),
    Encode(String),
    Credentials(CredentialError),
    Validation(ValidationError),
    Config(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the backend answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::AuthExpired { response, .. } => Some(response.status()),
            ApiError::Application { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthExpired { .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e) => write!(f, "Network error: {}", e),
            ApiError::AuthExpired { logged_out, .. } => {
                if *logged_out {
                    write!(f, "Session expired, please log in again")
                } else {
                    write!(f, "Request is not authorized")
                }
            }
            ApiError::Application { status, message } => {
                write!(f, "Backend returned {}: {}", status, message)
            }
            ApiError::Decode(msg) => write!(f, "Unexpected response body: {}", msg),
            ApiError::Encode(msg) => write!(f, "Failed to encode request body: {}", msg),
            ApiError::Credentials(e) => write!(f, "{}", e),
            ApiError::Validation(e) => write!(f, "{}", e),
            ApiError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ApiError::Network(e) => Some(e),
            ApiError::Credentials(e) => Some(e),
            ApiError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

// ============================================================================
// 3. FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        ApiError::Credentials(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err)
    }
}

// ============================================================================
// 4. BACKEND ERROR BODIES
// ============================================================================

/// Pull a human-readable message out of a backend error body.
///
/// The backend answers with `{"error": ..}`, `{"message": ..}` or `{"detail": ..}`
/// depending on the view; anything else falls back to the raw text.
pub fn backend_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["error", "message", "detail"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        text
    }
}
