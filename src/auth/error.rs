//! Error types for the auth module.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors from login and logout.
#[derive(Debug, Error)]
pub enum AuthError {
    /// DSM answered `success: false` to a login request.
    ///
    /// Display is the translated message alone, e.g. `401 - Disabled account.`
    #[error("{message}")]
    Rejected {
        /// Vendor error code (0 when the response carried none).
        code: i64,
        /// Translated message.
        message: String,
    },

    /// DSM answered `success: false` to a logout request.
    #[error("logout failed: {message}")]
    LogoutRejected {
        /// Vendor error code (0 when the response carried none).
        code: i64,
        /// Translated message.
        message: String,
    },

    /// Login endpoint returned a non-2xx status.
    #[error("HTTP {status} from {endpoint}")]
    HttpStatus {
        /// Endpoint without query string.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },

    /// Response body was not the expected JSON envelope.
    #[error("invalid auth response from {endpoint}: {reason}")]
    InvalidResponse {
        /// Endpoint without query string.
        endpoint: String,
        /// What was wrong.
        reason: String,
    },

    /// Credential base URL cannot be parsed.
    #[error("invalid NAS URL: {url}")]
    InvalidUrl {
        /// The offending base URL.
        url: String,
    },

    /// Logout was requested without a session.
    #[error("no active session to log out")]
    NoSession,

    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl AuthError {
    /// Creates a login rejection, translating the vendor code.
    pub fn rejected(code: i64) -> Self {
        Self::Rejected {
            code,
            message: crate::error_codes::translate(code),
        }
    }

    /// Creates a logout rejection, translating the vendor code.
    pub fn logout_rejected(code: i64) -> Self {
        Self::LogoutRejected {
            code,
            message: crate::error_codes::translate(code),
        }
    }

    pub fn invalid_response(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Vendor error code, when DSM supplied one.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rejected { code, .. } | Self::LogoutRejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}
