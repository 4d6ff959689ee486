// src/error.rs
use thiserror::Error;

use crate::types::JobId;

/// Errors surfaced by any call to the job board API.
///
/// Cloneable so the last failure of each data source can live inside the
/// published dashboard view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Authentication required: {reason}")]
    AuthRequired { reason: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },
}

impl FetchError {
    pub fn auth_required(reason: impl Into<String>) -> Self {
        Self::AuthRequired {
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Map a non-success HTTP status and its error message onto the taxonomy.
    pub fn from_status(status: u16, message: String, retry_after_secs: Option<u64>) -> Self {
        match status {
            401 | 403 => Self::AuthRequired { reason: message },
            400 | 422 => Self::Validation { message },
            404 => Self::NotFound { resource: message },
            409 => Self::Conflict { message },
            429 => Self::RateLimited { retry_after_secs },
            _ => Self::ServerError { status, message },
        }
    }

    /// Failures worth retrying without user involvement.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::RateLimited { .. } => true,
            Self::ServerError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthRequired { .. } => "AUTH_REQUIRED",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Conflict { .. } => "CONFLICT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::ServerError { .. } => "SERVER_ERROR",
            Self::Network { .. } => "NETWORK_ERROR",
            Self::MalformedResponse { .. } => "MALFORMED_RESPONSE",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::malformed(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16(), err.to_string(), None);
        }
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Errors returned by the optimistic save / unsave / apply intents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("A status change for job {job_id} is already in flight")]
    MutationInFlight { job_id: JobId },

    #[error("Job {job_id} has already been applied to")]
    AlreadyApplied { job_id: JobId },

    #[error("Dashboard is no longer mounted")]
    Detached,

    #[error(transparent)]
    Request(#[from] FetchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            FetchError::from_status(401, "expired".into(), None).code(),
            "AUTH_REQUIRED"
        );
        assert_eq!(
            FetchError::from_status(422, "bad".into(), None).code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            FetchError::from_status(409, "already applied".into(), None),
            FetchError::Conflict {
                message: "already applied".into()
            }
        );
        assert_eq!(
            FetchError::from_status(429, String::new(), Some(3)),
            FetchError::RateLimited {
                retry_after_secs: Some(3)
            }
        );
        assert_eq!(
            FetchError::from_status(502, "bad gateway".into(), None).code(),
            "SERVER_ERROR"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Network {
            message: "reset".into()
        }
        .is_transient());
        assert!(FetchError::from_status(503, String::new(), None).is_transient());
        assert!(!FetchError::from_status(418, String::new(), None).is_transient());
        assert!(!FetchError::auth_required("no token").is_transient());
        assert!(!FetchError::Conflict {
            message: "dup".into()
        }
        .is_transient());
    }
}
