use thiserror::Error;

use crate::config::SettingsError;
use crate::http_client::HttpError;

/// Input errors caught before any remote call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("resource name cannot be empty")]
    EmptyName,
    #[error("resource name length {len} exceeds max {max}")]
    NameTooLong { len: usize, max: usize },
    #[error("resource name contains invalid character '{ch}' at index {index}")]
    NameInvalidChar { ch: char, index: usize },

    #[error("{resource} requires a created {reference}")]
    MissingReference {
        resource: &'static str,
        reference: &'static str,
    },
    #[error("{resource} '{name}' has no package to upload")]
    MissingPackage { resource: &'static str, name: String },
    #[error("{resource} '{name}' has no remote identifier")]
    MissingIdentifier { resource: &'static str, name: String },
    #[error("{kind} does not support the '{action}' action")]
    UnsupportedAction {
        kind: &'static str,
        action: &'static str,
    },

    #[error("topic name cannot be empty")]
    EmptyTopic,
    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },
}

/// Coarse classification of [`OnapError`] for retry/abort decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnapErrorKind {
    NotFound,
    Validation,
    Api,
    Configuration,
    Lifecycle,
}

/// Top-level error type for every client operation.
#[derive(Debug, Error)]
pub enum OnapError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{resource} '{name}' not found")]
    NotFound { resource: &'static str, name: String },

    #[error("{operation} failed: {source}")]
    Api {
        operation: &'static str,
        #[source]
        source: HttpError,
    },

    #[error("{operation} returned status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("{operation} returned an unreadable payload: {source}")]
    Payload {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("onboarding of {kind} '{name}' stalled at status {status}")]
    Stalled {
        kind: &'static str,
        name: String,
        status: &'static str,
    },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("topic consumer worker failed: {0}")]
    Consumer(String),
}

impl OnapError {
    pub const fn kind(&self) -> OnapErrorKind {
        match self {
            Self::Validation(_) => OnapErrorKind::Validation,
            Self::NotFound { .. } => OnapErrorKind::NotFound,
            Self::Api { .. } | Self::Status { .. } | Self::Payload { .. } | Self::Consumer(_) => {
                OnapErrorKind::Api
            }
            Self::Stalled { .. } => OnapErrorKind::Lifecycle,
            Self::Settings(_) => OnapErrorKind::Configuration,
        }
    }

    /// Name of the remote operation that failed, when there is one.
    pub const fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Api { operation, .. }
            | Self::Status { operation, .. }
            | Self::Payload { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// Whether repeating the call may succeed.
    pub fn retryable(&self) -> bool {
        match self {
            Self::Api { source, .. } => source.retryable(),
            Self::Status { status, .. } => matches!(status, 408 | 429 | 500..=599),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_operation_context() {
        let error = OnapError::Api {
            operation: "vendor.create",
            source: HttpError::connect("connection refused"),
        };

        assert_eq!(error.kind(), OnapErrorKind::Api);
        assert_eq!(error.operation(), Some("vendor.create"));
        assert!(error.retryable());
        assert_eq!(error.to_string(), "vendor.create failed: connection refused");
    }

    #[test]
    fn client_side_statuses_are_not_retryable() {
        let error = OnapError::Status {
            operation: "vsp.validate",
            status: 400,
            body: String::from("bad package"),
        };
        assert!(!error.retryable());

        let error = OnapError::Status {
            operation: "vsp.validate",
            status: 503,
            body: String::new(),
        };
        assert!(error.retryable());
    }

    #[test]
    fn validation_converts_into_top_level_error() {
        let error: OnapError = ValidationError::EmptyName.into();
        assert_eq!(error.kind(), OnapErrorKind::Validation);
        assert_eq!(error.operation(), None);
    }
}
