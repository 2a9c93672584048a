//! Exception types raised anywhere in request processing.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

use onboard_shared::FieldErrors;
use thiserror::Error;

use crate::ports::AuthError;
use crate::validation::Violations;

/// Message and optional structured field errors carried by a taxonomy-level exception.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detail {
    pub message: String,
    pub errors: Option<FieldErrors>,
}

impl Detail {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    pub fn fields(errors: FieldErrors) -> Self {
        Self {
            message: String::new(),
            errors: Some(errors),
        }
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The error every layer raises and the exception router consumes.
#[derive(Debug, Error)]
pub enum AppException {
    #[error("{0}")]
    Validation(Detail),

    #[error("{0}")]
    NotAuthenticated(Detail),

    #[error("{0}")]
    PermissionDenied(Detail),

    #[error("{0}")]
    NotFound(Detail),

    #[error("{0}")]
    Conflict(Detail),

    #[error("{0}")]
    ExpectationFailed(Detail),

    #[error("{0}")]
    ServerError(Detail),

    #[error("{0}")]
    NotImplemented(Detail),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("{0}")]
    InvalidValue(String),

    #[error(transparent)]
    Schema(#[from] Violations),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Framework(#[from] FrameworkError),

    #[error("No route matches {0}")]
    UnknownRoute(String),

    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

impl AppException {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(Detail::message(message))
    }

    pub fn validation_fields(errors: FieldErrors) -> Self {
        Self::Validation(Detail::fields(errors))
    }

    pub fn not_authenticated(message: impl Into<String>) -> Self {
        Self::NotAuthenticated(Detail::message(message))
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(Detail::message(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(Detail::message(message))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(Detail::message(message))
    }

    pub fn expectation_failed(message: impl Into<String>) -> Self {
        Self::ExpectationFailed(Detail::message(message))
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::ServerError(Detail::message(message))
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::NotImplemented(Detail::message(message))
    }

    /// Structured field errors attached directly to a taxonomy-level exception.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(detail)
            | Self::NotAuthenticated(detail)
            | Self::PermissionDenied(detail)
            | Self::NotFound(detail)
            | Self::Conflict(detail)
            | Self::ExpectationFailed(detail)
            | Self::ServerError(detail)
            | Self::NotImplemented(detail) => detail.errors.as_ref(),
            _ => None,
        }
    }

    /// Variant name used when reporting the exception.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation",
            Self::NotAuthenticated(_) => "NotAuthenticated",
            Self::PermissionDenied(_) => "PermissionDenied",
            Self::NotFound(_) => "NotFound",
            Self::Conflict(_) => "Conflict",
            Self::ExpectationFailed(_) => "ExpectationFailed",
            Self::ServerError(_) => "ServerError",
            Self::NotImplemented(_) => "NotImplemented",
            Self::Repo(RepoError::NotFound) => "RepoError::NotFound",
            Self::Repo(RepoError::Integrity(_)) => "RepoError::Integrity",
            Self::Repo(RepoError::Unavailable(_)) => "RepoError::Unavailable",
            Self::InvalidValue(_) => "InvalidValue",
            Self::Schema(_) => "Schema",
            Self::Auth(_) => "AuthError",
            Self::Framework(_) => "Framework",
            Self::UnknownRoute(_) => "UnknownRoute",
            Self::Unhandled(_) => "Unhandled",
        }
    }

    /// Stack trace for telemetry: the one captured at creation when available,
    /// otherwise one captured now.
    pub fn trace(&self) -> Option<String> {
        if let Self::Unhandled(err) = self {
            let captured = err.backtrace();
            if captured.status() == BacktraceStatus::Captured {
                return Some(captured.to_string());
            }
        }

        let backtrace = Backtrace::capture();
        match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Entity not found")]
    NotFound,

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// An exception raised by the web framework itself (payload parsing, extractors, ...).
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("framework error (status {status:?}, code {code:?})")]
pub struct FrameworkError {
    /// Status the framework declared for this error.
    pub status: Option<u16>,
    /// Code the framework declared for this error.
    pub code: Option<String>,
    pub detail: Option<FrameworkDetail>,
}

impl FrameworkError {
    pub fn new(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_detail(mut self, detail: FrameworkDetail) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Detail attached to a framework error.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameworkDetail {
    Message(String),
    Fields(FieldErrors),
    /// Anything else; carried but never surfaced.
    Unstructured(serde_json::Value),
}
