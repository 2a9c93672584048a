//! Exception handlers, tried in a fixed priority order.

use serde_json::{Map, Value};

use super::Scope;
use super::detail::generate_base_data;
use crate::error::{AppException, FrameworkDetail, FrameworkError, RepoError};
use crate::ports::{AuthError, ErrorReport, Severity};
use crate::taxonomy::ErrorKind;

/// Draft error body and the status it should be sent with.
pub type Draft = (Map<String, Value>, u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Validation,
    NotAuthenticated,
    PermissionDenied,
    NotFound,
    Conflict,
    ExpectationFailed,
    ApiException,
    NotImplemented,
    /// Claims everything; only used when nothing in `CHAIN` does.
    GeneralException,
}

impl Handler {
    /// Priority order; the first handler that claims an exception wins.
    pub const CHAIN: [Handler; 8] = [
        Handler::Validation,
        Handler::NotAuthenticated,
        Handler::PermissionDenied,
        Handler::NotFound,
        Handler::Conflict,
        Handler::ExpectationFailed,
        Handler::ApiException,
        Handler::NotImplemented,
    ];

    pub const END_OF_CHAIN: Handler = Handler::GeneralException;

    pub fn claims(self, exc: &AppException) -> bool {
        use AppException as E;

        match self {
            Self::Validation => matches!(
                exc,
                E::Validation(_)
                    | E::Repo(RepoError::Integrity(_))
                    | E::Schema(_)
                    | E::InvalidValue(_)
            ),
            Self::NotAuthenticated => matches!(
                exc,
                E::NotAuthenticated(_)
                    | E::Auth(
                        AuthError::TokenExpired
                            | AuthError::InvalidToken(_)
                            | AuthError::MissingAuth
                    )
            ),
            Self::PermissionDenied => matches!(
                exc,
                E::PermissionDenied(_) | E::Auth(AuthError::InsufficientPermissions)
            ),
            Self::NotFound => matches!(
                exc,
                E::NotFound(_) | E::Repo(RepoError::NotFound) | E::UnknownRoute(_)
            ),
            Self::Conflict => matches!(exc, E::Conflict(_)),
            Self::ExpectationFailed => matches!(exc, E::ExpectationFailed(_)),
            Self::ApiException => matches!(exc, E::Framework(_)),
            Self::NotImplemented => matches!(exc, E::NotImplemented(_)),
            Self::GeneralException => true,
        }
    }

    pub fn build(self, exc: &AppException, scope: &Scope<'_>) -> Draft {
        tracing::debug!(
            handler = ?self,
            error_type = exc.type_name(),
            exception = %exc,
            context = ?scope.context,
            "Handling exception"
        );

        match self {
            Self::Validation => build_validation(exc),
            Self::NotAuthenticated => taxonomy(ErrorKind::NotAuthenticated, exc),
            Self::PermissionDenied => taxonomy(ErrorKind::PermissionDenied, exc),
            Self::NotFound => build_not_found(exc),
            Self::Conflict => taxonomy(ErrorKind::Conflict, exc),
            Self::ExpectationFailed => taxonomy(ErrorKind::ExpectationFailed, exc),
            Self::ApiException => build_framework(exc),
            Self::NotImplemented => {
                let report = ErrorReport::new(
                    Severity::Error,
                    exc.type_name(),
                    exc.to_string(),
                    scope.context,
                );
                scope.report(report.with_trace(exc.trace()));
                taxonomy(ErrorKind::NotImplemented, exc)
            }
            Self::GeneralException => build_unhandled(exc, scope),
        }
    }
}

fn taxonomy(kind: ErrorKind, exc: &AppException) -> Draft {
    (generate_base_data(kind, exc), kind.status_code())
}

fn build_validation(exc: &AppException) -> Draft {
    match exc {
        AppException::Schema(violations) => taxonomy(
            ErrorKind::Validation,
            &AppException::validation_fields(violations.to_field_errors()),
        ),
        _ => taxonomy(ErrorKind::Validation, exc),
    }
}

/// Library-level not-found errors carry unhelpful text, so they get the
/// default message instead.
fn build_not_found(exc: &AppException) -> Draft {
    match exc {
        AppException::NotFound(_) => taxonomy(ErrorKind::NotFound, exc),
        _ => taxonomy(ErrorKind::NotFound, &AppException::not_found("")),
    }
}

fn build_framework(exc: &AppException) -> Draft {
    let fallback = FrameworkError::default();
    let err = match exc {
        AppException::Framework(err) => err,
        _ => &fallback,
    };

    let kind = ErrorKind::ApiException;
    let mut data = Map::new();
    data.insert(
        "code".into(),
        Value::from(err.code.as_deref().unwrap_or(kind.code())),
    );
    data.insert("message".into(), Value::from(kind.default_message()));

    match &err.detail {
        Some(FrameworkDetail::Fields(errors)) => {
            data.insert("errors".into(), serde_json::json!(errors));
        }
        Some(FrameworkDetail::Message(message)) if !message.trim().is_empty() => {
            data.insert("message".into(), Value::from(message.trim()));
        }
        _ => tracing::warn!("Framework exception without structured detail"),
    }

    (data, err.status.unwrap_or(kind.status_code()))
}

fn build_unhandled(exc: &AppException, scope: &Scope<'_>) -> Draft {
    let trace = exc.trace();

    tracing::error!(
        error_type = exc.type_name(),
        exception = ?exc,
        trace = trace.as_deref().unwrap_or("<not captured>"),
        "Unhandled exception"
    );
    scope.report(
        ErrorReport::new(Severity::Critical, exc.type_name(), exc.to_string(), scope.context)
            .with_trace(trace),
    );

    let kind = ErrorKind::Unhandled;
    let mut data = Map::new();
    data.insert("code".into(), Value::from(kind.code()));
    data.insert("message".into(), Value::from(kind.default_message()));
    (data, kind.status_code())
}
