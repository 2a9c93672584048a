//! Catalogue of error kinds: status code, public code and default message.
//!
//! Codes are a public contract consumed by API clients and must not change.

use onboard_shared::response::{SERVER_ERROR_CODE, SERVER_ERROR_MESSAGE, SERVER_ERROR_STATUS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotAuthenticated,
    PermissionDenied,
    NotFound,
    Conflict,
    ExpectationFailed,
    ServerError,
    NotImplemented,
    /// Framework-level exception without a declared code.
    ApiException,
    /// Anything no handler claims; rendered with the `ServerError` face.
    Unhandled,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 10] = [
        ErrorKind::Validation,
        ErrorKind::NotAuthenticated,
        ErrorKind::PermissionDenied,
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::ExpectationFailed,
        ErrorKind::ServerError,
        ErrorKind::NotImplemented,
        ErrorKind::ApiException,
        ErrorKind::Unhandled,
    ];

    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation | Self::ApiException => 400,
            Self::NotAuthenticated => 401,
            Self::PermissionDenied => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::ExpectationFailed => 417,
            Self::ServerError | Self::Unhandled => SERVER_ERROR_STATUS,
            Self::NotImplemented => 501,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::NotAuthenticated => "not_authenticated",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ExpectationFailed => "expectation_failed",
            Self::ServerError | Self::Unhandled => SERVER_ERROR_CODE,
            Self::NotImplemented => "not_implemented",
            Self::ApiException => "error",
        }
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Validation => "Validation error.",
            Self::NotAuthenticated => "User is not authenticated.",
            Self::PermissionDenied => "Permission denied for the requested resource.",
            Self::NotFound => "Requested resource was not found.",
            Self::Conflict => "A conflict occurred while processing the request.",
            Self::ExpectationFailed => "Expectation failed.",
            Self::ServerError | Self::Unhandled => SERVER_ERROR_MESSAGE,
            Self::NotImplemented => "Requested resource is not implemented yet.",
            Self::ApiException => "Invalid request.",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let codes: Vec<_> = ErrorKind::ALL
            .iter()
            .filter(|kind| **kind != ErrorKind::Unhandled)
            .map(|kind| kind.code())
            .collect();
        let unique: HashSet<_> = codes.iter().collect();

        assert_eq!(codes.len(), unique.len());
    }

    #[test]
    fn test_unhandled_renders_as_server_error() {
        assert_eq!(ErrorKind::Unhandled.code(), ErrorKind::ServerError.code());
        assert_eq!(ErrorKind::Unhandled.status_code(), 500);
    }

    #[test]
    fn test_status_table() {
        let table = [
            (ErrorKind::Validation, 400, "validation_error"),
            (ErrorKind::NotAuthenticated, 401, "not_authenticated"),
            (ErrorKind::PermissionDenied, 403, "permission_denied"),
            (ErrorKind::NotFound, 404, "not_found"),
            (ErrorKind::Conflict, 409, "conflict"),
            (ErrorKind::ExpectationFailed, 417, "expectation_failed"),
            (ErrorKind::ServerError, 500, "server_error"),
            (ErrorKind::NotImplemented, 501, "not_implemented"),
        ];

        for (kind, status, code) in table {
            assert_eq!(kind.status_code(), status, "{kind:?}");
            assert_eq!(kind.code(), code, "{kind:?}");
            assert!(!kind.default_message().is_empty());
        }
    }
}
