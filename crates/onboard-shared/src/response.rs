//! Standardized error envelope returned by every failing endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name (or `non_field_errors`) to its human-readable messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// The JSON error contract API clients parse.
///
/// ```json
/// {
///   "code": "validation_error",
///   "message": "Validation error.",
///   "errors": {"email": ["Invalid format"]}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub code: String,

    /// Human-readable summary, never empty.
    pub message: String,

    /// Per-field messages, omitted when there are none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            errors: None,
        }
    }

    /// The fixed body used whenever nothing better can be produced.
    pub fn server_error() -> Self {
        Self::new(SERVER_ERROR_CODE, SERVER_ERROR_MESSAGE)
    }
}

pub const SERVER_ERROR_STATUS: u16 = 500;
pub const SERVER_ERROR_CODE: &str = "server_error";
pub const SERVER_ERROR_MESSAGE: &str = "Internal server error.";
