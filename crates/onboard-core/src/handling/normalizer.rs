//! Final schema check on a draft error body.

use onboard_shared::ErrorBody;
use onboard_shared::response::SERVER_ERROR_STATUS;
use serde_json::{Map, Value};
use thiserror::Error;

use super::Scope;
use crate::ports::{ErrorReport, Severity};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Error body does not match the schema: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("Error body field `{0}` must not be empty")]
    Empty(&'static str),

    #[error("Errors for `{0}` must be a non-empty list of non-empty strings")]
    FieldMessages(String),

    #[error("Status {0} is not an error status")]
    Status(u16),
}

/// Validate `draft` against the `ErrorBody` schema.
///
/// A single string under a field is coerced into a one-element list and an
/// empty `errors` map is dropped; everything else must already match.
pub fn validate(
    mut draft: Map<String, Value>,
    status: u16,
) -> Result<(ErrorBody, u16), SchemaError> {
    if !(400..=599).contains(&status) {
        return Err(SchemaError::Status(status));
    }

    if let Some(errors) = draft.remove("errors") {
        if let Some(errors) = coerce_errors(errors)? {
            draft.insert("errors".into(), errors);
        }
    }

    let body: ErrorBody = serde_json::from_value(Value::Object(draft))?;

    if body.code.trim().is_empty() {
        return Err(SchemaError::Empty("code"));
    }
    if body.message.trim().is_empty() {
        return Err(SchemaError::Empty("message"));
    }

    Ok((body, status))
}

fn coerce_errors(errors: Value) -> Result<Option<Value>, SchemaError> {
    let map = match errors {
        Value::Object(map) if map.is_empty() => return Ok(None),
        Value::Object(map) => map,
        other => return Ok(Some(other)),
    };

    let mut coerced = Map::new();
    for (field, messages) in map {
        let messages = match messages {
            Value::String(message) => vec![Value::String(message)],
            Value::Array(items) => items,
            _ => return Err(SchemaError::FieldMessages(field)),
        };

        let well_formed = !messages.is_empty()
            && messages
                .iter()
                .all(|m| m.as_str().is_some_and(|s| !s.trim().is_empty()));
        if !well_formed {
            return Err(SchemaError::FieldMessages(field));
        }

        coerced.insert(field, Value::Array(messages));
    }

    Ok(Some(Value::Object(coerced)))
}

/// Validate and return the body, or report the failure and return the fixed
/// server-error body.
pub fn finalize(draft: Map<String, Value>, status: u16, scope: &Scope<'_>) -> (ErrorBody, u16) {
    tracing::debug!(?draft, status, "Finalizing error response");

    match validate(draft, status) {
        Ok(validated) => validated,
        Err(err) => {
            tracing::error!(error = %err, "Failed to build error response");
            scope.report(ErrorReport::new(
                Severity::Critical,
                "SchemaError",
                err.to_string(),
                scope.context,
            ));
            (ErrorBody::server_error(), SERVER_ERROR_STATUS)
        }
    }
}
