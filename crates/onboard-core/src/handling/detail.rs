//! Turns an exception into the base `{code, message, errors?}` draft.

use serde_json::{Map, Value};

use super::literal::parse_mapping;
use crate::error::AppException;
use crate::taxonomy::ErrorKind;

/// Build the draft body for `exc` rendered as `kind`.
///
/// - structured field errors on the exception become `errors`, with the
///   default message unless the exception also carries its own text;
/// - an empty message falls back to the default message;
/// - a message starting with `{` is parsed as a field-error map; when parsing
///   fails only the default message remains;
/// - anything else is used verbatim as the message.
pub fn generate_base_data(kind: ErrorKind, exc: &AppException) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("code".into(), Value::from(kind.code()));

    let posted = exc.to_string();
    let posted = posted.trim();

    if let Some(errors) = exc.field_errors() {
        let message = if posted.is_empty() {
            kind.default_message()
        } else {
            posted
        };
        data.insert("message".into(), Value::from(message));
        data.insert("errors".into(), serde_json::json!(errors));
        return data;
    }

    if posted.is_empty() {
        data.insert("message".into(), Value::from(kind.default_message()));
    } else if posted.starts_with('{') {
        data.insert("message".into(), Value::from(kind.default_message()));
        match parse_mapping(posted) {
            Ok(errors) => {
                data.insert("errors".into(), Value::Object(errors));
            }
            Err(err) => {
                tracing::debug!(detail = posted, error = %err, "Could not parse error detail");
            }
        }
    } else {
        data.insert("message".into(), Value::from(posted));
    }

    data
}
