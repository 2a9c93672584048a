//! Field-error maps encoded inside an exception message.
//!
//! Both JSON (`{"email": ["Invalid format"]}`) and Python-literal notation
//! (`{'email': ['Invalid format'], 'age': ('too low',)}`) are accepted.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiteralError {
    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("literal is not a mapping")]
    NotAMapping,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Parse `text` into a JSON object.
pub fn parse_mapping(text: &str) -> Result<Map<String, Value>, LiteralError> {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) => serde_json::from_str(&python_literal_to_json(text)?)?,
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(LiteralError::NotAMapping),
    }
}

/// Rewrite Python literal syntax into JSON: quotes, tuples, trailing commas,
/// `None`/`True`/`False`.
fn python_literal_to_json(text: &str) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push('"');
                loop {
                    match chars.next() {
                        None => return Err(LiteralError::UnterminatedString),
                        Some('\\') => match chars.next() {
                            None => return Err(LiteralError::UnterminatedString),
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                        },
                        Some(ch) if ch == c => break,
                        Some('"') => out.push_str("\\\""),
                        Some(ch) => out.push(ch),
                    }
                }
                out.push('"');
            }
            '(' => out.push('['),
            ')' | ']' | '}' => {
                let kept = out.trim_end().len();
                if out[..kept].ends_with(',') {
                    out.truncate(kept - 1);
                }
                out.push(if c == ')' { ']' } else { c });
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !(next.is_alphanumeric() || next == '_') {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                out.push_str(match word.as_str() {
                    "None" => "null",
                    "True" => "true",
                    "False" => "false",
                    other => other,
                });
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_mapping() {
        let map = parse_mapping(r#"{"email": ["Invalid format"]}"#).unwrap();
        assert_eq!(Value::Object(map), json!({"email": ["Invalid format"]}));
    }

    #[test]
    fn test_python_mapping() {
        let map =
            parse_mapping("{'email': ['Invalid format'], 'name': (\"It's blank\",)}").unwrap();
        assert_eq!(
            Value::Object(map),
            json!({"email": ["Invalid format"], "name": ["It's blank"]})
        );
    }

    #[test]
    fn test_python_escapes_and_keywords() {
        let map = parse_mapping(r#"{'quote': ['say "hi"', 'it\'s'], 'flag': None,}"#).unwrap();
        assert_eq!(
            Value::Object(map),
            json!({"quote": ["say \"hi\"", "it's"], "flag": null})
        );
    }

    #[test]
    fn test_not_a_mapping() {
        assert!(matches!(
            parse_mapping("['a', 'b']"),
            Err(LiteralError::NotAMapping)
        ));
    }

    #[test]
    fn test_garbage_fails() {
        assert!(parse_mapping("{'email': ['unterminated]}").is_err());
        assert!(parse_mapping("{email: set()}").is_err());
    }
}
