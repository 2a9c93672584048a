//! Structured validation violations from request bodies and configuration.

use std::fmt;

use onboard_shared::{FieldErrors, NON_FIELD_ERRORS};

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Location of the offending value, outermost first.
    pub loc: Vec<String>,
    pub msg: String,
    /// Set when the check spans the whole object rather than one field.
    pub ctx: Option<String>,
}

impl Violation {
    pub fn field(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            loc: vec![name.into()],
            msg: msg.into(),
            ctx: None,
        }
    }

    pub fn object(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        Self {
            loc: Vec::new(),
            ctx: Some(msg.clone()),
            msg,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Translate into the field map used by error bodies.
    ///
    /// Field-level entries land under their first `loc` segment; object-level
    /// entries land under `non_field_errors`.
    pub fn to_field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for violation in &self.0 {
            match &violation.ctx {
                Some(ctx) => errors
                    .entry(NON_FIELD_ERRORS.to_string())
                    .or_default()
                    .push(ctx.clone()),
                None => {
                    let field = violation.loc.first().cloned().unwrap_or_default();
                    errors.entry(field).or_default().push(violation.msg.clone());
                }
            }
        }

        errors
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self(violations)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())
    }
}

impl std::error::Error for Violations {}
