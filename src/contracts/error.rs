use std::fmt;

use jsonschema::{ValidationError, error::ValidationErrorKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeMismatchKind {
    NotAnObject,
    MissingField,
    WrongType,
    UnknownVariant,
    UnexpectedField,
    Other,
}

impl ShapeMismatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeMismatchKind::NotAnObject => "not_an_object",
            ShapeMismatchKind::MissingField => "missing_field",
            ShapeMismatchKind::WrongType => "wrong_type",
            ShapeMismatchKind::UnknownVariant => "unknown_variant",
            ShapeMismatchKind::UnexpectedField => "unexpected_field",
            ShapeMismatchKind::Other => "other",
        }
    }
}

/// Why an input was refused. `path` is a JSON pointer to the offending
/// value; for a missing field it points at where the field should be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeMismatch {
    pub kind: ShapeMismatchKind,
    pub path: String,
    pub message: String,
}

impl ShapeMismatch {
    pub fn new(
        kind: ShapeMismatchKind,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn from_validation_error(error: &ValidationError<'_>) -> Self {
        let instance_path = error.instance_path.to_string();
        let message = error.to_string();
        match &error.kind {
            ValidationErrorKind::Type { .. } if instance_path.is_empty() => {
                Self::new(ShapeMismatchKind::NotAnObject, instance_path, message)
            }
            ValidationErrorKind::Type { .. } => {
                Self::new(ShapeMismatchKind::WrongType, instance_path, message)
            }
            ValidationErrorKind::Required { property } => {
                let field = property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string());
                Self::new(
                    ShapeMismatchKind::MissingField,
                    format!("{instance_path}/{field}"),
                    message,
                )
            }
            ValidationErrorKind::Enum { .. } => {
                Self::new(ShapeMismatchKind::UnknownVariant, instance_path, message)
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                let path = match unexpected.first() {
                    Some(field) => format!("{instance_path}/{field}"),
                    None => instance_path,
                };
                Self::new(ShapeMismatchKind::UnexpectedField, path, message)
            }
            _ => Self::new(ShapeMismatchKind::Other, instance_path, message),
        }
    }
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.kind.as_str(), self.message)
        } else {
            write!(f, "{} at {}: {}", self.kind.as_str(), self.path, self.message)
        }
    }
}

impl std::error::Error for ShapeMismatch {}

/// Failure of the text entry points: either the text is not JSON, or it is
/// JSON of the wrong shape.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("malformed json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("shape mismatch: {0}")]
    Shape(#[from] ShapeMismatch),
}

impl ContractError {
    pub fn shape_mismatch(&self) -> Option<&ShapeMismatch> {
        match self {
            ContractError::Shape(mismatch) => Some(mismatch),
            ContractError::Parse(_) => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to compile {shape} schema: {message}")]
pub struct SchemaError {
    pub shape: &'static str,
    pub message: String,
}
