use std::sync::LazyLock;

use jsonschema::JSONSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::contracts::{
    error::{ContractError, SchemaError, ShapeMismatch, ShapeMismatchKind},
    schema::{ContractShape, ValidationMode},
    types::{Meta, StructuredResponse, Transaction},
};

static LENIENT: LazyLock<ContractValidator> = LazyLock::new(|| {
    ContractValidator::new(ValidationMode::Lenient)
        .expect("built-in contract schemas must compile")
});

/// Compiled contract schemas for one validation mode. Stateless after
/// construction; share it freely across threads.
pub struct ContractValidator {
    mode: ValidationMode,
    structured_response: JSONSchema,
    transaction: JSONSchema,
}

impl ContractValidator {
    pub fn new(mode: ValidationMode) -> Result<Self, SchemaError> {
        Ok(Self {
            mode,
            structured_response: compile(ContractShape::StructuredResponse, mode)?,
            transaction: compile(ContractShape::Transaction, mode)?,
        })
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn validate_structured_response(
        &self,
        value: &Value,
    ) -> Result<StructuredResponse, ShapeMismatch> {
        self.check(ContractShape::StructuredResponse, value)?;
        if self.mode.is_strict() {
            return narrow(ContractShape::StructuredResponse, value);
        }
        narrow_lenient_response(value)
    }

    pub fn validate_transaction(&self, value: &Value) -> Result<Transaction, ShapeMismatch> {
        self.check(ContractShape::Transaction, value)?;
        narrow(ContractShape::Transaction, value)
    }

    pub fn is_structured_response(&self, value: &Value) -> bool {
        self.structured_response.is_valid(value)
    }

    pub fn is_transaction(&self, value: &Value) -> bool {
        self.transaction.is_valid(value)
    }

    pub fn parse_structured_response(
        &self,
        text: &str,
    ) -> Result<StructuredResponse, ContractError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(self.validate_structured_response(&value)?)
    }

    pub fn parse_transaction(&self, text: &str) -> Result<Transaction, ContractError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(self.validate_transaction(&value)?)
    }

    /// Shape check without building the typed view. Reports the first
    /// violation the schema produces.
    pub fn check(&self, shape: ContractShape, value: &Value) -> Result<(), ShapeMismatch> {
        let compiled = match shape {
            ContractShape::StructuredResponse => &self.structured_response,
            ContractShape::Transaction => &self.transaction,
        };

        let mismatch = match compiled.validate(value) {
            Ok(()) => return Ok(()),
            Err(mut errors) => match errors.next() {
                Some(error) => ShapeMismatch::from_validation_error(&error),
                None => ShapeMismatch::new(
                    ShapeMismatchKind::Other,
                    "",
                    "schema rejected input without reporting an error",
                ),
            },
        };

        tracing::debug!(
            target: "validator",
            shape = shape.as_str(),
            mode = ?self.mode,
            kind = mismatch.kind.as_str(),
            path = %mismatch.path,
            "contract_rejected"
        );
        Err(mismatch)
    }
}

pub fn validate_structured_response(value: &Value) -> Result<StructuredResponse, ShapeMismatch> {
    LENIENT.validate_structured_response(value)
}

pub fn validate_transaction(value: &Value) -> Result<Transaction, ShapeMismatch> {
    LENIENT.validate_transaction(value)
}

pub fn is_structured_response(value: &Value) -> bool {
    LENIENT.is_structured_response(value)
}

pub fn is_transaction(value: &Value) -> bool {
    LENIENT.is_transaction(value)
}

pub fn parse_structured_response(text: &str) -> Result<StructuredResponse, ContractError> {
    LENIENT.parse_structured_response(text)
}

pub fn parse_transaction(text: &str) -> Result<Transaction, ContractError> {
    LENIENT.parse_transaction(text)
}

fn compile(shape: ContractShape, mode: ValidationMode) -> Result<JSONSchema, SchemaError> {
    let schema = shape.schema(mode);
    JSONSchema::compile(&schema).map_err(|err| SchemaError {
        shape: shape.as_str(),
        message: err.to_string(),
    })
}

// The lenient schema leaves `plan` and `meta` untyped. Values that do not fit
// the typed fields are kept verbatim in `extra` under their own key.
fn narrow_lenient_response(value: &Value) -> Result<StructuredResponse, ShapeMismatch> {
    let Some(object) = value.as_object() else {
        return narrow(ContractShape::StructuredResponse, value);
    };

    let mut typed = object.clone();
    let mut stray = Map::new();
    if let Some(plan) = typed.remove("plan") {
        if plan.is_string() {
            typed.insert("plan".to_string(), plan);
        } else {
            stray.insert("plan".to_string(), plan);
        }
    }
    if let Some(meta) = typed.remove("meta") {
        if Meta::deserialize(&meta).is_ok() {
            typed.insert("meta".to_string(), meta);
        } else {
            stray.insert("meta".to_string(), meta);
        }
    }

    let typed = Value::Object(typed);
    let mut response: StructuredResponse = narrow(ContractShape::StructuredResponse, &typed)?;
    response.extra.extend(stray);
    Ok(response)
}

// Runs only after the schema accepted `value`, so a failure here means the
// schema and the serde types disagree.
fn narrow<'de, T: Deserialize<'de>>(
    shape: ContractShape,
    value: &'de Value,
) -> Result<T, ShapeMismatch> {
    T::deserialize(value).map_err(|err| {
        tracing::warn!(
            target: "validator",
            shape = shape.as_str(),
            error = %err,
            "schema_accepted_undeserializable_input"
        );
        ShapeMismatch::new(ShapeMismatchKind::Other, "", err.to_string())
    })
}
