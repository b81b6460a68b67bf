use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::contracts::types::ActionType;

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Only `actions` is checked. `plan` and `meta` are not typed; values
    /// that do not fit the typed view land in `extra`.
    #[default]
    Lenient,
    /// `plan` required, every object closed.
    Strict,
}

impl ValidationMode {
    pub fn is_strict(self) -> bool {
        matches!(self, ValidationMode::Strict)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractShape {
    StructuredResponse,
    Transaction,
}

impl ContractShape {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractShape::StructuredResponse => "structured_response",
            ContractShape::Transaction => "transaction",
        }
    }

    pub fn schema(self, mode: ValidationMode) -> Value {
        match self {
            ContractShape::StructuredResponse => structured_response_schema(mode),
            ContractShape::Transaction => transaction_schema(mode),
        }
    }
}

impl fmt::Display for ContractShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractShape {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "response" | "structured_response" => Ok(ContractShape::StructuredResponse),
            "transaction" | "tx" => Ok(ContractShape::Transaction),
            other => Err(format!(
                "unknown shape '{other}', expected 'response' or 'transaction'"
            )),
        }
    }
}

/// JSON Schema for a structured response. This document is the contract:
/// the validator evaluates it as-is, and prompting layers may embed it.
pub fn structured_response_schema(mode: ValidationMode) -> Value {
    let strict = mode.is_strict();
    let required = if strict {
        json!(["plan", "actions"])
    } else {
        json!(["actions"])
    };

    let mut properties = json!({
        "actions": {
            "type": "array",
            "items": action_schema(strict)
        }
    });
    if strict {
        properties["plan"] = json!({ "type": "string" });
        properties["meta"] = meta_schema();
    }

    let mut schema = json!({
        "$schema": DRAFT_07,
        "title": "StructuredResponse",
        "type": "object",
        "properties": properties,
        "required": required
    });
    close_object(&mut schema, strict);
    schema
}

pub fn transaction_schema(mode: ValidationMode) -> Value {
    let mut schema = json!({
        "$schema": DRAFT_07,
        "title": "Transaction",
        "type": "object",
        "properties": {
            "contractAddress": { "type": "string" },
            "entrypoint": { "type": "string" },
            "calldata": { "type": "array" }
        },
        "required": ["contractAddress", "entrypoint", "calldata"]
    });
    close_object(&mut schema, mode.is_strict());
    schema
}

fn action_schema(strict: bool) -> Value {
    let tags: Vec<&str> = ActionType::ALL.iter().map(|tag| tag.as_str()).collect();
    let mut schema = json!({
        "type": "object",
        "properties": {
            "type": { "type": "string", "enum": tags },
            "payload": { "type": "object" }
        },
        "required": ["type", "payload"]
    });
    close_object(&mut schema, strict);
    schema
}

fn meta_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "requirements": {
                "type": "object",
                "properties": {
                    "resources": {
                        "type": "object",
                        "additionalProperties": { "type": "number" }
                    },
                    "population": { "type": "number" }
                },
                "additionalProperties": false
            }
        },
        "additionalProperties": false
    })
}

fn close_object(schema: &mut Value, strict: bool) {
    if strict {
        schema["additionalProperties"] = Value::Bool(false);
    }
}
