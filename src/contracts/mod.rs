pub mod error;
pub mod schema;
pub mod types;
pub mod validator;

pub use error::{ContractError, SchemaError, ShapeMismatch, ShapeMismatchKind};
pub use schema::{ContractShape, ValidationMode, structured_response_schema, transaction_schema};
pub use types::{
    Action, ActionRecord, ActionType, ChainOfThoughtContext, CoTStep, Meta, Payload, Requirements,
    StructuredResponse, Transaction,
};
pub use validator::{
    ContractValidator, is_structured_response, is_transaction, parse_structured_response,
    parse_transaction, validate_structured_response, validate_transaction,
};
