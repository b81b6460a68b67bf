use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Payload = Map<String, Value>;
pub type StepIndex = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    GraphqlFetch,
    ExecuteTransaction,
}

impl ActionType {
    pub const ALL: [ActionType; 2] = [ActionType::GraphqlFetch, ActionType::ExecuteTransaction];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::GraphqlFetch => "GRAPHQL_FETCH",
            ActionType::ExecuteTransaction => "EXECUTE_TRANSACTION",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step the reasoning process asks the host to perform. The payload is
/// interpreted per action type further downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Requirements>,
}

/// Top-level message produced by one reasoning turn.
///
/// `extra` only ever holds entries under lenient validation; strict
/// validation rejects unknown top-level fields before deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    pub actions: Vec<Action>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single on-chain call: target contract, entrypoint name and positional
/// arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub contract_address: String,
    pub entrypoint: String,
    pub calldata: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action: Action,
    pub result: String,
}

/// Reasoning context owned by the execution loop. Read-only from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainOfThoughtContext {
    pub world_state: String,
    pub queries_available: String,
    pub available_actions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_history: Option<BTreeMap<StepIndex, ActionRecord>>,
}

impl ChainOfThoughtContext {
    pub fn history(&self) -> impl Iterator<Item = (StepIndex, &ActionRecord)> {
        self.action_history
            .iter()
            .flat_map(|history| history.iter().map(|(step, record)| (*step, record)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoTStep {
    pub id: String,
    pub content: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}
