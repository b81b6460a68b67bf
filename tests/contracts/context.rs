use serde_json::json;

use cot_guard::contracts::{ActionType, ChainOfThoughtContext, CoTStep};

#[test]
fn context_reads_camel_case_wire_names_and_history() {
    let context: ChainOfThoughtContext = serde_json::from_value(json!({
        "worldState": "realm 1 owns 20 wood",
        "queriesAvailable": "realm(id)",
        "availableActions": "GRAPHQL_FETCH, EXECUTE_TRANSACTION",
        "actionHistory": {
            "1": {
                "action": { "type": "GRAPHQL_FETCH", "payload": { "query": "{ realm }" } },
                "result": "{}"
            },
            "0": {
                "action": { "type": "EXECUTE_TRANSACTION", "payload": {} },
                "result": "ok"
            }
        }
    }))
    .expect("context should deserialize");

    assert_eq!(context.world_state, "realm 1 owns 20 wood");
    let steps: Vec<_> = context
        .history()
        .map(|(step, record)| (step, record.action.action_type))
        .collect();
    assert_eq!(
        steps,
        vec![(0, ActionType::ExecuteTransaction), (1, ActionType::GraphqlFetch)]
    );
}

#[test]
fn context_without_history_has_no_steps() {
    let context: ChainOfThoughtContext = serde_json::from_value(json!({
        "worldState": "",
        "queriesAvailable": "",
        "availableActions": ""
    }))
    .expect("history is optional");

    assert_eq!(context.history().count(), 0);
    let encoded = serde_json::to_value(&context).expect("context should serialize");
    assert!(encoded.get("actionHistory").is_none());
}

#[test]
fn step_optional_fields_are_omitted_when_absent() {
    let step = CoTStep {
        id: "step-1".to_string(),
        content: "fetch the realm".to_string(),
        timestamp: 1_700_000_000_000,
        tags: None,
        meta: None,
    };

    let encoded = serde_json::to_value(&step).expect("step should serialize");
    assert_eq!(
        encoded,
        json!({ "id": "step-1", "content": "fetch the realm", "timestamp": 1_700_000_000_000u64 })
    );
}
