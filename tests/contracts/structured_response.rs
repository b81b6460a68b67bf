use serde_json::json;

use cot_guard::contracts::{
    ActionType, ContractError, ContractValidator, ShapeMismatchKind, ValidationMode,
    is_structured_response, parse_structured_response, validate_structured_response,
};

fn strict() -> ContractValidator {
    ContractValidator::new(ValidationMode::Strict).expect("strict schemas should compile")
}

#[test]
fn graphql_fetch_action_without_plan_is_accepted() {
    let input = json!({
        "actions": [{ "type": "GRAPHQL_FETCH", "payload": { "query": "x" } }]
    });

    let response = validate_structured_response(&input).expect("response should be accepted");
    assert_eq!(response.plan, None);
    assert_eq!(response.actions.len(), 1);
    assert_eq!(response.actions[0].action_type, ActionType::GraphqlFetch);
    assert_eq!(response.actions[0].payload.get("query"), Some(&json!("x")));
}

#[test]
fn full_response_is_narrowed_to_typed_view() {
    let input = json!({
        "plan": "build a farm, then trade wheat",
        "meta": {
            "requirements": {
                "resources": { "wood": 10, "stone": 2.5 },
                "population": 4
            }
        },
        "actions": [
            { "type": "GRAPHQL_FETCH", "payload": { "query": "{ realm { id } }" } },
            { "type": "EXECUTE_TRANSACTION", "payload": { "contractAddress": "0x1" } }
        ]
    });

    let response = validate_structured_response(&input).expect("response should be accepted");
    assert_eq!(response.plan.as_deref(), Some("build a farm, then trade wheat"));
    let requirements = response
        .meta
        .and_then(|meta| meta.requirements)
        .expect("requirements should be present");
    let resources = requirements.resources.expect("resources should be present");
    assert_eq!(resources.get("wood"), Some(&10.0));
    assert_eq!(resources.get("stone"), Some(&2.5));
    assert_eq!(requirements.population, Some(4.0));
    assert_eq!(
        response
            .actions
            .iter()
            .map(|action| action.action_type)
            .collect::<Vec<_>>(),
        vec![ActionType::GraphqlFetch, ActionType::ExecuteTransaction]
    );
}

#[test]
fn empty_actions_are_accepted() {
    let response = validate_structured_response(&json!({ "plan": "wait", "actions": [] }))
        .expect("empty action list is valid");
    assert!(response.actions.is_empty());
}

#[test]
fn unknown_action_type_is_rejected() {
    let input = json!({ "actions": [{ "type": "BOGUS", "payload": {} }] });

    let mismatch = validate_structured_response(&input).expect_err("BOGUS is not a known tag");
    assert_eq!(mismatch.kind, ShapeMismatchKind::UnknownVariant);
    assert_eq!(mismatch.path, "/actions/0/type");
}

#[test]
fn non_array_actions_are_rejected() {
    let input = json!({ "plan": "p", "actions": "not-an-array" });

    let mismatch = validate_structured_response(&input).expect_err("actions must be an array");
    assert_eq!(mismatch.kind, ShapeMismatchKind::WrongType);
    assert_eq!(mismatch.path, "/actions");
}

#[test]
fn missing_actions_are_rejected() {
    let mismatch = validate_structured_response(&json!({ "plan": "p" }))
        .expect_err("actions are required");
    assert_eq!(mismatch.kind, ShapeMismatchKind::MissingField);
    assert_eq!(mismatch.path, "/actions");
}

#[test]
fn non_objects_are_rejected() {
    for input in [
        json!(null),
        json!(42),
        json!("actions"),
        json!(true),
        json!([{ "actions": [] }]),
    ] {
        let mismatch = validate_structured_response(&input)
            .expect_err("only objects can be structured responses");
        assert_eq!(mismatch.kind, ShapeMismatchKind::NotAnObject, "input: {input}");
        assert!(!is_structured_response(&input));
    }
}

#[test]
fn action_payload_must_be_present_and_an_object() {
    let missing = json!({ "actions": [{ "type": "GRAPHQL_FETCH" }] });
    let mismatch = validate_structured_response(&missing).expect_err("payload is required");
    assert_eq!(mismatch.kind, ShapeMismatchKind::MissingField);
    assert_eq!(mismatch.path, "/actions/0/payload");

    for payload in [json!(null), json!([]), json!("query"), json!(1)] {
        let input = json!({ "actions": [{ "type": "GRAPHQL_FETCH", "payload": payload }] });
        let mismatch =
            validate_structured_response(&input).expect_err("payload must be an object");
        assert_eq!(mismatch.kind, ShapeMismatchKind::WrongType, "payload: {payload}");
        assert_eq!(mismatch.path, "/actions/0/payload");
    }
}

#[test]
fn one_bad_action_invalidates_the_whole_response() {
    let input = json!({
        "actions": [
            { "type": "GRAPHQL_FETCH", "payload": {} },
            { "type": "EXECUTE_TRANSACTION", "payload": {} },
            { "payload": {} }
        ]
    });

    let mismatch = validate_structured_response(&input).expect_err("third action lacks a type");
    assert_eq!(mismatch.kind, ShapeMismatchKind::MissingField);
    assert_eq!(mismatch.path, "/actions/2/type");
}

#[test]
fn lenient_mode_keeps_unknown_top_level_fields() {
    let input = json!({ "actions": [], "thoughts": "hmm", "confidence": 0.4 });

    let response = validate_structured_response(&input).expect("extra fields are tolerated");
    assert_eq!(response.extra.get("thoughts"), Some(&json!("hmm")));
    assert_eq!(response.extra.get("confidence"), Some(&json!(0.4)));
}

#[test]
fn lenient_mode_accepts_untyped_plan_and_meta() {
    for plan in [json!(null), json!(7), json!(["step"])] {
        let input = json!({ "plan": plan, "actions": [] });
        let response =
            validate_structured_response(&input).expect("lenient mode does not type plan");
        assert_eq!(response.plan, None);
        assert_eq!(response.extra.get("plan"), Some(&plan));
    }

    for meta in [
        json!("x"),
        json!(null),
        json!({ "requirements": { "resources": { "wood": "lots" } } }),
    ] {
        let input = json!({ "actions": [], "meta": meta });
        let response =
            validate_structured_response(&input).expect("lenient mode does not type meta");
        assert_eq!(response.meta, None);
        assert_eq!(response.extra.get("meta"), Some(&meta));
    }
}

#[test]
fn lenient_typed_view_round_trips_mistyped_fields() {
    let input = json!({ "plan": 7, "meta": "x", "actions": [] });

    let response = validate_structured_response(&input).expect("lenient mode accepts");
    assert_eq!(
        serde_json::to_value(&response).expect("response should serialize"),
        input
    );
}

#[test]
fn strict_mode_types_plan_and_meta() {
    let validator = strict();

    for plan in [json!(null), json!(7)] {
        let mismatch = validator
            .validate_structured_response(&json!({ "plan": plan, "actions": [] }))
            .expect_err("strict mode requires a string plan");
        assert_eq!(mismatch.kind, ShapeMismatchKind::WrongType);
        assert_eq!(mismatch.path, "/plan");
    }

    let mismatch = validator
        .validate_structured_response(&json!({ "plan": "p", "actions": [], "meta": "x" }))
        .expect_err("strict mode requires an object meta");
    assert_eq!(mismatch.kind, ShapeMismatchKind::WrongType);
    assert_eq!(mismatch.path, "/meta");

    let input = json!({
        "plan": "p",
        "actions": [],
        "meta": { "requirements": { "resources": { "wood": "lots" } } }
    });
    let mismatch = validator
        .validate_structured_response(&input)
        .expect_err("resources are numeric");
    assert_eq!(mismatch.path, "/meta/requirements/resources/wood");
}

#[test]
fn strict_mode_requires_plan() {
    let input = json!({ "actions": [] });

    assert!(validate_structured_response(&input).is_ok());
    let mismatch = strict()
        .validate_structured_response(&input)
        .expect_err("strict mode requires a plan");
    assert_eq!(mismatch.kind, ShapeMismatchKind::MissingField);
    assert_eq!(mismatch.path, "/plan");
}

#[test]
fn strict_mode_rejects_unknown_fields() {
    let validator = strict();

    let top_level = json!({ "plan": "p", "actions": [], "thoughts": "hmm" });
    let mismatch = validator
        .validate_structured_response(&top_level)
        .expect_err("extra top-level field");
    assert_eq!(mismatch.kind, ShapeMismatchKind::UnexpectedField);
    assert_eq!(mismatch.path, "/thoughts");

    let in_action = json!({
        "plan": "p",
        "actions": [{ "type": "GRAPHQL_FETCH", "payload": {}, "why": "because" }]
    });
    let mismatch = validator
        .validate_structured_response(&in_action)
        .expect_err("extra action field");
    assert_eq!(mismatch.kind, ShapeMismatchKind::UnexpectedField);
    assert_eq!(mismatch.path, "/actions/0/why");
}

#[test]
fn verdict_is_stable_across_calls() {
    let good = json!({ "actions": [{ "type": "EXECUTE_TRANSACTION", "payload": {} }] });
    let bad = json!({ "actions": [{ "type": "graphql_fetch", "payload": {} }] });

    for _ in 0..3 {
        assert!(is_structured_response(&good));
        assert!(!is_structured_response(&bad));
    }
    assert_eq!(
        validate_structured_response(&good).ok(),
        validate_structured_response(&good).ok()
    );
    assert_eq!(
        validate_structured_response(&bad).err(),
        validate_structured_response(&bad).err()
    );
}

#[test]
fn text_entry_point_separates_parse_and_shape_failures() {
    let parsed = parse_structured_response(r#"{"actions":[{"type":"GRAPHQL_FETCH","payload":{}}]}"#)
        .expect("well-formed text should parse");
    assert_eq!(parsed.actions.len(), 1);

    let err = parse_structured_response("Sure! Here is the plan: {").expect_err("not json");
    assert!(matches!(err, ContractError::Parse(_)));
    assert!(err.shape_mismatch().is_none());

    let err = parse_structured_response(r#"{"actions":{}}"#).expect_err("wrong shape");
    let mismatch = err.shape_mismatch().expect("shape failure should carry the mismatch");
    assert_eq!(mismatch.kind, ShapeMismatchKind::WrongType);
}

#[test]
fn validator_is_shared_across_threads() {
    let validator = std::sync::Arc::new(strict());
    let handles: Vec<_> = (0..4)
        .map(|index| {
            let validator = std::sync::Arc::clone(&validator);
            std::thread::spawn(move || {
                let input = json!({ "plan": format!("plan {index}"), "actions": [] });
                validator.is_structured_response(&input)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().expect("validation thread should not panic"));
    }
}
