//! End-to-end scenarios 1-6 from spec §8.

use ace_core::adapter::from_serde_json;
use ace_core::model::Model;
use ace_core::types::NoModels;
use ace_service::{Engine, Environment};
use serde_json::json;
use std::io::Write;

fn model_from_json(j: serde_json::Value) -> Model {
    Model::from_value("test", &from_serde_json(&j)).unwrap()
}

#[test]
fn scenario_1_integer_range() {
    let model = model_from_json(json!({
        "body": { "n": {"type": "integer", "range": "[0..10]", "default": 3} }
    }));
    let engine = Engine::new(&NoModels);

    let ok = from_serde_json(&json!({"n": 5}));
    let resolved = engine.process(&model, ok).unwrap();
    assert_eq!(resolved.as_object().unwrap().get("n").unwrap().as_i64(), Some(5));

    let bad = from_serde_json(&json!({"n": 20}));
    let err = engine.process(&model, bad).unwrap_err().to_string();
    assert!(err.contains("range"));
}

#[test]
fn scenario_2_arity_unfold() {
    let model = model_from_json(json!({
        "body": { "xs": {"type": "integer", "arity": "1..3"} }
    }));
    let engine = Engine::new(&NoModels);

    let single = from_serde_json(&json!({"xs": 7}));
    let resolved = engine.process(&model, single).unwrap();
    let xs = resolved.as_object().unwrap().get("xs").unwrap().as_array().unwrap();
    assert_eq!(xs.len(), 1);
    assert_eq!(xs[0].as_i64(), Some(7));

    let too_many = from_serde_json(&json!({"xs": [1, 2, 3, 4]}));
    assert!(engine.process(&model, too_many).is_err());
}

#[test]
fn scenario_3_enum_either() {
    let model = model_from_json(json!({
        "body": { "mode": {"type": "string", "either": ["r", "w", "rw"], "default": "r"} }
    }));
    let engine = Engine::new(&NoModels);

    let defaulted = from_serde_json(&json!({}));
    let resolved = engine.process(&model, defaulted).unwrap();
    assert_eq!(resolved.as_object().unwrap().get("mode").unwrap().as_str(), Some("r"));

    let bad = from_serde_json(&json!({"mode": "x"}));
    assert!(engine.process(&model, bad).is_err());
}

#[test]
fn scenario_4_dependency_trigger() {
    let model = model_from_json(json!({
        "body": {
            "a": {"type": "boolean", "arity": "1"},
            "b": {"type": "integer", "arity": "?", "deps": ["true@$.a"]},
        }
    }));
    let engine = Engine::new(&NoModels);

    let kept = from_serde_json(&json!({"a": true, "b": 1}));
    let resolved = engine.process(&model, kept).unwrap();
    assert_eq!(resolved.as_object().unwrap().get("b").unwrap().as_i64(), Some(1));

    let dropped = from_serde_json(&json!({"a": false, "b": 1}));
    let resolved = engine.process(&model, dropped).unwrap();
    assert!(resolved.as_object().unwrap().get("b").unwrap().is_undefined());
}

#[test]
fn scenario_5_hook() {
    let mut model = model_from_json(json!({
        "body": { "url": {"type": "string", "arity": "1"} }
    }));
    model.hooks.push(ace_core::model::Hook {
        path: "$.url".parse().unwrap(),
        pattern: r"^http://(.*)$".into(),
        replacement: r"https://\1".into(),
    });
    let engine = Engine::new(&NoModels);

    let instance = from_serde_json(&json!({"url": "http://x"}));
    let resolved = engine.process(&model, instance).unwrap();
    assert_eq!(resolved.as_object().unwrap().get("url").unwrap().as_str(), Some("https://x"));
}

#[test]
fn scenario_6_include_and_class() {
    let dir = tempfile::tempdir().unwrap();
    let b_path = dir.path().join("B.json");
    let mut f = std::fs::File::create(&b_path).unwrap();
    f.write_all(
        br#"{"name": "B", "body": {"field": {"type": "integer", "arity": "1"}}}"#,
    )
    .unwrap();

    let mut env = Environment::with_search_paths([dir.path().to_path_buf()]);
    env.load_model("B").unwrap();

    let a = model_from_json(json!({
        "name": "A",
        "include": ["B"],
        "body": { "sub": {"type": "class", "model": "B", "arity": "1"} }
    }));

    let engine = Engine::new(&env);

    let good = from_serde_json(&json!({"sub": {"field": 1}}));
    assert!(engine.process(&a, good).is_ok());

    let missing_field = from_serde_json(&json!({"sub": {}}));
    let err = engine.check(&a, &missing_field).unwrap_err().to_string();
    assert!(err.contains("field"));
}

#[test]
fn resolve_recurses_hooks_into_included_class_model() {
    let dir = tempfile::tempdir().unwrap();
    let b_path = dir.path().join("B.json");
    let mut f = std::fs::File::create(&b_path).unwrap();
    f.write_all(
        br#"{
            "name": "B",
            "body": {"url": {"type": "string", "arity": "1"}},
            "hooks": [{"path": "$.url", "match": "^http://(.*)$", "replace": "https://\\1"}]
        }"#,
    )
    .unwrap();

    let mut env = Environment::with_search_paths([dir.path().to_path_buf()]);
    env.load_model("B").unwrap();

    let a = model_from_json(json!({
        "name": "A",
        "include": ["B"],
        "body": { "sub": {"type": "class", "model": "B", "arity": "1"} }
    }));

    let engine = Engine::new(&env);
    let instance = from_serde_json(&json!({"sub": {"url": "http://x"}}));
    let resolved = engine.process(&a, instance).unwrap();
    let sub = resolved.as_object().unwrap().get("sub").unwrap().as_object().unwrap();
    assert_eq!(sub.get("url").unwrap().as_str(), Some("https://x"));
}
