//! The top-level instance engine (spec §4.G): wires a `Model`'s
//! `check_instance_body`/`expand_instance_body`/`flatten_instance_body`/
//! `resolve_instance_body` into the pipeline described in spec §4.F step 2:
//!
//! 1. parse the instance document (the caller already has a `Value`, or
//!    uses `ace_core::adapter` itself),
//! 2. `checkInstance(root, root)`,
//! 3. `expandInstance(root, root)`,
//! 4. `flattenInstance(root, root)`,
//! 5. `resolveInstance(root, root)`.
//!
//! A false/failing step aborts the pipeline (spec §4.G "Failure semantics":
//! "a false return from any model-level step aborts the pipeline; the
//! caller receives null") — here, `Err`.

use ace_core::model::Model;
use ace_core::types::ModelResolver;
use ace_core::{Diagnostics, Value};

use crate::error::{Error, Result};

/// Runs the full check/expand/flatten/resolve pipeline for `instance`
/// against `model`, using `resolver` to follow any `Class`/`Selector`
/// fields into their included models.
pub struct Engine<'a> {
    resolver: &'a dyn ModelResolver,
}

impl<'a> Engine<'a> {
    /// Build an engine that resolves included models through `resolver`
    /// (typically an `Environment`).
    pub fn new(resolver: &'a dyn ModelResolver) -> Self {
        Self { resolver }
    }

    /// Run all four stages in order, consuming `instance` in place and
    /// returning it once every stage has passed. On the first failing
    /// stage, returns `Err` with the accumulated diagnostics for that
    /// stage; later stages never run (spec §4.G).
    pub fn process(&self, model: &Model, mut instance: Value) -> Result<Value> {
        self.check(model, &instance)?;
        self.expand(model, &mut instance);
        self.flatten(model, &mut instance);
        self.resolve(model, &mut instance)?;
        Ok(instance)
    }

    /// Step 2: `checkInstance(root, root)`.
    pub fn check(&self, model: &Model, instance: &Value) -> Result<()> {
        let mut diags = Diagnostics::new(model.name.clone());
        if model.check_instance_body(instance, self.resolver, &mut diags) {
            Ok(())
        } else {
            Err(Error::InvalidModel {
                name: model.name.clone(),
                diagnostics: diags.to_string(),
            })
        }
    }

    /// Step 3: `expandInstance(root, root)` — defaults, arity unfolding,
    /// Class/Selector recursion. Never fails: only fills in scaffolding.
    pub fn expand(&self, model: &Model, instance: &mut Value) {
        model.expand_instance_body(instance, self.resolver);
    }

    /// Step 4: `flattenInstance(root, root)` — strip transient scaffolding.
    pub fn flatten(&self, model: &Model, instance: &mut Value) {
        model.flatten_instance_body(instance);
    }

    /// Step 5: `resolveInstance(root, root)` — dependency triggers, then
    /// hooks in declaration order.
    pub fn resolve(&self, model: &Model, instance: &mut Value) -> Result<()> {
        let mut diags = Diagnostics::new(model.name.clone());
        model.resolve_instance_body(instance, self.resolver, &mut diags);
        if diags.is_ok() {
            Ok(())
        } else {
            Err(Error::InvalidModel {
                name: model.name.clone(),
                diagnostics: diags.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ace_core::types::NoModels;
    use serde_json::json;

    fn model_from_json(j: serde_json::Value) -> Model {
        let v = ace_core::adapter::from_serde_json(&j);
        Model::from_value("test", &v).unwrap()
    }

    #[test]
    fn pipeline_expands_defaults_and_unfolds_arity() {
        let model = model_from_json(json!({
            "body": {
                "tags": {"type": "string", "arity": "0..3"},
                "port": {"type": "integer", "range": "[0..65535]", "arity": "1", "default": 8080},
            }
        }));
        let instance = ace_core::adapter::from_serde_json(&json!({"tags": "a", "port": 8080}));
        let engine = Engine::new(&NoModels);
        let result = engine.process(&model, instance).unwrap();
        let obj = result.as_object().unwrap();
        assert_eq!(obj.get("tags").unwrap().as_array().unwrap().len(), 1);
        assert_eq!(obj.get("port").unwrap().as_i64(), Some(8080));
    }

    #[test]
    fn pipeline_rejects_unknown_keys_at_check_stage() {
        let model = model_from_json(json!({
            "body": { "port": {"type": "integer", "arity": "1"} }
        }));
        let instance = ace_core::adapter::from_serde_json(&json!({"port": 1, "bogus": true}));
        let engine = Engine::new(&NoModels);
        assert!(engine.process(&model, instance).is_err());
    }
}
