//! `Model` — a unit of schema (spec §3, §4.F): name, version, authors,
//! doc, include list, template parameters, body, and hooks. Created by
//! `from_value` (the filename-aware `load(path)` from the source lives in
//! `ace-service`'s `Environment`, which owns search paths); validated via
//! `flatten_model` then `validate_model` before any instance is checked;
//! immutable thereafter.

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::path::{Item, Path};
use crate::regexutil;
use crate::types::{
    BasicType, BooleanType, ClassType, CpuidType, DependencyOutcome, EnumType, FileType,
    Ipv4Type, MacType, ModelResolver, NumberType, SelectorType, StringType, UriType,
};
use crate::value::{Object, Value};
use indexmap::IndexMap;
use std::sync::atomic::{AtomicU64, Ordering};

static OBJECT_ID: AtomicU64 = AtomicU64::new(0);

/// Allocate the next identity number in the process-wide sequence used to
/// name unnamed schema nodes (spec §5: "Object identity numbers are
/// allocated atomically").
pub fn next_object_id() -> u64 {
    OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// `"{Kind}_{id}"`, the fallback debug name for an unnamed schema node.
pub fn default_object_name(kind: &str) -> String {
    format!("{kind}_{}", next_object_id())
}

/// A path-rewrite rule applied during `resolveInstance` (spec §4.G, §4.H).
#[derive(Debug, Clone)]
pub struct Hook {
    /// Where in the instance tree this hook applies.
    pub path: Path,
    /// The full-match pattern a leaf string must satisfy to be rewritten.
    pub pattern: String,
    /// The back-reference template used to build the replacement.
    pub replacement: String,
}

impl Hook {
    fn from_value(v: &Value) -> Result<Hook> {
        let obj = v.as_object().ok_or_else(|| Error::SchemaShape {
            path: "hook".into(),
            message: "hook entry must be an object".into(),
        })?;
        let path_str = obj.get("path").and_then(Value::as_str).ok_or_else(|| Error::SchemaShape {
            path: "hook".into(),
            message: "hook requires a 'path' string".into(),
        })?;
        let pattern = obj.get("match").and_then(Value::as_str).ok_or_else(|| Error::SchemaShape {
            path: "hook".into(),
            message: "hook requires a 'match' regex".into(),
        })?;
        let replacement = obj.get("replace").and_then(Value::as_str).ok_or_else(|| Error::SchemaShape {
            path: "hook".into(),
            message: "hook requires a 'replace' template".into(),
        })?;
        Ok(Hook {
            path: Path::parse(path_str)?,
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        })
    }

    fn validate(&self, diags: &mut Diagnostics) -> bool {
        match regexutil::validate_hook_template(&self.pattern, &self.replacement) {
            Ok(()) => true,
            Err(e) => {
                diags.push(self.path.to_string(), e.to_string());
                false
            }
        }
    }
}

/// A schema unit: a named, versioned set of typed fields plus hooks.
#[derive(Debug, Clone)]
pub struct Model {
    /// The model's own name (defaults to the filename it was loaded from).
    pub name: String,
    /// Free-form version string.
    pub version: String,
    /// Author list.
    pub authors: Vec<String>,
    /// Documentation string.
    pub doc: Option<String>,
    /// Names of other models this one includes (by filename, resolved by
    /// `ace-service`'s `Environment`).
    pub includes: Vec<String>,
    /// Named placeholders substituted into `body` at load time.
    pub templates: IndexMap<String, Value>,
    /// Ordered map of field name to its schema type.
    pub body: IndexMap<String, Box<dyn BasicType>>,
    /// Path-rewrite rules applied at resolve time.
    pub hooks: Vec<Hook>,
}

fn construct_type(kind: &str, name: &str) -> Result<Box<dyn BasicType>> {
    Ok(match kind {
        "boolean" => Box::new(BooleanType::new(name)),
        "integer" => Box::new(NumberType::integer(name)),
        "float" => Box::new(NumberType::float(name)),
        "string" => Box::new(StringType::new(name)),
        "enum" => Box::new(EnumType::new(name)),
        "file" => Box::new(FileType::new(name)),
        "ipv4" => Box::new(Ipv4Type::new(name)),
        "mac" => Box::new(MacType::new(name)),
        "uri" => Box::new(UriType::new(name)),
        "cpuid" => Box::new(CpuidType::new(name)),
        "class" => Box::new(ClassType::new(name)),
        "selector" => Box::new(SelectorType::new(name)),
        other => {
            return Err(Error::SchemaShape {
                path: name.to_string(),
                message: format!("unknown field type '{other}'"),
            })
        }
    })
}

fn substitute_templates(v: &Value, templates: &IndexMap<String, Value>) -> Value {
    match v {
        Value::String(s) => s
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
            .and_then(|key| templates.get(key))
            .cloned()
            .unwrap_or_else(|| v.clone()),
        Value::Array(items) => {
            Value::Array(items.iter().map(|i| substitute_templates(i, templates)).collect())
        }
        Value::Object(o) => Value::Object(
            o.iter()
                .map(|(k, v)| (k.to_string(), substitute_templates(v, templates)))
                .collect(),
        ),
        other => other.clone(),
    }
}

impl Model {
    /// Build a `Model` from an already-parsed document, per spec §4.F
    /// steps 1-6 (name/version/authors/doc/include/templates, then each
    /// `body` key constructs and loads its `BasicType`).
    pub fn from_value(default_name: &str, v: &Value) -> Result<Model> {
        let obj = v.as_object().ok_or_else(|| Error::SchemaShape {
            path: default_name.to_string(),
            message: "model document must be an object".into(),
        })?;

        let name = obj.get("name").and_then(Value::as_str).unwrap_or(default_name).to_string();
        let version = obj.get("version").and_then(Value::as_str).unwrap_or("0.0.0").to_string();
        let authors = string_array(obj, "authors");
        let doc = obj.get("doc").and_then(Value::as_str).map(str::to_string);
        let includes = string_array(obj, "include");
        let templates: IndexMap<String, Value> = obj
            .get("templates")
            .and_then(Value::as_object)
            .map(|o| o.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
            .unwrap_or_default();

        let body_obj = obj.get("body").and_then(Value::as_object).ok_or_else(|| Error::SchemaShape {
            path: name.clone(),
            message: "model requires a 'body' object".into(),
        })?;

        let mut body = IndexMap::new();
        for (key, field_v) in body_obj.iter() {
            let substituted = substitute_templates(field_v, &templates);
            let kind = substituted
                .as_object()
                .and_then(|o| o.get("type"))
                .and_then(Value::as_str)
                .ok_or_else(|| Error::SchemaShape {
                    path: key.to_string(),
                    message: "field is missing a 'type' tag".into(),
                })?
                .to_string();
            let mut ty = construct_type(&kind, key)?;
            ty.check_model(&substituted)?;
            ty.load_model(&substituted)?;
            body.insert(key.to_string(), ty);
        }

        let mut hooks = Vec::new();
        if let Some(items) = obj.get("hooks").and_then(Value::as_array) {
            for item in items {
                hooks.push(Hook::from_value(item)?);
            }
        }

        Ok(Model {
            name,
            version,
            authors,
            doc,
            includes,
            templates,
            body,
            hooks,
        })
    }

    /// Step 7: resolve inherited attributes down the tree. ACE schemas are
    /// flat (siblings in `body` don't inherit from one another — only
    /// `templates` cascade, and those are already substituted by
    /// `from_value`), so this is a no-op that only exists to satisfy the
    /// "`flattenModel` is idempotent" invariant (spec §8) should a future
    /// nesting mechanism need a hook here.
    pub fn flatten_model(&mut self) -> bool {
        true
    }

    /// Step 8: each type validates its own internal consistency, plus
    /// every hook's template is checked against its own capture count.
    pub fn validate_model(&self, diags: &mut Diagnostics) -> bool {
        let mut ok = true;
        for (key, ty) in &self.body {
            let path = Path::local().push(Item::Named(key.clone()));
            ok &= ty.validate_model(&path, diags);
        }
        for hook in &self.hooks {
            ok &= hook.validate(diags);
        }
        ok
    }

    /// Names of models this one (transitively, through `Class`/`Selector`
    /// fields) references, beyond its own `include` list.
    pub fn collect_includes(&self) -> Vec<String> {
        let mut out = self.includes.clone();
        for ty in self.body.values() {
            ty.collect_includes(&mut out);
        }
        out
    }

    /// `checkInstance(root, root)`'s per-model recursion target: confirm
    /// `v` (an object) has exactly this model's fields, each conforming to
    /// its type.
    pub fn check_instance_body(
        &self,
        v: &Value,
        resolver: &dyn ModelResolver,
        diags: &mut Diagnostics,
    ) -> bool {
        let Some(obj) = v.as_object() else {
            diags.push(self.name.clone(), format!("expected object, found {}", v.kind()));
            return false;
        };
        let mut ok = true;
        for (key, ty) in &self.body {
            let path = Path::local().push(Item::Named(key.clone()));
            match obj.get(key) {
                None | Some(Value::Undefined) => {
                    if !ty.common().arity.value.check(0) {
                        diags.push(path.to_string(), format!("required field '{key}' is missing"));
                        ok = false;
                    }
                }
                Some(Value::Array(items)) => {
                    if !ty.common().arity.value.check(items.len()) {
                        diags.push(
                            path.to_string(),
                            format!("arity violation: expected {}, found {}", ty.common().arity.value, items.len()),
                        );
                        ok = false;
                    }
                    for item in items {
                        ok &= ty.check_instance(&path, item, resolver, diags);
                    }
                }
                Some(other) => {
                    if !ty.common().arity.value.check(1) {
                        diags.push(
                            path.to_string(),
                            format!("arity violation: expected {}, found 1", ty.common().arity.value),
                        );
                        ok = false;
                    }
                    ok &= ty.check_instance(&path, other, resolver, diags);
                }
            }
        }
        for key in obj.keys() {
            if !self.body.contains_key(key) {
                diags.push(format!(".{key}"), format!("unknown key '{key}'"));
                ok = false;
            }
        }
        ok
    }

    /// `expandInstance(root, root)`'s per-model recursion target: insert
    /// defaults and unfold singletons to arrays when arity demands it.
    pub fn expand_instance_body(&self, v: &mut Value, resolver: &dyn ModelResolver) {
        if v.is_undefined() {
            *v = Value::Object(Object::new());
        }
        let Some(obj) = v.as_object_mut() else {
            return;
        };
        for (key, ty) in &self.body {
            let mut val = obj.remove(key).unwrap_or(Value::Undefined);
            if ty.common().arity.value.allows_multiple() {
                match val {
                    Value::Array(mut items) => {
                        for item in items.iter_mut() {
                            ty.expand_instance(item, resolver);
                        }
                        val = Value::Array(items);
                    }
                    Value::Undefined => {
                        ty.expand_instance(&mut val, resolver);
                        val = if val.is_undefined() {
                            Value::Array(Vec::new())
                        } else {
                            Value::Array(vec![val])
                        };
                    }
                    mut scalar => {
                        ty.expand_instance(&mut scalar, resolver);
                        val = Value::Array(vec![scalar]);
                    }
                }
            } else {
                val = match val {
                    Value::Array(mut items) if items.len() == 1 => items.pop().unwrap(),
                    other => other,
                };
                ty.expand_instance(&mut val, resolver);
            }
            obj.put(key.clone(), val);
        }
    }

    /// `flattenInstance(root, root)`: strip transient scaffolding inserted
    /// during expansion from each field.
    pub fn flatten_instance_body(&self, v: &mut Value) {
        let Some(obj) = v.as_object_mut() else {
            return;
        };
        for (key, ty) in &self.body {
            if let Some(val) = obj.get_mut(key) {
                match val {
                    Value::Array(items) => {
                        for item in items.iter_mut() {
                            ty.flatten_instance(item);
                        }
                    }
                    other => ty.flatten_instance(other),
                }
            }
        }
    }

    /// `resolveInstance(root, root)`: drop fields whose dependency
    /// triggers fail (spec §4.G), recurse into any `Class`/`Selector`
    /// field's included model so its own deps/hooks run too, then apply
    /// this model's own hooks (spec §4.H) by rewriting matched leaf
    /// strings in place.
    pub fn resolve_instance_body(&self, v: &mut Value, resolver: &dyn ModelResolver, diags: &mut Diagnostics) {
        let snapshot = v.clone();
        if let Some(obj) = v.as_object_mut() {
            for (key, ty) in &self.body {
                let Some(slot) = obj.get_mut(key) else { continue };
                if let DependencyOutcome::Drop = ty.resolve_instance(&snapshot, diags) {
                    *slot = Value::Undefined;
                    continue;
                }

                match slot {
                    Value::Array(items) => {
                        for item in items.iter_mut() {
                            ty.resolve_instance_recurse(item, resolver, diags);
                        }
                    }
                    other => ty.resolve_instance_recurse(other, resolver, diags),
                }
            }
        }

        for hook in &self.hooks {
            let hits: Vec<(Path, String)> = v
                .walk(&hook.path)
                .into_iter()
                .filter_map(|(p, val)| val.as_str().map(|s| (p, s.to_string())))
                .collect();
            for (path, s) in hits {
                match regexutil::expand(&s, &hook.pattern, &hook.replacement) {
                    Ok(rewritten) => {
                        if let Some(slot) = v.get_mut_at(&path) {
                            *slot = Value::String(rewritten);
                        }
                    }
                    Err(_) => {
                        // The leaf didn't match the hook's pattern: hooks
                        // are opportunistic rewrites, not constraints.
                    }
                }
            }
        }
    }
}

fn string_array(obj: &Object, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NoModels;
    use serde_json::json;

    fn model_from_json(j: serde_json::Value) -> Model {
        let v = crate::adapter::from_serde_json(&j);
        Model::from_value("test", &v).unwrap()
    }

    #[test]
    fn loads_scalar_fields_and_validates() {
        let model = model_from_json(json!({
            "body": {
                "port": {"type": "integer", "range": "[0..65535]", "arity": "1"},
                "name": {"type": "string", "arity": "?"},
            }
        }));
        let mut diags = Diagnostics::new("model");
        assert!(model.validate_model(&mut diags));
        assert!(diags.is_ok());
    }

    #[test]
    fn check_instance_flags_missing_required_and_unknown_keys() {
        let model = model_from_json(json!({
            "body": { "port": {"type": "integer", "arity": "1"} }
        }));
        let instance = crate::adapter::from_serde_json(&json!({"bogus": 1}));
        let mut diags = Diagnostics::new("instance");
        let ok = model.check_instance_body(&instance, &NoModels, &mut diags);
        assert!(!ok);
        assert_eq!(diags.entries().len(), 2);
    }

    #[test]
    fn expand_instance_unwraps_singleton_array_for_exactly_one_arity() {
        let model = model_from_json(json!({
            "body": { "n": {"type": "integer", "arity": "1"} }
        }));
        let mut instance = crate::adapter::from_serde_json(&json!({"n": [5]}));
        model.expand_instance_body(&mut instance, &NoModels);
        let n = instance.as_object().unwrap().get("n").unwrap();
        assert_eq!(n.as_i64(), Some(5));
    }

    #[test]
    fn check_instance_flags_scalar_underflowing_min_arity() {
        let model = model_from_json(json!({
            "body": { "xs": {"type": "integer", "arity": "2..3"} }
        }));
        let instance = crate::adapter::from_serde_json(&json!({"xs": 7}));
        let mut diags = Diagnostics::new("instance");
        assert!(!model.check_instance_body(&instance, &NoModels, &mut diags));
    }

    #[test]
    fn expand_instance_unfolds_singleton_to_array() {
        let model = model_from_json(json!({
            "body": { "tags": {"type": "string", "arity": "0..3"} }
        }));
        let mut instance = crate::adapter::from_serde_json(&json!({"tags": "a"}));
        model.expand_instance_body(&mut instance, &NoModels);
        let tags = instance.as_object().unwrap().get("tags").unwrap();
        assert_eq!(tags.as_array().unwrap().len(), 1);
    }

    #[test]
    fn resolve_instance_drops_field_on_failed_dependency() {
        let model = model_from_json(json!({
            "body": {
                "mode": {"type": "string", "arity": "1"},
                "extra": {"type": "string", "arity": "?", "deps": ["advanced@.mode"]},
            }
        }));
        let mut instance = crate::adapter::from_serde_json(&json!({"mode": "basic", "extra": "x"}));
        let mut diags = Diagnostics::new("resolve");
        model.resolve_instance_body(&mut instance, &NoModels, &mut diags);
        let extra = instance.as_object().unwrap().get("extra").unwrap();
        assert!(extra.is_undefined());
    }

    #[test]
    fn resolve_instance_applies_hooks() {
        let mut model = model_from_json(json!({
            "body": { "url": {"type": "string", "arity": "1"} }
        }));
        model.hooks.push(Hook {
            path: Path::parse("$.url").unwrap(),
            pattern: r"^http://(.*)$".into(),
            replacement: r"https://\1".into(),
        });
        let mut instance = crate::adapter::from_serde_json(&json!({"url": "http://x"}));
        let mut diags = Diagnostics::new("resolve");
        model.resolve_instance_body(&mut instance, &NoModels, &mut diags);
        let url = instance.as_object().unwrap().get("url").unwrap();
        assert_eq!(url.as_str(), Some("https://x"));
    }
}
