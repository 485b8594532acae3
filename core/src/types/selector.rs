//! `Selector` — picks one of several sub-models by a discriminant key read
//! off the instance, then defers to that model like a `Class` would (spec
//! §3 "Class / Selector").
//!
//! The source leaves the discriminant mechanism mostly implicit; absent a
//! more specific grammar this reads a named string field of the
//! selector's own instance object and looks it up in a fixed
//! `discriminant value -> model name` table (an Open Question resolution,
//! see `DESIGN.md`).

use super::common::Common;
use super::{BasicType, ModelResolver};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::path::Path;
use crate::value::{Object, Value};
use indexmap::IndexMap;

/// `type: "selector"`.
#[derive(Debug, Clone)]
pub struct SelectorType {
    common: Common,
    /// Object key, read off the selector's own instance value, whose
    /// string value picks the branch.
    pub discriminant: String,
    /// Discriminant value → included model name.
    pub options: IndexMap<String, String>,
}

impl SelectorType {
    /// A new selector field named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: Common::new(name),
            discriminant: String::new(),
            options: IndexMap::new(),
        }
    }

    fn branch(&self, v: &Value) -> Option<&str> {
        let obj = v.as_object()?;
        let key = obj.get(&self.discriminant)?.as_str()?;
        self.options.get(key).map(String::as_str)
    }
}

fn body<'a>(common: &Common, v: &'a Value) -> Result<&'a Object> {
    v.as_object().ok_or_else(|| Error::SchemaShape {
        path: common.name.clone(),
        message: "type body must be an object".into(),
    })
}

impl BasicType for SelectorType {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn type_name(&self) -> &'static str {
        "selector"
    }

    fn check_model(&self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?;
        obj.get("discriminant").and_then(Value::as_str).ok_or_else(|| Error::AttributeParse {
            attribute: "discriminant".into(),
            path: self.common.name.clone(),
            message: "selector type requires a 'discriminant' key".into(),
        })?;
        let options = obj.get("options").and_then(Value::as_object).ok_or_else(|| Error::AttributeParse {
            attribute: "options".into(),
            path: self.common.name.clone(),
            message: "selector type requires an 'options' object".into(),
        })?;
        if options.is_empty() {
            return Err(Error::AttributeParse {
                attribute: "options".into(),
                path: self.common.name.clone(),
                message: "selector options must not be empty".into(),
            });
        }
        Ok(())
    }

    fn load_model(&mut self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?.clone();
        self.common.load_common(&obj)?;
        self.discriminant = obj.get("discriminant").and_then(Value::as_str).unwrap().to_string();
        let options = obj.get("options").and_then(Value::as_object).unwrap();
        for (key, value) in options.iter() {
            if let Some(model) = value.as_str() {
                self.options.insert(key.to_string(), model.to_string());
            }
        }
        Ok(())
    }

    fn validate_model(&self, path: &Path, diags: &mut Diagnostics) -> bool {
        if self.options.is_empty() {
            diags.push(path.to_string(), "selector has no options".to_string());
            false
        } else {
            true
        }
    }

    fn check_instance(
        &self,
        path: &Path,
        v: &Value,
        resolver: &dyn ModelResolver,
        diags: &mut Diagnostics,
    ) -> bool {
        let Some(model_ref) = self.branch(v) else {
            diags.push(
                path.to_string(),
                format!("no matching selector branch for discriminant '{}'", self.discriminant),
            );
            return false;
        };
        let Some(model) = resolver.resolve(model_ref) else {
            diags.push(path.to_string(), format!("unresolved selector model '{model_ref}'"));
            return false;
        };
        model.check_instance_body(v, resolver, diags)
    }

    fn expand_instance(&self, v: &mut Value, resolver: &dyn ModelResolver) {
        let model_ref = self.branch(v).map(str::to_string);
        if let Some(model_ref) = model_ref {
            if let Some(model) = resolver.resolve(&model_ref) {
                model.expand_instance_body(v, resolver);
            }
        }
    }

    fn resolve_instance_recurse(&self, v: &mut Value, resolver: &dyn ModelResolver, diags: &mut Diagnostics) {
        let model_ref = self.branch(v).map(str::to_string);
        if let Some(model_ref) = model_ref {
            if let Some(model) = resolver.resolve(&model_ref) {
                model.resolve_instance_body(v, resolver, diags);
            }
        }
    }

    fn collect_includes(&self, out: &mut Vec<String>) {
        out.extend(self.options.values().cloned());
    }

    fn explain(&self) -> String {
        format!(
            "selector {} discriminant={} options=[{}] (arity {})",
            self.common.name,
            self.discriminant,
            self.options.keys().cloned().collect::<Vec<_>>().join(","),
            self.common.arity.render()
        )
    }

    fn clone_box(&self) -> Box<dyn BasicType> {
        Box::new(self.clone())
    }
}
