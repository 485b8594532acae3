//! `Class` — a compound `BasicType` whose instance values are checked
//! against an *included* `Model` (spec §3 "Class / Selector", §4.E).

use super::common::Common;
use super::{BasicType, ModelResolver};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::path::Path;
use crate::value::{Object, Value};

/// `type: "class"` — holds the name of an included `Model` that acts as
/// this field's schema. During instance expansion each resolved Class
/// occurrence is tracked as one "clone" (spec §3: "a list of clones, one
/// per resolved Class instance").
#[derive(Debug, Clone)]
pub struct ClassType {
    common: Common,
    /// Name of the included `Model` providing this class's schema.
    pub model_ref: String,
}

impl ClassType {
    /// A new class field named `name`, with no model reference until
    /// loaded.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: Common::new(name),
            model_ref: String::new(),
        }
    }
}

fn body<'a>(common: &Common, v: &'a Value) -> Result<&'a Object> {
    v.as_object().ok_or_else(|| Error::SchemaShape {
        path: common.name.clone(),
        message: "type body must be an object".into(),
    })
}

impl BasicType for ClassType {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn type_name(&self) -> &'static str {
        "class"
    }

    fn check_model(&self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?;
        obj.get("model").and_then(Value::as_str).ok_or_else(|| Error::AttributeParse {
            attribute: "model".into(),
            path: self.common.name.clone(),
            message: "class type requires a 'model' reference".into(),
        })?;
        Ok(())
    }

    fn load_model(&mut self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?.clone();
        self.common.load_common(&obj)?;
        self.model_ref = obj.get("model").and_then(Value::as_str).unwrap().to_string();
        Ok(())
    }

    fn validate_model(&self, path: &Path, diags: &mut Diagnostics) -> bool {
        if self.model_ref.is_empty() {
            diags.push(path.to_string(), "class has no model reference".to_string());
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
        let Some(model) = resolver.resolve(&self.model_ref) else {
            diags.push(path.to_string(), format!("unresolved class model '{}'", self.model_ref));
            return false;
        };
        model.check_instance_body(v, resolver, diags)
    }

    fn expand_instance(&self, v: &mut Value, resolver: &dyn ModelResolver) {
        if let Some(model) = resolver.resolve(&self.model_ref) {
            model.expand_instance_body(v, resolver);
        }
    }

    fn flatten_instance(&self, _v: &mut Value) {}

    fn resolve_instance_recurse(&self, v: &mut Value, resolver: &dyn ModelResolver, diags: &mut Diagnostics) {
        if let Some(model) = resolver.resolve(&self.model_ref) {
            model.resolve_instance_body(v, resolver, diags);
        }
    }

    fn collect_includes(&self, out: &mut Vec<String>) {
        if !self.model_ref.is_empty() {
            out.push(self.model_ref.clone());
        }
    }

    fn explain(&self) -> String {
        format!(
            "class {} model={} (arity {})",
            self.common.name,
            self.model_ref,
            self.common.arity.render()
        )
    }

    fn clone_box(&self) -> Box<dyn BasicType> {
        Box::new(self.clone())
    }
}
