//! The `BasicType` hierarchy (spec §4.E, REDESIGN FLAGS "Polymorphic type
//! hierarchy"): a closed `Type` enum over a `BasicType` trait, instead of
//! the source's deep C++ inheritance. Shared state (name, arity, doc,
//! deps) lives in `common::Common`, composed by every variant; policy
//! mixins (`Ranged`, `Enumerated`, `FormatChecker`) are small attribute
//! structs held by the variant rather than base classes.

mod class;
mod common;
mod format;
mod scalar;
mod selector;

pub use class::ClassType;
pub use common::{Common, Dependency};
pub use format::{CpuidType, FileMode, FileType, Ipv4Type, MacType, UriType};
pub use scalar::{BooleanType, EnumType, NumberType, StringType};
pub use selector::SelectorType;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::model::Model;
use crate::path::Path;
use crate::value::Value;
use std::fmt;

/// Looks up an included `Model` by name. Implemented by `ace_service`'s
/// `Environment`; `ace-core` only depends on the trait, never the
/// concrete registry (REDESIGN FLAGS: no global `Master`).
pub trait ModelResolver {
    /// Resolve `name` (as given to a `Class`'s model reference or an
    /// `include` entry) to an already-loaded `Model`.
    fn resolve(&self, name: &str) -> Option<&Model>;
}

/// A resolver that never resolves anything — useful for schema-time
/// operations and tests that don't involve `Class`/`Selector` recursion.
pub struct NoModels;

impl ModelResolver for NoModels {
    fn resolve(&self, _name: &str) -> Option<&Model> {
        None
    }
}

/// Outcome of evaluating a `BasicType`'s dependency triggers against an
/// instance (spec §4.G).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyOutcome {
    /// Every trigger matched (or there were none): the field stays.
    Keep,
    /// A trigger failed and the field is optional: drop it silently.
    Drop,
    /// A trigger failed and the field is required: a constraint violation.
    Violation(String),
}

/// Render a leaf `Value` the way a dependency trigger compares against it.
pub fn render_scalar(v: &Value) -> Option<String> {
    match v {
        Value::Boolean(b) => Some(b.to_string()),
        Value::Integer(n) => Some(n.to_string()),
        Value::Float(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// A schema-time node: one field of a `Model`'s body.
pub trait BasicType: fmt::Debug {
    /// Shared fields (name, arity, doc, deps).
    fn common(&self) -> &Common;
    /// Mutable access to the shared fields.
    fn common_mut(&mut self) -> &mut Common;
    /// The `type` tag this kind is constructed from (`"boolean"`, …).
    fn type_name(&self) -> &'static str;

    /// Does this type's own schema subtree `v` have the shape this kind
    /// expects?
    fn check_model(&self, v: &Value) -> Result<()>;
    /// Parse and store `v` (only called after `check_model` succeeded).
    fn load_model(&mut self, v: &Value) -> Result<()>;

    /// Confirm internal consistency once the whole model is loaded
    /// (default ∈ range, enum non-empty, …). Default: always consistent.
    fn validate_model(&self, _path: &Path, _diags: &mut Diagnostics) -> bool {
        true
    }

    /// Enforce this type's attributes on an instance leaf (or, for
    /// `Class`, recurse into the referenced `Model`).
    fn check_instance(
        &self,
        path: &Path,
        v: &Value,
        resolver: &dyn ModelResolver,
        diags: &mut Diagnostics,
    ) -> bool;

    /// Insert defaults and unfold singletons to arrays when arity demands
    /// it.
    fn expand_instance(&self, v: &mut Value, resolver: &dyn ModelResolver);

    /// Normalize structure after expansion (strip transient scaffolding).
    /// Default: no-op — most kinds have nothing to flatten.
    fn flatten_instance(&self, _v: &mut Value) {}

    /// Evaluate this type's own dependency triggers against the instance
    /// root (spec §4.G). Default implementation walks `common().deps`;
    /// kinds never need to override this.
    fn resolve_instance(&self, root: &Value, diags: &mut Diagnostics) -> DependencyOutcome {
        for dep in &self.common().deps {
            let hits = root.walk(&dep.path);
            let rendered = hits.first().and_then(|(_, v)| render_scalar(v));
            if !dep.matches(rendered.as_deref()) {
                return if self.common().arity.value.check(0) {
                    DependencyOutcome::Drop
                } else {
                    let msg = format!(
                        "dependency '{}@{}' unmet",
                        dep.trigger, dep.path
                    );
                    diags.push(self.common().name.clone(), msg.clone());
                    DependencyOutcome::Violation(msg)
                };
            }
        }
        DependencyOutcome::Keep
    }

    /// Recurse `resolveInstance` into this field's own value, for kinds
    /// that defer to an included `Model` (`Class`/`Selector`), so that
    /// model's own deps/hooks run too (spec §4.G: "across the model
    /// tree"). Default: no-op — scalar kinds have no submodel to recurse
    /// into.
    fn resolve_instance_recurse(&self, _v: &mut Value, _resolver: &dyn ModelResolver, _diags: &mut Diagnostics) {}

    /// Append the names of `Model`s this type (transitively) references.
    /// Default: none — only `Class`/`Selector` override.
    fn collect_includes(&self, _out: &mut Vec<String>) {}

    /// One-line attribute dump, used by the Coach/Explainer (spec §4.H).
    fn explain(&self) -> String;

    /// Deep-clone behind a trait object.
    fn clone_box(&self) -> Box<dyn BasicType>;
}

impl Clone for Box<dyn BasicType> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
