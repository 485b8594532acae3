//! Fields and helpers shared by every `BasicType` variant (spec §3, §4.E).

use crate::attributes::{ArityAttribute, AttributeValue};
use crate::error::{Error, Result};
use crate::path::Path;
use crate::value::Object;

/// One `"trigger@path"` dependency (spec §4.G).
#[derive(Debug, Clone)]
pub struct Dependency {
    /// The trigger expression: a literal for equality, a set member for
    /// enumerations, or `*` for mere existence.
    pub trigger: String,
    /// Where to look up the value to test the trigger against.
    pub path: Path,
}

impl Dependency {
    /// Parse `"trigger@path"`.
    pub fn parse(s: &str) -> Result<Self> {
        let (trigger, path) = s.split_once('@').ok_or_else(|| Error::ModelConsistency {
            path: String::new(),
            message: format!("dependency '{s}' is missing '@path'"),
        })?;
        Ok(Self {
            trigger: trigger.to_string(),
            path: Path::parse(path)?,
        })
    }

    /// True if `value` (rendered as a string) satisfies this trigger.
    /// `"*"` only demands existence (any non-undefined value), and a
    /// comma-separated trigger is read as a membership test.
    pub fn matches(&self, rendered: Option<&str>) -> bool {
        match rendered {
            None => false,
            Some(s) => {
                if self.trigger == "*" {
                    true
                } else if self.trigger.contains(',') {
                    self.trigger.split(',').any(|t| t == s)
                } else {
                    self.trigger == s
                }
            }
        }
    }
}

/// Fields every `BasicType` kind carries regardless of its specific
/// payload: name, arity, doc string, and dependency list. A type's own
/// value-tree path is never stored here — the REDESIGN FLAGS rule out
/// parent back-pointers, so paths are always derived from the enclosing
/// traversal (see `value::Value::walk`).
#[derive(Debug, Clone)]
pub struct Common {
    /// The field's key in its parent's body.
    pub name: String,
    /// How many values this field may hold.
    pub arity: ArityAttribute,
    /// Optional documentation string.
    pub doc: Option<String>,
    /// Dependency triggers gating this field's presence (spec §4.G).
    pub deps: Vec<Dependency>,
}

impl Common {
    /// A fresh `Common` for a field named `name`, arity defaulting to `1`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: ArityAttribute::new(true, true),
            doc: None,
            deps: Vec::new(),
        }
    }

    /// Load the attributes shared by every kind (`arity`, `doc`, `deps`)
    /// out of this type's own schema subtree. Kind-specific keys (`range`,
    /// `either`, `default`, …) are left for the caller to consume.
    pub fn load_common(&mut self, obj: &Object) -> Result<()> {
        if let Some(v) = obj.get("arity") {
            self.arity.check_model(v).map_err(|e| attach_path(e, &self.name))?;
            self.arity.load_model(v)?;
        }
        if let Some(v) = obj.get("doc") {
            self.doc = v.as_str().map(str::to_string);
        }
        if let Some(items) = obj.get("deps").and_then(|v| v.as_array()) {
            for item in items {
                if let Some(s) = item.as_str() {
                    self.deps.push(Dependency::parse(s)?);
                }
            }
        }
        Ok(())
    }

    /// Fold an inherited `Common` (from a template or supertype) into this
    /// one: tighten the arity, keep the child's `doc` if set else inherit
    /// the parent's, and union the dependency lists.
    pub fn merge(&mut self, parent: &Common) -> bool {
        let combined = self.arity.value.intersect(&parent.arity.value);
        if !combined.is_valid() {
            return false;
        }
        self.arity.value = combined;
        if self.doc.is_none() {
            self.doc = parent.doc.clone();
        }
        for dep in &parent.deps {
            self.deps.push(dep.clone());
        }
        true
    }
}

fn attach_path(e: Error, path: &str) -> Error {
    match e {
        Error::AttributeParse {
            attribute, message, ..
        } => Error::AttributeParse {
            attribute,
            path: path.to_string(),
            message,
        },
        other => other,
    }
}
