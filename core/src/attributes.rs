//! Named, typed, optional/overridable schema metadata (spec §3, §4.D).
//!
//! Each `BasicType` owns a *registry* mapping attribute name to its
//! definition (required? overridable?); on model load it instantiates the
//! attribute, feeds it `checkModel` then `loadModel`, and at instance time
//! calls `validate`. `merge`/`override_with` implement attribute
//! inheritance when a subtype's registry entry collides with a supertype's.

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::path::Path;
use crate::range::Range;
use crate::value::Value;
use crate::Arity;
use std::fmt;

/// A scalar attribute payload (the base type that `either`/`default` range
/// over), independent of the owning `BasicType`'s own kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Float scalar.
    Float(f64),
    /// String scalar.
    Str(String),
}

impl Scalar {
    /// Convert a leaf `Value` to a `Scalar`, if it is one.
    pub fn from_value(v: &Value) -> Option<Scalar> {
        match v {
            Value::Boolean(b) => Some(Scalar::Bool(*b)),
            Value::Integer(n) => Some(Scalar::Int(*n)),
            Value::Float(n) => Some(Scalar::Float(*n)),
            Value::String(s) => Some(Scalar::Str(s.clone())),
            _ => None,
        }
    }

    /// Render back to a `Value`.
    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Bool(b) => Value::Boolean(*b),
            Scalar::Int(n) => Value::Integer(*n),
            Scalar::Float(n) => Value::Float(*n),
            Scalar::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Common metadata every attribute carries.
#[derive(Debug, Clone)]
pub struct AttributeMeta {
    /// Attribute key in the field-schema object (`"arity"`, `"range"`, …).
    pub name: String,
    /// Whether the owning type may omit this attribute.
    pub optional: bool,
    /// Whether a subtype may replace this attribute's value outright.
    pub overridable: bool,
}

impl AttributeMeta {
    /// Construct attribute metadata.
    pub fn new(name: impl Into<String>, optional: bool, overridable: bool) -> Self {
        Self {
            name: name.into(),
            optional,
            overridable,
        }
    }
}

/// A piece of schema metadata attached to a `BasicType`.
pub trait AttributeValue: fmt::Debug {
    /// Shared metadata (name, optional?, overridable?).
    fn meta(&self) -> &AttributeMeta;

    /// Does `v` have the shape this attribute expects (spec §4.D)?
    fn check_model(&self, v: &Value) -> Result<()>;

    /// Parse and store `v` (only called after `check_model` succeeded).
    fn load_model(&mut self, v: &Value) -> Result<()>;

    /// Combine with a same-named attribute inherited from a supertype.
    /// Returns `false` if the combined result is inconsistent (e.g. an
    /// empty arity/range intersection).
    fn merge(&mut self, other: &dyn AttributeValue) -> bool;

    /// Replace this attribute's value with `other`'s. Fails if `self` is
    /// not `overridable`.
    fn override_with(&mut self, other: &dyn AttributeValue) -> bool {
        if !self.meta().overridable {
            return false;
        }
        self.merge_override(other)
    }

    /// Hook used by the default `override_with` to actually copy state;
    /// implementors with no internal state beyond what `merge` handles may
    /// reuse `merge`.
    fn merge_override(&mut self, other: &dyn AttributeValue) -> bool;

    /// Confirm an instance value obeys this attribute.
    fn validate(&self, path: &Path, v: &Value, diags: &mut Diagnostics) -> bool;

    /// Render back to the schema-language string form.
    fn render(&self) -> String;

    /// Deep-clone behind a trait object.
    fn clone_box(&self) -> Box<dyn AttributeValue>;
}

impl Clone for Box<dyn AttributeValue> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// `arity` — field cardinality.
#[derive(Debug, Clone)]
pub struct ArityAttribute {
    meta: AttributeMeta,
    /// The parsed arity; `Arity::exactly(1)` until loaded.
    pub value: Arity,
}

impl ArityAttribute {
    /// Construct with the default arity `1`.
    pub fn new(optional: bool, overridable: bool) -> Self {
        Self {
            meta: AttributeMeta::new("arity", optional, overridable),
            value: Arity::exactly(1),
        }
    }
}

impl AttributeValue for ArityAttribute {
    fn meta(&self) -> &AttributeMeta {
        &self.meta
    }

    fn check_model(&self, v: &Value) -> Result<()> {
        let s = v.as_str().ok_or_else(|| Error::AttributeParse {
            attribute: "arity".into(),
            path: String::new(),
            message: "expected a string".into(),
        })?;
        Arity::parse(s)?;
        Ok(())
    }

    fn load_model(&mut self, v: &Value) -> Result<()> {
        self.value = Arity::parse(v.as_str().unwrap_or_default())?;
        Ok(())
    }

    fn merge(&mut self, other: &dyn AttributeValue) -> bool {
        let Some(o) = (other as &dyn std::any::Any).downcast_ref::<ArityAttribute>() else {
            return false;
        };
        let combined = self.value.intersect(&o.value);
        if !combined.is_valid() {
            return false;
        }
        self.value = combined;
        true
    }

    fn merge_override(&mut self, other: &dyn AttributeValue) -> bool {
        let Some(o) = (other as &dyn std::any::Any).downcast_ref::<ArityAttribute>() else {
            return false;
        };
        self.value = o.value;
        true
    }

    fn validate(&self, path: &Path, v: &Value, diags: &mut Diagnostics) -> bool {
        let size = match v {
            Value::Array(a) => a.len(),
            Value::Undefined => 0,
            _ => 1,
        };
        if self.value.check(size) {
            true
        } else {
            diags.push(
                path.to_string(),
                format!("arity violation: expected {}, found {size}", self.value),
            );
            false
        }
    }

    fn render(&self) -> String {
        self.value.to_string()
    }

    fn clone_box(&self) -> Box<dyn AttributeValue> {
        Box::new(self.clone())
    }
}

/// `range` — numeric interval, over integers (the common case) or floats.
#[derive(Debug, Clone)]
pub enum RangeAttribute {
    /// Range over a 64-bit integer.
    Int {
        /// Shared metadata.
        meta: AttributeMeta,
        /// The parsed interval.
        value: Range<i64>,
    },
    /// Range over a 64-bit float.
    Float {
        /// Shared metadata.
        meta: AttributeMeta,
        /// The parsed interval.
        value: Range<f64>,
    },
}

impl RangeAttribute {
    /// An integer range attribute named `name`, initially unbounded.
    pub fn int(name: impl Into<String>, optional: bool, overridable: bool) -> Self {
        RangeAttribute::Int {
            meta: AttributeMeta::new(name, optional, overridable),
            value: Range::unbounded(),
        }
    }

    /// A float range attribute named `name`, initially unbounded.
    pub fn float(name: impl Into<String>, optional: bool, overridable: bool) -> Self {
        RangeAttribute::Float {
            meta: AttributeMeta::new(name, optional, overridable),
            value: Range::unbounded(),
        }
    }
}

impl AttributeValue for RangeAttribute {
    fn meta(&self) -> &AttributeMeta {
        match self {
            RangeAttribute::Int { meta, .. } | RangeAttribute::Float { meta, .. } => meta,
        }
    }

    fn check_model(&self, v: &Value) -> Result<()> {
        let s = v.as_str().ok_or_else(|| Error::AttributeParse {
            attribute: self.meta().name.clone(),
            path: String::new(),
            message: "expected a string".into(),
        })?;
        match self {
            RangeAttribute::Int { .. } => {
                Range::<i64>::parse(s)?;
            }
            RangeAttribute::Float { .. } => {
                Range::<f64>::parse(s)?;
            }
        }
        Ok(())
    }

    fn load_model(&mut self, v: &Value) -> Result<()> {
        let s = v.as_str().unwrap_or_default();
        match self {
            RangeAttribute::Int { value, .. } => *value = Range::<i64>::parse(s)?,
            RangeAttribute::Float { value, .. } => *value = Range::<f64>::parse(s)?,
        }
        Ok(())
    }

    fn merge(&mut self, other: &dyn AttributeValue) -> bool {
        let Some(o) = (other as &dyn std::any::Any).downcast_ref::<RangeAttribute>() else {
            return false;
        };
        match (self, o) {
            (RangeAttribute::Int { value, .. }, RangeAttribute::Int { value: ov, .. }) => {
                let combined = value.intersect(ov);
                if !combined.is_valid() {
                    return false;
                }
                *value = combined;
                true
            }
            (RangeAttribute::Float { value, .. }, RangeAttribute::Float { value: ov, .. }) => {
                let combined = value.intersect(ov);
                if !combined.is_valid() {
                    return false;
                }
                *value = combined;
                true
            }
            _ => false,
        }
    }

    fn merge_override(&mut self, other: &dyn AttributeValue) -> bool {
        let Some(o) = (other as &dyn std::any::Any).downcast_ref::<RangeAttribute>() else {
            return false;
        };
        match (self, o) {
            (RangeAttribute::Int { value, .. }, RangeAttribute::Int { value: ov, .. }) => {
                *value = *ov;
                true
            }
            (RangeAttribute::Float { value, .. }, RangeAttribute::Float { value: ov, .. }) => {
                *value = *ov;
                true
            }
            _ => false,
        }
    }

    fn validate(&self, path: &Path, v: &Value, diags: &mut Diagnostics) -> bool {
        let in_range = match self {
            RangeAttribute::Int { value, .. } => v.as_i64().map(|n| value.contains(n)),
            RangeAttribute::Float { value, .. } => v.as_f64().map(|n| value.contains(n)),
        };
        match in_range {
            Some(true) => true,
            Some(false) => {
                diags.push(path.to_string(), format!("value out of range {}", self.render()));
                false
            }
            None => true, // non-numeric leaves are for checkInstance's type check to reject
        }
    }

    fn render(&self) -> String {
        match self {
            RangeAttribute::Int { value, .. } => value.to_string(),
            RangeAttribute::Float { value, .. } => value.to_string(),
        }
    }

    fn clone_box(&self) -> Box<dyn AttributeValue> {
        Box::new(self.clone())
    }
}

/// `either` — the enumeration of legal discrete values.
#[derive(Debug, Clone)]
pub struct EitherAttribute {
    meta: AttributeMeta,
    /// Accepted values; empty means "not yet loaded", which fails
    /// `validateModel` (spec §8 boundary cases: "either-set empty").
    pub values: Vec<Scalar>,
}

impl EitherAttribute {
    /// A new, empty `either` attribute.
    pub fn new(optional: bool, overridable: bool) -> Self {
        Self {
            meta: AttributeMeta::new("either", optional, overridable),
            values: Vec::new(),
        }
    }
}

impl AttributeValue for EitherAttribute {
    fn meta(&self) -> &AttributeMeta {
        &self.meta
    }

    fn check_model(&self, v: &Value) -> Result<()> {
        let items = v.as_array().ok_or_else(|| Error::AttributeParse {
            attribute: "either".into(),
            path: String::new(),
            message: "expected an array".into(),
        })?;
        if items.is_empty() {
            return Err(Error::AttributeParse {
                attribute: "either".into(),
                path: String::new(),
                message: "either-set must not be empty".into(),
            });
        }
        for item in items {
            if Scalar::from_value(item).is_none() {
                return Err(Error::AttributeParse {
                    attribute: "either".into(),
                    path: String::new(),
                    message: "either values must be scalars".into(),
                });
            }
        }
        Ok(())
    }

    fn load_model(&mut self, v: &Value) -> Result<()> {
        self.values = v
            .as_array()
            .unwrap_or(&[])
            .iter()
            .filter_map(Scalar::from_value)
            .collect();
        Ok(())
    }

    fn merge(&mut self, other: &dyn AttributeValue) -> bool {
        let Some(o) = (other as &dyn std::any::Any).downcast_ref::<EitherAttribute>() else {
            return false;
        };
        self.values.retain(|v| o.values.contains(v));
        !self.values.is_empty()
    }

    fn merge_override(&mut self, other: &dyn AttributeValue) -> bool {
        let Some(o) = (other as &dyn std::any::Any).downcast_ref::<EitherAttribute>() else {
            return false;
        };
        self.values = o.values.clone();
        true
    }

    fn validate(&self, path: &Path, v: &Value, diags: &mut Diagnostics) -> bool {
        let Some(scalar) = Scalar::from_value(v) else {
            return true; // type-check handles non-scalars
        };
        if self.values.contains(&scalar) {
            true
        } else {
            diags.push(path.to_string(), format!("'{scalar}' is not one of the permitted values"));
            false
        }
    }

    fn render(&self) -> String {
        self.values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn clone_box(&self) -> Box<dyn AttributeValue> {
        Box::new(self.clone())
    }
}

/// `default` — value(s) inserted by `expandInstance` when the field is
/// absent.
#[derive(Debug, Clone)]
pub struct DefaultAttribute {
    meta: AttributeMeta,
    /// The default, if any was declared.
    pub value: Option<Value>,
}

impl DefaultAttribute {
    /// A new, unset `default` attribute.
    pub fn new(overridable: bool) -> Self {
        Self {
            meta: AttributeMeta::new("default", true, overridable),
            value: None,
        }
    }
}

impl AttributeValue for DefaultAttribute {
    fn meta(&self) -> &AttributeMeta {
        &self.meta
    }

    fn check_model(&self, v: &Value) -> Result<()> {
        match v {
            Value::Boolean(_) | Value::Integer(_) | Value::Float(_) | Value::String(_) => Ok(()),
            Value::Array(items) => {
                if items
                    .iter()
                    .all(|i| Scalar::from_value(i).is_some())
                {
                    Ok(())
                } else {
                    Err(Error::AttributeParse {
                        attribute: "default".into(),
                        path: String::new(),
                        message: "default array must hold scalars".into(),
                    })
                }
            }
            _ => Err(Error::AttributeParse {
                attribute: "default".into(),
                path: String::new(),
                message: "default must be a scalar or array of scalars".into(),
            }),
        }
    }

    fn load_model(&mut self, v: &Value) -> Result<()> {
        self.value = Some(v.clone());
        Ok(())
    }

    fn merge(&mut self, other: &dyn AttributeValue) -> bool {
        // The subtype's default wins only if overridable; otherwise the
        // supertype's default (if any) is kept (spec §4.D).
        let Some(o) = (other as &dyn std::any::Any).downcast_ref::<DefaultAttribute>() else {
            return false;
        };
        if self.value.is_none() {
            self.value = o.value.clone();
        }
        true
    }

    fn merge_override(&mut self, other: &dyn AttributeValue) -> bool {
        let Some(o) = (other as &dyn std::any::Any).downcast_ref::<DefaultAttribute>() else {
            return false;
        };
        self.value = o.value.clone();
        true
    }

    fn validate(&self, _path: &Path, _v: &Value, _diags: &mut Diagnostics) -> bool {
        true
    }

    fn render(&self) -> String {
        match &self.value {
            Some(v) => format!("{v:?}"),
            None => String::new(),
        }
    }

    fn clone_box(&self) -> Box<dyn AttributeValue> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn arity_attribute_round_trip() {
        let mut a = ArityAttribute::new(true, true);
        a.load_model(&Value::String("1..3".into())).unwrap();
        assert_eq!(a.render(), "1..3");
        let mut diags = Diagnostics::new("t");
        assert!(a.validate(&Path::global(), &Value::Array(vec![Value::Integer(1)]), &mut diags));
        assert!(!a.validate(
            &Path::global(),
            &Value::Array(vec![Value::Integer(1); 4]),
            &mut diags
        ));
    }

    #[test]
    fn arity_merge_tightens_and_can_fail() {
        let mut a = ArityAttribute::new(true, true);
        a.load_model(&Value::String("0..5".into())).unwrap();
        let mut b = ArityAttribute::new(true, true);
        b.load_model(&Value::String("2..10".into())).unwrap();
        assert!(a.merge(&b));
        assert_eq!(a.value, Arity::between(2, 5));

        let mut c = ArityAttribute::new(true, true);
        c.load_model(&Value::String("1".into())).unwrap();
        let mut d = ArityAttribute::new(true, true);
        d.load_model(&Value::String("2".into())).unwrap();
        assert!(!c.merge(&d));
    }

    #[test]
    fn either_rejects_empty_set() {
        let a = EitherAttribute::new(false, true);
        assert!(a.check_model(&Value::Array(vec![])).is_err());
    }

    #[test]
    fn either_validates_membership() {
        let mut a = EitherAttribute::new(false, true);
        a.load_model(&Value::Array(vec![
            Value::String("r".into()),
            Value::String("w".into()),
        ]))
        .unwrap();
        let mut diags = Diagnostics::new("t");
        assert!(a.validate(&Path::global(), &Value::String("r".into()), &mut diags));
        assert!(!a.validate(&Path::global(), &Value::String("x".into()), &mut diags));
    }

    #[test]
    fn default_not_overridable_keeps_parent_value() {
        let mut child = DefaultAttribute::new(false);
        let mut parent = DefaultAttribute::new(false);
        parent.value = Some(Value::Integer(7));
        assert!(child.merge(&parent));
        assert_eq!(child.value, Some(Value::Integer(7)));
    }
}
