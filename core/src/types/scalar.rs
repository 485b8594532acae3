//! Scalar `BasicType` kinds: `Boolean`, `Integer`, `Float`, `String`,
//! `Enum` (spec §4.E `RangedType<T>` / `EnumeratedType<T>` mixins).

use super::common::Common;
use super::BasicType;
use crate::attributes::{AttributeValue, DefaultAttribute, EitherAttribute, RangeAttribute};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::path::Path;
use crate::value::{Kind as ValueKind, Object, Value};

/// `type: "boolean"` — a plain true/false leaf.
#[derive(Debug, Clone)]
pub struct BooleanType {
    common: Common,
    default: DefaultAttribute,
}

impl BooleanType {
    /// A new boolean field named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: Common::new(name),
            default: DefaultAttribute::new(true),
        }
    }
}

impl BasicType for BooleanType {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn type_name(&self) -> &'static str {
        "boolean"
    }

    fn check_model(&self, v: &Value) -> Result<()> {
        let obj = v.as_object().ok_or_else(|| Error::SchemaShape {
            path: self.common.name.clone(),
            message: "type body must be an object".into(),
        })?;
        if let Some(d) = obj.get("default") {
            if !matches!(d, Value::Boolean(_)) {
                return Err(Error::AttributeParse {
                    attribute: "default".into(),
                    path: self.common.name.clone(),
                    message: "boolean default must be a bool".into(),
                });
            }
        }
        Ok(())
    }

    fn load_model(&mut self, v: &Value) -> Result<()> {
        let obj = v.as_object().ok_or_else(|| Error::SchemaShape {
            path: self.common.name.clone(),
            message: "type body must be an object".into(),
        })?;
        self.common.load_common(obj)?;
        if let Some(d) = obj.get("default") {
            self.default.load_model(d)?;
        }
        Ok(())
    }

    fn check_instance(
        &self,
        path: &Path,
        v: &Value,
        _resolver: &dyn super::ModelResolver,
        diags: &mut Diagnostics,
    ) -> bool {
        if matches!(v, Value::Boolean(_)) {
            true
        } else {
            diags.push(path.to_string(), format!("expected boolean, found {}", v.kind()));
            false
        }
    }

    fn expand_instance(&self, v: &mut Value, _resolver: &dyn super::ModelResolver) {
        if v.is_undefined() {
            if let Some(d) = &self.default.value {
                *v = d.clone();
            }
        }
    }

    fn explain(&self) -> String {
        format!("boolean {} (arity {})", self.common.name, self.common.arity.render())
    }

    fn clone_box(&self) -> Box<dyn BasicType> {
        Box::new(self.clone())
    }
}

/// A numeric `BasicType` over `i64` or `f64`, the `RangedType<T>` mixin
/// (spec §4.E: adds `range`, `default`).
#[derive(Debug, Clone)]
pub struct NumberType {
    common: Common,
    range: RangeAttribute,
    default: DefaultAttribute,
    value_kind: ValueKind,
}

impl NumberType {
    /// A new `integer` field named `name`.
    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            common: Common::new(name),
            range: RangeAttribute::int("range", true, true),
            default: DefaultAttribute::new(true),
            value_kind: ValueKind::Integer,
        }
    }

    /// A new `float` field named `name`.
    pub fn float(name: impl Into<String>) -> Self {
        Self {
            common: Common::new(name),
            range: RangeAttribute::float("range", true, true),
            default: DefaultAttribute::new(true),
            value_kind: ValueKind::Float,
        }
    }
}

impl BasicType for NumberType {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn type_name(&self) -> &'static str {
        match self.value_kind {
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            _ => unreachable!(),
        }
    }

    fn check_model(&self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?;
        if let Some(r) = obj.get("range") {
            self.range.check_model(r)?;
        }
        Ok(())
    }

    fn load_model(&mut self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?.clone();
        self.common.load_common(&obj)?;
        if let Some(r) = obj.get("range") {
            self.range.load_model(r)?;
        }
        if let Some(d) = obj.get("default") {
            self.default.load_model(d)?;
        }
        Ok(())
    }

    fn validate_model(&self, path: &Path, diags: &mut Diagnostics) -> bool {
        let mut ok = true;
        if let Some(d) = &self.default.value {
            let mut dummy = Diagnostics::new("default-in-range");
            if !self.range.validate(path, d, &mut dummy) {
                diags.push(path.to_string(), "default value is outside range".to_string());
                ok = false;
            }
        }
        ok
    }

    fn check_instance(
        &self,
        path: &Path,
        v: &Value,
        _resolver: &dyn super::ModelResolver,
        diags: &mut Diagnostics,
    ) -> bool {
        let kind_ok = match self.value_kind {
            ValueKind::Integer => v.as_i64().is_some(),
            ValueKind::Float => v.as_f64().is_some(),
            _ => false,
        };
        if !kind_ok {
            diags.push(path.to_string(), format!("expected {}, found {}", self.type_name(), v.kind()));
            return false;
        }
        self.range.validate(path, v, diags)
    }

    fn expand_instance(&self, v: &mut Value, _resolver: &dyn super::ModelResolver) {
        if v.is_undefined() {
            if let Some(d) = &self.default.value {
                *v = d.clone();
            }
        }
    }

    fn explain(&self) -> String {
        format!(
            "{} {} range={} (arity {})",
            self.type_name(),
            self.common.name,
            self.range.render(),
            self.common.arity.render()
        )
    }

    fn clone_box(&self) -> Box<dyn BasicType> {
        Box::new(self.clone())
    }
}

/// `type: "string"` — text, optionally restricted to a fixed `either`-set
/// or a `length` range over its character count.
#[derive(Debug, Clone)]
pub struct StringType {
    common: Common,
    either: Option<EitherAttribute>,
    length: Option<RangeAttribute>,
    default: DefaultAttribute,
}

impl StringType {
    /// A new string field named `name`, unconstrained until loaded.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: Common::new(name),
            either: None,
            length: None,
            default: DefaultAttribute::new(true),
        }
    }
}

impl BasicType for StringType {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn type_name(&self) -> &'static str {
        "string"
    }

    fn check_model(&self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?;
        if let Some(e) = obj.get("either") {
            EitherAttribute::new(true, true).check_model(e)?;
        }
        if let Some(l) = obj.get("length") {
            RangeAttribute::int("length", true, true).check_model(l)?;
        }
        Ok(())
    }

    fn load_model(&mut self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?.clone();
        self.common.load_common(&obj)?;
        if let Some(e) = obj.get("either") {
            let mut attr = EitherAttribute::new(true, true);
            attr.load_model(e)?;
            self.either = Some(attr);
        }
        if let Some(l) = obj.get("length") {
            let mut attr = RangeAttribute::int("length", true, true);
            attr.load_model(l)?;
            self.length = Some(attr);
        }
        if let Some(d) = obj.get("default") {
            self.default.load_model(d)?;
        }
        Ok(())
    }

    fn check_instance(
        &self,
        path: &Path,
        v: &Value,
        _resolver: &dyn super::ModelResolver,
        diags: &mut Diagnostics,
    ) -> bool {
        let Value::String(s) = v else {
            diags.push(path.to_string(), format!("expected string, found {}", v.kind()));
            return false;
        };
        let mut ok = true;
        if let Some(e) = &self.either {
            ok &= e.validate(path, v, diags);
        }
        if let Some(l) = &self.length {
            ok &= l.validate(path, &Value::Integer(s.chars().count() as i64), diags);
        }
        ok
    }

    fn expand_instance(&self, v: &mut Value, _resolver: &dyn super::ModelResolver) {
        if v.is_undefined() {
            if let Some(d) = &self.default.value {
                *v = d.clone();
            }
        }
    }

    fn explain(&self) -> String {
        let mut s = format!("string {} (arity {})", self.common.name, self.common.arity.render());
        if let Some(e) = &self.either {
            s.push_str(&format!(" either=[{}]", e.render()));
        }
        s
    }

    fn clone_box(&self) -> Box<dyn BasicType> {
        Box::new(self.clone())
    }
}

/// `type: "enum"` — the `EnumeratedType<T>` mixin standing alone: a
/// non-empty, fixed set of scalar values with an optional default.
#[derive(Debug, Clone)]
pub struct EnumType {
    common: Common,
    either: EitherAttribute,
    default: DefaultAttribute,
}

impl EnumType {
    /// A new, not-yet-loaded enum field named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: Common::new(name),
            either: EitherAttribute::new(false, true),
            default: DefaultAttribute::new(true),
        }
    }
}

impl BasicType for EnumType {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn type_name(&self) -> &'static str {
        "enum"
    }

    fn check_model(&self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?;
        let either = obj.get("either").ok_or_else(|| Error::AttributeParse {
            attribute: "either".into(),
            path: self.common.name.clone(),
            message: "enum type requires an 'either' set".into(),
        })?;
        self.either.check_model(either)
    }

    fn load_model(&mut self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?.clone();
        self.common.load_common(&obj)?;
        self.either.load_model(obj.get("either").unwrap())?;
        if let Some(d) = obj.get("default") {
            self.default.load_model(d)?;
        }
        Ok(())
    }

    fn validate_model(&self, path: &Path, diags: &mut Diagnostics) -> bool {
        if self.either.values.is_empty() {
            diags.push(path.to_string(), "enum either-set must not be empty".to_string());
            return false;
        }
        true
    }

    fn check_instance(
        &self,
        path: &Path,
        v: &Value,
        _resolver: &dyn super::ModelResolver,
        diags: &mut Diagnostics,
    ) -> bool {
        self.either.validate(path, v, diags)
    }

    fn expand_instance(&self, v: &mut Value, _resolver: &dyn super::ModelResolver) {
        if v.is_undefined() {
            if let Some(d) = &self.default.value {
                *v = d.clone();
            }
        }
    }

    fn explain(&self) -> String {
        format!(
            "enum {} either=[{}] (arity {})",
            self.common.name,
            self.either.render(),
            self.common.arity.render()
        )
    }

    fn clone_box(&self) -> Box<dyn BasicType> {
        Box::new(self.clone())
    }
}

fn body<'a>(common: &Common, v: &'a Value) -> Result<&'a Object> {
    v.as_object().ok_or_else(|| Error::SchemaShape {
        path: common.name.clone(),
        message: "type body must be an object".into(),
    })
}
