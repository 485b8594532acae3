//! The generic dynamic value tree (spec §3, §4.A).
//!
//! Per the REDESIGN FLAGS ("Parent back-pointers"), this tree carries no
//! back-pointer from child to parent: a `Value` is a plain owned recursive
//! enum, and a node's path is reconstructed lazily while walking down from
//! the root (`walk`), never persisted. This sidesteps the aliasing that a
//! raw back-pointer would require in Rust.

use crate::error::{Error, Result};
use crate::path::{Item, Path};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The type tag of a `Value`, used by the `Checker` and by attribute
/// `checkModel`/`checkInstance` implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// Absent / not-yet-set.
    Undefined,
    /// `true`/`false`.
    Boolean,
    /// 64-bit signed integer (spec's open question: 64-bit throughout).
    Integer,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    String,
    /// Ordered sequence of values.
    Array,
    /// Ordered, duplicate-free map of string keys to values.
    Object,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Undefined => "undefined",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        };
        write!(f, "{s}")
    }
}

/// A node in the generic configuration value tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value — distinct from any present scalar.
    Undefined,
    /// Boolean leaf.
    Boolean(bool),
    /// Integer leaf.
    Integer(i64),
    /// Float leaf.
    Float(f64),
    /// String leaf.
    String(String),
    /// Array of children, insertion order preserved.
    Array(Vec<Value>),
    /// Object of children, insertion order preserved, O(1) key lookup.
    Object(Object),
}

/// An ordered, duplicate-rejecting-on-parse map of string keys to `Value`s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object {
    entries: IndexMap<String, Value>,
}

impl Object {
    /// An empty object.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// True if `key` is present.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The value at `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Mutable access to the value at `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Insert or replace the value at `key` (general API: "duplicate puts
    /// replace", spec §3).
    pub fn put(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Insert a freshly-parsed key, failing if it is already present
    /// ("duplicate keys on parse are rejected", spec §3).
    pub fn insert_unique(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(Error::SchemaShape {
                path: key.clone(),
                message: format!("duplicate key '{key}'"),
            });
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Remove the value at `key`, if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Value {
    /// The type tag of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Undefined => Kind::Undefined,
            Value::Boolean(_) => Kind::Boolean,
            Value::Integer(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    /// True if this is `Value::Undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Boolean introspection.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer introspection.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Float introspection (integers widen).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// String introspection.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Array introspection.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a.as_slice()),
            _ => None,
        }
    }

    /// Mutable array introspection.
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Object introspection.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Mutable object introspection.
    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Walk `path` from this value, treating `self` as the node the path's
    /// anchor (`$`/`.`) resolves to. Wildcards (`Item::Any`) fan out to
    /// every matching descendant, so the result can hold more than one
    /// entry. Each result pairs the fully concrete `Path` reached with the
    /// descendant `Value` found there.
    pub fn walk<'a>(&'a self, path: &Path) -> Vec<(Path, &'a Value)> {
        let items = path.items();
        let anchor = items.first().cloned();
        let mut results = self.walk_steps(&items[1.min(items.len())..]);
        for (steps, _) in results.iter_mut() {
            if let Some(a) = &anchor {
                steps.insert(0, a.clone());
            }
        }
        results
            .into_iter()
            .map(|(steps, v)| (Path::from_items(steps), v))
            .collect()
    }

    fn walk_steps<'a>(&'a self, steps: &[Item]) -> Vec<(Vec<Item>, &'a Value)> {
        let Some((head, rest)) = steps.split_first() else {
            return vec![(Vec::new(), self)];
        };
        match head {
            Item::Global | Item::Local => self.walk_steps(rest),
            Item::Named(name) => {
                let Value::Object(o) = self else {
                    return Vec::new();
                };
                let Some(child) = o.get(name) else {
                    return Vec::new();
                };
                prefix_all(head.clone(), child.walk_steps(rest))
            }
            Item::Indexed(idx) => {
                let Value::Array(items) = self else {
                    return Vec::new();
                };
                let Some(child) = items.get(*idx) else {
                    return Vec::new();
                };
                prefix_all(head.clone(), child.walk_steps(rest))
            }
            Item::Any => match self {
                Value::Object(o) => o
                    .iter()
                    .flat_map(|(k, v)| {
                        prefix_all(Item::Named(k.to_string()), v.walk_steps(rest))
                    })
                    .collect(),
                Value::Array(items) => items
                    .iter()
                    .enumerate()
                    .flat_map(|(i, v)| prefix_all(Item::Indexed(i), v.walk_steps(rest)))
                    .collect(),
                _ => Vec::new(),
            },
        }
    }
}

impl Value {
    /// Mutable counterpart to `walk`, for the single concrete (non-`Any`)
    /// path a hook targets — used by `resolveInstance`'s hook application
    /// (spec §4.H), which needs to replace a leaf in place. Returns `None`
    /// if any step is a wildcard or doesn't resolve.
    pub fn get_mut_at(&mut self, path: &Path) -> Option<&mut Value> {
        let items = path.items();
        self.get_mut_steps(&items[1.min(items.len())..])
    }

    fn get_mut_steps(&mut self, steps: &[Item]) -> Option<&mut Value> {
        let Some((head, rest)) = steps.split_first() else {
            return Some(self);
        };
        match head {
            Item::Global | Item::Local => self.get_mut_steps(rest),
            Item::Named(name) => {
                let Value::Object(o) = self else {
                    return None;
                };
                o.get_mut(name)?.get_mut_steps(rest)
            }
            Item::Indexed(idx) => {
                let Value::Array(items) = self else {
                    return None;
                };
                items.get_mut(*idx)?.get_mut_steps(rest)
            }
            Item::Any => None,
        }
    }
}

fn prefix_all<'a>(item: Item, rest: Vec<(Vec<Item>, &'a Value)>) -> Vec<(Vec<Item>, &'a Value)> {
    rest.into_iter()
        .map(|(mut steps, v)| {
            steps.insert(0, item.clone());
            (steps, v)
        })
        .collect()
}

impl Path {
    /// Build a path directly from a step list (used by `Value::walk`).
    pub fn from_items(items: Vec<Item>) -> Path {
        let mut p = Path::empty();
        for item in items {
            p = p.push(item);
        }
        p
    }
}

/// The accepted shape of one object key, used by `Checker`.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Value kinds accepted at this key.
    pub types: Vec<Kind>,
    /// Whether the key may be absent.
    pub optional: bool,
}

impl Pattern {
    /// A required key accepting exactly one kind.
    pub fn required(kind: Kind) -> Self {
        Self {
            types: vec![kind],
            optional: false,
        }
    }

    /// An optional key accepting exactly one kind.
    pub fn optional(kind: Kind) -> Self {
        Self {
            types: vec![kind],
            optional: true,
        }
    }

    /// A key accepting any of `kinds`.
    pub fn any_of(kinds: Vec<Kind>, optional: bool) -> Self {
        Self {
            types: kinds,
            optional,
        }
    }
}

/// A flat object schema: key → accepted shape. Mirrors spec §4.A's
/// `Schema = mapping from key -> Pattern`.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    patterns: IndexMap<String, Pattern>,
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self {
        Self {
            patterns: IndexMap::new(),
        }
    }

    /// Register the accepted shape for `key`.
    pub fn field(mut self, key: impl Into<String>, pattern: Pattern) -> Self {
        self.patterns.insert(key.into(), pattern);
        self
    }
}

/// Validates an `Object` against a `Schema`, accumulating every violation
/// (spec §4.A).
pub struct Checker<'a> {
    header: &'a str,
}

impl<'a> Checker<'a> {
    /// Create a checker tagged with `header` (used in diagnostic context).
    pub fn new(header: &'a str) -> Self {
        Self { header }
    }

    /// Check `obj`, located at `path`, against `schema`. Returns `true` iff
    /// no violation was recorded.
    pub fn check(
        &self,
        path: &Path,
        schema: &Schema,
        obj: &Object,
        diags: &mut crate::diagnostics::Diagnostics,
    ) -> bool {
        let mut ok = true;
        for (key, value) in obj.iter() {
            match schema.patterns.get(key) {
                None => {
                    diags.push(
                        format!("{path}.{key}"),
                        format!("{}: unknown key '{key}'", self.header),
                    );
                    ok = false;
                }
                Some(pattern) => {
                    if !pattern.types.contains(&value.kind()) {
                        let expected: Vec<String> =
                            pattern.types.iter().map(|k| k.to_string()).collect();
                        diags.push(
                            format!("{path}.{key}"),
                            format!(
                                "{}: expected one of [{}], found {}",
                                self.header,
                                expected.join(", "),
                                value.kind()
                            ),
                        );
                        ok = false;
                    }
                }
            }
        }
        for (key, pattern) in schema.patterns.iter() {
            if !pattern.optional && !obj.has(key) {
                diags.push(
                    format!("{path}.{key}"),
                    format!("{}: required key '{key}' missing", self.header),
                );
                ok = false;
            }
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;

    fn sample() -> Value {
        let mut inner = Object::new();
        inner.put("c", Value::Integer(3));
        let mut obj = Object::new();
        obj.put("a", Value::Integer(1));
        obj.put(
            "b",
            Value::Array(vec![Value::Integer(10), Value::Integer(20)]),
        );
        obj.put("nested", Value::Object(inner));
        Value::Object(obj)
    }

    #[test]
    fn walk_named_and_indexed() {
        let v = sample();
        let path = Path::parse("$.nested.c").unwrap();
        let hits = v.walk(&path);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1.as_i64(), Some(3));
        assert_eq!(hits[0].0, path);

        let path = Path::parse("$.b[1]").unwrap();
        let hits = v.walk(&path);
        assert_eq!(hits[0].1.as_i64(), Some(20));
    }

    #[test]
    fn walk_wildcard_fans_out() {
        let v = sample();
        let path = Path::parse("$.b[*]").unwrap();
        let hits = v.walk(&path);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].1.as_i64(), Some(10));
        assert_eq!(hits[1].1.as_i64(), Some(20));
    }

    #[test]
    fn walk_missing_path_is_empty() {
        let v = sample();
        let path = Path::parse("$.missing.x").unwrap();
        assert!(v.walk(&path).is_empty());
    }

    #[test]
    fn checker_flags_unknown_and_missing_keys() {
        let schema = Schema::new()
            .field("a", Pattern::required(Kind::Integer))
            .field("b", Pattern::optional(Kind::String));
        let mut obj = Object::new();
        obj.put("b", Value::String("x".into()));
        obj.put("z", Value::Boolean(true));

        let mut diags = Diagnostics::new("test");
        let checker = Checker::new("test");
        let ok = checker.check(&Path::global(), &schema, &obj, &mut diags);
        assert!(!ok);
        assert_eq!(diags.entries().len(), 2); // missing 'a', unknown 'z'
    }

    #[test]
    fn insert_unique_rejects_duplicates() {
        let mut obj = Object::new();
        obj.insert_unique("a", Value::Integer(1)).unwrap();
        assert!(obj.insert_unique("a", Value::Integer(2)).is_err());
    }
}
