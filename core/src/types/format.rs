//! `FormatChecker<T>` mixin kinds: `IPv4`, `MAC`, `URI`, `CPUID`, `File`
//! (spec §4.E). Each is a `String`-shaped leaf whose `checkInstance` also
//! enforces a domain-specific format.

use super::common::Common;
use super::BasicType;
use crate::attributes::AttributeValue;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::path::Path;
use crate::range::Range;
use crate::value::{Object, Value};
use std::net::Ipv4Addr;
use std::str::FromStr;

fn body<'a>(common: &Common, v: &'a Value) -> Result<&'a Object> {
    v.as_object().ok_or_else(|| Error::SchemaShape {
        path: common.name.clone(),
        message: "type body must be an object".into(),
    })
}

/// `type: "ipv4"` — a dotted-quad address.
#[derive(Debug, Clone)]
pub struct Ipv4Type {
    common: Common,
}

impl Ipv4Type {
    /// A new ipv4 field named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { common: Common::new(name) }
    }
}

impl BasicType for Ipv4Type {
    fn common(&self) -> &Common {
        &self.common
    }
    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }
    fn type_name(&self) -> &'static str {
        "ipv4"
    }
    fn check_model(&self, v: &Value) -> Result<()> {
        body(&self.common, v)?;
        Ok(())
    }
    fn load_model(&mut self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?.clone();
        self.common.load_common(&obj)
    }
    fn check_instance(
        &self,
        path: &Path,
        v: &Value,
        _resolver: &dyn super::ModelResolver,
        diags: &mut Diagnostics,
    ) -> bool {
        let Some(s) = v.as_str() else {
            diags.push(path.to_string(), format!("expected string, found {}", v.kind()));
            return false;
        };
        if Ipv4Addr::from_str(s).is_ok() {
            true
        } else {
            diags.push(path.to_string(), format!("'{s}' is not a valid IPv4 address"));
            false
        }
    }
    fn expand_instance(&self, _v: &mut Value, _resolver: &dyn super::ModelResolver) {}
    fn explain(&self) -> String {
        format!("ipv4 {} (arity {})", self.common.name, self.common.arity.render())
    }
    fn clone_box(&self) -> Box<dyn BasicType> {
        Box::new(self.clone())
    }
}

/// `type: "mac"` — `hh:hh:hh:hh:hh:hh`.
#[derive(Debug, Clone)]
pub struct MacType {
    common: Common,
}

impl MacType {
    /// A new mac-address field named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { common: Common::new(name) }
    }
}

fn is_mac(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();
    parts.len() == 6 && parts.iter().all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
}

impl BasicType for MacType {
    fn common(&self) -> &Common {
        &self.common
    }
    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }
    fn type_name(&self) -> &'static str {
        "mac"
    }
    fn check_model(&self, v: &Value) -> Result<()> {
        body(&self.common, v)?;
        Ok(())
    }
    fn load_model(&mut self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?.clone();
        self.common.load_common(&obj)
    }
    fn check_instance(
        &self,
        path: &Path,
        v: &Value,
        _resolver: &dyn super::ModelResolver,
        diags: &mut Diagnostics,
    ) -> bool {
        let Some(s) = v.as_str() else {
            diags.push(path.to_string(), format!("expected string, found {}", v.kind()));
            return false;
        };
        if is_mac(s) {
            true
        } else {
            diags.push(path.to_string(), format!("'{s}' is not a valid MAC address"));
            false
        }
    }
    fn expand_instance(&self, _v: &mut Value, _resolver: &dyn super::ModelResolver) {}
    fn explain(&self) -> String {
        format!("mac {} (arity {})", self.common.name, self.common.arity.render())
    }
    fn clone_box(&self) -> Box<dyn BasicType> {
        Box::new(self.clone())
    }
}

/// `type: "uri"` — validated with `url::Url`'s parser; `schemes`, if given,
/// restricts the accepted scheme set.
#[derive(Debug, Clone)]
pub struct UriType {
    common: Common,
    schemes: Vec<String>,
}

impl UriType {
    /// A new uri field named `name`, accepting any scheme until loaded.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: Common::new(name),
            schemes: Vec::new(),
        }
    }
}

impl BasicType for UriType {
    fn common(&self) -> &Common {
        &self.common
    }
    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }
    fn type_name(&self) -> &'static str {
        "uri"
    }
    fn check_model(&self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?;
        if let Some(schemes) = obj.get("schemes") {
            schemes.as_array().ok_or_else(|| Error::AttributeParse {
                attribute: "schemes".into(),
                path: self.common.name.clone(),
                message: "schemes must be an array of strings".into(),
            })?;
        }
        Ok(())
    }
    fn load_model(&mut self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?.clone();
        self.common.load_common(&obj)?;
        if let Some(items) = obj.get("schemes").and_then(|v| v.as_array()) {
            self.schemes = items.iter().filter_map(|i| i.as_str().map(str::to_string)).collect();
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
        let Some(s) = v.as_str() else {
            diags.push(path.to_string(), format!("expected string, found {}", v.kind()));
            return false;
        };
        match url::Url::parse(s) {
            Ok(url) if self.schemes.is_empty() || self.schemes.iter().any(|sc| sc == url.scheme()) => true,
            Ok(url) => {
                diags.push(path.to_string(), format!("scheme '{}' is not permitted", url.scheme()));
                false
            }
            Err(e) => {
                diags.push(path.to_string(), format!("'{s}' is not a valid URI: {e}"));
                false
            }
        }
    }
    fn expand_instance(&self, _v: &mut Value, _resolver: &dyn super::ModelResolver) {}
    fn explain(&self) -> String {
        format!("uri {} (arity {})", self.common.name, self.common.arity.render())
    }
    fn clone_box(&self) -> Box<dyn BasicType> {
        Box::new(self.clone())
    }
}

/// `type: "cpuid"` — a core index: `-1` (any core) or `[0, n)` where `n` is
/// the host's available parallelism.
#[derive(Debug, Clone)]
pub struct CpuidType {
    common: Common,
}

impl CpuidType {
    /// A new cpuid field named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { common: Common::new(name) }
    }

    fn upper_bound() -> i64 {
        std::thread::available_parallelism()
            .map(|n| n.get() as i64)
            .unwrap_or(1)
    }
}

impl BasicType for CpuidType {
    fn common(&self) -> &Common {
        &self.common
    }
    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }
    fn type_name(&self) -> &'static str {
        "cpuid"
    }
    fn check_model(&self, v: &Value) -> Result<()> {
        body(&self.common, v)?;
        Ok(())
    }
    fn load_model(&mut self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?.clone();
        self.common.load_common(&obj)
    }
    fn check_instance(
        &self,
        path: &Path,
        v: &Value,
        _resolver: &dyn super::ModelResolver,
        diags: &mut Diagnostics,
    ) -> bool {
        let Some(n) = v.as_i64() else {
            diags.push(path.to_string(), format!("expected integer, found {}", v.kind()));
            return false;
        };
        let bound: Range<i64> = Range::closed(-1, Self::upper_bound() - 1);
        if bound.contains(n) {
            true
        } else {
            diags.push(path.to_string(), format!("cpu index {n} is outside [-1, {})", Self::upper_bound()));
            false
        }
    }
    fn expand_instance(&self, _v: &mut Value, _resolver: &dyn super::ModelResolver) {}
    fn explain(&self) -> String {
        format!("cpuid {} (arity {})", self.common.name, self.common.arity.render())
    }
    fn clone_box(&self) -> Box<dyn BasicType> {
        Box::new(self.clone())
    }
}

/// `mode` values a `file` field may demand of its instance value (spec §6
/// field-schema key `mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Must already exist and be readable.
    Read,
    /// Must already exist and be writable.
    ReadWrite,
    /// Must *not* already exist (the path is somewhere the consumer will
    /// create the file).
    New,
    /// No existence/writability constraint; purely a string leaf.
    Any,
}

impl FileMode {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "r" => Ok(FileMode::Read),
            "rw" => Ok(FileMode::ReadWrite),
            "new" => Ok(FileMode::New),
            "any" => Ok(FileMode::Any),
            other => Err(Error::AttributeParse {
                attribute: "mode".into(),
                path: String::new(),
                message: format!("unknown file mode '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FileMode::Read => "r",
            FileMode::ReadWrite => "rw",
            FileMode::New => "new",
            FileMode::Any => "any",
        };
        write!(f, "{s}")
    }
}

/// `type: "file"` — a filesystem path, checked against a `mode`
/// (`r|rw|new|any`) via `std::fs::metadata` existence/writability, not raw
/// POSIX permission bits (spec §6, supplemented from the original's intent
/// of a portable existence/writability check).
#[derive(Debug, Clone)]
pub struct FileType {
    common: Common,
    mode: FileMode,
}

impl FileType {
    /// A new file field named `name`, mode `any` until loaded.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: Common::new(name),
            mode: FileMode::Any,
        }
    }
}

impl BasicType for FileType {
    fn common(&self) -> &Common {
        &self.common
    }
    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }
    fn type_name(&self) -> &'static str {
        "file"
    }
    fn check_model(&self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?;
        if let Some(s) = obj.get("mode").and_then(|v| v.as_str()) {
            FileMode::parse(s)?;
        }
        Ok(())
    }
    fn load_model(&mut self, v: &Value) -> Result<()> {
        let obj = body(&self.common, v)?.clone();
        self.common.load_common(&obj)?;
        if let Some(s) = obj.get("mode").and_then(|v| v.as_str()) {
            self.mode = FileMode::parse(s)?;
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
        let Some(s) = v.as_str() else {
            diags.push(path.to_string(), format!("expected string, found {}", v.kind()));
            return false;
        };
        let exists = std::fs::metadata(s).is_ok();
        match self.mode {
            FileMode::Any => true,
            FileMode::New if exists => {
                diags.push(path.to_string(), format!("'{s}' already exists"));
                false
            }
            FileMode::New => true,
            FileMode::Read | FileMode::ReadWrite if !exists => {
                diags.push(path.to_string(), format!("'{s}' does not exist"));
                false
            }
            FileMode::ReadWrite => {
                let writable = std::fs::metadata(s)
                    .map(|m| !m.permissions().readonly())
                    .unwrap_or(false);
                if writable {
                    true
                } else {
                    diags.push(path.to_string(), format!("'{s}' is not writable"));
                    false
                }
            }
            FileMode::Read => true,
        }
    }
    fn expand_instance(&self, _v: &mut Value, _resolver: &dyn super::ModelResolver) {}
    fn explain(&self) -> String {
        format!(
            "file {} mode={} (arity {})",
            self.common.name,
            self.mode,
            self.common.arity.render()
        )
    }
    fn clone_box(&self) -> Box<dyn BasicType> {
        Box::new(self.clone())
    }
}
