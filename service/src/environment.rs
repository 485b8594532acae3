//! `Environment` — replaces the source's global `Master` registry (spec §5,
//! REDESIGN FLAGS "Global `Master` singleton"). Owns a model search path
//! list and a cache of already-loaded models, and implements
//! `ace_core::types::ModelResolver` so `Class`/`Selector` fields can recurse
//! into their included models without any process-wide state.

use ace_core::model::Model;
use ace_core::types::ModelResolver;
use ace_core::Diagnostics;
use indexmap::IndexMap;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Model search paths plus a cache of already-loaded, already-validated
/// models, keyed by the file they were loaded from. A second index maps the
/// model's own `name` (as referenced by `include`/`model` keys) to that
/// file, since those references are name-based, not path-based.
pub struct Environment {
    search_paths: Vec<PathBuf>,
    by_path: IndexMap<PathBuf, Arc<Model>>,
    by_name: IndexMap<String, PathBuf>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// An environment with no search paths configured yet.
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
            by_path: IndexMap::new(),
            by_name: IndexMap::new(),
        }
    }

    /// An environment that looks for named models under `paths`, in order.
    pub fn with_search_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut env = Self::new();
        env.search_paths = paths.into_iter().collect();
        env
    }

    /// Append another directory to the search path list.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        for dir in &self.search_paths {
            let candidate = dir.join(format!("{name}.json"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    /// Load (or return the cached copy of) the model named `name`: locate
    /// its file on the search path, parse it with the reference JSON
    /// adapter, flatten and validate it, then cache it under both its file
    /// path and its own declared `name`. Recursively loads every model it
    /// `include`s or references via `Class`/`Selector` fields.
    pub fn load_model(&mut self, name: &str) -> Result<Arc<Model>> {
        if let Some(path) = self.by_name.get(name) {
            if let Some(model) = self.by_path.get(path) {
                return Ok(model.clone());
            }
        }

        let path = self.locate(name).ok_or_else(|| Error::ModelNotFound {
            name: name.to_string(),
            search_paths: self.search_paths.clone(),
        })?;
        self.load_model_file(&path, name)
    }

    fn load_model_file(&mut self, path: &FsPath, default_name: &str) -> Result<Arc<Model>> {
        if let Some(model) = self.by_path.get(path) {
            return Ok(model.clone());
        }

        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: serde_json::Value = serde_json::from_str(&source).map_err(|e| {
            Error::Model(ace_core::Error::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;
        let value = ace_core::adapter::from_serde_json(&parsed);
        let mut model = Model::from_value(default_name, &value)?;
        model.flatten_model();

        let mut diags = Diagnostics::new(model.name.clone());
        if !model.validate_model(&mut diags) {
            return Err(Error::InvalidModel {
                name: model.name.clone(),
                diagnostics: diags.to_string(),
            });
        }

        let includes = model.collect_includes();
        let name = model.name.clone();
        let arc = Arc::new(model);
        self.by_path.insert(path.to_path_buf(), arc.clone());
        self.by_name.insert(name, path.to_path_buf());

        for included in includes {
            if !self.by_name.contains_key(&included) {
                self.load_model(&included)?;
            }
        }

        Ok(arc)
    }

    /// Load `path` directly, bypassing the search-path lookup — used when
    /// the caller already has a concrete file (e.g. a top-level model
    /// passed on the command line rather than referenced by name).
    pub fn load_model_at(&mut self, path: impl AsRef<FsPath>) -> Result<Arc<Model>> {
        let path = path.as_ref();
        let default_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();
        self.load_model_file(path, &default_name)
    }

    /// Every model currently cached, by name.
    pub fn loaded(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

impl ModelResolver for Environment {
    fn resolve(&self, name: &str) -> Option<&Model> {
        let path = self.by_name.get(name)?;
        self.by_path.get(path).map(|arc| arc.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_model(dir: &tempfile::TempDir, filename: &str, body: &str) -> PathBuf {
        let path = dir.path().join(filename);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_and_caches_a_model_by_name() {
        let dir = tempfile::tempdir().unwrap();
        write_model(
            &dir,
            "base.json",
            r#"{"name": "base", "body": {"port": {"type": "integer", "arity": "1"}}}"#,
        );
        let mut env = Environment::with_search_paths([dir.path().to_path_buf()]);
        let first = env.load_model("base").unwrap();
        let second = env.load_model("base").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name, "base");
    }

    #[test]
    fn missing_model_reports_search_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = Environment::with_search_paths([dir.path().to_path_buf()]);
        let err = env.load_model("nope").unwrap_err();
        assert!(matches!(err, Error::ModelNotFound { .. }));
    }

    #[test]
    fn recursively_loads_includes() {
        let dir = tempfile::tempdir().unwrap();
        write_model(
            &dir,
            "leaf.json",
            r#"{"name": "leaf", "body": {"x": {"type": "boolean", "arity": "1"}}}"#,
        );
        write_model(
            &dir,
            "root.json",
            r#"{"name": "root", "include": ["leaf"], "body": {"port": {"type": "integer", "arity": "1"}}}"#,
        );
        let mut env = Environment::with_search_paths([dir.path().to_path_buf()]);
        env.load_model("root").unwrap();
        assert!(env.resolve("leaf").is_some());
    }
}
