//! Error taxonomy for the instance/execution half of ACE.
//!
//! Wraps `ace_core::Error` (taxonomy kinds 1-4) and adds kinds 5-7 from spec
//! §7: instance type errors, instance constraint errors, and IO errors
//! (missing include, missing instance file, library path misconfiguration).

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving models, running the instance engine, or
/// rendering the Coach.
#[derive(Debug, Error)]
pub enum Error {
    /// A schema/model-time error bubbled up unchanged.
    #[error(transparent)]
    Model(#[from] ace_core::Error),

    /// An instance value's type does not match its declared field type.
    #[error("instance type error at {path}: {message}")]
    InstanceType {
        /// Value-tree path of the offending node.
        path: String,
        /// What was expected vs. found.
        message: String,
    },

    /// A range/enum/format/arity/length/dependency constraint was violated,
    /// or a hook's expansion failed against a matching leaf.
    #[error("instance constraint error at {path}: {message}")]
    InstanceConstraint {
        /// Value-tree path of the offending node.
        path: String,
        /// Description of the violation.
        message: String,
    },

    /// A named model could not be found on the search path.
    #[error("model '{name}' not found on search path {search_paths:?}")]
    ModelNotFound {
        /// The name (as given in `include` or a class's `model` key).
        name: String,
        /// The search paths consulted.
        search_paths: Vec<PathBuf>,
    },

    /// A model's own declared consistency (or a whole pipeline stage)
    /// failed; `diagnostics` is the rendered accumulated log.
    #[error("model '{name}' failed validation:\n{diagnostics}")]
    InvalidModel {
        /// The model's name.
        name: String,
        /// The rendered `Diagnostics` log collected during validation.
        diagnostics: String,
    },

    /// Reading a model or instance file from disk failed.
    #[error("io error reading '{path}': {source}")]
    Io {
        /// The path that could not be read.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout `ace-service`.
pub type Result<T> = std::result::Result<T, Error>;
