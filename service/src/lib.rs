//! The instance-time half of ACE: `Environment` (model search paths and
//! cache, replacing the source's global `Master`), the instance engine
//! (check/expand/flatten/resolve), and the Coach/Explainer. Depends on
//! `ace-core` for the value tree, path/range/arity grammars and the
//! `BasicType` hierarchy — this crate only adds the filesystem and
//! orchestration layer around them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod coach;
pub mod engine;
pub mod environment;
pub mod error;

pub use coach::Coach;
pub use engine::Engine;
pub use environment::Environment;
pub use error::{Error, Result};
