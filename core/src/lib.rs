//! Schema-time model: the generic value tree, path/range/arity/regex
//! grammars, typed attributes, and the `BasicType` hierarchy they compose
//! into. This crate has no notion of "running" a configuration — that is
//! `ace-service`'s job; this crate only knows how to load a model, flatten
//! its includes/templates, and validate its own internal consistency.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod arity;
pub mod attributes;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod path;
pub mod range;
pub mod regexutil;
pub mod types;
pub mod value;

pub use arity::Arity;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{Error, Result};
pub use path::{Item, Path};
pub use range::Range;
pub use value::{Kind, Object, Value};
