//! Error taxonomy for the schema/value-tree half of ACE.
//!
//! Mirrors spec §7 kinds 1-4: parse, schema-shape, attribute-parse and
//! model-consistency errors. Instance-time errors (kinds 5-7) live in
//! `ace_service::Error`, which wraps this one.

use thiserror::Error;

/// Errors raised while parsing paths, ranges, arities, regex templates, or
/// while loading/validating a schema `Model`.
#[derive(Debug, Error)]
pub enum Error {
    /// The source document was not well-formed (adapter-reported position).
    #[error("parse error at {path}: {message}")]
    Parse {
        /// Document path or filename being parsed.
        path: String,
        /// Adapter-specific diagnostic.
        message: String,
    },

    /// A value did not conform to the `Checker`'s schema.
    #[error("schema-shape error at {path}: {message}")]
    SchemaShape {
        /// Value-tree path of the offending node.
        path: String,
        /// What was expected vs. found.
        message: String,
    },

    /// A schema value that should parse as a range/arity/regex did not.
    #[error("attribute-parse error for '{attribute}' at {path}: {message}")]
    AttributeParse {
        /// Attribute name (e.g. `"arity"`, `"range"`).
        attribute: String,
        /// Value-tree path of the attribute's owner.
        path: String,
        /// Why the value failed to parse.
        message: String,
    },

    /// The model is internally inconsistent (bad default, empty enum,
    /// dangling dependency path, merge/override conflict).
    #[error("model-consistency error at {path}: {message}")]
    ModelConsistency {
        /// Value-tree path of the offending node.
        path: String,
        /// Description of the inconsistency.
        message: String,
    },

    /// Failure to parse a `Path` expression.
    #[error("invalid path expression '{0}'")]
    InvalidPath(String),

    /// Failure to parse a `Range<T>` expression.
    #[error("invalid range expression '{0}'")]
    InvalidRange(String),

    /// Failure to parse an `Arity` expression.
    #[error("invalid arity expression '{0}'")]
    InvalidArity(String),

    /// A hook's replacement template referenced a non-dense backreference set.
    #[error("invalid hook expansion template '{0}'")]
    InvalidHookTemplate(String),

    /// A regex failed to compile.
    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        /// The offending pattern.
        pattern: String,
        /// Underlying compile error.
        #[source]
        source: regex::Error,
    },
}

/// Convenience alias used throughout `ace-core`.
pub type Result<T> = std::result::Result<T, Error>;
