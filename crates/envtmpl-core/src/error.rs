//! Unified error types for envtmpl.
//!
//! Rendering fails in one of two phases. [`ParseError`] covers everything
//! detected while building the template (bad syntax, unknown helpers, invalid
//! UTF-8 inside an action). [`ExecError`] covers failures while the template
//! runs: [`ValueError`]s raised by the `default` and `required` helpers, and
//! argument or comparison errors from the other helpers.
//! Both are wrapped by [`TemplateError`], whose message names the phase.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while loading configuration or rendering a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    // --- Rendering ---

    /// The template could not be built from its source.
    #[error("failed to create template: {0}")]
    Parse(#[from] ParseError),

    /// The template parsed but failed while executing.
    #[error("failed to transform template: {0}")]
    Exec(#[from] ExecError),

    // --- Configuration ---

    /// The render configuration file could not be read.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The render configuration file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration is well-formed but unusable (e.g. an empty delimiter).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TemplateError {
    /// The helper value error behind an execution failure, if there is one.
    pub fn value_error(&self) -> Option<&ValueError> {
        match self {
            Self::Exec(err) => err.value_error(),
            _ => None,
        }
    }
}

/// A syntax-level diagnostic, located by template name and line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("template: {name}:{line}: {message}")]
pub struct ParseError {
    pub name: String,
    pub line: usize,
    pub message: String,
}

/// A helper call that failed during execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("template: {name}:{line}: error calling {func}: {source}")]
pub struct ExecError {
    pub name: String,
    pub line: usize,
    pub func: String,
    #[source]
    pub source: CallError,
}

impl ExecError {
    pub fn value_error(&self) -> Option<&ValueError> {
        match &self.source {
            CallError::Value(err) => Some(err),
            _ => None,
        }
    }
}

/// Why a single helper invocation failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("wrong number of args: want {want}, got {got}")]
    Arity { want: usize, got: usize },

    #[error("wrong number of args: want at least {want}, got {got}")]
    ArityAtLeast { want: usize, got: usize },

    #[error("wrong type for argument {index}: want {want}, got {got}")]
    ArgType {
        index: usize,
        want: &'static str,
        got: &'static str,
    },

    #[error("incompatible types for comparison")]
    IncompatibleTypes,

    #[error("invalid type for comparison: {type_name}")]
    InvalidComparison { type_name: &'static str },

    #[error("missing argument for comparison")]
    MissingComparison,

    #[error("len of type {type_name}")]
    Len { type_name: &'static str },
}

/// Failures raised by the `default` and `required` helpers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A literal of a type the helpers do not accept (number, boolean).
    #[error("unsupported type '{type_name}'")]
    UnsupportedType { type_name: &'static str },

    /// `default` ran out of candidates.
    #[error("all arguments are nil/absent")]
    AllAbsent,

    /// `required` was handed the nil marker.
    #[error("required argument is missing")]
    RequiredMissing,

    /// `required` was handed an absent optional while strict mode is on.
    #[error("required value is absent")]
    RequiredAbsent,
}

/// Alias for `Result<T, TemplateError>`.
pub type Result<T> = std::result::Result<T, TemplateError>;
