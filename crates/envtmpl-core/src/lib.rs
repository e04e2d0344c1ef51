//! Core library for envtmpl.
//!
//! Expands text templates (configuration files, static files) by substituting
//! values taken from the environment at render time. The environment helpers
//! are:
//!
//! - `env "NAME"`: the variable's value, or an absent value when it is unset
//! - `default a b ...`: the first usable argument
//! - `required v`: `v`, failing when it is the `nil` marker
//!
//! Templates can also branch with `{{if}}` / `{{with}}` and use the logic,
//! comparison and formatting builtins listed in [`funcs::FuncRegistry::BUILTIN`].
//!
//! [`generate_template`] is the one-call entry point. [`TemplateRenderer`]
//! exposes the same pipeline with its configuration, helper registry and
//! environment injected. [`templates::template::Template`] splits the parse
//! and execute phases for callers that render one source repeatedly.

pub mod config;
pub mod environment;
pub mod error;
pub mod funcs;
pub mod templates;
pub mod value;

pub use config::RenderConfig;
pub use environment::{Environment, MapEnv, ProcessEnv};
pub use error::{Result, TemplateError, ValueError};
pub use funcs::{FuncRegistry, Helper};
pub use templates::renderer::TemplateRenderer;
pub use value::{Argument, OptionalValue, Value};

/// Render `source` against the process environment with default settings.
pub fn generate_template(source: &[u8]) -> Result<Vec<u8>> {
    TemplateRenderer::new().generate_template(source)
}
