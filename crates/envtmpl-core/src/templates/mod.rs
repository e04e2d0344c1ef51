//! Template engine for envtmpl.
//!
//! Source text goes through three stages: the [`lexer`] splits it into text
//! and action tokens, the parser builds a syntax tree with every helper
//! name bound to its implementation, and the executor walks that tree against
//! a [`crate::funcs::CallContext`]. [`renderer::TemplateRenderer`] wires the
//! stages together behind a byte-in, byte-out API.
//!
//! ## Syntax
//!
//! - Text outside `{{ ... }}` is copied through byte for byte, whatever its
//!   encoding. Actions must be UTF-8.
//! - `{{ pipeline }}` prints the pipeline's value.
//! - `{{if p}} ... {{else if q}} ... {{else}} ... {{end}}` picks a branch by
//!   truth: `nil`, `false`, `0`, empty strings and absent or empty `env`
//!   values are false. `{{with p}}` is the same but sets `.` to the value.
//! - A pipeline is commands joined by `|`; each stage's value becomes the
//!   **first** argument of the next, so `{{env "A" | default "b"}}` is
//!   `{{default (env "A") "b"}}`.
//! - Operands: helper names, `"quoted"` and `` `raw` `` strings, integers,
//!   character constants, integers (`0x`, `0o`, `0b` and `_` allowed),
//!   floats, `true`, `false`, `nil`, `.` and `( sub-pipelines )`.
//! - `{{- ` and ` -}}` trim adjacent whitespace; `{{/* ... */}}` is a comment.

pub(crate) mod exec;
pub(crate) mod lexer;
pub(crate) mod node;
pub(crate) mod parse;
pub mod renderer;
pub mod template;
