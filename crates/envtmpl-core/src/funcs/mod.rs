//! The helper functions templates can call.
//!
//! `env`, `default` and `required` read the environment. The rest are the
//! standard text-template builtins (see [`builtins`]): logic, comparison,
//! `len` and the `print` family.
//!
//! The environment helpers exist twice. The typed functions ([`env`],
//! [`default_value`], [`required`]) are the Rust API. The registry entries
//! adapt them to template values: they check arity, convert each [`Value`]
//! to an [`Argument`] and hand off to the typed function.
//!
//! The set of helpers is the constant [`FuncRegistry::BUILTIN`]. It is passed
//! to the parser, which binds each helper name to its implementation, so
//! nothing global is consulted at render time.

pub mod builtins;

use std::fmt;

use crate::environment::Environment;
use crate::error::{CallError, ValueError};
use crate::value::{Argument, OptionalValue, Value};

/// Everything a helper may read while it runs.
#[derive(Clone, Copy)]
pub struct CallContext<'a> {
    pub environment: &'a dyn Environment,
    /// Make `required` fail on an absent optional instead of yielding `""`.
    pub strict_required: bool,
}

impl<'a> CallContext<'a> {
    pub fn new(environment: &'a dyn Environment) -> Self {
        Self {
            environment,
            strict_required: false,
        }
    }
}

/// A template-callable function.
///
/// When the call is a pipeline stage after the first, the piped value is
/// `args[0]`.
pub type Func = fn(&CallContext<'_>, &[Value]) -> Result<Value, CallError>;

/// How the executor invokes a registered name.
#[derive(Debug, Clone, Copy)]
pub enum Helper {
    /// Called once every argument has been evaluated.
    Call(Func),
    /// Evaluates arguments left to right and returns the first falsy one,
    /// or the last.
    And,
    /// Evaluates arguments left to right and returns the first truthy one,
    /// or the last.
    Or,
}

/// Immutable mapping from helper name to implementation.
#[derive(Clone, Copy)]
pub struct FuncRegistry {
    entries: &'static [(&'static str, Helper)],
}

impl FuncRegistry {
    /// The environment helpers plus the text-template builtins.
    pub const BUILTIN: Self = Self {
        entries: &[
            ("env", Helper::Call(env_func)),
            ("default", Helper::Call(default_func)),
            ("required", Helper::Call(required_func)),
            ("and", Helper::And),
            ("or", Helper::Or),
            ("not", Helper::Call(builtins::not)),
            ("eq", Helper::Call(builtins::eq)),
            ("ne", Helper::Call(builtins::ne)),
            ("lt", Helper::Call(builtins::lt)),
            ("le", Helper::Call(builtins::le)),
            ("gt", Helper::Call(builtins::gt)),
            ("ge", Helper::Call(builtins::ge)),
            ("len", Helper::Call(builtins::len)),
            ("print", Helper::Call(builtins::print)),
            ("printf", Helper::Call(builtins::printf)),
            ("println", Helper::Call(builtins::println)),
        ],
    };

    /// Only `env`, `default` and `required`.
    pub const ENV_ONLY: Self = Self {
        entries: &[
            ("env", Helper::Call(env_func)),
            ("default", Helper::Call(default_func)),
            ("required", Helper::Call(required_func)),
        ],
    };

    pub const fn new(entries: &'static [(&'static str, Helper)]) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<Helper> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, helper)| *helper)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl Default for FuncRegistry {
    fn default() -> Self {
        Self::BUILTIN
    }
}

impl fmt::Debug for FuncRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

// -------------------------------------------------------
// Typed helpers
// -------------------------------------------------------

/// Look `key` up. Never fails.
pub fn env(environment: &dyn Environment, key: &str) -> OptionalValue {
    environment.lookup(key)
}

/// First usable candidate, in order.
///
/// `Missing` and absent optionals are skipped. A plain string is usable even
/// when empty, so `default_value([Text(""), Text("x")])` is `""`.
pub fn default_value<'a, I>(candidates: I) -> Result<String, ValueError>
where
    I: IntoIterator<Item = Argument<'a>>,
{
    first_usable(candidates.into_iter().map(Ok))
}

/// The string held by `arg`.
///
/// Only the nil marker fails. An absent optional yields `""`; see
/// [`required_strict`] for the variant that rejects it.
pub fn required(arg: Argument<'_>) -> Result<String, ValueError> {
    match arg {
        Argument::Missing => Err(ValueError::RequiredMissing),
        other => Ok(other.usable().unwrap_or_default().to_owned()),
    }
}

/// Like [`required`], but an absent optional is an error too.
pub fn required_strict(arg: Argument<'_>) -> Result<String, ValueError> {
    match arg {
        Argument::Missing => Err(ValueError::RequiredMissing),
        Argument::Optional(opt) if !opt.is_present() => Err(ValueError::RequiredAbsent),
        other => Ok(other.usable().unwrap_or_default().to_owned()),
    }
}

/// Stops at the first usable candidate; later candidates are never inspected,
/// so an unsupported one after it does not fail the call.
fn first_usable<'a, I>(candidates: I) -> Result<String, ValueError>
where
    I: Iterator<Item = Result<Argument<'a>, ValueError>>,
{
    for candidate in candidates {
        if let Some(text) = candidate?.usable() {
            return Ok(text.to_owned());
        }
    }
    Err(ValueError::AllAbsent)
}

// -------------------------------------------------------
// Registry adapters
// -------------------------------------------------------

fn env_func(ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    let [key] = args else {
        return Err(CallError::Arity {
            want: 1,
            got: args.len(),
        });
    };
    let Value::String(key) = key else {
        return Err(CallError::ArgType {
            index: 0,
            want: "string",
            got: key.type_name(),
        });
    };
    let value = env(ctx.environment, key);
    tracing::trace!(key = %key, present = value.is_present(), "env lookup");
    Ok(Value::Optional(value))
}

fn default_func(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    let value = first_usable(args.iter().map(Argument::try_from))?;
    Ok(Value::String(value))
}

fn required_func(ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    let [arg] = args else {
        return Err(CallError::Arity {
            want: 1,
            got: args.len(),
        });
    };
    let arg = Argument::try_from(arg)?;
    let value = if ctx.strict_required {
        required_strict(arg)?
    } else {
        required(arg)?
    };
    Ok(Value::String(value))
}
