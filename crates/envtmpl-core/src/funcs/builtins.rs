//! Standard text-template builtins: `not`, comparisons, `len` and the
//! `print` family.
//!
//! `and` and `or` are not here; they short-circuit, so the executor runs
//! them itself (see [`super::Helper`]).
//!
//! Comparisons work on strings, integers, floats and booleans. An optional
//! compares as its text (`""` when absent), so
//! `eq (env "MODE") "prod"` needs no `default`. Integers and floats never
//! compare with each other.

use std::cmp::Ordering;
use std::fmt::Write;

use super::CallContext;
use crate::error::CallError;
use crate::value::Value;

fn arity(args: &[Value], want: usize) -> Result<(), CallError> {
    if args.len() == want {
        Ok(())
    } else {
        Err(CallError::Arity {
            want,
            got: args.len(),
        })
    }
}

// -------------------------------------------------------
// Logic and comparison
// -------------------------------------------------------

pub fn not(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    arity(args, 1)?;
    Ok(Value::Bool(!args[0].is_truthy()))
}

/// `eq a b c ...` is `a == b || a == c || ...`.
pub fn eq(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    let Some((first, rest)) = args.split_first() else {
        return Err(CallError::ArityAtLeast { want: 1, got: 0 });
    };
    if rest.is_empty() {
        return Err(CallError::MissingComparison);
    }
    for other in rest {
        if equal(first, other)? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

pub fn ne(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    arity(args, 2)?;
    Ok(Value::Bool(!equal(&args[0], &args[1])?))
}

pub fn lt(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    ordered(args, Ordering::is_lt)
}

pub fn le(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    ordered(args, Ordering::is_le)
}

pub fn gt(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    ordered(args, Ordering::is_gt)
}

pub fn ge(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    ordered(args, Ordering::is_ge)
}

fn ordered(args: &[Value], test: fn(Ordering) -> bool) -> Result<Value, CallError> {
    arity(args, 2)?;
    Ok(Value::Bool(test(compare(&args[0], &args[1])?)))
}

/// The comparable view of a value.
enum Basic<'a> {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(&'a str),
}

fn basic(value: &Value) -> Result<Basic<'_>, CallError> {
    match value {
        Value::Bool(b) => Ok(Basic::Bool(*b)),
        Value::Int(i) => Ok(Basic::Int(*i)),
        Value::Float(x) => Ok(Basic::Float(*x)),
        Value::String(s) => Ok(Basic::Text(s)),
        Value::Optional(opt) => Ok(Basic::Text(opt.as_deref().unwrap_or_default())),
        Value::Nil => Err(CallError::InvalidComparison { type_name: "nil" }),
    }
}

fn equal(a: &Value, b: &Value) -> Result<bool, CallError> {
    match (basic(a)?, basic(b)?) {
        (Basic::Bool(a), Basic::Bool(b)) => Ok(a == b),
        (Basic::Int(a), Basic::Int(b)) => Ok(a == b),
        (Basic::Float(a), Basic::Float(b)) => Ok(a == b),
        (Basic::Text(a), Basic::Text(b)) => Ok(a == b),
        _ => Err(CallError::IncompatibleTypes),
    }
}

fn compare(a: &Value, b: &Value) -> Result<Ordering, CallError> {
    match (basic(a)?, basic(b)?) {
        (Basic::Int(a), Basic::Int(b)) => Ok(a.cmp(&b)),
        (Basic::Float(a), Basic::Float(b)) => Ok(a.total_cmp(&b)),
        (Basic::Text(a), Basic::Text(b)) => Ok(a.cmp(b)),
        (Basic::Bool(_), Basic::Bool(_)) => Err(CallError::InvalidComparison { type_name: "bool" }),
        _ => Err(CallError::IncompatibleTypes),
    }
}

// -------------------------------------------------------
// len
// -------------------------------------------------------

/// Length in bytes of a string or optional.
pub fn len(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    arity(args, 1)?;
    let len = match &args[0] {
        Value::String(s) => s.len(),
        Value::Optional(opt) => opt.as_deref().map_or(0, str::len),
        other => {
            return Err(CallError::Len {
                type_name: other.type_name(),
            })
        }
    };
    // A string never holds more than isize::MAX bytes.
    Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)))
}

// -------------------------------------------------------
// print family
// -------------------------------------------------------

/// Operands joined with a space wherever neither neighbour is text.
pub fn print(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 && !args[i - 1].is_text() && !arg.is_text() {
            out.push(' ');
        }
        out.push_str(&plain(arg));
    }
    Ok(Value::String(out))
}

/// Operands joined with spaces, plus a trailing newline.
pub fn println(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    let mut out = args.iter().map(plain).collect::<Vec<_>>().join(" ");
    out.push('\n');
    Ok(Value::String(out))
}

/// Formats with the verbs `%v %s %q %d %x %t %f` and `%%`.
///
/// Flags, widths and precisions are not understood. Mismatches are
/// reported inline rather than failing the render: `%!d(string=x)` for a
/// wrong verb, `%!d(MISSING)` for a missing operand and
/// `%!(EXTRA int=1)` for leftovers.
pub fn printf(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Value, CallError> {
    let Some((format, operands)) = args.split_first() else {
        return Err(CallError::ArityAtLeast { want: 1, got: 0 });
    };
    let Value::String(format) = format else {
        return Err(CallError::ArgType {
            index: 0,
            want: "string",
            got: format.type_name(),
        });
    };
    Ok(Value::String(sprintf(format, operands)))
}

fn sprintf(format: &str, operands: &[Value]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut operands = operands.iter();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        let Some(operand) = operands.next() else {
            let _ = write!(out, "%!{verb}(MISSING)");
            continue;
        };
        match format_verb(verb, operand) {
            Some(text) => out.push_str(&text),
            None => {
                let _ = write!(out, "%!{verb}({})", typed(operand));
            }
        }
    }

    let extra: Vec<String> = operands.map(typed).collect();
    if !extra.is_empty() {
        let _ = write!(out, "%!(EXTRA {})", extra.join(", "));
    }
    out
}

fn format_verb(verb: char, operand: &Value) -> Option<String> {
    let text = match (verb, operand) {
        ('v', _) => plain(operand),
        ('s', Value::String(_) | Value::Optional(_)) => operand.to_string(),
        ('q', Value::String(_) | Value::Optional(_)) => format!("{:?}", operand.to_string()),
        ('d', Value::Int(i)) => i.to_string(),
        ('x', Value::Int(i)) if *i < 0 => format!("-{:x}", i.unsigned_abs()),
        ('x', Value::Int(i)) => format!("{i:x}"),
        ('t', Value::Bool(b)) => b.to_string(),
        ('f', Value::Float(x)) => format!("{x:.6}"),
        _ => return None,
    };
    Some(text)
}

/// Print form used by the `print` family, where `nil` is `<nil>`.
fn plain(value: &Value) -> String {
    match value {
        Value::Nil => "<nil>".to_owned(),
        other => other.to_string(),
    }
}

fn typed(value: &Value) -> String {
    format!("{}={}", value.type_name(), plain(value))
}
