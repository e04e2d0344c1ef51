//! Runtime values flowing through a template.
//!
//! [`OptionalValue`] is what `env` produces: a string that is either present
//! (possibly empty) or absent. [`Value`] is the full set of things a template
//! expression can evaluate to, and [`Argument`] is the closed view of a value
//! that the `default` and `required` helpers accept.

use std::fmt;

use crate::error::ValueError;

/// A string that may be absent.
///
/// An environment variable set to `""` is present; an unset one is absent.
/// The text form of an absent value is always the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OptionalValue(Option<String>);

impl OptionalValue {
    pub fn present(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    pub const fn absent() -> Self {
        Self(None)
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Present and non-empty.
    pub fn is_truthy(&self) -> bool {
        self.as_deref().is_some_and(|value| !value.is_empty())
    }
}

impl From<Option<String>> for OptionalValue {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

impl fmt::Display for OptionalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_deref().unwrap_or_default())
    }
}

/// The value of a template expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The `nil` literal.
    Nil,
    String(String),
    Optional(OptionalValue),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Value {
    /// Type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::String(_) => "string",
            Self::Optional(_) => "optional",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
        }
    }

    /// Truth as `if`, `with`, `and`, `or` and `not` see it.
    ///
    /// Empty strings, zero numbers, `false` and `nil` are false. An optional
    /// is true only when it is present and non-empty, so an unset variable
    /// and one set to `""` both test false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Nil => false,
            Self::String(s) => !s.is_empty(),
            Self::Optional(opt) => opt.is_truthy(),
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(x) => *x != 0.0,
        }
    }

    /// Strings and optionals; `print` puts no spaces next to these.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::String(_) | Self::Optional(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("<no value>"),
            Self::String(s) => f.write_str(s),
            Self::Optional(opt) => fmt::Display::fmt(opt, f),
            Self::Bool(b) => fmt::Display::fmt(b, f),
            Self::Int(i) => fmt::Display::fmt(i, f),
            Self::Float(x) => fmt::Display::fmt(x, f),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<OptionalValue> for Value {
    fn from(value: OptionalValue) -> Self {
        Self::Optional(value)
    }
}

/// An argument to `default` or `required`.
///
/// Typed callers build these directly and can never hit the
/// "unsupported type" failure; template values go through
/// [`Argument::try_from`], which is the only place it can arise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument<'a> {
    /// The nil marker.
    Missing,
    /// A plain string. Always usable, even when empty.
    Text(&'a str),
    /// An optional string. Usable only when present.
    Optional(&'a OptionalValue),
}

impl<'a> Argument<'a> {
    /// The string this argument contributes, if it is usable.
    pub fn usable(self) -> Option<&'a str> {
        match self {
            Self::Missing => None,
            Self::Text(text) => Some(text),
            Self::Optional(opt) => opt.as_deref(),
        }
    }
}

impl<'a> TryFrom<&'a Value> for Argument<'a> {
    type Error = ValueError;

    fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
        match value {
            Value::Nil => Ok(Self::Missing),
            Value::String(s) => Ok(Self::Text(s)),
            Value::Optional(opt) => Ok(Self::Optional(opt)),
            other => Err(ValueError::UnsupportedType {
                type_name: other.type_name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_renders_empty() {
        assert_eq!(OptionalValue::absent().to_string(), "");
        assert!(!OptionalValue::absent().is_present());
    }

    #[test]
    fn test_present_empty_is_still_present() {
        let opt = OptionalValue::present("");
        assert!(opt.is_present());
        assert_eq!(opt.as_deref(), Some(""));
        assert_eq!(opt.to_string(), "");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Optional(OptionalValue::present("x")).to_string(), "x");
        assert_eq!(Value::Optional(OptionalValue::absent()).to_string(), "");
    }

    #[test]
    fn test_argument_conversion() {
        let nil = Value::Nil;
        let text = Value::from("a");
        let opt = Value::Optional(OptionalValue::absent());
        assert_eq!(Argument::try_from(&nil), Ok(Argument::Missing));
        assert_eq!(Argument::try_from(&text), Ok(Argument::Text("a")));
        assert!(matches!(Argument::try_from(&opt), Ok(Argument::Optional(_))));
    }

    #[test]
    fn test_argument_conversion_rejects_literals() {
        assert_eq!(
            Argument::try_from(&Value::Int(42)),
            Err(ValueError::UnsupportedType { type_name: "int" })
        );
        assert_eq!(
            Argument::try_from(&Value::Bool(false)),
            Err(ValueError::UnsupportedType { type_name: "bool" })
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Optional(OptionalValue::absent()).is_truthy());
        assert!(!Value::Optional(OptionalValue::present("")).is_truthy());
        assert!(Value::Optional(OptionalValue::present("x")).is_truthy());
    }

    #[test]
    fn test_usable() {
        let absent = OptionalValue::absent();
        let present = OptionalValue::present("v");
        assert_eq!(Argument::Missing.usable(), None);
        assert_eq!(Argument::Text("").usable(), Some(""));
        assert_eq!(Argument::Optional(&absent).usable(), None);
        assert_eq!(Argument::Optional(&present).usable(), Some("v"));
    }
}
