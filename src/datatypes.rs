//! Value kinds and the coercers that turn raw strings into typed values

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConversionError;

/// Declared type of a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Boolean,
    Integer,
    Float,
    String,
    /// Comma separated list, each element coerced with the inner kind
    List(Box<Kind>),
}

/// A typed setting value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

const TRUE_TOKENS: [&str; 4] = ["yes", "true", "on", "1"];
const FALSE_TOKENS: [&str; 4] = ["no", "false", "off", "0"];

/// Parse a boolean from the usual truthy/falsy tokens, ignoring case.
pub fn parse_bool(raw: &str) -> Result<bool, ConversionError> {
    let token = raw.trim().to_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Ok(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Ok(false)
    } else {
        Err(ConversionError::new(
            Kind::Boolean,
            raw,
            "not a boolean token (yes/no, true/false, on/off, 1/0)",
        ))
    }
}

/// Split a comma separated string and coerce every part with `element`.
///
/// Empty parts are dropped and `none` yields an empty list.
pub fn parse_list(raw: &str, element: &Kind) -> Result<Vec<Value>, ConversionError> {
    if raw.trim().eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| element.coerce(part))
        .collect()
}

fn parse_number<T>(kind: Kind, raw: &str) -> Result<T, ConversionError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConversionError::new(kind, raw, e))
}

impl Kind {
    /// Shorthand for `Kind::List(Box::new(element))`.
    pub fn list_of(element: Kind) -> Self {
        Kind::List(Box::new(element))
    }

    /// Convert a raw string into a value of this kind.
    pub fn coerce(&self, raw: &str) -> Result<Value, ConversionError> {
        match self {
            Kind::Boolean => parse_bool(raw).map(Value::Bool),
            Kind::Integer => parse_number(Kind::Integer, raw).map(Value::Integer),
            Kind::Float => parse_number(Kind::Float, raw).map(Value::Float),
            Kind::String => Ok(Value::String(raw.to_string())),
            Kind::List(element) => parse_list(raw, element)
                .map(Value::List)
                .map_err(|e| ConversionError::new(self.clone(), raw, e.reason)),
        }
    }

    /// Keep `value` if it already has this kind, otherwise coerce its text.
    pub fn convert(&self, value: Value) -> Result<Value, ConversionError> {
        if value.matches(self) {
            return Ok(value);
        }
        match (value, self) {
            (Value::Bool(b), Kind::Integer) => Ok(Value::Integer(i64::from(b))),
            (Value::Bool(b), Kind::Float) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
            (Value::String(raw), _) => self.coerce(&raw),
            (other, _) => self.coerce(&other.to_string()),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Boolean => write!(f, "boolean"),
            Kind::Integer => write!(f, "integer"),
            Kind::Float => write!(f, "float"),
            Kind::String => write!(f, "string"),
            Kind::List(element) => write!(f, "list of {element}"),
        }
    }
}

impl FromStr for Kind {
    type Err = String;

    /// Accepts the short names used on the command line (`bool`, `int`,
    /// `float`, `str`, `list`) as well as the display names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bool" | "boolean" => Ok(Kind::Boolean),
            "int" | "integer" => Ok(Kind::Integer),
            "float" => Ok(Kind::Float),
            "str" | "string" => Ok(Kind::String),
            "list" => Ok(Kind::list_of(Kind::String)),
            other => Err(format!("unknown kind '{other}'")),
        }
    }
}

impl Value {
    /// Kind inferred from the value itself. Empty lists are lists of strings.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Boolean,
            Value::Integer(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::List(items) => {
                Kind::list_of(items.first().map_or(Kind::String, Value::kind))
            }
        }
    }

    pub fn matches(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Value::Bool(_), Kind::Boolean)
            | (Value::Integer(_), Kind::Integer)
            | (Value::Float(_), Kind::Float)
            | (Value::String(_), Kind::String) => true,
            (Value::List(items), Kind::List(element)) => {
                items.iter().all(|item| item.matches(element))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Extraction of a Rust value from a setting value of the matching kind.
pub trait FromValue: Sized {
    fn kind() -> Kind;
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    fn kind() -> Kind {
        Kind::Boolean
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn kind() -> Kind {
        Kind::Integer
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn kind() -> Kind {
        Kind::Float
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn kind() -> Kind {
        Kind::String
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn kind() -> Kind {
        Kind::list_of(T::kind())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

/// Parsing of a single raw option value into a Rust type.
///
/// Booleans use the token parser ([`parse_bool`]); the other types use
/// their `FromStr` implementation on the trimmed text.
pub trait ParseValue: Sized {
    fn parse_value(raw: &str) -> Result<Self, ConversionError>;
}

impl ParseValue for bool {
    fn parse_value(raw: &str) -> Result<Self, ConversionError> {
        parse_bool(raw)
    }
}

impl ParseValue for String {
    fn parse_value(raw: &str) -> Result<Self, ConversionError> {
        Ok(raw.to_string())
    }
}

macro_rules! parse_value_from_str {
    ($kind:expr => $($ty:ty),+) => {
        $(
            impl ParseValue for $ty {
                fn parse_value(raw: &str) -> Result<Self, ConversionError> {
                    parse_number($kind, raw)
                }
            }
        )+
    };
}

parse_value_from_str!(Kind::Integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
parse_value_from_str!(Kind::Float => f32, f64);
