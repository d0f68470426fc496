//! The basic building block of the template language: the value.
//!
//! All data flowing through a template, locals, helper results,
//! instance variables, is represented as a [`Value`]. This allows
//! operations across data types, like concatenating strings and
//! numbers, or looking up hash keys dynamically.
use super::Error;

use std::cmp::Ordering;
use std::collections::HashMap;

/// A template value, e.g. `5` or `"hello world"`.
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    List(Vec<Value>),
    Hash(HashMap<String, Value>),
    /// A value marked as HTML-safe. Printed without escaping.
    Safe(Box<Value>),
    Null,
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => i1.partial_cmp(i2),
            (Value::Integer(i1), Value::Float(f2)) => (*i1 as f64).partial_cmp(f2),
            (Value::Float(f1), Value::Integer(i2)) => f1.partial_cmp(&(*i2 as f64)),
            (Value::Float(f1), Value::Float(f2)) => f1.partial_cmp(f2),
            (Value::String(s1), Value::String(s2)) => s1.partial_cmp(s2),
            (Value::Boolean(b1), Value::Boolean(b2)) => b1.partial_cmp(b2),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    write!(f, "{}", v)?;
                    if i < l.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "]")
            }
            Value::Hash(h) => {
                write!(f, "{{")?;
                for (i, (k, v)) in h.iter().enumerate() {
                    write!(f, "{}: {}", k, v)?;
                    if i < h.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "}}")
            }
            Value::Safe(inner) => write!(f, "{}", inner),
            Value::Null => write!(f, "null"),
        }
    }
}

impl Value {
    /// Mark a value as HTML-safe. Safe values are printed verbatim,
    /// bypassing the default escaping.
    pub fn safe(value: impl Into<Value>) -> Value {
        match value.into() {
            safe @ Value::Safe(_) => safe,
            value => Value::Safe(Box::new(value)),
        }
    }

    /// Convert any serializable type into a template value,
    /// e.g. a model struct into a hash.
    pub fn from_serde(value: &impl serde::Serialize) -> Result<Value, Error> {
        Ok(serde_json::to_value(value)?.into())
    }

    /// If the value, when evaluated in the context of an `if` statement,
    /// would result in the statement being executed.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(list) => !list.is_empty(),
            Value::Hash(hash) => !hash.is_empty(),
            Value::Safe(inner) => inner.truthy(),
            Value::Null => false,
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => Value::Integer(i1 + i2),
            (Value::Integer(i1), Value::Float(f2)) => Value::Float(*i1 as f64 + f2),
            (Value::Float(f1), Value::Integer(i2)) => Value::Float(f1 + *i2 as f64),
            (Value::Float(f1), Value::Float(f2)) => Value::Float(f1 + f2),
            (Value::String(s1), other) => Value::String(format!("{}{}", s1, other)),
            (other, Value::String(s2)) => Value::String(format!("{}{}", other, s2)),
            (Value::List(list), other) => {
                let mut list = list.clone();
                list.push(other.clone());
                Value::List(list)
            }
            _ => Value::Null,
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => Value::Integer(i1 - i2),
            (Value::Integer(i1), Value::Float(f2)) => Value::Float(*i1 as f64 - f2),
            (Value::Float(f1), Value::Integer(i2)) => Value::Float(f1 - *i2 as f64),
            (Value::Float(f1), Value::Float(f2)) => Value::Float(f1 - f2),
            (Value::String(s1), Value::String(s2)) => Value::String(s1.replace(s2, "")),
            (Value::List(list), other) => {
                let mut list = list.clone();
                list.retain(|v| v != other);
                Value::List(list)
            }
            _ => Value::Null,
        }
    }

    pub fn mul(&self, other: &Self) -> Result<Self, Error> {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => Ok(Value::Integer(i1 * i2)),
            (Value::Integer(i1), Value::Float(f2)) => Ok(Value::Float(*i1 as f64 * f2)),
            (Value::Float(f1), Value::Integer(i2)) => Ok(Value::Float(f1 * *i2 as f64)),
            (Value::Float(f1), Value::Float(f2)) => Ok(Value::Float(f1 * f2)),
            (Value::String(s1), Value::Integer(i2)) | (Value::Integer(i2), Value::String(s1)) => {
                if *i2 < 0 {
                    Err(Error::Runtime(format!(
                        "cannot repeat a string {} times",
                        i2
                    )))
                } else {
                    Ok(Value::String(s1.repeat(*i2 as usize)))
                }
            }
            _ => Ok(Value::Null),
        }
    }

    pub fn div(&self, other: &Self) -> Result<Self, Error> {
        match (self, other) {
            // Floats divide by zero to infinity; integers error.
            (Value::Integer(_), Value::Integer(0)) => {
                Err(Error::Runtime("division by zero".into()))
            }
            (Value::Integer(i1), Value::Integer(i2)) => Ok(Value::Integer(i1.wrapping_div(*i2))),
            (Value::Integer(i1), Value::Float(f2)) => Ok(Value::Float(*i1 as f64 / f2)),
            (Value::Float(f1), Value::Integer(i2)) => Ok(Value::Float(f1 / *i2 as f64)),
            (Value::Float(f1), Value::Float(f2)) => Ok(Value::Float(f1 / f2)),
            _ => Ok(Value::Null),
        }
    }

    /// Call a method on the value, e.g. `<%= name.upcase %>`.
    ///
    /// Unknown method names on hashes fall back to key access,
    /// and on lists to numeric indexing, so `user.email` and `list.0`
    /// work without dedicated syntax.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, Error> {
        match name {
            "upcase" => Ok(Value::String(self.to_string().to_uppercase())),
            "downcase" => Ok(Value::String(self.to_string().to_lowercase())),
            "trim" => Ok(Value::String(self.to_string().trim().to_string())),
            "to_string" => Ok(Value::String(self.to_string())),
            "replace" | "sub" => match (args.first(), args.get(1)) {
                (Some(from), Some(to)) => Ok(Value::String(
                    self.to_string().replace(&from.to_string(), &to.to_string()),
                )),
                _ => Err(Error::Runtime(format!(
                    "\"{}\" takes two arguments",
                    name
                ))),
            },
            "len" | "size" => match self {
                Value::String(s) => Ok(Value::Integer(s.len() as i64)),
                Value::List(list) => Ok(Value::Integer(list.len() as i64)),
                Value::Hash(hash) => Ok(Value::Integer(hash.len() as i64)),
                _ => Err(Error::UnknownMethod(name.to_string())),
            },
            "html_safe" | "safe" => Ok(Value::safe(self.clone())),
            _ => match self {
                Value::Hash(hash) => Ok(hash.get(name).cloned().unwrap_or(Value::Null)),
                Value::List(list) => match name.parse::<usize>() {
                    Ok(index) => Ok(list.get(index).cloned().unwrap_or(Value::Null)),
                    Err(_) => Err(Error::UnknownMethod(name.to_string())),
                },
                _ => Err(Error::UnknownMethod(name.to_string())),
            },
        }
    }
}

/// Convert a Rust type into a template [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Result<Value, Error>;
}

impl ToValue for Value {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(self.clone())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::String(self.to_string()))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::String(self.clone()))
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::Boolean(*self))
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Result<Value, Error> {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Result<Value, Error> {
        match self {
            Some(value) => value.to_value(),
            None => Ok(Value::Null),
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Result<Value, Error> {
        let mut list = Vec::with_capacity(self.len());
        for value in self {
            list.push(value.to_value()?);
        }
        Ok(Value::List(list))
    }
}

macro_rules! impl_integer {
    ($ty:ty) => {
        impl ToValue for $ty {
            fn to_value(&self) -> Result<Value, Error> {
                Ok(Value::Integer(*self as i64))
            }
        }
    };
}

impl_integer!(i8);
impl_integer!(i16);
impl_integer!(i32);
impl_integer!(i64);
impl_integer!(isize);
impl_integer!(u8);
impl_integer!(u16);
impl_integer!(u32);
impl_integer!(u64);
impl_integer!(usize);

impl ToValue for f64 {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::Float(*self))
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::Float(*self as f64))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Boolean(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Value {
        use serde_json::Value as Json;

        match value {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Boolean(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(0.0)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(list) => Value::List(list.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Hash(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}
