//! Template locals.
//!
//! A [`Context`] maps local variable names to values for one render.
//! Values are read-only during the render; the template never mutates
//! its context.
use super::{Error, ToValue, Value};

use std::collections::HashMap;
use std::ops::Index;

#[derive(Debug, Default, Clone)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: impl ToValue) -> Result<&mut Self, Error> {
        self.values.insert(key.to_string(), value.to_value()?);
        Ok(self)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Snapshot a lexical scope into a context. Missing values are skipped.
    pub fn from_scope(scope: &dyn LocalScope) -> Self {
        let mut context = Self::new();
        for name in scope.local_variable_names() {
            if let Some(value) = scope.value_of(&name) {
                context.values.insert(name, value);
            }
        }
        context
    }
}

impl Index<&str> for Context {
    type Output = Value;

    fn index(&self, key: &str) -> &Self::Output {
        self.values.get(key).unwrap_or(&Value::Null)
    }
}

/// A capture of a caller's local variables, the "binding" collaborator.
///
/// The [`crate::locals!`] macro is the usual way to snapshot locals; this
/// trait exists for callers that carry their own scope representation.
pub trait LocalScope {
    fn local_variable_names(&self) -> Vec<String>;
    fn value_of(&self, name: &str) -> Option<Value>;
}

/// Conversion of caller-supplied locals into a [`Context`].
///
/// Implemented for maps, vectors and arrays of name/value pairs, and for
/// `Result<Context, Error>` so the `locals!` macro composes without an
/// intermediate `?`.
pub trait IntoContext {
    fn into_context(self) -> Result<Context, Error>;
}

impl IntoContext for Context {
    fn into_context(self) -> Result<Context, Error> {
        Ok(self)
    }
}

impl IntoContext for &Context {
    fn into_context(self) -> Result<Context, Error> {
        Ok(self.clone())
    }
}

impl IntoContext for Result<Context, Error> {
    fn into_context(self) -> Result<Context, Error> {
        self
    }
}

impl<K: ToString, V: ToValue, const N: usize> IntoContext for [(K, V); N] {
    fn into_context(self) -> Result<Context, Error> {
        let mut context = Context::new();
        for (key, value) in &self {
            context.set(&key.to_string(), value)?;
        }
        Ok(context)
    }
}

impl<K: ToString, V: ToValue> IntoContext for Vec<(K, V)> {
    fn into_context(self) -> Result<Context, Error> {
        let mut context = Context::new();
        for (key, value) in &self {
            context.set(&key.to_string(), value)?;
        }
        Ok(context)
    }
}

impl<K: ToString, V: ToValue> IntoContext for HashMap<K, V> {
    fn into_context(self) -> Result<Context, Error> {
        let mut context = Context::new();
        for (key, value) in &self {
            context.set(&key.to_string(), value)?;
        }
        Ok(context)
    }
}
