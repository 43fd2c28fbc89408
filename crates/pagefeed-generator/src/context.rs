//! Rendering contexts.
//!
//! A [`Context`] is an ordered mapping from field name to [`FieldValue`]. A
//! value is either a literal string or a deferred computation that is only
//! evaluated when a template (or a timestamp lookup) asks for it.

use std::{fmt, sync::Arc};

use once_cell::sync::OnceCell;
use tracing::warn;

use crate::{error::Result, pipeline::Renderer};

type Compute = dyn Fn(&Renderer) -> Result<String> + Send + Sync;

/// A lazily computed field value.
///
/// The computation runs at most once per value: clones share the memoised
/// result. A failed evaluation is not memoised.
#[derive(Clone)]
pub struct Deferred {
    compute: Arc<Compute>,
    value: Arc<OnceCell<String>>,
}

impl Deferred {
    /// Wrap a computation.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn(&Renderer) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            compute: Arc::new(compute),
            value: Arc::new(OnceCell::new()),
        }
    }

    /// Evaluate the computation, or return the memoised value.
    pub fn force(&self, renderer: &Renderer) -> Result<&str> {
        self.value
            .get_or_try_init(|| (self.compute)(renderer))
            .map(String::as_str)
    }

    /// Whether the value has already been computed.
    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.value.get().is_some()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("Deferred").field(value).finish(),
            None => f.write_str("Deferred(<pending>)"),
        }
    }
}

/// Value of a context field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// A plain string.
    Literal(String),
    /// A string computed on demand.
    Deferred(Deferred),
}

impl FieldValue {
    /// Create a literal value.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// Create a deferred value.
    pub fn deferred<F>(compute: F) -> Self
    where
        F: Fn(&Renderer) -> Result<String> + Send + Sync + 'static,
    {
        Self::Deferred(Deferred::new(compute))
    }

    /// Get the string value, evaluating it if needed.
    pub fn force(&self, renderer: &Renderer) -> Result<&str> {
        match self {
            Self::Literal(value) => Ok(value.as_str()),
            Self::Deferred(deferred) => deferred.force(renderer),
        }
    }

    /// The value if it is a literal, or a deferred value that was already computed.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(value) => Some(value.as_str()),
            Self::Deferred(deferred) => deferred.value.get().map(String::as_str),
        }
    }

    /// Derive a new value from this one.
    ///
    /// Literals are transformed right away; deferred values stay deferred.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        match self {
            Self::Literal(value) => Self::Literal(f(value)),
            Self::Deferred(source) => {
                let source = source.clone();
                Self::deferred(move |renderer| source.force(renderer).map(&f))
            }
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<Deferred> for FieldValue {
    fn from(value: Deferred) -> Self {
        Self::Deferred(value)
    }
}

/// Ordered mapping of field names to values.
#[derive(Debug, Clone, Default)]
pub struct Context {
    fields: Vec<(String, FieldValue)>,
}

impl Context {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing an existing value in place.
    ///
    /// Field names must not be empty; an empty name is ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        if key.is_empty() {
            warn!("ignoring context field with an empty name");
            return;
        }
        let value = value.into();

        match self.fields.iter_mut().find(|(name, _)| *name == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a field value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Get a field value, evaluating it if it is deferred.
    pub fn force(&self, key: &str, renderer: &Renderer) -> Result<Option<&str>> {
        self.get(key).map(|value| value.force(renderer)).transpose()
    }

    /// Check if a field exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a field.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let index = self.fields.iter().position(|(name, _)| name == key)?;
        Some(self.fields.remove(index).1)
    }

    /// Merge fields into this context; later fields win.
    pub fn merge<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        for (key, value) in fields {
            self.insert(key, value);
        }
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the context has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        context.merge(iter);
        context
    }
}

impl IntoIterator for Context {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
