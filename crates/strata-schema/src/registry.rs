//! Construction of concrete types by name
//!
//! Data may name the implementation it wants built (the `class` and
//! `blueprint-class` conventions). Each module that defines such a type
//! registers a factory for it at start-up; blueprints look the factory up by
//! name when they build.

use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// Failure to build a value by type name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstantiationError {
    #[error("no factory registered for type '{0}'")]
    UnknownType(String),

    #[error("factory for '{type_name}' failed: {message}")]
    Failed { type_name: String, message: String },
}

/// Builds values of `T` from a type name
pub trait Instantiator<T> {
    fn construct(&self, type_name: &str) -> Result<T, InstantiationError>;
}

type Factory<T> = Box<dyn Fn() -> Result<T, InstantiationError>>;

/// A map from type names to factory closures
///
/// # Example
///
/// ```
/// use strata_schema::{Instantiator, TypeRegistry};
///
/// let mut registry = TypeRegistry::new();
/// registry.register("answer", || 42);
///
/// assert_eq!(registry.construct("answer").unwrap(), 42);
/// assert!(registry.construct("question").is_err());
/// ```
pub struct TypeRegistry<T> {
    factories: IndexMap<String, Factory<T>>,
}

impl<T> TypeRegistry<T> {
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Register an infallible factory, replacing any previous one under `type_name`
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        factory: impl Fn() -> T + 'static,
    ) -> &mut Self
    where
        T: 'static,
    {
        self.register_fallible(type_name, move || Ok(factory()))
    }

    /// Register a factory that may refuse to build
    pub fn register_fallible(
        &mut self,
        type_name: impl Into<String>,
        factory: impl Fn() -> Result<T, InstantiationError> + 'static,
    ) -> &mut Self {
        self.factories.insert(type_name.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names, in registration order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<T> Instantiator<T> for TypeRegistry<T> {
    fn construct(&self, type_name: &str) -> Result<T, InstantiationError> {
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| InstantiationError::UnknownType(type_name.to_string()))?;
        factory()
    }
}

impl<T> Default for TypeRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypeRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
