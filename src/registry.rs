//! Maps descriptor kinds to component constructors.

use std::collections::HashMap;

use crate::component::Component;
use crate::error::ConfigurationError;
use crate::props::{Descriptor, Props};
use crate::widgets;

type Factory = Box<dyn Fn(&Props) -> Result<Box<dyn Component>, ConfigurationError>>;

#[derive(Default)]
pub struct ComponentRegistry {
    factories: HashMap<String, Factory>,
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in widget under its default kind name.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        widgets::register_builtins(&mut registry);
        registry
    }

    /// Register a constructor for `kind`, replacing any previous one.
    pub fn register<C, F>(&mut self, kind: impl Into<String>, factory: F)
    where
        C: Component + 'static,
        F: Fn(&Props) -> Result<C, ConfigurationError> + 'static,
    {
        self.factories.insert(
            kind.into(),
            Box::new(move |props| Ok(Box::new(factory(props)?) as Box<dyn Component>)),
        );
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<C, F>(mut self, kind: impl Into<String>, factory: F) -> Self
    where
        C: Component + 'static,
        F: Fn(&Props) -> Result<C, ConfigurationError> + 'static,
    {
        self.register(kind, factory);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Construct the component a descriptor names.
    pub fn build(&self, descriptor: &Descriptor) -> Result<Box<dyn Component>, ConfigurationError> {
        let factory = self
            .factories
            .get(&descriptor.kind)
            .ok_or_else(|| ConfigurationError::UnknownComponent(descriptor.kind.clone()))?;
        factory(&descriptor.props)
    }
}
