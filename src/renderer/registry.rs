use std::collections::HashMap;

use super::id::{RendererFamily, RendererId};
use crate::backends::Backend;
use crate::errors::*;

/// Default number of backend factories a registry accepts.
pub const MAX_REGISTERED_RENDERERS: usize = 10;

/// Creates and destroys the instances of one backend family.
pub trait BackendFactory {
    /// The family and version this factory provides, with an unbound index.
    fn id(&self) -> RendererId;

    /// Creates an instance for `request`.
    fn create(&self, request: RendererId) -> Result<Box<dyn Backend>>;

    /// Destroys an instance created by this factory.
    fn destroy(&self, backend: Box<dyn Backend>) {
        drop(backend);
    }
}

/// The backend factories available to a `GpuSystem`, keyed by family.
///
/// Registration order is kept for enumeration. It has no influence on which
/// backend gets picked at initialization.
pub struct RendererRegistry {
    factories: HashMap<RendererFamily, Box<dyn BackendFactory>>,
    order: Vec<RendererFamily>,
    capacity: usize,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        RendererRegistry::new()
    }
}

impl RendererRegistry {
    /// Constructs an empty registry.
    pub fn new() -> Self {
        RendererRegistry::with_capacity(MAX_REGISTERED_RENDERERS)
    }

    /// Constructs an empty registry accepting at most `capacity` factories.
    pub fn with_capacity(capacity: usize) -> Self {
        RendererRegistry {
            factories: HashMap::new(),
            order: Vec::new(),
            capacity,
        }
    }

    /// Constructs a registry holding every backend compiled into this build.
    pub fn builtin() -> Self {
        let mut registry = RendererRegistry::new();
        crate::backends::register_builtin(&mut registry);
        registry
    }

    /// Adds a factory. Returns false, without logging anything, if the
    /// registry is full or already holds a factory of the same family.
    pub fn register(&mut self, factory: Box<dyn BackendFactory>) -> bool {
        let family = factory.id().family;

        if self.factories.contains_key(&family) || self.order.len() >= self.capacity {
            return false;
        }

        self.factories.insert(family, factory);
        self.order.push(family);
        true
    }

    /// Finds the factory of the family of `id`. Versions are not compared.
    pub fn find_factory(&self, id: &RendererId) -> Option<&dyn BackendFactory> {
        self.factories.get(&id.family).map(|v| &**v)
    }

    /// Finds a factory by family alias, ignoring case.
    pub fn find_factory_by_name(&self, name: &str) -> Option<&dyn BackendFactory> {
        let family = name.parse::<RendererFamily>().ok()?;
        self.factories.get(&family).map(|v| &**v)
    }

    /// Returns the registered identity of `family`.
    pub fn id(&self, family: RendererFamily) -> Option<RendererId> {
        self.factories.get(&family).map(|v| v.id())
    }

    /// Lists the registered identities in registration order.
    pub fn list(&self) -> Vec<RendererId> {
        self.order
            .iter()
            .filter_map(|family| self.factories.get(family))
            .map(|v| v.id())
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates an instance for `request` with the factory of its family.
    pub fn create_instance(&self, request: RendererId) -> Result<Box<dyn Backend>> {
        let not_found = || {
            Error::backend(format!(
                "Could not create renderer: \"{}\" was not found in the renderer registry.",
                request
            ))
        };

        let factory = self.find_factory(&request).ok_or_else(not_found)?;
        factory.create(request).map_err(|err| {
            Error::backend(format!(
                "Could not create renderer: \"{}\" failed to create ({}).",
                request, err.details
            ))
        })
    }

    /// Hands `backend` back to the factory of its own family.
    pub fn destroy(&self, backend: Box<dyn Backend>) {
        match self.factories.get(&backend.id().family) {
            Some(factory) => factory.destroy(backend),
            None => drop(backend),
        }
    }
}
