use super::id::RendererId;
use super::registry::RendererRegistry;
use crate::backends::Backend;

/// Default number of renderers that may be alive at the same time.
pub const MAX_ACTIVE_RENDERERS: usize = 20;

/// The live backend instances, each stored in the slot its identity names.
pub struct ActiveRenderers {
    slots: Vec<Option<Box<dyn Backend>>>,
}

impl Default for ActiveRenderers {
    fn default() -> Self {
        ActiveRenderers::new()
    }
}

impl ActiveRenderers {
    pub fn new() -> Self {
        ActiveRenderers::with_capacity(MAX_ACTIVE_RENDERERS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        ActiveRenderers { slots }
    }

    /// Places `backend` in the first empty slot and stamps its index. A full
    /// table hands the backend back.
    pub fn add(&mut self, mut backend: Box<dyn Backend>) -> Result<usize, Box<dyn Backend>> {
        match self.slots.iter().position(|v| v.is_none()) {
            Some(slot) => {
                backend.set_index(slot as i32);
                self.slots[slot] = Some(backend);
                Ok(slot)
            }
            None => Err(backend),
        }
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<&dyn Backend> {
        match self.slots.get(slot) {
            Some(Some(v)) => Some(&**v),
            _ => None,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut (dyn Backend + 'static)> {
        match self.slots.get_mut(slot) {
            Some(Some(v)) => Some(&mut **v),
            _ => None,
        }
    }

    /// Finds the slot of the first instance matching the family and version
    /// of `id`.
    pub fn find(&self, id: &RendererId) -> Option<usize> {
        self.slots.iter().position(|v| match v {
            Some(backend) => backend.id().matches(id),
            None => false,
        })
    }

    /// Removes the instance in the slot named by `id`, provided its family
    /// matches, and destroys it through the registry.
    pub fn remove(&mut self, id: &RendererId, registry: &RendererRegistry) -> bool {
        if id.index < 0 {
            return false;
        }

        let slot = id.index as usize;
        let matched = match self.slots.get(slot) {
            Some(Some(backend)) => backend.id().same_family(id),
            _ => false,
        };

        if !matched {
            return false;
        }

        match self.take(slot) {
            Some(backend) => {
                registry.destroy(backend);
                true
            }
            None => false,
        }
    }

    /// Clears `slot` and returns its instance.
    #[inline]
    pub fn take(&mut self, slot: usize) -> Option<Box<dyn Backend>> {
        self.slots.get_mut(slot).and_then(|v| v.take())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|v| v.is_some()).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Identities of the live instances, in slot order.
    pub fn ids(&self) -> Vec<RendererId> {
        self.slots
            .iter()
            .filter_map(|v| v.as_ref())
            .map(|v| v.id())
            .collect()
    }

    /// Slots currently holding an instance.
    pub fn slots(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|&(_, v)| v.is_some())
            .map(|(i, _)| i)
            .collect()
    }
}
