use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::handle::{Handle, HandleIndex};

/// Objects of type `T`, named by typed handles `H`.
///
/// Freed indices are recycled lowest first, and every slot carries a version
/// that is odd while alive, so stale handles never alias a new object.
pub struct ObjectPool<H, T> {
    versions: Vec<HandleIndex>,
    frees: BinaryHeap<Reverse<HandleIndex>>,
    entries: Vec<Option<T>>,
    _marker: ::std::marker::PhantomData<H>,
}

impl<H, T> Default for ObjectPool<H, T>
where
    H: Copy + From<Handle> + Into<Handle>,
{
    fn default() -> Self {
        ObjectPool::new()
    }
}

impl<H, T> ObjectPool<H, T>
where
    H: Copy + From<Handle> + Into<Handle>,
{
    pub fn new() -> Self {
        ObjectPool {
            versions: Vec::new(),
            frees: BinaryHeap::new(),
            entries: Vec::new(),
            _marker: ::std::marker::PhantomData,
        }
    }

    /// Stores `value`, returning its new handle.
    pub fn create(&mut self, value: T) -> H {
        let handle = if let Some(Reverse(index)) = self.frees.pop() {
            let i = index as usize;
            self.versions[i] += 1;
            self.entries[i] = Some(value);
            Handle::new(index, self.versions[i])
        } else {
            self.versions.push(1);
            self.entries.push(Some(value));
            Handle::new(self.versions.len() as HandleIndex - 1, 1)
        };

        H::from(handle)
    }

    /// The slot of `handle`, if it names a live object.
    #[inline]
    fn slot(&self, handle: H) -> Option<usize> {
        let handle: Handle = handle.into();
        let index = handle.index() as usize;
        let alive = index < self.versions.len()
            && (self.versions[index] & 0x1) == 1
            && self.versions[index] == handle.version();

        if alive {
            Some(index)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_alive(&self, handle: H) -> bool {
        self.slot(handle).is_some()
    }

    #[inline]
    pub fn get(&self, handle: H) -> Option<&T> {
        let index = self.slot(handle)?;
        self.entries[index].as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        let index = self.slot(handle)?;
        self.entries[index].as_mut()
    }

    /// Removes the object named by `handle`. Its slot is reused by later
    /// objects under a new version.
    pub fn free(&mut self, handle: H) -> Option<T> {
        let index = self.slot(handle)?;
        self.versions[index] += 1;
        self.frees.push(Reverse(index as HandleIndex));
        self.entries[index].take()
    }

    /// The number of live objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.versions.len() - self.frees.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the handles of every alive object, in index order.
    pub fn handles(&self) -> Vec<H> {
        self.versions
            .iter()
            .enumerate()
            .filter(|&(_, v)| (v & 0x1) == 1)
            .map(|(i, &v)| H::from(Handle::new(i as HandleIndex, v)))
            .collect()
    }

    /// Removes every object, handing them back in index order.
    pub fn drain(&mut self) -> Vec<(H, T)> {
        let mut objects = Vec::new();
        for handle in self.handles() {
            if let Some(v) = self.free(handle) {
                objects.push((handle, v));
            }
        }

        objects
    }
}
