//! Window id to context target mappings.
//!
//! A context target may back several windows, but a window is mapped to at
//! most one target. Window id `0` is never a valid window.
//!
//! Targets are only unique within the renderer that created them, so every
//! mapping also records the active slot of that renderer.

use std::collections::HashMap;

use crate::assets::target::TargetHandle;
use crate::errors::*;

/// A target of the renderer living in active slot `slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotTarget {
    pub slot: usize,
    pub target: TargetHandle,
}

impl SlotTarget {
    #[inline]
    pub fn new(slot: usize, target: TargetHandle) -> Self {
        SlotTarget { slot, target }
    }
}

#[derive(Debug, Default)]
pub struct WindowMappings {
    mappings: HashMap<u32, SlotTarget>,
}

impl WindowMappings {
    pub fn new() -> Self {
        WindowMappings {
            mappings: HashMap::new(),
        }
    }

    /// Fails if `window_id` is mapped to anything but `target`.
    pub fn check(&self, window_id: u32, target: SlotTarget) -> Result<()> {
        match self.get(window_id) {
            Some(v) if v != target => Err(Error::data(format!(
                "WindowID {} already has a mapping.",
                window_id
            ))),
            _ => Ok(()),
        }
    }

    /// Maps `window_id` to `target`.
    ///
    /// Mapping a window to the target it already maps to does nothing.
    /// Mapping it to a different target fails and keeps the existing mapping.
    pub fn add(&mut self, window_id: u32, target: SlotTarget) -> Result<()> {
        if window_id == 0 {
            return Ok(());
        }

        self.check(window_id, target)?;
        self.mappings.insert(window_id, target);
        Ok(())
    }

    /// Removes the mapping of `window_id`, returning the target it mapped to.
    pub fn remove(&mut self, window_id: u32) -> Option<SlotTarget> {
        if window_id == 0 {
            return None;
        }

        self.mappings.remove(&window_id)
    }

    /// Removes every mapping to `target`, returning the unmapped window ids.
    pub fn remove_by_target(&mut self, target: SlotTarget) -> Vec<u32> {
        self.remove_where(|v| v == target)
    }

    /// Removes every mapping to a target of the renderer in `slot`.
    pub fn remove_by_slot(&mut self, slot: usize) -> Vec<u32> {
        self.remove_where(|v| v.slot == slot)
    }

    fn remove_where<F>(&mut self, func: F) -> Vec<u32>
    where
        F: Fn(SlotTarget) -> bool,
    {
        let mut ids: Vec<_> = self
            .mappings
            .iter()
            .filter(|&(_, &v)| func(v))
            .map(|(&k, _)| k)
            .collect();

        ids.sort();
        for id in &ids {
            self.mappings.remove(id);
        }

        ids
    }

    #[inline]
    pub fn get(&self, window_id: u32) -> Option<SlotTarget> {
        if window_id == 0 {
            return None;
        }

        self.mappings.get(&window_id).cloned()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.mappings.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::Handle;

    fn target(slot: usize, index: u32) -> SlotTarget {
        SlotTarget::new(slot, TargetHandle::from(Handle::new(index, 1)))
    }

    #[test]
    fn basic() {
        let t1 = target(0, 0);
        let t2 = target(0, 1);

        let mut mappings = WindowMappings::new();
        mappings.add(1, t1).unwrap();
        mappings.add(2, t1).unwrap();
        mappings.add(1, t1).unwrap();
        assert_eq!(mappings.len(), 2);

        let err = mappings.add(1, t2).unwrap_err();
        assert_eq!(err.code, ErrorCode::Data);
        assert_eq!(err.details, "WindowID 1 already has a mapping.");
        assert_eq!(mappings.get(1), Some(t1));

        assert_eq!(mappings.remove_by_target(t1), vec![1, 2]);
        assert!(mappings.is_empty());
    }

    #[test]
    fn renderers() {
        // Both renderers hand out the same first handle.
        let t1 = target(0, 0);
        let t2 = target(1, 0);
        assert_eq!(t1.target, t2.target);

        let mut mappings = WindowMappings::new();
        mappings.add(1, t1).unwrap();
        assert!(mappings.check(1, t2).is_err());
        assert!(mappings.add(1, t2).is_err());

        mappings.add(2, t2).unwrap();
        mappings.add(3, t2).unwrap();
        assert_eq!(mappings.remove_by_target(t2), vec![2, 3]);

        mappings.add(4, t2).unwrap();
        assert_eq!(mappings.remove_by_slot(0), vec![1]);
        assert_eq!(mappings.get(4), Some(t2));
    }

    #[test]
    fn zero_id() {
        let t1 = target(0, 0);

        let mut mappings = WindowMappings::new();
        mappings.add(0, t1).unwrap();
        assert!(mappings.is_empty());
        assert!(mappings.check(0, t1).is_ok());
        assert_eq!(mappings.get(0), None);
        assert_eq!(mappings.remove(0), None);
    }
}
