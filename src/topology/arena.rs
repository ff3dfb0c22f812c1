//! Append-only arena storage addressed by typed handles.
//!
//! Slots are handed out in creation order and never recycled. Removing an
//! entity vacates its slot; every other handle keeps pointing at the same
//! entity, and the removed handle resolves to `None` from then on.
//!
//! ```text
//! Arena<T, Tag> {
//!     slots: [ Some(a), None, Some(c) ],   // slot 1 was removed
//!     live:  2,
//! }
//! ```

use crate::topology::handle::Handle;

/// Typed arena keyed by `Handle<Tag>`.
#[derive(Debug)]
pub struct Arena<T, Tag> {
    slots: Vec<Option<T>>,
    live: usize,
    _tag: std::marker::PhantomData<fn() -> Tag>,
}

impl<T: Clone, Tag> Clone for Arena<T, Tag> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            live: self.live,
            _tag: std::marker::PhantomData,
        }
    }
}

impl<T, Tag> Default for Arena<T, Tag> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Tag> Arena<T, Tag> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            _tag: std::marker::PhantomData,
        }
    }

    /// Stores `value` in a fresh slot and returns its handle.
    pub fn insert(&mut self, value: T) -> Handle<Tag> {
        debug_assert!(self.slots.len() < u32::MAX as usize, "arena slot space exhausted");
        let slot = self.slots.len() as u32;
        self.slots.push(Some(value));
        self.live += 1;
        Handle::from_slot(slot)
    }

    /// Removes the entity behind `handle`, leaving the slot vacant.
    pub fn remove(&mut self, handle: Handle<Tag>) -> Option<T> {
        let taken = self.slots.get_mut(handle.slot())?.take();
        if taken.is_some() {
            self.live -= 1;
        }
        taken
    }

    #[inline]
    pub fn get(&self, handle: Handle<Tag>) -> Option<&T> {
        self.slots.get(handle.slot()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: Handle<Tag>) -> Option<&mut T> {
        self.slots.get_mut(handle.slot()).and_then(Option::as_mut)
    }

    #[inline]
    pub fn contains(&self, handle: Handle<Tag>) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<Tag>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(slot, value)| {
            value
                .as_ref()
                .map(|v| (Handle::from_slot(slot as u32), v))
        })
    }

    /// Handles of live entities in creation order.
    pub fn handles(&self) -> impl Iterator<Item = Handle<Tag>> + '_ {
        self.iter().map(|(h, _)| h)
    }
}
