//! Stable, typed handles for mesh entities.
//!
//! Points, faces and cells are addressed by a `Handle<Tag>` that wraps the
//! arena slot the entity was created in. Handles are never renumbered:
//! removing an entity leaves its slot vacant, so every surviving handle stays
//! valid across insertions and deletions, and a handle to a removed entity
//! simply stops resolving.
//!
//! The tag parameter keeps the three handle families apart at compile time;
//! a `FaceHandle` cannot be used to look up a cell.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker trait for handle families.
pub trait HandleTag: 'static + Copy + Send + Sync {
    /// Short name used by `Debug` output.
    const NAME: &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct PointTag;
#[derive(Debug, Clone, Copy)]
pub struct FaceTag;
#[derive(Debug, Clone, Copy)]
pub struct CellTag;

impl HandleTag for PointTag {
    const NAME: &'static str = "Point";
}
impl HandleTag for FaceTag {
    const NAME: &'static str = "Face";
}
impl HandleTag for CellTag {
    const NAME: &'static str = "Cell";
}

/// Opaque, permanent identity of a mesh entity.
///
/// # Memory layout
/// `repr(transparent)` over `u32`; the tag is a zero-sized function-pointer
/// phantom so `Handle` is `Copy`/`Send`/`Sync` regardless of `Tag`.
#[repr(transparent)]
pub struct Handle<Tag> {
    slot: u32,
    _tag: PhantomData<fn() -> Tag>,
}

pub type PointHandle = Handle<PointTag>;
pub type FaceHandle = Handle<FaceTag>;
pub type CellHandle = Handle<CellTag>;

impl<Tag> Handle<Tag> {
    #[inline]
    pub(crate) const fn from_slot(slot: u32) -> Self {
        Self {
            slot,
            _tag: PhantomData,
        }
    }

    /// Arena slot backing this handle.
    ///
    /// Slots are assigned in creation order and never reused, so comparing
    /// slots compares creation order.
    #[inline]
    pub const fn slot(self) -> usize {
        self.slot as usize
    }
}

impl<Tag> Copy for Handle<Tag> {}

impl<Tag> Clone for Handle<Tag> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<Tag> PartialEq for Handle<Tag> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl<Tag> Eq for Handle<Tag> {}

impl<Tag> PartialOrd for Handle<Tag> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Tag> Ord for Handle<Tag> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.slot.cmp(&other.slot)
    }
}

impl<Tag> Hash for Handle<Tag> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
    }
}

// -----------------------------------------------------------------------------
// Formatting traits
// -----------------------------------------------------------------------------

/// Displays as `Face(12)`, `Cell(3)`, ...
impl<Tag: HandleTag> fmt::Debug for Handle<Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(Tag::NAME).field(&self.slot).finish()
    }
}

/// Prints only the raw slot number.
impl<Tag> fmt::Display for Handle<Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slot)
    }
}

// -----------------------------------------------------------------------------
// Serialization: handles travel as their raw slot
// -----------------------------------------------------------------------------

impl<Tag> serde::Serialize for Handle<Tag> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.slot)
    }
}

impl<'de, Tag> serde::Deserialize<'de> for Handle<Tag> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let slot = <u32 as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::from_slot(slot))
    }
}
