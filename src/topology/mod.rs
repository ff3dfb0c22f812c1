//! Identity and bookkeeping for mesh entities.
//!
//! This module provides:
//! - Typed, stable handles for points, faces and cells
//! - The arena that stores entities behind those handles
//! - Boundary patch types and face zones
//! - The face/boundary index ledger

pub mod arena;
pub mod handle;
pub mod ledger;
pub mod patch;

pub use handle::{CellHandle, FaceHandle, PointHandle};
pub use ledger::FaceLedger;
pub use patch::{FaceZone, Patch, PatchKind};
