//! Face/boundary index ledger.
//!
//! The canonical face order places every internal face first and then the
//! boundary faces of each patch, patch after patch:
//!
//! ```text
//! [ internal: 0..n_internal | patch 0: start0..start0+count0 | patch 1 ... ] = n_faces
//! ```
//!
//! The ledger keeps these counters up to date as faces are inserted and
//! removed, so the position ranges are known without rescanning the mesh.
//! [`FaceLedger::from_zones`] rebuilds the same counters from scratch; the two
//! must always agree.

use std::ops::Range;

use serde::Serialize;

use crate::mesh_error::MeshError;
use crate::topology::patch::{FaceZone, PatchKind};

/// Per-patch bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PatchEntry {
    pub kind: PatchKind,
    pub start: usize,
    pub count: usize,
}

/// Incrementally maintained face counters and patch ranges.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FaceLedger {
    n_faces: usize,
    n_internal: usize,
    patches: Vec<PatchEntry>,
}

impl FaceLedger {
    /// Creates a ledger with no faces for the given patch kinds.
    pub fn new<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = PatchKind>,
    {
        Self {
            n_faces: 0,
            n_internal: 0,
            patches: kinds
                .into_iter()
                .map(|kind| PatchEntry {
                    kind,
                    start: 0,
                    count: 0,
                })
                .collect(),
        }
    }

    /// Derives the ledger from the zone tag of every live face.
    pub fn from_zones<I>(kinds: &[PatchKind], zones: I) -> Result<Self, MeshError>
    where
        I: IntoIterator<Item = FaceZone>,
    {
        let mut n_internal = 0;
        let mut counts = vec![0usize; kinds.len()];
        for zone in zones {
            match zone {
                FaceZone::Internal => n_internal += 1,
                FaceZone::Boundary(p) => {
                    let slot = counts.get_mut(p).ok_or_else(|| {
                        MeshError::LedgerMismatch(format!(
                            "face tagged with patch {p}, but only {} patches exist",
                            kinds.len()
                        ))
                    })?;
                    *slot += 1;
                }
            }
        }
        let mut start = n_internal;
        let patches = kinds
            .iter()
            .zip(counts)
            .map(|(&kind, count)| {
                let entry = PatchEntry { kind, start, count };
                start += count;
                entry
            })
            .collect();
        Ok(Self {
            n_faces: start,
            n_internal,
            patches,
        })
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        self.n_faces
    }

    #[inline]
    pub fn n_internal(&self) -> usize {
        self.n_internal
    }

    #[inline]
    pub fn n_boundary(&self) -> usize {
        self.n_faces - self.n_internal
    }

    #[inline]
    pub fn n_patches(&self) -> usize {
        self.patches.len()
    }

    pub fn patches(&self) -> &[PatchEntry] {
        &self.patches
    }

    pub fn patch(&self, patch: usize) -> Option<&PatchEntry> {
        self.patches.get(patch)
    }

    /// Position range of the internal faces.
    #[inline]
    pub fn internal_range(&self) -> Range<usize> {
        0..self.n_internal
    }

    /// Position range of the faces of `patch`.
    pub fn patch_range(&self, patch: usize) -> Option<Range<usize>> {
        self.patches.get(patch).map(|e| e.start..e.start + e.count)
    }

    /// Position range of an arbitrary zone.
    pub fn zone_range(&self, zone: FaceZone) -> Option<Range<usize>> {
        match zone {
            FaceZone::Internal => Some(self.internal_range()),
            FaceZone::Boundary(p) => self.patch_range(p),
        }
    }

    /// Accounts for one new face appended to the end of `zone`.
    ///
    /// Every range that lies behind the insertion point moves up by one.
    pub fn record_insert(&mut self, zone: FaceZone) -> Result<(), MeshError> {
        match zone {
            FaceZone::Internal => {
                self.n_internal += 1;
                for entry in &mut self.patches {
                    entry.start += 1;
                }
            }
            FaceZone::Boundary(p) => {
                self.check_patch(p)?;
                self.patches[p].count += 1;
                for entry in &mut self.patches[p + 1..] {
                    entry.start += 1;
                }
            }
        }
        self.n_faces += 1;
        Ok(())
    }

    /// Accounts for the removal of one face of `zone`.
    pub fn record_remove(&mut self, zone: FaceZone) -> Result<(), MeshError> {
        match zone {
            FaceZone::Internal => {
                if self.n_internal == 0 {
                    return Err(MeshError::LedgerMismatch(
                        "removing an internal face from an empty internal range".into(),
                    ));
                }
                self.n_internal -= 1;
                for entry in &mut self.patches {
                    entry.start -= 1;
                }
            }
            FaceZone::Boundary(p) => {
                self.check_patch(p)?;
                if self.patches[p].count == 0 {
                    return Err(MeshError::LedgerMismatch(format!(
                        "removing a face from empty patch {p}"
                    )));
                }
                self.patches[p].count -= 1;
                for entry in &mut self.patches[p + 1..] {
                    entry.start -= 1;
                }
            }
        }
        self.n_faces -= 1;
        Ok(())
    }

    /// Checks that the ranges tile `0..n_faces` without gaps or overlaps.
    pub fn validate(&self) -> Result<(), MeshError> {
        let mut expected_start = self.n_internal;
        for (p, entry) in self.patches.iter().enumerate() {
            if entry.start != expected_start {
                return Err(MeshError::LedgerMismatch(format!(
                    "patch {p} starts at {}, expected {expected_start}",
                    entry.start
                )));
            }
            expected_start = entry.start + entry.count;
        }
        if expected_start != self.n_faces {
            return Err(MeshError::LedgerMismatch(format!(
                "last patch ends at {expected_start}, but there are {} faces",
                self.n_faces
            )));
        }
        Ok(())
    }

    fn check_patch(&self, p: usize) -> Result<(), MeshError> {
        if p < self.patches.len() {
            Ok(())
        } else {
            Err(MeshError::LedgerMismatch(format!(
                "patch {p} does not exist ({} patches)",
                self.patches.len()
            )))
        }
    }
}
