//! Per-consumer change tracking
//!
//! Every edit marks its touched cells into the pending set of each
//! registered consumer. A poll resolves the marks against current ground
//! truth (last state wins, marks carry no values) and clears them. A
//! consumer's first poll instead signals a full refetch.

pub mod caches;

pub use caches::ViewCaches;

use std::collections::{HashMap, HashSet};

use crate::core::types::{IVec3, SlicePlane};
use crate::document::Voxel;
use crate::history::Effected;

/// Result of a diff poll.
#[derive(Clone, Debug, PartialEq)]
pub enum VoxelDiff {
    /// Discard everything previously fetched and use this full snapshot.
    Reset(Vec<Voxel>),
    /// Cells that emptied out and voxels that appeared or changed since
    /// the last poll.
    Delta {
        removed: Vec<IVec3>,
        added: Vec<Voxel>,
    },
}

impl VoxelDiff {
    /// True for a delta carrying no changes.
    pub fn is_empty(&self) -> bool {
        match self {
            VoxelDiff::Reset(_) => false,
            VoxelDiff::Delta { removed, added } => removed.is_empty() && added.is_empty(),
        }
    }
}

type Pending = HashSet<IVec3>;

/// Pending-set storage for all three diff families.
#[derive(Debug, Default)]
pub struct DiffTracker {
    visible: HashMap<String, Pending>,
    selected: HashMap<String, Pending>,
    /// (orientation, consumer) -> plane value -> pending cells
    slices: HashMap<(SlicePlane, String), HashMap<i32, Pending>>,
}

impl DiffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a visible-voxel consumer. True when it was new, meaning
    /// the caller owes it a full snapshot.
    pub fn register_visible(&mut self, consumer: &str) -> bool {
        match self.visible.contains_key(consumer) {
            true => false,
            false => {
                self.visible.insert(consumer.to_string(), Pending::new());
                true
            }
        }
    }

    /// Drain a visible consumer's pending cells.
    pub fn take_visible(&mut self, consumer: &str) -> Vec<IVec3> {
        self.visible
            .get_mut(consumer)
            .map(|pending| pending.drain().collect())
            .unwrap_or_default()
    }

    /// Register a selected-voxel consumer; see [`Self::register_visible`].
    pub fn register_selected(&mut self, consumer: &str) -> bool {
        match self.selected.contains_key(consumer) {
            true => false,
            false => {
                self.selected.insert(consumer.to_string(), Pending::new());
                true
            }
        }
    }

    /// Drain a selected consumer's pending cells.
    pub fn take_selected(&mut self, consumer: &str) -> Vec<IVec3> {
        self.selected
            .get_mut(consumer)
            .map(|pending| pending.drain().collect())
            .unwrap_or_default()
    }

    /// Make a slice consumer known for one orientation so edits start
    /// marking planes for it.
    pub fn register_slice_consumer(&mut self, plane: SlicePlane, consumer: &str) {
        self.slices
            .entry((plane, consumer.to_string()))
            .or_default();
    }

    /// True when the consumer has state for this plane value, either from
    /// a prior poll or from marks that arrived since.
    pub fn slice_known(&self, plane: SlicePlane, consumer: &str, value: i32) -> bool {
        self.slices
            .get(&(plane, consumer.to_string()))
            .is_some_and(|planes| planes.contains_key(&value))
    }

    /// Mark one plane as fetched with no pending cells.
    pub fn mark_slice_fetched(&mut self, plane: SlicePlane, consumer: &str, value: i32) {
        self.slices
            .entry((plane, consumer.to_string()))
            .or_default()
            .insert(value, Pending::new());
    }

    /// Drain one plane's pending cells.
    pub fn take_slice(&mut self, plane: SlicePlane, consumer: &str, value: i32) -> Vec<IVec3> {
        self.slices
            .get_mut(&(plane, consumer.to_string()))
            .and_then(|planes| planes.get_mut(&value))
            .map(|pending| pending.drain().collect())
            .unwrap_or_default()
    }

    /// Drop one plane's state so its next poll refetches in full.
    pub fn forget_slice(&mut self, plane: SlicePlane, consumer: &str, value: i32) {
        self.register_slice_consumer(plane, consumer);
        if let Some(planes) = self.slices.get_mut(&(plane, consumer.to_string())) {
            planes.remove(&value);
        }
    }

    /// Fan the touched cells of one outcome out to every registered
    /// consumer. `Everything` drops all pending state instead, forcing
    /// full refetches.
    pub fn mark(&mut self, effected: &Effected) {
        match effected {
            Effected::None => {}
            Effected::Positions(cells) => {
                for pending in self.visible.values_mut() {
                    pending.extend(cells.iter().copied());
                }
                for pending in self.selected.values_mut() {
                    pending.extend(cells.iter().copied());
                }
                // only planes a consumer has fetched accumulate marks; an
                // unfetched plane must answer its first poll with a full
                // snapshot instead
                for ((plane, _), planes) in self.slices.iter_mut() {
                    for pos in cells {
                        if let Some(pending) = planes.get_mut(&plane.plane_of(*pos)) {
                            pending.insert(*pos);
                        }
                    }
                }
            }
            Effected::Everything => self.clear(),
        }
    }

    /// Drop every consumer's pending state.
    pub fn clear(&mut self) {
        self.visible.clear();
        self.selected.clear();
        self.slices.clear();
    }

    /// Unregister one consumer across all three families, releasing its
    /// pending sets.
    pub fn release_consumer(&mut self, consumer: &str) {
        self.visible.remove(consumer);
        self.selected.remove(consumer);
        self.slices.retain(|(_, owner), _| owner != consumer);
    }
}
