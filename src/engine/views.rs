//! Diff polls and derived-view reads
//!
//! Consumers are opaque string ids. Each one independently asks "what
//! changed since I last looked"; the first poll of a consumer answers with
//! a full snapshot instead.

use crate::core::types::SlicePlane;
use crate::diff::VoxelDiff;
use crate::document::Voxel;

use super::Engine;

/// Consumer id feeding the engine's own incremental composition buffer.
const INTERNAL_VISIBLE: &str = "__internal_visible__";

impl Engine {
    /// What changed in the merged visible composition since this consumer
    /// last polled.
    pub fn poll_visible(&mut self, consumer: &str) -> VoxelDiff {
        if self.diffs.register_visible(consumer) {
            return VoxelDiff::Reset(self.caches.merged(&self.document).to_vec());
        }
        let mut removed = Vec::new();
        let mut added = Vec::new();
        for pos in self.diffs.take_visible(consumer) {
            match self.document.visible_voxel_at(pos) {
                Some(voxel) => added.push(voxel.clone()),
                None => removed.push(pos),
            }
        }
        VoxelDiff::Delta { removed, added }
    }

    /// What changed among selected visible voxels since this consumer
    /// last polled. A cell whose voxel got deselected reports as removed.
    pub fn poll_selected(&mut self, consumer: &str) -> VoxelDiff {
        if self.diffs.register_selected(consumer) {
            return VoxelDiff::Reset(self.caches.selected(&self.document).to_vec());
        }
        let mut removed = Vec::new();
        let mut added = Vec::new();
        for pos in self.diffs.take_selected(consumer) {
            match self.document.visible_voxel_at(pos) {
                Some(voxel) if voxel.selected => added.push(voxel.clone()),
                _ => removed.push(pos),
            }
        }
        VoxelDiff::Delta { removed, added }
    }

    /// What changed in one cross-section plane since this consumer last
    /// polled it. Planes are tracked independently per (orientation,
    /// consumer, plane value).
    pub fn poll_slice(&mut self, consumer: &str, plane: SlicePlane, value: i32) -> VoxelDiff {
        self.diffs.register_slice_consumer(plane, consumer);
        if !self.diffs.slice_known(plane, consumer, value) {
            self.diffs.mark_slice_fetched(plane, consumer, value);
            return VoxelDiff::Reset(self.caches.slice(&self.document, plane, value).to_vec());
        }
        let mut removed = Vec::new();
        let mut added = Vec::new();
        for pos in self.diffs.take_slice(plane, consumer, value) {
            match self.document.visible_voxel_at(pos) {
                Some(voxel) => added.push(voxel.clone()),
                None => removed.push(pos),
            }
        }
        VoxelDiff::Delta { removed, added }
    }

    /// Force a full refetch for one plane of one consumer, e.g. when a
    /// slice viewer scrolls to a plane it dropped.
    pub fn invalidate_slice(&mut self, consumer: &str, plane: SlicePlane, value: i32) {
        self.diffs.forget_slice(plane, consumer, value);
    }

    /// Drop all diff state held for a consumer across every family.
    pub fn release_consumer(&mut self, consumer: &str) {
        self.diffs.release_consumer(consumer);
    }

    /// The merged visible composition, maintained incrementally between
    /// edits through an internal diff consumer.
    pub fn visible_voxels(&mut self) -> Vec<Voxel> {
        self.refresh_live();
        self.caches.live_buffer().to_vec()
    }

    /// True when any voxel is visible at all.
    pub fn any_voxels_visible(&mut self) -> bool {
        self.refresh_live();
        self.caches.any_visible()
    }

    fn refresh_live(&mut self) {
        let diff = self.poll_visible(INTERNAL_VISIBLE);
        self.caches.apply_live_diff(&diff);
    }

    /// Copies of every selected visible voxel.
    pub fn selected_voxels(&mut self) -> Vec<Voxel> {
        self.caches.selected(&self.document).to_vec()
    }

    /// Cross-section of the composition at `z`.
    pub fn slice_xy(&mut self, z: i32) -> Vec<Voxel> {
        self.caches.slice(&self.document, SlicePlane::Xy, z).to_vec()
    }

    /// Cross-section of the composition at `y`.
    pub fn slice_xz(&mut self, y: i32) -> Vec<Voxel> {
        self.caches.slice(&self.document, SlicePlane::Xz, y).to_vec()
    }

    /// Cross-section of the composition at `x`.
    pub fn slice_yz(&mut self, x: i32) -> Vec<Voxel> {
        self.caches.slice(&self.document, SlicePlane::Yz, x).to_vec()
    }
}
