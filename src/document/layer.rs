//! Layer shell owning a per-layer spatial index

use crate::core::types::{IVec3, LayerId, VoxelId};
use crate::math::GridBox;

use super::index::GridIndex;

/// A document layer: name, visibility flag and the spatial index of the
/// voxels it owns. At most one live voxel per position within a layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    name: String,
    visible: bool,
    index: GridIndex,
}

impl Layer {
    /// Create an empty, visible layer capped at `capacity` voxels.
    pub fn new(id: LayerId, name: impl Into<String>, capacity: usize) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            index: GridIndex::with_capacity(capacity),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Number of voxels in the layer.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// True while another voxel still fits under the capacity.
    pub fn has_room(&self) -> bool {
        self.index.has_room()
    }

    /// True when no voxel of this layer occupies the position.
    pub fn position_free(&self, pos: IVec3) -> bool {
        self.index.position_free(pos)
    }

    /// Voxel id at an exact position.
    pub fn voxel_at(&self, pos: IVec3) -> Option<VoxelId> {
        self.index.get(pos)
    }

    /// Index a voxel position. Refused at capacity or on an occupied cell.
    pub fn insert(&mut self, pos: IVec3, id: VoxelId) -> bool {
        self.index.insert(pos, id)
    }

    /// Drop a voxel position from the index.
    pub fn remove(&mut self, pos: IVec3) -> Option<VoxelId> {
        self.index.remove(pos)
    }

    /// Every voxel within the inclusive cube around `center`.
    pub fn search(&self, center: IVec3, radius: i32) -> Vec<(IVec3, VoxelId)> {
        self.index.search(center, radius)
    }

    /// Every voxel inside an inclusive box.
    pub fn search_box(&self, b: &GridBox) -> Vec<(IVec3, VoxelId)> {
        self.index.search_box(b)
    }

    /// All indexed positions with their voxel ids.
    pub fn iter(&self) -> impl Iterator<Item = (IVec3, VoxelId)> + '_ {
        self.index.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_layer_is_visible_and_empty() {
        let layer = Layer::new(LayerId(0), "Layer 1", 10);
        assert!(layer.visible());
        assert!(layer.is_empty());
        assert_eq!(layer.name(), "Layer 1");
    }

    #[test]
    fn test_position_uniqueness_within_layer() {
        let mut layer = Layer::new(LayerId(0), "l", 10);
        assert!(layer.insert(IVec3::ZERO, VoxelId(1)));
        assert!(!layer.insert(IVec3::ZERO, VoxelId(2)));
        assert_eq!(layer.voxel_at(IVec3::ZERO), Some(VoxelId(1)));
    }

    #[test]
    fn test_capacity_enforced() {
        let mut layer = Layer::new(LayerId(0), "l", 1);
        assert!(layer.insert(IVec3::ZERO, VoxelId(1)));
        assert!(!layer.insert(IVec3::new(1, 0, 0), VoxelId(2)));
        layer.remove(IVec3::ZERO);
        assert!(layer.insert(IVec3::new(1, 0, 0), VoxelId(2)));
    }
}
