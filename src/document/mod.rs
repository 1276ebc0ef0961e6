//! Canonical entity store: voxels, layers, textures and their ordering

pub mod index;
pub mod layer;
pub mod texture;
pub mod voxel;

pub use index::GridIndex;
pub use layer::Layer;
pub use texture::TextureAsset;
pub use voxel::{Rgba, Voxel, FACE_COUNT};

use std::collections::HashMap;

use crate::core::types::{IVec3, LayerId, TextureId, VoxelId};

/// Tunables for a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Hard cap on live voxels per layer
    pub max_voxels_per_layer: usize,
    /// Required edge length for newly added textures
    pub texture_size: u32,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_voxels_per_layer: 100_000,
            texture_size: 32,
        }
    }
}

/// The canonical container. Owned exclusively by the engine; mutation
/// happens through intents, reads hand out copies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub voxels: HashMap<VoxelId, Voxel>,
    pub layers: HashMap<LayerId, Layer>,
    /// Paint order; index 0 is the topmost layer. Always a permutation of
    /// the `layers` key set.
    pub layer_order: Vec<LayerId>,
    pub selected_layer: Option<LayerId>,
    pub textures: HashMap<TextureId, TextureAsset>,
    pub selected_texture: Option<TextureId>,
    pub config: DocumentConfig,
    next_voxel_id: u64,
    next_layer_id: u64,
    next_texture_id: u64,
}

impl Document {
    pub fn new(config: DocumentConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Monotonic voxel id allocation; freed ids are never reused.
    pub fn allocate_voxel_id(&mut self) -> VoxelId {
        let id = VoxelId(self.next_voxel_id);
        self.next_voxel_id += 1;
        id
    }

    pub fn allocate_layer_id(&mut self) -> LayerId {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        id
    }

    pub fn allocate_texture_id(&mut self) -> TextureId {
        let id = TextureId(self.next_texture_id);
        self.next_texture_id += 1;
        id
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    pub fn voxel(&self, id: VoxelId) -> Option<&Voxel> {
        self.voxels.get(&id)
    }

    /// Insert a voxel into the store and its layer's index. Refused (with
    /// no state change) when the layer is missing, full, or the position
    /// is already taken.
    pub fn insert_voxel(&mut self, voxel: Voxel) -> bool {
        let Some(layer) = self.layers.get_mut(&voxel.layer) else {
            return false;
        };
        if !layer.insert(voxel.position, voxel.id) {
            return false;
        }
        self.voxels.insert(voxel.id, voxel);
        true
    }

    /// Remove a voxel from the store and its layer's index.
    pub fn extract_voxel(&mut self, id: VoxelId) -> Option<Voxel> {
        let voxel = self.voxels.remove(&id)?;
        if let Some(layer) = self.layers.get_mut(&voxel.layer) {
            layer.remove(voxel.position);
        }
        Some(voxel)
    }

    /// Ids of every voxel in a layer.
    pub fn layer_voxel_ids(&self, layer_id: LayerId) -> Vec<VoxelId> {
        self.layer(layer_id)
            .map(|layer| layer.iter().map(|(_, id)| id).collect())
            .unwrap_or_default()
    }

    /// Copies of every voxel in a layer.
    pub fn layer_voxels(&self, layer_id: LayerId) -> Vec<Voxel> {
        self.layer(layer_id)
            .map(|layer| {
                layer
                    .iter()
                    .filter_map(|(_, id)| self.voxels.get(&id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Topmost visible voxel at a position, walking the paint order.
    pub fn visible_voxel_at(&self, pos: IVec3) -> Option<&Voxel> {
        for layer_id in &self.layer_order {
            let Some(layer) = self.layers.get(layer_id) else {
                continue;
            };
            if !layer.visible() {
                continue;
            }
            if let Some(id) = layer.voxel_at(pos) {
                return self.voxels.get(&id);
            }
        }
        None
    }

    /// True when the position is unoccupied within one layer.
    pub fn position_free(&self, layer_id: LayerId, pos: IVec3) -> bool {
        self.layer(layer_id)
            .map(|layer| layer.position_free(pos))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_layer() -> (Document, LayerId) {
        let mut doc = Document::new(DocumentConfig::default());
        let id = doc.allocate_layer_id();
        doc.layers
            .insert(id, Layer::new(id, "base", doc.config.max_voxels_per_layer));
        doc.layer_order.insert(0, id);
        (doc, id)
    }

    #[test]
    fn test_id_allocation_is_monotonic() {
        let mut doc = Document::default();
        let a = doc.allocate_voxel_id();
        let b = doc.allocate_voxel_id();
        assert!(b > a);
    }

    #[test]
    fn test_insert_and_extract_voxel() {
        let (mut doc, layer) = doc_with_layer();
        let id = doc.allocate_voxel_id();
        let voxel = Voxel::new(id, IVec3::new(1, 1, 1), Rgba::rgb(9, 9, 9), layer);
        assert!(doc.insert_voxel(voxel.clone()));
        assert!(!doc.position_free(layer, IVec3::new(1, 1, 1)));

        let taken = doc.extract_voxel(id).unwrap();
        assert_eq!(taken, voxel);
        assert!(doc.position_free(layer, IVec3::new(1, 1, 1)));
        assert!(doc.voxels.is_empty());
    }

    #[test]
    fn test_insert_refused_without_layer() {
        let mut doc = Document::default();
        let id = doc.allocate_voxel_id();
        assert!(!doc.insert_voxel(Voxel::new(id, IVec3::ZERO, Rgba::rgb(0, 0, 0), LayerId(4))));
        assert!(doc.voxels.is_empty());
    }

    #[test]
    fn test_visible_voxel_at_respects_paint_order() {
        let (mut doc, bottom) = doc_with_layer();
        let top = doc.allocate_layer_id();
        doc.layers
            .insert(top, Layer::new(top, "top", doc.config.max_voxels_per_layer));
        doc.layer_order.insert(0, top);

        let pos = IVec3::new(2, 2, 2);
        let below = doc.allocate_voxel_id();
        let above = doc.allocate_voxel_id();
        doc.insert_voxel(Voxel::new(below, pos, Rgba::rgb(1, 0, 0), bottom));
        doc.insert_voxel(Voxel::new(above, pos, Rgba::rgb(0, 1, 0), top));

        assert_eq!(doc.visible_voxel_at(pos).unwrap().id, above);

        doc.layer_mut(top).unwrap().set_visible(false);
        assert_eq!(doc.visible_voxel_at(pos).unwrap().id, below);
    }
}
