//! Voxel mutators and point queries

use std::collections::HashSet;

use crate::core::types::{Axis, IVec3, LayerId, TextureId, VoxelId};
use crate::document::{Rgba, Voxel, FACE_COUNT};
use crate::history::VoxelIntent;
use crate::math::GridBox;

use super::Engine;

impl Engine {
    /// Add a voxel to the selected layer. Refused when no layer is
    /// selected, the layer is full, the cell is taken, or a face texture
    /// id is unknown.
    pub fn add_voxel(
        &mut self,
        color: Rgba,
        texture: Option<[TextureId; FACE_COUNT]>,
        pos: IVec3,
    ) -> Option<VoxelId> {
        let layer_id = self.document.selected_layer?;
        let layer = self.document.layer(layer_id)?;
        if !layer.has_room() || !layer.position_free(pos) {
            return None;
        }
        if let Some(faces) = &texture {
            if !faces.iter().all(|id| self.document.textures.contains_key(id)) {
                return None;
            }
        }
        let id = self.document.allocate_voxel_id();
        self.submit(VoxelIntent::add_voxel(Voxel {
            id,
            position: pos,
            color,
            selected: false,
            texture,
            layer: layer_id,
        }));
        Some(id)
    }

    /// Add many voxel records to the selected layer at once. Occupied
    /// cells and duplicate positions within the batch are dropped; the
    /// whole call is refused when nothing remains or the survivors would
    /// overflow the layer.
    pub fn mass_add_voxels(&mut self, voxels: &[Voxel]) -> bool {
        let Some(layer_id) = self.document.selected_layer else {
            return false;
        };
        let Some(layer) = self.document.layer(layer_id) else {
            return false;
        };
        let mut seen: HashSet<IVec3> = HashSet::new();
        let valid: Vec<Voxel> = voxels
            .iter()
            .filter(|v| layer.position_free(v.position) && seen.insert(v.position))
            .cloned()
            .collect();
        if valid.is_empty()
            || layer.len() + valid.len() > self.document.config.max_voxels_per_layer
        {
            return false;
        }
        self.submit(VoxelIntent::mass_add(valid, Some(layer_id)));
        true
    }

    pub fn remove_voxel(&mut self, voxel_id: VoxelId) -> bool {
        if self.document.voxel(voxel_id).is_none() {
            return false;
        }
        self.submit(VoxelIntent::remove_voxel(voxel_id));
        true
    }

    pub fn mass_remove_voxels(&mut self, voxel_ids: &[VoxelId]) -> bool {
        let valid: Vec<VoxelId> = voxel_ids
            .iter()
            .filter(|id| self.document.voxel(**id).is_some())
            .copied()
            .collect();
        if valid.is_empty() {
            return false;
        }
        self.submit(VoxelIntent::mass_remove(valid));
        true
    }

    /// Move one voxel to a new cell in its layer, evicting any occupant.
    pub fn move_voxel(&mut self, voxel_id: VoxelId, new_pos: IVec3) -> bool {
        if self.document.voxel(voxel_id).is_none() {
            return false;
        }
        self.submit(VoxelIntent::move_voxel(voxel_id, new_pos));
        true
    }

    /// Displace the given voxels by `offset`, evicting occupants at the
    /// destinations.
    pub fn mass_move_voxels(&mut self, voxels: &[Voxel], offset: IVec3) -> bool {
        if voxels.is_empty() || offset == IVec3::ZERO {
            return false;
        }
        self.submit(VoxelIntent::mass_move(voxels.to_vec(), offset));
        true
    }

    /// Rotate the given voxels about the midpoint of their bounding box.
    /// A rotation that is a multiple of a full turn is refused outright.
    pub fn rotate_voxels(&mut self, voxels: &[Voxel], axis: Axis, degrees: f32) -> bool {
        if voxels.is_empty() || degrees.rem_euclid(360.0) == 0.0 {
            return false;
        }
        self.submit(VoxelIntent::rotate_voxels(voxels.to_vec(), axis, degrees));
        true
    }

    /// Reflect the given voxels along one axis about their bounding-box
    /// midpoint.
    pub fn mirror_voxels(&mut self, voxels: &[Voxel], axis: Axis) -> bool {
        if voxels.is_empty() {
            return false;
        }
        self.submit(VoxelIntent::mirror_voxels(voxels.to_vec(), axis));
        true
    }

    pub fn voxel(&self, voxel_id: VoxelId) -> Option<Voxel> {
        self.document.voxel(voxel_id).cloned()
    }

    /// Recolor one voxel; the texture is dropped in the process. Refused
    /// when nothing would change.
    pub fn set_color(&mut self, voxel_id: VoxelId, color: Rgba) -> bool {
        let Some(voxel) = self.document.voxel(voxel_id) else {
            return false;
        };
        if voxel.color == color && voxel.texture.is_none() {
            return false;
        }
        self.submit(VoxelIntent::color_voxel(voxel_id, color));
        true
    }

    pub fn mass_set_color(&mut self, voxel_ids: &[VoxelId], color: Rgba) -> bool {
        let valid: Vec<VoxelId> = voxel_ids
            .iter()
            .filter(|id| self.document.voxel(**id).is_some())
            .copied()
            .collect();
        if valid.is_empty() {
            return false;
        }
        self.submit(VoxelIntent::mass_color(valid, color));
        true
    }

    pub fn color_of(&self, voxel_id: VoxelId) -> Option<Rgba> {
        self.document.voxel(voxel_id).map(|v| v.color)
    }

    /// In-place alpha change. Refused when the value already matches.
    pub fn set_alpha(&mut self, voxel_id: VoxelId, alpha: u8) -> bool {
        let Some(voxel) = self.document.voxel(voxel_id) else {
            return false;
        };
        if voxel.color.a == alpha {
            return false;
        }
        self.submit(VoxelIntent::alpha_voxel(voxel_id, alpha));
        true
    }

    pub fn alpha_of(&self, voxel_id: VoxelId) -> Option<u8> {
        self.document.voxel(voxel_id).map(|v| v.color.a)
    }

    pub fn layer_of(&self, voxel_id: VoxelId) -> Option<LayerId> {
        self.document.voxel(voxel_id).map(|v| v.layer)
    }

    /// Remove every voxel of the selected layer inside the inclusive cube
    /// around `center`. Refused when the cube is already empty.
    pub fn clear_range(&mut self, center: IVec3, radius: i32) -> bool {
        let Some(layer_id) = self.document.selected_layer else {
            return false;
        };
        let Some(layer) = self.document.layer(layer_id) else {
            return false;
        };
        if layer.search(center, radius).is_empty() {
            return false;
        }
        self.submit(VoxelIntent::clear_range(layer_id, center, radius));
        true
    }

    /// Fill every empty cell of the cube around `center` on the selected
    /// layer. Refused when the cube is already full or the fill would
    /// overflow the layer.
    pub fn fill_range(&mut self, center: IVec3, radius: i32, color: Rgba) -> bool {
        let Some(layer_id) = self.document.selected_layer else {
            return false;
        };
        let Some(layer) = self.document.layer(layer_id) else {
            return false;
        };
        let cells = GridBox::cube(center, radius).cell_count();
        let occupied = layer.search(center, radius).len() as u128;
        if occupied >= cells {
            return false;
        }
        let to_add = (cells - occupied) as usize;
        if layer.len() + to_add > self.document.config.max_voxels_per_layer {
            return false;
        }
        self.submit(VoxelIntent::fill_range(layer_id, center, radius, color));
        true
    }

    /// Remove every voxel of one layer. Refused on an empty layer.
    pub fn clear_layer(&mut self, layer_id: LayerId) -> bool {
        match self.document.layer(layer_id) {
            Some(layer) if !layer.is_empty() => {
                self.submit(VoxelIntent::clear_layer(layer_id));
                true
            }
            _ => false,
        }
    }

    /// Voxel at a cell: either on the selected layer (which must be
    /// visible), or the topmost visible match across all layers.
    pub fn search_voxel(&self, pos: IVec3, only_current_layer: bool) -> Option<Voxel> {
        if only_current_layer {
            let layer = self.document.layer(self.document.selected_layer?)?;
            if !layer.visible() {
                return None;
            }
            let id = layer.voxel_at(pos)?;
            self.document.voxel(id).cloned()
        } else {
            self.document.visible_voxel_at(pos).cloned()
        }
    }

    /// In-place selection flip. Refused when the flag already matches.
    pub fn set_voxel_selected(&mut self, voxel_id: VoxelId, selected: bool) -> bool {
        let Some(voxel) = self.document.voxel(voxel_id) else {
            return false;
        };
        if voxel.selected == selected {
            return false;
        }
        self.submit(VoxelIntent::select_voxel(voxel_id, selected));
        true
    }

    pub fn is_selected(&self, voxel_id: VoxelId) -> bool {
        self.document
            .voxel(voxel_id)
            .map(|v| v.selected)
            .unwrap_or(false)
    }

    pub fn mass_set_voxel_selected(&mut self, voxel_ids: &[VoxelId], selected: bool) -> bool {
        let valid: Vec<VoxelId> = voxel_ids
            .iter()
            .filter(|id| {
                self.document
                    .voxel(**id)
                    .is_some_and(|v| v.selected != selected)
            })
            .copied()
            .collect();
        if valid.is_empty() {
            return false;
        }
        self.submit(VoxelIntent::mass_select(valid, selected));
        true
    }

    /// Move the given voxels into a fresh layer and select it.
    pub fn migrate_voxels(&mut self, voxels: &[Voxel]) -> bool {
        if voxels.is_empty() || voxels.len() > self.document.config.max_voxels_per_layer {
            return false;
        }
        self.submit(VoxelIntent::migrate(voxels.to_vec()));
        true
    }

    pub fn voxel_count(&self, layer_id: LayerId) -> usize {
        self.document.layer(layer_id).map(|l| l.len()).unwrap_or(0)
    }
}
