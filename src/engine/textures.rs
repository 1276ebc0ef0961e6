//! Texture asset mutators and reads

use image::RgbaImage;

use crate::core::types::{TextureId, VoxelId};
use crate::document::{TextureAsset, FACE_COUNT};
use crate::history::VoxelIntent;

use super::Engine;

impl Engine {
    /// Add a texture asset and select it. Refused when the image does not
    /// match the required dimensions.
    pub fn add_texture(&mut self, image: RgbaImage) -> bool {
        let asset = match TextureAsset::new(image, self.document.config.texture_size) {
            Ok(asset) => asset,
            Err(err) => {
                log::debug!("texture rejected: {err}");
                return false;
            }
        };
        let texture_id = self.document.allocate_texture_id();
        self.submit(VoxelIntent::add_texture(texture_id, asset));
        true
    }

    /// Remove a texture. Blocked while any voxel still references it.
    pub fn remove_texture(&mut self, texture_id: TextureId) -> bool {
        if self.texture_referenced(texture_id) {
            return false;
        }
        if !self.document.textures.contains_key(&texture_id) {
            return false;
        }
        self.submit(VoxelIntent::remove_texture(texture_id));
        true
    }

    /// Remove every texture no voxel references. Refused when the texture
    /// list is empty.
    pub fn remove_unused_textures(&mut self) -> bool {
        if self.document.textures.is_empty() {
            return false;
        }
        self.submit(VoxelIntent::remove_unused_textures());
        true
    }

    /// Swap the pixel content of an existing texture.
    pub fn replace_texture(&mut self, texture_id: TextureId, image: RgbaImage) -> bool {
        if !self.document.textures.contains_key(&texture_id) {
            return false;
        }
        let asset = match TextureAsset::new(image, self.document.config.texture_size) {
            Ok(asset) => asset,
            Err(err) => {
                log::debug!("replacement texture rejected: {err}");
                return false;
            }
        };
        self.submit(VoxelIntent::replace_texture(texture_id, asset));
        true
    }

    /// All texture ids, ascending.
    pub fn texture_ids(&self) -> Vec<TextureId> {
        let mut ids: Vec<TextureId> = self.document.textures.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Copy of a texture's pixels.
    pub fn texture(&self, texture_id: TextureId) -> Option<RgbaImage> {
        self.document
            .textures
            .get(&texture_id)
            .map(|asset| asset.image().clone())
    }

    /// Content hash of a texture, empty for an unknown id (or when the
    /// encode failed and the hash degraded).
    pub fn texture_hash(&mut self, texture_id: TextureId) -> String {
        self.document
            .textures
            .get_mut(&texture_id)
            .map(|asset| asset.content_hash().to_string())
            .unwrap_or_default()
    }

    /// Change the selected texture through the log. An unknown id
    /// deselects, like `None`.
    pub fn select_texture(&mut self, texture_id: Option<TextureId>) -> bool {
        let target = texture_id.filter(|id| self.document.textures.contains_key(id));
        if self.document.selected_texture == target {
            return false;
        }
        self.submit(VoxelIntent::select_texture(target));
        true
    }

    /// Change the selected texture without a log entry.
    pub fn select_texture_soft(&mut self, texture_id: Option<TextureId>) -> bool {
        let valid = texture_id.is_none_or(|id| self.document.textures.contains_key(&id));
        if !valid || self.document.selected_texture == texture_id {
            return false;
        }
        self.document.selected_texture = texture_id;
        if let Some(notifier) = self.notifier.as_mut() {
            notifier.texture_data_changed();
        }
        true
    }

    /// The selected texture; a stale selection heals to `None`.
    pub fn selected_texture(&mut self) -> Option<TextureId> {
        if let Some(id) = self.document.selected_texture {
            if !self.document.textures.contains_key(&id) {
                self.select_texture_soft(None);
            }
        }
        self.document.selected_texture
    }

    /// Texture one face of a voxel, or all six when the voxel was bare.
    /// `None` strips the texture. Refused when nothing would change.
    pub fn set_voxel_texture(
        &mut self,
        voxel_id: VoxelId,
        face: usize,
        texture_id: Option<TextureId>,
    ) -> bool {
        if face >= FACE_COUNT {
            return false;
        }
        let Some(voxel) = self.document.voxel(voxel_id) else {
            return false;
        };
        let accepted = match texture_id {
            Some(id) => {
                self.document.textures.contains_key(&id)
                    && voxel.texture.map(|faces| faces[face]) != Some(id)
            }
            None => voxel.texture.is_some(),
        };
        if !accepted {
            return false;
        }
        self.submit(VoxelIntent::texture_voxel(voxel_id, Some(face), texture_id));
        true
    }

    /// Texture all six faces of many voxels at once.
    pub fn mass_set_voxel_texture(&mut self, voxel_ids: &[VoxelId], texture_id: TextureId) -> bool {
        if !self.document.textures.contains_key(&texture_id) {
            return false;
        }
        let valid: Vec<VoxelId> = voxel_ids
            .iter()
            .filter(|id| self.document.voxel(**id).is_some())
            .copied()
            .collect();
        if valid.is_empty() {
            return false;
        }
        self.submit(VoxelIntent::mass_texture(valid, texture_id));
        true
    }

    /// Face-texture array of a voxel, `None` when untextured or unknown.
    pub fn voxel_texture(&self, voxel_id: VoxelId) -> Option<[TextureId; FACE_COUNT]> {
        self.document.voxel(voxel_id).and_then(|v| v.texture)
    }

    fn texture_referenced(&self, texture_id: TextureId) -> bool {
        self.document.voxels.values().any(|voxel| {
            voxel
                .texture
                .map(|faces| faces.contains(&texture_id))
                .unwrap_or(false)
        })
    }
}
