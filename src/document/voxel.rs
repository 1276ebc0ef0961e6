//! Voxel record and color type

use serde::{Deserialize, Serialize};

use crate::core::types::{IVec3, LayerId, TextureId, VoxelId};

/// RGBA color, alpha included. All channels 0-255.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully opaque color from RGB channels.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with an explicit alpha channel.
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Compare only the color channels, ignoring alpha.
    pub fn same_rgb(self, other: Rgba) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}

/// Number of faces on a voxel cube, the length of a face-texture array.
pub const FACE_COUNT: usize = 6;

/// A single voxel record.
///
/// Only `selected` and `color.a` are ever mutated in place; every other
/// change is carried out as a remove followed by an add so that edits stay
/// symmetric and reversible.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Voxel {
    pub id: VoxelId,
    pub position: IVec3,
    pub color: Rgba,
    pub selected: bool,
    /// Per-face texture ids, or `None` for an untextured voxel.
    pub texture: Option<[TextureId; FACE_COUNT]>,
    /// Owning layer.
    pub layer: LayerId,
}

impl Voxel {
    /// Create an unselected, untextured voxel.
    pub fn new(id: VoxelId, position: IVec3, color: Rgba, layer: LayerId) -> Self {
        Self {
            id,
            position,
            color,
            selected: false,
            texture: None,
            layer,
        }
    }

    /// Copy of this voxel at a different position.
    pub fn at(&self, position: IVec3) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }
}
