//! Core type aliases and shared identifiers

use serde::{Deserialize, Serialize};

pub use glam::{DVec3, IVec3};

/// Standard Result type for the engine
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;

/// Unique identifier for a voxel. Never reused while the document lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelId(pub u64);

/// Unique identifier for a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

/// Unique identifier for a texture asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// One of the three grid axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index of this axis in an `IVec3`.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The other two axes, in ascending component order.
    pub fn others(self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        }
    }
}

/// Orientation of a 2-D cross-section through the grid.
///
/// A slice fixes one axis to a single plane value and spans the other two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlicePlane {
    /// XY cross-sections, keyed by z
    Xy,
    /// XZ cross-sections, keyed by y
    Xz,
    /// YZ cross-sections, keyed by x
    Yz,
}

impl SlicePlane {
    /// The axis a plane value pins down.
    pub fn fixed_axis(self) -> Axis {
        match self {
            SlicePlane::Xy => Axis::Z,
            SlicePlane::Xz => Axis::Y,
            SlicePlane::Yz => Axis::X,
        }
    }

    /// The plane a grid position belongs to for this orientation.
    pub fn plane_of(self, pos: IVec3) -> i32 {
        pos[self.fixed_axis().index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_others_ascending() {
        assert_eq!(Axis::X.others(), (1, 2));
        assert_eq!(Axis::Y.others(), (0, 2));
        assert_eq!(Axis::Z.others(), (0, 1));
    }

    #[test]
    fn test_slice_plane_of() {
        let pos = IVec3::new(4, 5, 6);
        assert_eq!(SlicePlane::Xy.plane_of(pos), 6);
        assert_eq!(SlicePlane::Xz.plane_of(pos), 5);
        assert_eq!(SlicePlane::Yz.plane_of(pos), 4);
    }
}
