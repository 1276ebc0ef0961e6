//! GridIndex - spatial lookup for voxels within one layer

use std::collections::{HashMap, HashSet};

use crate::core::types::{IVec3, VoxelId};
use crate::math::GridBox;

/// Edge length of a grid cell bucket is `1 << CELL_BITS`.
const CELL_BITS: i32 = 3;

fn cell_of(pos: IVec3) -> IVec3 {
    IVec3::new(pos.x >> CELL_BITS, pos.y >> CELL_BITS, pos.z >> CELL_BITS)
}

fn cell_box(b: &GridBox) -> GridBox {
    GridBox {
        min: cell_of(b.min),
        max: cell_of(b.max),
    }
}

/// Quantized hash grid over integer 3-D points.
///
/// Exact lookups go through a flat position map; box queries visit either
/// the cells covered by the box or the occupied cells of the index,
/// whichever set is smaller, so plane-sized boxes stay proportional to
/// occupancy rather than extent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridIndex {
    /// Direct position lookup
    points: HashMap<IVec3, VoxelId>,
    /// Occupied positions bucketed by cell (sparse for large documents)
    cells: HashMap<IVec3, HashSet<IVec3>>,
    /// Maximum number of points this index accepts, 0 for unbounded
    capacity: usize,
}

impl GridIndex {
    /// Create an index refusing insertions beyond `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: HashMap::new(),
            cells: HashMap::new(),
            capacity,
        }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True while another point still fits under the capacity.
    pub fn has_room(&self) -> bool {
        self.capacity == 0 || self.points.len() < self.capacity
    }

    /// Insert a point. Refused when the position is taken or the index is
    /// at capacity.
    pub fn insert(&mut self, pos: IVec3, id: VoxelId) -> bool {
        if !self.has_room() || self.points.contains_key(&pos) {
            return false;
        }
        self.points.insert(pos, id);
        self.cells.entry(cell_of(pos)).or_default().insert(pos);
        true
    }

    /// Remove the point at a position.
    pub fn remove(&mut self, pos: IVec3) -> Option<VoxelId> {
        let id = self.points.remove(&pos)?;
        let cell = cell_of(pos);
        if let Some(members) = self.cells.get_mut(&cell) {
            members.remove(&pos);
            if members.is_empty() {
                self.cells.remove(&cell);
            }
        }
        Some(id)
    }

    /// Exact point lookup.
    pub fn get(&self, pos: IVec3) -> Option<VoxelId> {
        self.points.get(&pos).copied()
    }

    /// True when no point occupies the position.
    pub fn position_free(&self, pos: IVec3) -> bool {
        !self.points.contains_key(&pos)
    }

    /// All indexed positions with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (IVec3, VoxelId)> + '_ {
        self.points.iter().map(|(p, id)| (*p, *id))
    }

    /// Every point within the inclusive cube of side `2 * radius + 1`.
    /// Radius 0 is an exact point match.
    pub fn search(&self, center: IVec3, radius: i32) -> Vec<(IVec3, VoxelId)> {
        if radius <= 0 {
            return self
                .get(center)
                .map(|id| vec![(center, id)])
                .unwrap_or_default();
        }
        self.search_box(&GridBox::cube(center, radius))
    }

    /// Every point inside an inclusive axis-aligned box.
    pub fn search_box(&self, b: &GridBox) -> Vec<(IVec3, VoxelId)> {
        let cb = cell_box(b);
        let mut out = Vec::new();
        if cb.cell_count() <= self.cells.len() as u128 {
            for cx in cb.min.x..=cb.max.x {
                for cy in cb.min.y..=cb.max.y {
                    for cz in cb.min.z..=cb.max.z {
                        if let Some(members) = self.cells.get(&IVec3::new(cx, cy, cz)) {
                            self.collect_members(members, b, &mut out);
                        }
                    }
                }
            }
        } else {
            for (cell, members) in &self.cells {
                if cb.contains(*cell) {
                    self.collect_members(members, b, &mut out);
                }
            }
        }
        out
    }

    fn collect_members(&self, members: &HashSet<IVec3>, b: &GridBox, out: &mut Vec<(IVec3, VoxelId)>) {
        for pos in members {
            if b.contains(*pos) {
                if let Some(id) = self.points.get(pos) {
                    out.push((*pos, *id));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Axis;

    fn filled(points: &[(i32, i32, i32)]) -> GridIndex {
        let mut index = GridIndex::with_capacity(0);
        for (i, (x, y, z)) in points.iter().enumerate() {
            assert!(index.insert(IVec3::new(*x, *y, *z), VoxelId(i as u64)));
        }
        index
    }

    #[test]
    fn test_insert_and_get() {
        let mut index = GridIndex::with_capacity(0);
        assert!(index.insert(IVec3::new(1, 2, 3), VoxelId(7)));
        assert_eq!(index.get(IVec3::new(1, 2, 3)), Some(VoxelId(7)));
        assert!(index.position_free(IVec3::new(1, 2, 4)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_insert_rejects_occupied_position() {
        let mut index = GridIndex::with_capacity(0);
        assert!(index.insert(IVec3::ZERO, VoxelId(1)));
        assert!(!index.insert(IVec3::ZERO, VoxelId(2)));
        assert_eq!(index.get(IVec3::ZERO), Some(VoxelId(1)));
    }

    #[test]
    fn test_insert_rejects_at_capacity() {
        let mut index = GridIndex::with_capacity(2);
        assert!(index.insert(IVec3::new(0, 0, 0), VoxelId(0)));
        assert!(index.insert(IVec3::new(1, 0, 0), VoxelId(1)));
        assert!(!index.has_room());
        assert!(!index.insert(IVec3::new(2, 0, 0), VoxelId(2)));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_remove_frees_position() {
        let mut index = GridIndex::with_capacity(1);
        index.insert(IVec3::ZERO, VoxelId(5));
        assert_eq!(index.remove(IVec3::ZERO), Some(VoxelId(5)));
        assert_eq!(index.remove(IVec3::ZERO), None);
        assert!(index.insert(IVec3::ZERO, VoxelId(6)));
    }

    #[test]
    fn test_search_radius_zero_is_exact() {
        let index = filled(&[(0, 0, 0), (1, 0, 0)]);
        assert_eq!(index.search(IVec3::ZERO, 0).len(), 1);
        assert_eq!(index.search(IVec3::new(2, 0, 0), 0).len(), 0);
    }

    #[test]
    fn test_search_cube_is_inclusive() {
        let index = filled(&[(0, 0, 0), (2, 0, 0), (3, 0, 0), (-2, -2, -2)]);
        let hits = index.search(IVec3::ZERO, 2);
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|(p, _)| p.x.abs() <= 2));
    }

    #[test]
    fn test_search_across_cell_boundaries() {
        // positions straddling the 8-cell quantization boundary
        let index = filled(&[(7, 7, 7), (8, 8, 8), (9, 7, 8), (16, 0, 0)]);
        let hits = index.search(IVec3::new(8, 7, 7), 2);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_slice_query_visits_occupied_cells_only() {
        let index = filled(&[(0, 0, 5), (100, -30, 5), (0, 0, 6)]);
        let hits = index.search_box(&GridBox::slice(Axis::Z, 5));
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|(p, _)| p.z == 5));
    }

    #[test]
    fn test_negative_coordinates_quantize_correctly() {
        let index = filled(&[(-1, -1, -1), (-8, -8, -8), (-9, -9, -9)]);
        let hits = index.search(IVec3::new(-8, -8, -8), 1);
        assert_eq!(hits.len(), 2);
    }
}
