//! Lazily rebuilt derived views over the document
//!
//! Every cache is dropped wholesale when a command lands and recomputed on
//! the next read. The merged visible view is the exception: it is kept live
//! incrementally by feeding it the diffs of an internal consumer, so
//! repeated reads between edits stay cheap.

use std::collections::{HashMap, HashSet};

use crate::core::types::{IVec3, LayerId, SlicePlane};
use crate::document::{Document, Voxel};
use crate::math::GridBox;

use super::VoxelDiff;

/// Invalidate-then-recompute caches for the read side of the engine.
#[derive(Debug, Default)]
pub struct ViewCaches {
    layer_ids: Option<Vec<LayerId>>,
    layer_names: Option<Vec<String>>,
    layer_voxels: Option<(LayerId, Vec<Voxel>)>,
    slice_xy: Option<(i32, Vec<Voxel>)>,
    slice_xz: Option<(i32, Vec<Voxel>)>,
    slice_yz: Option<(i32, Vec<Voxel>)>,
    selected: Option<Vec<Voxel>>,
    merged: Option<Vec<Voxel>>,
    /// Incrementally maintained composition, keyed by cell
    live: HashMap<IVec3, Voxel>,
    live_buffer: Vec<Voxel>,
    any_visible: bool,
}

impl ViewCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every lazily rebuilt buffer. The live composition is kept; it
    /// catches up through its own diff feed.
    pub fn invalidate(&mut self) {
        self.layer_ids = None;
        self.layer_names = None;
        self.layer_voxels = None;
        self.slice_xy = None;
        self.slice_xz = None;
        self.slice_yz = None;
        self.selected = None;
        self.merged = None;
    }

    /// Layer ids in paint order.
    pub fn layer_ids(&mut self, doc: &Document) -> &[LayerId] {
        self.layer_ids
            .get_or_insert_with(|| doc.layer_order.clone())
    }

    /// Layer names in paint order.
    pub fn layer_names(&mut self, doc: &Document) -> &[String] {
        self.layer_names.get_or_insert_with(|| {
            doc.layer_order
                .iter()
                .filter_map(|id| doc.layer(*id).map(|layer| layer.name().to_string()))
                .collect()
        })
    }

    /// Copies of one layer's voxels, cached for the last requested layer.
    pub fn layer_voxels(&mut self, doc: &Document, layer_id: LayerId) -> &[Voxel] {
        let stale = !matches!(&self.layer_voxels, Some((cached, _)) if *cached == layer_id);
        if stale {
            self.layer_voxels = Some((layer_id, doc.layer_voxels(layer_id)));
        }
        self.layer_voxels
            .as_ref()
            .map(|(_, voxels)| voxels.as_slice())
            .unwrap_or_default()
    }

    /// Merged composition of all visible layers, topmost wins per cell.
    pub fn merged(&mut self, doc: &Document) -> &[Voxel] {
        self.merged.get_or_insert_with(|| compute_merged(doc))
    }

    /// Visible voxels that are selected.
    pub fn selected(&mut self, doc: &Document) -> &[Voxel] {
        if self.selected.is_none() {
            let selected = self
                .merged(doc)
                .iter()
                .filter(|voxel| voxel.selected)
                .cloned()
                .collect();
            self.selected = Some(selected);
        }
        self.selected.as_deref().unwrap_or_default()
    }

    /// One cross-section of the composition, cached per orientation for
    /// the last requested plane value.
    pub fn slice(&mut self, doc: &Document, plane: SlicePlane, value: i32) -> &[Voxel] {
        let cache = match plane {
            SlicePlane::Xy => &mut self.slice_xy,
            SlicePlane::Xz => &mut self.slice_xz,
            SlicePlane::Yz => &mut self.slice_yz,
        };
        let stale = !matches!(cache, Some((cached, _)) if *cached == value);
        if stale {
            *cache = Some((value, compute_slice(doc, plane, value)));
        }
        cache
            .as_ref()
            .map(|(_, voxels)| voxels.as_slice())
            .unwrap_or_default()
    }

    /// Feed the live composition the diff of its internal consumer.
    pub fn apply_live_diff(&mut self, diff: &VoxelDiff) {
        let changed = match diff {
            VoxelDiff::Reset(snapshot) => {
                self.live.clear();
                for voxel in snapshot {
                    self.live.insert(voxel.position, voxel.clone());
                }
                true
            }
            VoxelDiff::Delta { removed, added } => {
                for pos in removed {
                    self.live.remove(pos);
                }
                for voxel in added {
                    self.live.insert(voxel.position, voxel.clone());
                }
                !removed.is_empty() || !added.is_empty()
            }
        };
        if changed {
            self.live_buffer = self.live.values().cloned().collect();
            self.any_visible = !self.live_buffer.is_empty();
        }
    }

    /// The incrementally maintained composition buffer.
    pub fn live_buffer(&self) -> &[Voxel] {
        &self.live_buffer
    }

    pub fn any_visible(&self) -> bool {
        self.any_visible
    }
}

/// Walk the paint order over visible layers; the first voxel to claim a
/// cell occludes everything beneath it.
fn compute_merged(doc: &Document) -> Vec<Voxel> {
    let mut claimed: HashSet<IVec3> = HashSet::new();
    let mut out = Vec::new();
    for layer_id in &doc.layer_order {
        let Some(layer) = doc.layer(*layer_id) else {
            continue;
        };
        if !layer.visible() {
            continue;
        }
        for (pos, id) in layer.iter() {
            if claimed.insert(pos) {
                if let Some(voxel) = doc.voxel(id) {
                    out.push(voxel.clone());
                }
            }
        }
    }
    out
}

fn compute_slice(doc: &Document, plane: SlicePlane, value: i32) -> Vec<Voxel> {
    let b = GridBox::slice(plane.fixed_axis(), value);
    let mut claimed: HashSet<IVec3> = HashSet::new();
    let mut out = Vec::new();
    for layer_id in &doc.layer_order {
        let Some(layer) = doc.layer(*layer_id) else {
            continue;
        };
        if !layer.visible() {
            continue;
        }
        for (pos, id) in layer.search_box(&b) {
            if claimed.insert(pos) {
                if let Some(voxel) = doc.voxel(id) {
                    out.push(voxel.clone());
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::VoxelId;
    use crate::document::{DocumentConfig, Layer, Rgba};

    fn doc_with_layers(n: usize) -> (Document, Vec<LayerId>) {
        let mut doc = Document::new(DocumentConfig::default());
        let mut ids = Vec::new();
        for i in 0..n {
            let id = doc.allocate_layer_id();
            doc.layers.insert(
                id,
                Layer::new(id, format!("layer {i}"), doc.config.max_voxels_per_layer),
            );
            doc.layer_order.insert(0, id);
            ids.push(id);
        }
        (doc, ids)
    }

    fn add(doc: &mut Document, layer: LayerId, pos: IVec3, color: Rgba) -> VoxelId {
        let id = doc.allocate_voxel_id();
        assert!(doc.insert_voxel(Voxel::new(id, pos, color, layer)));
        id
    }

    #[test]
    fn test_merged_topmost_wins() {
        let (mut doc, layers) = doc_with_layers(2);
        let (bottom, top) = (layers[0], layers[1]);
        add(&mut doc, bottom, IVec3::ZERO, Rgba::rgb(1, 0, 0));
        add(&mut doc, top, IVec3::ZERO, Rgba::rgb(0, 1, 0));
        add(&mut doc, bottom, IVec3::new(1, 0, 0), Rgba::rgb(2, 0, 0));

        let mut caches = ViewCaches::new();
        let merged = caches.merged(&doc).to_vec();
        assert_eq!(merged.len(), 2);
        let at_origin = merged.iter().find(|v| v.position == IVec3::ZERO).unwrap();
        assert_eq!(at_origin.color, Rgba::rgb(0, 1, 0));
    }

    #[test]
    fn test_hidden_layers_excluded() {
        let (mut doc, layers) = doc_with_layers(1);
        add(&mut doc, layers[0], IVec3::ZERO, Rgba::rgb(1, 1, 1));
        doc.layer_mut(layers[0]).unwrap().set_visible(false);

        let mut caches = ViewCaches::new();
        assert!(caches.merged(&doc).is_empty());
    }

    #[test]
    fn test_slice_filters_by_plane() {
        let (mut doc, layers) = doc_with_layers(1);
        add(&mut doc, layers[0], IVec3::new(0, 0, 2), Rgba::rgb(1, 1, 1));
        add(&mut doc, layers[0], IVec3::new(5, 5, 2), Rgba::rgb(1, 1, 1));
        add(&mut doc, layers[0], IVec3::new(0, 0, 3), Rgba::rgb(1, 1, 1));

        let mut caches = ViewCaches::new();
        assert_eq!(caches.slice(&doc, SlicePlane::Xy, 2).len(), 2);
        assert_eq!(caches.slice(&doc, SlicePlane::Xy, 3).len(), 1);
        assert_eq!(caches.slice(&doc, SlicePlane::Yz, 0).len(), 2);
    }

    #[test]
    fn test_invalidate_recomputes() {
        let (mut doc, layers) = doc_with_layers(1);
        let mut caches = ViewCaches::new();
        assert!(caches.merged(&doc).is_empty());

        add(&mut doc, layers[0], IVec3::ZERO, Rgba::rgb(1, 1, 1));
        // stale until invalidated
        assert!(caches.merged(&doc).is_empty());
        caches.invalidate();
        assert_eq!(caches.merged(&doc).len(), 1);
    }

    #[test]
    fn test_live_diff_feed() {
        let mut caches = ViewCaches::new();
        let voxel = Voxel::new(VoxelId(1), IVec3::ZERO, Rgba::rgb(1, 1, 1), LayerId(0));
        caches.apply_live_diff(&VoxelDiff::Reset(vec![voxel.clone()]));
        assert_eq!(caches.live_buffer().len(), 1);
        assert!(caches.any_visible());

        caches.apply_live_diff(&VoxelDiff::Delta {
            removed: vec![IVec3::ZERO],
            added: vec![],
        });
        assert!(caches.live_buffer().is_empty());
        assert!(!caches.any_visible());
    }
}
