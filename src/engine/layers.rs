//! Layer mutators and layer list reads

use crate::core::types::{LayerId, VoxelId};
use crate::document::Voxel;
use crate::history::{Effected, Outcome, VoxelIntent};

use super::Engine;

impl Engine {
    /// Create an empty layer on top of the paint order.
    pub fn create_layer(&mut self, name: impl Into<String>) -> LayerId {
        let layer_id = self.document.allocate_layer_id();
        self.submit(VoxelIntent::create_layer(layer_id, name.into()));
        layer_id
    }

    /// Delete a layer with everything it contains.
    pub fn delete_layer(&mut self, layer_id: LayerId) -> bool {
        if self.document.layer(layer_id).is_none() {
            return false;
        }
        self.submit(VoxelIntent::delete_layer(layer_id));
        true
    }

    /// Rename a layer. Refused when the name already matches.
    pub fn rename_layer(&mut self, layer_id: LayerId, name: impl Into<String>) -> bool {
        let name = name.into();
        match self.document.layer(layer_id) {
            Some(layer) if layer.name() != name => {
                self.submit(VoxelIntent::rename_layer(layer_id, name));
                true
            }
            _ => false,
        }
    }

    pub fn layer_name(&self, layer_id: LayerId) -> Option<String> {
        self.document
            .layer(layer_id)
            .map(|layer| layer.name().to_string())
    }

    /// Layer names in paint order, topmost first.
    pub fn layer_names(&mut self) -> Vec<String> {
        self.caches.layer_names(&self.document).to_vec()
    }

    /// Layer ids in paint order, topmost first.
    pub fn layer_ids(&mut self) -> Vec<LayerId> {
        self.caches.layer_ids(&self.document).to_vec()
    }

    /// Change the selected layer through the log. `None` deselects.
    pub fn select_layer(&mut self, layer_id: Option<LayerId>) -> bool {
        if !self.layer_selectable(layer_id) {
            return false;
        }
        self.submit(VoxelIntent::select_layer(layer_id));
        true
    }

    /// Change the selected layer without a log entry; viewers still get
    /// refreshed. For selection churn that should not pollute undo.
    pub fn select_layer_soft(&mut self, layer_id: Option<LayerId>) -> bool {
        if !self.layer_selectable(layer_id) {
            return false;
        }
        self.document.selected_layer = layer_id;
        self.after_change(&Outcome {
            effected: Effected::Positions(Vec::new()),
            affects_texture: false,
        });
        true
    }

    fn layer_selectable(&self, layer_id: Option<LayerId>) -> bool {
        let valid = layer_id.is_none_or(|id| self.document.layer(id).is_some());
        valid && self.document.selected_layer != layer_id
    }

    /// The selected layer, or `None` when the selection went stale.
    pub fn selected_layer(&self) -> Option<LayerId> {
        self.document
            .selected_layer
            .filter(|id| self.document.layer(*id).is_some())
    }

    /// Toggle layer visibility. Refused when the flag already matches.
    pub fn set_layer_visible(&mut self, layer_id: LayerId, visible: bool) -> bool {
        match self.document.layer(layer_id) {
            Some(layer) if layer.visible() != visible => {
                self.submit(VoxelIntent::layer_visibility(layer_id, visible));
                true
            }
            _ => false,
        }
    }

    pub fn layer_visible(&self, layer_id: LayerId) -> bool {
        self.document
            .layer(layer_id)
            .map(|layer| layer.visible())
            .unwrap_or(false)
    }

    /// Swap a layer with the one above it in the paint order.
    pub fn move_layer_up(&mut self, layer_id: LayerId) -> bool {
        if !self.can_move_layer_up(layer_id) {
            return false;
        }
        self.submit(VoxelIntent::move_layer(layer_id, true));
        true
    }

    /// Swap a layer with the one below it in the paint order.
    pub fn move_layer_down(&mut self, layer_id: LayerId) -> bool {
        if !self.can_move_layer_down(layer_id) {
            return false;
        }
        self.submit(VoxelIntent::move_layer(layer_id, false));
        true
    }

    pub fn can_move_layer_up(&self, layer_id: LayerId) -> bool {
        self.document
            .layer_order
            .iter()
            .position(|id| *id == layer_id)
            .is_some_and(|index| index > 0)
    }

    pub fn can_move_layer_down(&self, layer_id: LayerId) -> bool {
        self.document
            .layer_order
            .iter()
            .position(|id| *id == layer_id)
            .is_some_and(|index| index + 1 < self.document.layer_order.len())
    }

    /// Collapse all visible layers into one fresh layer, topmost voxel
    /// winning each cell, and select it.
    pub fn merge_visible_layers(&mut self) -> bool {
        if !self.can_merge_visible_layers() {
            return false;
        }
        self.submit(VoxelIntent::merge_layers());
        true
    }

    pub fn can_merge_visible_layers(&self) -> bool {
        self.document
            .layer_order
            .iter()
            .filter(|id| {
                self.document
                    .layer(**id)
                    .map(|layer| layer.visible())
                    .unwrap_or(false)
            })
            .nth(1)
            .is_some()
    }

    /// Copies of one layer's voxels.
    pub fn layer_voxels(&mut self, layer_id: LayerId) -> Vec<Voxel> {
        self.caches.layer_voxels(&self.document, layer_id).to_vec()
    }

    /// Ids of one layer's voxels.
    pub fn layer_voxel_ids(&self, layer_id: LayerId) -> Vec<VoxelId> {
        self.document.layer_voxel_ids(layer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::core::types::IVec3;
    use crate::document::Rgba;

    #[test]
    fn test_create_layer_goes_on_top() {
        let mut engine = Engine::new();
        let a = engine.create_layer("a");
        let b = engine.create_layer("b");
        assert_eq!(engine.layer_ids(), vec![b, a]);
        assert_eq!(engine.layer_names(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_delete_layer_undo_restores_voxels() {
        let (mut engine, layer) = engine_with_layer();
        let ids = [
            add_at(&mut engine, 0, 0, 0),
            add_at(&mut engine, 1, 0, 0),
            add_at(&mut engine, 2, 0, 0),
        ];
        assert!(engine.delete_layer(layer));
        assert!(engine.layer_name(layer).is_none());
        assert!(engine.can_undo());

        engine.undo();
        assert_eq!(engine.voxel_count(layer), 3);
        for (i, id) in ids.iter().enumerate() {
            let voxel = engine.voxel(*id).expect("original id restored");
            assert_eq!(voxel.position, IVec3::new(i as i32, 0, 0));
        }
    }

    #[test]
    fn test_rename_and_reorder() {
        let mut engine = Engine::new();
        let a = engine.create_layer("a");
        let b = engine.create_layer("b");

        assert!(engine.rename_layer(a, "base"));
        assert!(!engine.rename_layer(a, "base"));

        assert!(!engine.can_move_layer_up(b), "already on top");
        assert!(engine.move_layer_up(a));
        assert_eq!(engine.layer_ids(), vec![a, b]);
        engine.undo();
        assert_eq!(engine.layer_ids(), vec![b, a]);
    }

    #[test]
    fn test_select_layer_validation() {
        let mut engine = Engine::new();
        let layer = engine.create_layer("a");
        assert!(engine.select_layer(Some(layer)));
        assert!(!engine.select_layer(Some(layer)), "no change");
        assert!(!engine.select_layer(Some(LayerId(999))));
        assert!(engine.select_layer(None));
        assert_eq!(engine.selected_layer(), None);
    }

    #[test]
    fn test_soft_select_skips_history() {
        let mut engine = Engine::new();
        let layer = engine.create_layer("a");
        let entries = engine.can_undo();
        assert!(engine.select_layer_soft(Some(layer)));
        assert_eq!(engine.can_undo(), entries, "no new log entry");
        assert_eq!(engine.selected_layer(), Some(layer));
    }

    #[test]
    fn test_merge_overlap_topmost_wins_and_undoes() {
        let mut engine = Engine::new();
        let bottom = engine.create_layer("bottom");
        let top = engine.create_layer("top");

        engine.select_layer(Some(bottom));
        let shared = IVec3::new(1, 2, 3);
        engine.add_voxel(Rgba::rgb(200, 0, 0), None, shared).unwrap();
        engine.add_voxel(Rgba::rgb(200, 0, 0), None, IVec3::ZERO).unwrap();
        engine.select_layer(Some(top));
        engine.add_voxel(Rgba::rgb(0, 200, 0), None, shared).unwrap();

        assert!(engine.can_merge_visible_layers());
        assert!(engine.merge_visible_layers());

        let merged = engine.selected_layer().unwrap();
        assert_eq!(engine.layer_ids(), vec![merged]);
        assert_eq!(engine.voxel_count(merged), 2);
        let winner = engine.search_voxel(shared, false).unwrap();
        assert_eq!(winner.color, Rgba::rgb(0, 200, 0), "topmost layer won");

        engine.undo();
        assert_eq!(engine.layer_ids(), vec![top, bottom]);
        assert_eq!(engine.voxel_count(bottom), 2);
        assert_eq!(engine.voxel_count(top), 1);
    }

    #[test]
    fn test_merge_needs_two_visible_layers() {
        let mut engine = Engine::new();
        let a = engine.create_layer("a");
        let _b = engine.create_layer("b");
        assert!(engine.can_merge_visible_layers());
        engine.set_layer_visible(a, false);
        assert!(!engine.can_merge_visible_layers());
        assert!(!engine.merge_visible_layers());
    }

    #[test]
    fn test_visibility_toggle_reversible() {
        let (mut engine, layer) = engine_with_layer();
        assert!(engine.set_layer_visible(layer, false));
        assert!(!engine.set_layer_visible(layer, false));
        assert!(!engine.layer_visible(layer));
        engine.undo();
        assert!(engine.layer_visible(layer));
    }
}
