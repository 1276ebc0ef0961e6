//! Engine facade: validate-then-apply mutators over the document
//!
//! The engine owns the document, the intent log and the diff state. Every
//! public mutator checks its preconditions first and either commits one
//! top-level intent or leaves the document untouched, reporting success
//! through its return value. Exactly one data-changed notification goes out
//! per committed top-level intent, however many children it carried.

mod layers;
mod textures;
mod views;
mod voxels;

use crate::diff::{DiffTracker, ViewCaches};
use crate::document::{Document, DocumentConfig};
use crate::history::{HistoryManager, Outcome, VoxelIntent};

/// External collaborator told when data changes. Registered by the UI
/// shell; the engine itself never depends on what it does.
pub trait ChangeNotifier {
    fn voxel_data_changed(&mut self) {}
    fn texture_data_changed(&mut self) {}
}

/// The voxel document engine.
pub struct Engine {
    document: Document,
    history: HistoryManager<Document, VoxelIntent>,
    diffs: DiffTracker,
    caches: ViewCaches,
    notifier: Option<Box<dyn ChangeNotifier>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            document: Document::new(config),
            history: HistoryManager::new(),
            diffs: DiffTracker::new(),
            caches: ViewCaches::new(),
            notifier: None,
        }
    }

    /// Register the notification collaborator.
    pub fn set_notifier(&mut self, notifier: Box<dyn ChangeNotifier>) {
        self.notifier = Some(notifier);
    }

    /// Read-only view of the store, for persistence collaborators that
    /// snapshot final state.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Commit one top-level intent and fan its outcome out.
    pub(crate) fn submit(&mut self, intent: VoxelIntent) {
        let outcome = self.history.apply_intent(&mut self.document, intent);
        self.after_change(&outcome);
    }

    pub(crate) fn after_change(&mut self, outcome: &Outcome) {
        self.diffs.mark(&outcome.effected);
        self.caches.invalidate();
        if let Some(notifier) = self.notifier.as_mut() {
            notifier.voxel_data_changed();
            if outcome.affects_texture {
                notifier.texture_data_changed();
            }
        }
    }

    /// Unapply the newest log entry. A no-op on an empty log.
    pub fn undo(&mut self) {
        if let Some(outcome) = self.history.undo(&mut self.document) {
            self.after_change(&outcome);
        }
    }

    /// Re-apply the newest undone entry. A no-op with nothing to redo.
    pub fn redo(&mut self) {
        if let Some(outcome) = self.history.redo(&mut self.document) {
            self.after_change(&outcome);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drop the whole edit log, e.g. after a persistence collaborator
    /// loaded fresh state. Consumers are forced to refetch in full.
    pub fn clear_history(&mut self) {
        let outcome = self.history.clear();
        self.after_change(&outcome);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::types::{IVec3, LayerId, VoxelId};
    use crate::document::Rgba;

    /// Counting notifier shared with the test body.
    #[derive(Clone, Default)]
    pub struct Counter {
        pub counts: Rc<RefCell<(usize, usize)>>,
    }

    impl ChangeNotifier for Counter {
        fn voxel_data_changed(&mut self) {
            self.counts.borrow_mut().0 += 1;
        }
        fn texture_data_changed(&mut self) {
            self.counts.borrow_mut().1 += 1;
        }
    }

    /// Engine with one selected layer, ready for voxel edits.
    pub fn engine_with_layer() -> (Engine, LayerId) {
        let mut engine = Engine::new();
        let layer = engine.create_layer("Layer 1");
        engine.select_layer(Some(layer));
        (engine, layer)
    }

    pub fn red() -> Rgba {
        Rgba::rgb(255, 0, 0)
    }

    pub fn add_at(engine: &mut Engine, x: i32, y: i32, z: i32) -> VoxelId {
        engine
            .add_voxel(red(), None, IVec3::new(x, y, z))
            .expect("add should pass preconditions")
    }

    /// Equality over the observable document fields; id counters are not
    /// observable and survive undo.
    pub fn assert_observably_equal(a: &Document, b: &Document) {
        assert_eq!(a.voxels, b.voxels);
        assert_eq!(a.layers, b.layers);
        assert_eq!(a.layer_order, b.layer_order);
        assert_eq!(a.selected_layer, b.selected_layer);
        assert_eq!(a.textures, b.textures);
        assert_eq!(a.selected_texture, b.selected_texture);
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::core::types::IVec3;

    #[test]
    fn test_apply_then_undo_restores_observable_state() {
        let (mut engine, _) = engine_with_layer();
        let before = engine.document().clone();

        add_at(&mut engine, 0, 0, 0);
        engine.undo();
        assert_observably_equal(engine.document(), &before);
    }

    #[test]
    fn test_strict_lifo_discards_redo_tail() {
        let (mut engine, _) = engine_with_layer();
        let a = add_at(&mut engine, 0, 0, 0);
        let b = add_at(&mut engine, 1, 0, 0);
        let c = add_at(&mut engine, 2, 0, 0);
        engine.undo();
        engine.undo();
        assert!(engine.can_redo());

        let d = add_at(&mut engine, 3, 0, 0);
        assert!(!engine.can_redo(), "c is discarded permanently");
        engine.redo();
        assert!(engine.voxel(a).is_some());
        assert!(engine.voxel(b).is_none());
        assert!(engine.voxel(c).is_none());
        assert!(engine.voxel(d).is_some());
    }

    #[test]
    fn test_one_notification_per_top_level_command() {
        let (mut engine, layer) = engine_with_layer();
        let counter = Counter::default();
        let counts = counter.counts.clone();
        engine.set_notifier(Box::new(counter));

        // a composite spanning many children still notifies once
        engine.fill_range(IVec3::ZERO, 1, red());
        assert_eq!(counts.borrow().0, 1);
        assert_eq!(engine.voxel_count(layer), 27);

        engine.undo();
        assert_eq!(counts.borrow().0, 2);
        assert_eq!(counts.borrow().1, 0);
    }

    #[test]
    fn test_texture_commands_notify_texture_channel() {
        let (mut engine, _) = engine_with_layer();
        let counter = Counter::default();
        let counts = counter.counts.clone();
        engine.set_notifier(Box::new(counter));

        let image = image::RgbaImage::new(32, 32);
        assert!(engine.add_texture(image));
        assert_eq!(counts.borrow().0, 1);
        assert_eq!(counts.borrow().1, 1);
    }

    #[test]
    fn test_undo_redo_empty_log_is_silent_noop() {
        let mut engine = Engine::new();
        let counter = Counter::default();
        let counts = counter.counts.clone();
        engine.set_notifier(Box::new(counter));

        engine.undo();
        engine.redo();
        assert_eq!(*counts.borrow(), (0, 0));
        assert!(!engine.can_undo());
        assert!(!engine.can_redo());
    }

    #[test]
    fn test_clear_history_drops_both_directions() {
        let (mut engine, _) = engine_with_layer();
        add_at(&mut engine, 0, 0, 0);
        engine.undo();
        assert!(engine.can_redo());

        engine.clear_history();
        assert!(!engine.can_undo());
        assert!(!engine.can_redo());
    }
}
