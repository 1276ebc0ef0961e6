//! Generic reversible command log with nested composition
//!
//! Intents are recorded into one flat list with a cursor; a composite
//! intent's children are appended as *attached* entries ahead of their
//! parent, so a whole run undoes and redoes as a single log entry while
//! replay walks the already-flattened list without re-deriving anything.

pub mod intent;

pub use intent::VoxelIntent;

use std::marker::PhantomData;

use crate::core::types::IVec3;

/// Grid cells touched by an intent. Used solely to drive cache and diff
/// invalidation, never for correctness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effected {
    /// Nothing positional changed (layer metadata, texture CRUD)
    None,
    /// The listed cells changed
    Positions(Vec<IVec3>),
    /// Discard all derived state and refetch in full
    Everything,
}

/// What a top-level apply, undo or redo touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub effected: Effected,
    pub affects_texture: bool,
}

/// A reversible unit of store mutation.
///
/// `forward` runs on first execution (Record mode) and again on redo
/// (Replay mode). An intent memoizes everything it derives on the first
/// call (captured prior values, issued children, touched cells) and must
/// reuse the memoized data verbatim on replay. Children are issued through
/// the [`AttachScope`]; the scope is never used on replay because the log
/// replays the flattened child list itself.
pub trait ActionIntent<S>: Sized {
    fn forward(&mut self, store: &mut S, scope: &mut AttachScope<'_, S, Self>);

    fn inverse(&mut self, store: &mut S);

    /// Cells this intent touched; valid after the first `forward`.
    fn effected(&self) -> Effected;

    /// True when this intent changes texture-list state.
    fn affects_texture(&self) -> bool {
        false
    }
}

struct Entry<T> {
    intent: T,
    attached: bool,
}

/// Issues nested intents during a top-level Record execution.
pub struct AttachScope<'a, S, T: ActionIntent<S>> {
    batch: &'a mut Vec<Entry<T>>,
    marker: PhantomData<fn() -> S>,
}

impl<'a, S, T: ActionIntent<S>> AttachScope<'a, S, T> {
    /// Execute a child intent now and record it as an attached entry of
    /// the current top-level log entry.
    pub fn attach(&mut self, store: &mut S, mut child: T) {
        {
            let mut scope = AttachScope {
                batch: &mut *self.batch,
                marker: PhantomData,
            };
            child.forward(store, &mut scope);
        }
        self.batch.push(Entry {
            intent: child,
            attached: true,
        });
    }
}

/// Apply/unapply log over a store `S`.
pub struct HistoryManager<S, T: ActionIntent<S>> {
    entries: Vec<Entry<T>>,
    /// Entries below the cursor are applied, entries at and above it are
    /// redoable.
    position: usize,
    marker: PhantomData<fn() -> S>,
}

impl<S, T: ActionIntent<S>> Default for HistoryManager<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, T: ActionIntent<S>> HistoryManager<S, T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            position: 0,
            marker: PhantomData,
        }
    }

    /// Execute a top-level intent in Record mode and log it. Any redoable
    /// tail is discarded first.
    pub fn apply_intent(&mut self, store: &mut S, mut intent: T) -> Outcome {
        self.entries.truncate(self.position);
        let mut batch = Vec::new();
        {
            let mut scope = AttachScope {
                batch: &mut batch,
                marker: PhantomData,
            };
            intent.forward(store, &mut scope);
        }
        let outcome = Outcome {
            effected: intent.effected(),
            affects_texture: intent.affects_texture(),
        };
        batch.push(Entry {
            intent,
            attached: false,
        });
        self.position += batch.len();
        self.entries.append(&mut batch);
        outcome
    }

    /// Unapply the newest applied log entry and its attached run. A no-op
    /// returning `None` when nothing is applied.
    pub fn undo(&mut self, store: &mut S) -> Option<Outcome> {
        if !self.can_undo() {
            return None;
        }
        // the top-level entry sits after its attached children
        self.position -= 1;
        let top = &mut self.entries[self.position];
        top.intent.inverse(store);
        let outcome = Outcome {
            effected: top.intent.effected(),
            affects_texture: top.intent.affects_texture(),
        };
        while self.position > 0 && self.entries[self.position - 1].attached {
            self.position -= 1;
            self.entries[self.position].intent.inverse(store);
        }
        Some(outcome)
    }

    /// Re-apply the next redoable run in Replay mode. A no-op returning
    /// `None` when nothing is redoable.
    pub fn redo(&mut self, store: &mut S) -> Option<Outcome> {
        if !self.can_redo() {
            return None;
        }
        loop {
            let entry = &mut self.entries[self.position];
            let mut replay_batch = Vec::new();
            {
                let mut scope = AttachScope {
                    batch: &mut replay_batch,
                    marker: PhantomData,
                };
                entry.intent.forward(store, &mut scope);
            }
            debug_assert!(
                replay_batch.is_empty(),
                "an intent issued children during replay"
            );
            let done = !entry.attached;
            let outcome = done.then(|| Outcome {
                effected: entry.intent.effected(),
                affects_texture: entry.intent.affects_texture(),
            });
            self.position += 1;
            if let Some(outcome) = outcome {
                return Some(outcome);
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position < self.entries.len()
    }

    /// Number of applied top-level entries.
    pub fn applied_len(&self) -> usize {
        self.entries[..self.position]
            .iter()
            .filter(|e| !e.attached)
            .count()
    }

    /// Number of redoable top-level entries.
    pub fn redoable_len(&self) -> usize {
        self.entries[self.position..]
            .iter()
            .filter(|e| !e.attached)
            .count()
    }

    /// Drop the whole log. Reported as an invalidate-everything outcome.
    pub fn clear(&mut self) -> Outcome {
        self.entries.clear();
        self.position = 0;
        Outcome {
            effected: Effected::Everything,
            affects_texture: false,
        }
    }
}
