//! Voxed - an editable, layered, spatially-indexed voxel document engine

pub mod core;
pub mod diff;
pub mod document;
pub mod engine;
pub mod history;
pub mod math;

pub use diff::VoxelDiff;
pub use document::{Document, DocumentConfig, Rgba, Voxel};
pub use engine::{ChangeNotifier, Engine};
