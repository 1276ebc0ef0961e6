//! Mathematical utilities and data structures

pub mod gridbox;

pub use gridbox::GridBox;
