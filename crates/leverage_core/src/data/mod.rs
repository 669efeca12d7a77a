//! Data structures for level definitions.
//!
//! This module contains pure data structures that describe a level: its
//! targets, their facts, and their combos. All structs deserialize from RON
//! (the format used under `assets/levels/`) or JSON.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `leverage_tools`.

mod level_data;
mod target_data;

pub use level_data::LevelData;
pub use target_data::{ComboData, FactData, TargetData};
