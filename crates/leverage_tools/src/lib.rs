//! # Leverage Development Tools
//!
//! Everything that touches the filesystem or a terminal:
//! - Level loading and validation
//! - JSON-lines play protocol
//! - Scripted strategies and batch playthroughs
//! - Replay files

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod batch;
pub mod level_loader;
pub mod protocol;
pub mod replay_file;
pub mod strategies;
pub mod validate;
