//! Replay files on disk.

use std::fs;
use std::path::Path;

use leverage_core::error::GameError;
use leverage_core::replay::Replay;
use thiserror::Error;

/// Errors reading or writing replay files.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Failed to read or write the file.
    #[error("IO error on replay '{path}': {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The replay itself is malformed or diverges.
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Read a replay file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid replay.
pub fn load_replay(path: &Path) -> Result<Replay, ReplayError> {
    let text = fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Replay::from_json(&text)?)
}

/// Write a replay file, creating parent directories.
///
/// # Errors
///
/// Returns an error if the replay cannot be serialized or written.
pub fn save_replay(replay: &Replay, path: &Path) -> Result<(), ReplayError> {
    let io_error = |source| ReplayError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, replay.to_json()?).map_err(io_error)
}

/// Load a replay and verify it, returning its final hash.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the replay diverges.
pub fn verify_replay_file(path: &Path) -> Result<u64, ReplayError> {
    let replay = load_replay(path)?;
    tracing::info!(
        level = %replay.level.name,
        seed = replay.seed,
        intents = replay.intent_count(),
        "Replaying"
    );
    Ok(replay.verify()?)
}
