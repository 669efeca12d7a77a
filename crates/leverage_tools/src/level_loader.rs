//! Level file loading.
//!
//! Levels live under `assets/levels/` as RON (`.ron`) or JSON (`.json`)
//! files, one level per file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use leverage_core::data::LevelData;
use thiserror::Error;

/// Default level directory, relative to the repository root.
pub const DEFAULT_LEVEL_DIR: &str = "assets/levels";

/// Errors that can occur during level loading.
#[derive(Error, Debug)]
pub enum LevelLoadError {
    /// Failed to read a file or directory.
    #[error("IO error reading '{path}': {source}")]
    Io {
        /// Path being read.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Failed to parse RON.
    #[error("Parse error in '{path}': {source}")]
    Ron {
        /// File path.
        path: String,
        /// Underlying error.
        source: ron::error::SpannedError,
    },
    /// Failed to parse JSON.
    #[error("Parse error in '{path}': {source}")]
    Json {
        /// File path.
        path: String,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// The file is neither `.ron` nor `.json`.
    #[error("Unsupported level format: {0}")]
    UnsupportedFormat(String),
    /// Directory not found.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
}

/// Check whether a path looks like a level file.
#[must_use]
pub fn is_level_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("ron" | "json")
    )
}

/// Load one level file, picking the format from the extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is in an unsupported
/// format, or does not parse.
pub fn load_level(path: &Path) -> Result<LevelData, LevelLoadError> {
    let display = path.display().to_string();
    let format = path.extension().and_then(|e| e.to_str());
    if !matches!(format, Some("ron" | "json")) {
        return Err(LevelLoadError::UnsupportedFormat(display));
    }

    let content = fs::read_to_string(path).map_err(|source| LevelLoadError::Io {
        path: display.clone(),
        source,
    })?;

    if format == Some("ron") {
        ron::from_str(&content).map_err(|source| LevelLoadError::Ron {
            path: display,
            source,
        })
    } else {
        serde_json::from_str(&content).map_err(|source| LevelLoadError::Json {
            path: display,
            source,
        })
    }
}

/// Level files in a directory, sorted by path.
///
/// # Errors
///
/// Returns an error if the directory is missing or unreadable.
pub fn level_files(dir: &Path) -> Result<Vec<PathBuf>, LevelLoadError> {
    if !dir.is_dir() {
        return Err(LevelLoadError::DirectoryNotFound(dir.display().to_string()));
    }

    let io_error = |source| LevelLoadError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && is_level_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Registry of loaded levels, keyed by level name.
#[derive(Debug, Clone, Default)]
pub struct LevelRegistry {
    levels: BTreeMap<String, LevelData>,
}

impl LevelRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a level file. Returns the level name.
    ///
    /// # Errors
    ///
    /// See [`load_level`].
    pub fn load_from_file(&mut self, path: &Path) -> Result<String, LevelLoadError> {
        let level = load_level(path)?;
        let name = level.name.clone();
        if self.levels.insert(name.clone(), level).is_some() {
            tracing::warn!(level = %name, path = %path.display(), "Level replaced by a later file");
        }
        Ok(name)
    }

    /// Load every level in a directory, skipping files that fail to load.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is missing or unreadable.
    pub fn load_from_directory(&mut self, dir: &Path) -> Result<Vec<String>, LevelLoadError> {
        let mut loaded = Vec::new();
        for path in level_files(dir)? {
            match self.load_from_file(&path) {
                Ok(name) => loaded.push(name),
                Err(e) => {
                    tracing::warn!("Failed to load level from {:?}: {}", path, e);
                }
            }
        }
        Ok(loaded)
    }

    /// Get a level by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LevelData> {
        self.levels.get(name)
    }

    /// Loaded level names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    /// Number of loaded levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check if no levels are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
