//! Level validation.
//!
//! Loads every level file under a path, runs [`LevelData::validate`] and
//! builds a throwaway world from each one. Facts no first fact can ever
//! lead to are reported as warnings.

use std::path::{Path, PathBuf};

use leverage_core::data::LevelData;
use leverage_core::facts::Pod;
use leverage_core::random::SeededRandom;
use leverage_core::world::World;

use crate::level_loader::{level_files, load_level, LevelLoadError};

/// Findings for one level file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    /// File checked.
    pub path: PathBuf,
    /// Level name, if the file parsed.
    pub level: Option<String>,
    /// Problems that make the level unplayable.
    pub errors: Vec<String>,
    /// Problems that leave the level playable.
    pub warnings: Vec<String>,
}

impl FileReport {
    /// Whether the file passed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Findings for every file under a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// One report per file, in path order.
    pub files: Vec<FileReport>,
}

impl ValidationReport {
    /// Whether every file passed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.files.iter().all(FileReport::is_ok)
    }

    /// Total error count.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.files.iter().map(|f| f.errors.len()).sum()
    }

    /// Total warning count.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.files.iter().map(|f| f.warnings.len()).sum()
    }
}

/// Check a loaded level.
///
/// Returns `(errors, warnings)`.
#[must_use]
pub fn check_level(level: &LevelData) -> (Vec<String>, Vec<String>) {
    let mut errors = level.validate();
    let mut warnings = Vec::new();

    if !errors.is_empty() {
        return (errors, warnings);
    }

    for target in &level.targets {
        match Pod::from_data(target) {
            Ok(pod) => {
                for fact in pod.unreachable() {
                    warnings.push(format!(
                        "Target '{}': fact '{fact}' is unreachable from its first facts",
                        target.name
                    ));
                }
            }
            Err(e) => errors.push(e.to_string()),
        }
    }

    if errors.is_empty() {
        if let Err(e) = World::new(level, SeededRandom::new(0)) {
            errors.push(e.to_string());
        }
    }

    (errors, warnings)
}

/// Validate one level file.
#[must_use]
pub fn validate_file(path: &Path) -> FileReport {
    let mut report = FileReport {
        path: path.to_path_buf(),
        ..FileReport::default()
    };

    match load_level(path) {
        Ok(level) => {
            let (errors, warnings) = check_level(&level);
            report.level = Some(level.name);
            report.errors = errors;
            report.warnings = warnings;
        }
        Err(e) => report.errors.push(e.to_string()),
    }

    report
}

/// Validate a single level file, or every level file in a directory.
///
/// # Errors
///
/// Returns an error if the path does not exist or a directory cannot be
/// listed. Broken level files are reported, not returned as errors.
pub fn validate_path(path: &Path) -> Result<ValidationReport, LevelLoadError> {
    let files = if path.is_dir() {
        level_files(path)?
    } else if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        return Err(LevelLoadError::DirectoryNotFound(path.display().to_string()));
    };

    let files = files.iter().map(|file| validate_file(file)).collect();
    Ok(ValidationReport { files })
}
