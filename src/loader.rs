//! This module provides the `DescriptionLoader` struct, responsible for loading machine
//! descriptions from various sources, including files, strings, and directories.

use crate::parser::parse;
use crate::types::{KTapeError, MachineDescription};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of machine description files.
pub const DESCRIPTION_EXTENSION: &str = "csv";

/// `DescriptionLoader` is a utility struct for loading machine descriptions.
pub struct DescriptionLoader;

impl DescriptionLoader {
    /// Loads a single machine description from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(MachineDescription)` if the file is successfully read and parsed.
    /// * `Err(KTapeError::FileError)` if the file cannot be read.
    /// * Any error produced by [`parse`] if the content is not a valid description.
    pub fn load(path: &Path) -> Result<MachineDescription, KTapeError> {
        let content = fs::read_to_string(path).map_err(|e| {
            KTapeError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        parse(&content)
    }

    /// Loads a single machine description from the provided string content.
    pub fn load_from_string(content: &str) -> Result<MachineDescription, KTapeError> {
        parse(content)
    }

    /// Loads every description file (`.csv` extension) from a given directory.
    ///
    /// Directories and other files are skipped. Each entry of the result carries either the
    /// loaded description with its path, or the error that occurred for that file.
    pub fn load_all(directory: &Path) -> Vec<Result<(PathBuf, MachineDescription), KTapeError>> {
        if !directory.exists() {
            return vec![Err(KTapeError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(KTapeError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(KTapeError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                if path.is_dir()
                    || path
                        .extension()
                        .is_none_or(|ext| ext != DESCRIPTION_EXTENSION)
                {
                    return None;
                }

                match Self::load(&path) {
                    Ok(description) => Some(Ok((path, description))),
                    Err(e) => Some(Err(KTapeError::FileError(format!(
                        "Failed to load description from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect();

        // Directory iteration order is platform dependent.
        results.sort_by(|a, b| match (a, b) {
            (Ok((a, _)), Ok((b, _))) => a.cmp(b),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });

        results
    }
}
