//! Class table loading for headless runs.
//!
//! Class tables are RON lists of `ClassData`. A path may name one file or a
//! directory of `.ron` files, which are merged in file-name order so the
//! result does not depend on directory listing order.

use std::fs;
use std::path::{Path, PathBuf};

use arena_core::error::ArenaError;
use arena_core::prelude::ClassRegistry;
use thiserror::Error;

/// Errors that can occur during class loading.
#[derive(Error, Debug)]
pub enum ClassLoadError {
    /// Failed to read a file or directory.
    #[error("IO error reading '{path}': {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Malformed class table.
    #[error(transparent)]
    Parse(#[from] ArenaError),
    /// Path does not exist.
    #[error("Class data not found: {0}")]
    NotFound(String),
}

fn io_error(path: &Path, source: std::io::Error) -> ClassLoadError {
    ClassLoadError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Load a class table from one RON file.
pub fn load_classes_from_file(path: &Path) -> Result<ClassRegistry, ClassLoadError> {
    let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    Ok(ClassRegistry::from_ron_str(
        &path.display().to_string(),
        &content,
    )?)
}

/// Load and merge every `.ron` class table in a directory.
///
/// Files that fail to load are logged and skipped. Later files replace
/// classes of the same name from earlier ones.
pub fn load_classes_from_directory(dir: &Path) -> Result<ClassRegistry, ClassLoadError> {
    if !dir.exists() {
        return Err(ClassLoadError::NotFound(dir.display().to_string()));
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        if path.extension().is_some_and(|e| e == "ron") {
            files.push(path);
        }
    }
    files.sort();

    let mut registry = ClassRegistry::new();
    for path in files {
        match load_classes_from_file(&path) {
            Ok(table) => {
                for name in table.names() {
                    if let Ok(class) = table.get(name) {
                        registry.register(class.clone());
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to load classes from {:?}: {}", path, e);
            }
        }
    }

    Ok(registry)
}

/// Load classes from a file or directory. `None` gives the built-in table.
pub fn load_classes(path: Option<&Path>) -> Result<ClassRegistry, ClassLoadError> {
    let Some(path) = path else {
        return Ok(ClassRegistry::builtin());
    };

    if path.is_dir() {
        load_classes_from_directory(path)
    } else if path.exists() {
        load_classes_from_file(path)
    } else {
        Err(ClassLoadError::NotFound(path.display().to_string()))
    }
}
