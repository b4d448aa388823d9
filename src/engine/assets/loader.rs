// Document loading and path conversion

use super::AssetError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Reads and writes JSON documents relative to a base directory
#[derive(Debug, Clone)]
pub struct AssetLoader {
    base_path: PathBuf,
}

impl AssetLoader {
    /// Create a new asset loader with the given base path.
    /// A relative base is anchored at the current working directory.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        let base_path = base_path.as_ref();
        let base_path = if base_path.is_absolute() {
            base_path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(base_path))
                .unwrap_or_else(|_| base_path.to_path_buf())
        };
        Self {
            base_path: normalize(&base_path),
        }
    }

    /// Loader rooted at the directory containing `document`
    pub fn for_document<P: AsRef<Path>>(document: P) -> Self {
        let parent = document
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(parent)
    }

    /// Get the base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a document-relative path to an absolute one
    pub fn to_absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.base_path.join(path))
        }
    }

    /// Express `path` relative to the base directory.
    /// Paths on another root are returned unchanged.
    pub fn to_relative(&self, path: &Path) -> PathBuf {
        if !path.is_absolute() {
            return path.to_path_buf();
        }
        let path = normalize(path);
        let base: Vec<Component> = self.base_path.components().collect();
        let target: Vec<Component> = path.components().collect();

        let shared = base
            .iter()
            .zip(target.iter())
            .take_while(|(a, b)| a == b)
            .count();
        if shared == 0 {
            return path;
        }

        let mut relative = PathBuf::new();
        for _ in shared..base.len() {
            relative.push("..");
        }
        for component in &target[shared..] {
            relative.push(component.as_os_str());
        }
        relative
    }

    /// Read and deserialize a JSON document
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, AssetError> {
        let path = self.to_absolute(path);
        if !path.exists() {
            return Err(AssetError::NotFound(path));
        }
        let text = std::fs::read_to_string(&path).map_err(|source| AssetError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| AssetError::Parse { path, source })
    }

    /// Serialize and write a JSON document, pretty-printed for hand editing
    pub fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), AssetError> {
        let path = self.to_absolute(path);
        let text = serde_json::to_string_pretty(value).map_err(|source| AssetError::Serialize {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, text).map_err(|source| AssetError::Write { path, source })
    }
}

/// Remove `.` components and fold `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
