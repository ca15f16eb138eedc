//! Fixed menu of available component versions
//!
//! Loaded from the `[[metadata.dependencies]]` tables of a `buildpack.toml`. Only `id`
//! and `version` are read; every other key is ignored.

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use semver::Version;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyCatalog {
    entries: Vec<CatalogEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    metadata: CatalogMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogMetadata {
    #[serde(default)]
    dependencies: Vec<CatalogEntry>,
}

impl DependencyCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content).map_err(|source| Error::Toml {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::new(file.metadata.dependencies))
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs
            .read_to_string(path)
            .map_err(|e| Error::io("open", path, e))?;
        let catalog = Self::from_toml_str(&content, path)?;
        debug!(
            "Loaded {} catalog entries from {}",
            catalog.entries.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parsed versions offered for `id`; entries that are not semver are skipped
    pub fn versions(&self, id: &str) -> Vec<Version> {
        self.entries
            .iter()
            .filter(|e| e.id == id)
            .filter_map(|e| match Version::parse(&e.version) {
                Ok(version) => Some(version),
                Err(err) => {
                    debug!("Skipping {} version '{}': {}", id, e.version, err);
                    None
                }
            })
            .collect()
    }
}
