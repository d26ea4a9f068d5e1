//! Flat-file catalog backend
//!
//! The entire catalog lives in one pretty-printed JSON array at a fixed path.
//! Every operation does read-entire, mutate-in-memory, write-entire. There is
//! no partial-write protection: a write interrupted mid-flight can corrupt the
//! file. A tokio mutex serializes in-process read-modify-write cycles;
//! cross-process writers still race with last-write-wins.

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{Error, Result};

use super::{CatalogRepository, Project, ProjectPatch};

/// Catalog repository backed by a single JSON file
pub struct JsonFileCatalog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileCatalog {
    /// Create a repository for the given file path.
    ///
    /// The file is not touched until the first operation; a missing file reads
    /// as an empty catalog.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_catalog(&self) -> Result<Vec<Project>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        let catalog: Vec<Project> = serde_json::from_str(&contents)?;
        Ok(catalog)
    }

    fn write_catalog(&self, catalog: &[Project]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(catalog)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for JsonFileCatalog {
    fn backend_tag(&self) -> &'static str {
        "json-file"
    }

    async fn list(&self) -> Result<Vec<Project>> {
        let _guard = self.lock.lock().await;
        self.read_catalog()
    }

    async fn get(&self, name: &str) -> Result<Option<Project>> {
        let _guard = self.lock.lock().await;
        let catalog = self.read_catalog()?;
        Ok(catalog.into_iter().find(|p| p.name == name))
    }

    async fn create(&self, project: Project) -> Result<Vec<Project>> {
        let _guard = self.lock.lock().await;
        let mut catalog = self.read_catalog()?;
        if catalog.iter().any(|p| p.name == project.name) {
            return Err(Error::Conflict(project.name));
        }
        tracing::info!(name = %project.name, "Appending project to catalog file");
        catalog.push(project);
        self.write_catalog(&catalog)?;
        Ok(catalog)
    }

    async fn update(&self, name: &str, patch: ProjectPatch) -> Result<Vec<Project>> {
        let _guard = self.lock.lock().await;
        let mut catalog = self.read_catalog()?;
        let Some(existing) = catalog.iter_mut().find(|p| p.name == name) else {
            return Err(Error::NotFound(name.to_string()));
        };
        existing.apply(patch);
        tracing::info!(name = %name, "Updated project in catalog file");
        self.write_catalog(&catalog)?;
        Ok(catalog)
    }

    async fn delete(&self, name: &str) -> Result<Vec<Project>> {
        let _guard = self.lock.lock().await;
        let mut catalog = self.read_catalog()?;
        let before = catalog.len();
        catalog.retain(|p| p.name != name);
        if catalog.len() < before {
            tracing::info!(name = %name, "Removed project from catalog file");
        }
        self.write_catalog(&catalog)?;
        Ok(catalog)
    }
}
