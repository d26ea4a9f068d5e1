//! Catalog service
//!
//! Wraps a [`CatalogRepository`] with validation and composes [`AssetStore`]
//! uploads into project photo lists. Handlers talk to this layer only; they
//! never see which backend is active.

use std::sync::Arc;

use tracing::{info, warn};

use crate::assets::{AssetStore, AssetUpload};
use crate::error::Result;

use super::{validate_name, CatalogRepository, Project, ProjectPatch};

pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
    assets: Arc<dyn AssetStore>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>, assets: Arc<dyn AssetStore>) -> Self {
        Self { repo, assets }
    }

    /// Tag of the active catalog backend, for startup logging
    pub fn catalog_backend(&self) -> &'static str {
        self.repo.backend_tag()
    }

    /// Tag of the active asset backend, for startup logging
    pub fn asset_backend(&self) -> &'static str {
        self.assets.backend_tag()
    }

    /// Return the full catalog in stable order.
    pub async fn list(&self) -> Result<Vec<Project>> {
        self.repo.list().await
    }

    /// Create a project and return the full updated catalog.
    ///
    /// Fails with `Validation` when `name` or `github` is empty and with
    /// `Conflict` when the name is already taken.
    pub async fn create(&self, project: Project) -> Result<Vec<Project>> {
        project.validate()?;
        self.repo.create(project).await
    }

    /// Patch an existing project and return the full updated catalog.
    ///
    /// Fields absent from the patch keep their prior values; `photos`
    /// replaces the whole list. Fails with `NotFound` when no project has
    /// the given name.
    pub async fn update(&self, name: &str, patch: ProjectPatch) -> Result<Vec<Project>> {
        validate_name(name)?;
        patch.validate()?;
        self.repo.update(name, patch).await
    }

    /// Delete a project by exact name and return the full updated catalog.
    ///
    /// Deleting an absent name is a no-op; the unchanged catalog comes back.
    pub async fn delete(&self, name: &str) -> Result<Vec<Project>> {
        validate_name(name)?;
        self.repo.delete(name).await
    }

    /// Store an upload batch and return its URLs in input order.
    ///
    /// When a project with the hinted name already exists, the new URLs are
    /// appended to its photo list in the same call, so the two effects cannot
    /// drift apart; if that persist fails the stored files are removed again
    /// before the error surfaces. When no such project exists (uploads ahead
    /// of a create), the caller attaches the URLs itself.
    pub async fn upload_photos(
        &self,
        name_hint: &str,
        files: &[AssetUpload],
    ) -> Result<Vec<String>> {
        let urls = self.assets.store_batch(name_hint, files).await?;
        if urls.is_empty() {
            return Ok(urls);
        }

        let name = name_hint.trim();
        if let Some(project) = self.repo.get(name).await? {
            let mut photos = project.photos;
            photos.extend(urls.iter().cloned());
            let patch = ProjectPatch {
                photos: Some(photos),
                ..Default::default()
            };
            if let Err(err) = self.repo.update(name, patch).await {
                warn!(name = %name, error = %err, "Catalog update after upload failed; removing stored files");
                if let Err(cleanup_err) = self.assets.remove(&urls).await {
                    warn!(error = %cleanup_err, "Failed to remove files after catalog error");
                }
                return Err(err);
            }
            info!(name = %name, count = urls.len(), "Attached uploaded photos to project");
        }

        Ok(urls)
    }
}
