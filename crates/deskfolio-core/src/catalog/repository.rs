//! Repository trait for catalog persistence
//!
//! This module defines the trait for catalog storage operations. The trait
//! abstracts over the two storage backends (flat JSON file, SQLite) so the
//! service layer never depends on which one is active.

use async_trait::async_trait;

use crate::error::Result;

use super::{Project, ProjectPatch};

/// Repository trait for catalog persistence
///
/// Every mutating operation returns the full current catalog, not just the
/// affected record, so the caller never needs a separate re-fetch. Catalog
/// order is insertion order and both backends must preserve it identically:
/// create appends, update keeps position, delete closes the gap.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Short backend name for logs and health reporting
    fn backend_tag(&self) -> &'static str;

    /// List the full catalog in insertion order
    async fn list(&self) -> Result<Vec<Project>>;

    /// Get a single project by exact name
    async fn get(&self, name: &str) -> Result<Option<Project>>;

    /// Append a new project; fails with `Conflict` if the name exists
    async fn create(&self, project: Project) -> Result<Vec<Project>>;

    /// Merge a patch over the named project; fails with `NotFound` if absent
    async fn update(&self, name: &str, patch: ProjectPatch) -> Result<Vec<Project>>;

    /// Remove the named project; removing an absent name is a no-op
    async fn delete(&self, name: &str) -> Result<Vec<Project>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe
    fn _assert_object_safe(_: &dyn CatalogRepository) {}
}
