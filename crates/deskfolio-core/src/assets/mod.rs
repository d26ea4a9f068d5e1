//! Asset stores
//!
//! An asset store persists uploaded screenshot files and returns stable public
//! URLs. The store is unaware of the Project entity: it receives a
//! project-name string used only as a storage-path segment. Two backends sit
//! behind one trait: the local filesystem and a remote blob service.

mod blob;
mod local;

pub use blob::BlobAssetStore;
pub use local::LocalAssetStore;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Fallback path segment when no project name accompanies an upload
pub const DEFAULT_NAME_HINT: &str = "unnamed";

/// Path prefix shared by both backends
pub const ASSET_PREFIX: &str = "projects";

/// One file in an upload batch
#[derive(Debug, Clone)]
pub struct AssetUpload {
    /// Original file name, kept as the stored name (last write wins on collision)
    pub file_name: String,
    /// Raw file contents; stored as-is, no type or size validation
    pub bytes: Vec<u8>,
}

impl AssetUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Store trait for uploaded assets
///
/// `store_batch` is all-or-nothing: if any file fails, files already written
/// in the same batch are removed before the error is returned, so a failed
/// batch leaves nothing behind.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Short backend name for logs and health reporting
    fn backend_tag(&self) -> &'static str;

    /// Persist a batch of files under the name hint, returning one URL per
    /// input file in input order.
    async fn store_batch(&self, name_hint: &str, files: &[AssetUpload]) -> Result<Vec<String>>;

    /// Remove previously stored assets by the URLs `store_batch` returned.
    ///
    /// Missing assets are skipped; used for compensating cleanup when a
    /// catalog write fails after a successful upload.
    async fn remove(&self, urls: &[String]) -> Result<()>;
}

/// Normalize a project-name hint into a safe path segment.
///
/// Empty hints fall back to [`DEFAULT_NAME_HINT`]; anything that could escape
/// the store root is rejected.
pub fn sanitize_name_hint(hint: &str) -> Result<String> {
    let trimmed = hint.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_NAME_HINT.to_string());
    }
    check_path_segment(trimmed, "project name")?;
    Ok(trimmed.to_string())
}

/// Validate an uploaded file name as a safe path segment
pub fn sanitize_file_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(
            "Uploaded file has an empty name".to_string(),
        ));
    }
    check_path_segment(trimmed, "file name")?;
    Ok(trimmed.to_string())
}

fn check_path_segment(segment: &str, what: &str) -> Result<()> {
    if segment.contains('/') || segment.contains('\\') || segment.contains('\0') {
        return Err(Error::Validation(format!(
            "Invalid {}: path separators are not allowed",
            what
        )));
    }
    if segment == "." || segment == ".." || segment.starts_with('.') {
        return Err(Error::Validation(format!(
            "Invalid {}: must not start with a dot",
            what
        )));
    }
    Ok(())
}
