//! Filesystem asset store
//!
//! Writes each file under `<root>/projects/<nameHint>/<filename>` and returns
//! the matching relative URL `/projects/<nameHint>/<filename>`. The same
//! filename silently overwrites (last write wins).

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Error, Result};

use super::{sanitize_file_name, sanitize_name_hint, AssetStore, AssetUpload, ASSET_PREFIX};

/// Asset store backed by a directory of public files
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    /// Create a store rooted at the given public directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The public root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL previously returned by `store_batch` back to its file path.
    ///
    /// Both path segments are re-validated so a crafted URL cannot reach
    /// outside the store root.
    fn path_for_url(&self, url: &str) -> Result<PathBuf> {
        let rest = url
            .strip_prefix(&format!("/{}/", ASSET_PREFIX))
            .ok_or_else(|| {
                Error::Validation(format!("URL '{}' is not a stored asset path", url))
            })?;
        let (hint, file_name) = rest.split_once('/').ok_or_else(|| {
            Error::Validation(format!("URL '{}' is not a stored asset path", url))
        })?;
        let hint = sanitize_name_hint(hint)?;
        let file_name = sanitize_file_name(file_name)?;
        Ok(self.root.join(ASSET_PREFIX).join(hint).join(file_name))
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    fn backend_tag(&self) -> &'static str {
        "local"
    }

    async fn store_batch(&self, name_hint: &str, files: &[AssetUpload]) -> Result<Vec<String>> {
        let hint = sanitize_name_hint(name_hint)?;
        // Validate every name up front so a bad entry fails before any write.
        let mut names = Vec::with_capacity(files.len());
        for file in files {
            names.push(sanitize_file_name(&file.file_name)?);
        }

        let dir = self.root.join(ASSET_PREFIX).join(&hint);
        fs::create_dir_all(&dir)?;

        let mut urls = Vec::with_capacity(files.len());
        let mut written: Vec<PathBuf> = Vec::with_capacity(files.len());
        for (file, name) in files.iter().zip(&names) {
            let path = dir.join(name);
            if let Err(err) = fs::write(&path, &file.bytes) {
                // Abort the batch and take already-written files with us.
                for stale in &written {
                    if let Err(cleanup_err) = fs::remove_file(stale) {
                        warn!(
                            path = %stale.display(),
                            error = %cleanup_err,
                            "Failed to clean up partial upload"
                        );
                    }
                }
                return Err(Error::UploadFailed(format!(
                    "writing '{}': {}",
                    path.display(),
                    err
                )));
            }
            info!(
                path = %path.display(),
                size_bytes = file.bytes.len(),
                "Stored uploaded file"
            );
            written.push(path);
            urls.push(format!("/{}/{}/{}", ASSET_PREFIX, hint, name));
        }

        Ok(urls)
    }

    async fn remove(&self, urls: &[String]) -> Result<()> {
        for url in urls {
            let path = self.path_for_url(url)?;
            match fs::remove_file(&path) {
                Ok(()) => info!(path = %path.display(), "Removed stored file"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn upload(name: &str, bytes: &[u8]) -> AssetUpload {
        AssetUpload::new(name, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_store_batch_returns_urls_in_input_order() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalAssetStore::new(dir.path());

        let urls = store
            .store_batch(
                "demo",
                &[upload("b.png", b"bbb"), upload("a.png", b"aaa")],
            )
            .await
            .expect("Failed to store batch");

        assert_eq!(urls, vec!["/projects/demo/b.png", "/projects/demo/a.png"]);
        assert_eq!(
            fs::read(dir.path().join("projects/demo/b.png")).unwrap(),
            b"bbb"
        );
        assert_eq!(
            fs::read(dir.path().join("projects/demo/a.png")).unwrap(),
            b"aaa"
        );
    }

    #[tokio::test]
    async fn test_same_filename_overwrites() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalAssetStore::new(dir.path());

        store
            .store_batch("demo", &[upload("img.png", b"old")])
            .await
            .expect("Failed to store");
        store
            .store_batch("demo", &[upload("img.png", b"new")])
            .await
            .expect("Failed to overwrite");

        assert_eq!(
            fs::read(dir.path().join("projects/demo/img.png")).unwrap(),
            b"new"
        );
    }

    #[tokio::test]
    async fn test_empty_hint_stores_under_unnamed() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalAssetStore::new(dir.path());

        let urls = store
            .store_batch("", &[upload("img.png", b"x")])
            .await
            .expect("Failed to store");

        assert_eq!(urls, vec!["/projects/unnamed/img.png"]);
        assert!(dir.path().join("projects/unnamed/img.png").exists());
    }

    #[tokio::test]
    async fn test_bad_file_name_writes_nothing() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalAssetStore::new(dir.path());

        let err = store
            .store_batch(
                "demo",
                &[upload("ok.png", b"x"), upload("../evil.png", b"y")],
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "Validation");
        // Up-front validation means the good file was never written either
        assert!(!dir.path().join("projects/demo/ok.png").exists());
    }

    #[tokio::test]
    async fn test_failed_batch_cleans_up_earlier_files() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalAssetStore::new(dir.path());

        // Occupy the second file's path with a directory so its write fails.
        fs::create_dir_all(dir.path().join("projects/demo/b.png"))
            .expect("Failed to prepare collision dir");

        let err = store
            .store_batch(
                "demo",
                &[upload("a.png", b"aaa"), upload("b.png", b"bbb")],
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "UploadFailed");
        assert!(
            !dir.path().join("projects/demo/a.png").exists(),
            "First file should have been cleaned up"
        );
    }

    #[tokio::test]
    async fn test_remove_deletes_stored_files_and_skips_missing() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalAssetStore::new(dir.path());

        let urls = store
            .store_batch("demo", &[upload("a.png", b"aaa")])
            .await
            .expect("Failed to store");

        store.remove(&urls).await.expect("Failed to remove");
        assert!(!dir.path().join("projects/demo/a.png").exists());

        // Removing again is fine
        store
            .remove(&urls)
            .await
            .expect("Removing missing files should not error");
    }

    #[tokio::test]
    async fn test_remove_rejects_foreign_urls() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalAssetStore::new(dir.path());

        let err = store
            .remove(&["/etc/passwd".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "Validation");
    }
}
