//! Remote blob-service asset store
//!
//! Uploads each file with an HTTP PUT to
//! `<endpoint>/projects/<nameHint>/<filename>` with public-read access and
//! returns the absolute URL under the public base. Transient failures surface
//! immediately; there are no retries.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{Error, Result};

use super::{sanitize_file_name, sanitize_name_hint, AssetStore, AssetUpload, ASSET_PREFIX};

/// Request timeout for blob-service calls
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Asset store backed by a remote blob service
#[derive(Debug)]
pub struct BlobAssetStore {
    endpoint: String,
    public_base: String,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl BlobAssetStore {
    /// Create a store for the given service endpoint.
    ///
    /// `public_base` is the base of the URLs handed back to callers; it
    /// defaults to the endpoint itself when not configured separately (e.g.
    /// a CDN in front of the bucket).
    pub fn new(
        endpoint: impl Into<String>,
        public_base: Option<String>,
        bearer_token: Option<String>,
    ) -> Result<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(Error::Config(
                "Blob asset store requires a service endpoint".to_string(),
            ));
        }
        let public_base = public_base
            .map(|base| base.trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| endpoint.clone());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            endpoint,
            public_base,
            bearer_token,
            client,
        })
    }

    fn object_url(&self, hint: &str, file_name: &str) -> String {
        format!("{}/{}/{}/{}", self.endpoint, ASSET_PREFIX, hint, file_name)
    }

    fn public_url(&self, hint: &str, file_name: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.public_base, ASSET_PREFIX, hint, file_name
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn delete_object(&self, url: &str) -> Result<()> {
        let response = self.request(self.client.delete(url)).send().await?;
        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(Error::UploadFailed(format!(
            "removing blob failed status={} url={}",
            status, url
        )))
    }
}

#[async_trait]
impl AssetStore for BlobAssetStore {
    fn backend_tag(&self) -> &'static str {
        "blob"
    }

    async fn store_batch(&self, name_hint: &str, files: &[AssetUpload]) -> Result<Vec<String>> {
        let hint = sanitize_name_hint(name_hint)?;
        let mut names = Vec::with_capacity(files.len());
        for file in files {
            names.push(sanitize_file_name(&file.file_name)?);
        }

        let mut urls = Vec::with_capacity(files.len());
        let mut uploaded: Vec<String> = Vec::with_capacity(files.len());
        for (file, name) in files.iter().zip(&names) {
            let url = self.object_url(&hint, name);
            let result = self
                .request(self.client.put(&url))
                .header("x-amz-acl", "public-read")
                .body(file.bytes.clone())
                .send()
                .await;

            let failure = match result {
                Ok(response) if response.status().is_success() => None,
                Ok(response) => Some(format!(
                    "upload failed status={} url={}",
                    response.status(),
                    url
                )),
                Err(err) => Some(format!("upload failed url={}: {}", url, err)),
            };

            if let Some(message) = failure {
                // Abort the batch; best-effort removal of blobs already sent.
                for stale in &uploaded {
                    if let Err(cleanup_err) = self.delete_object(stale).await {
                        warn!(url = %stale, error = %cleanup_err, "Failed to clean up partial upload");
                    }
                }
                return Err(Error::UploadFailed(message));
            }

            info!(url = %url, size_bytes = file.bytes.len(), "Uploaded file to blob service");
            uploaded.push(url);
            urls.push(self.public_url(&hint, name));
        }

        Ok(urls)
    }

    async fn remove(&self, urls: &[String]) -> Result<()> {
        for url in urls {
            let path = url.strip_prefix(&self.public_base).ok_or_else(|| {
                Error::Validation(format!("URL '{}' is not served by this blob store", url))
            })?;
            let object_url = format!("{}{}", self.endpoint, path);
            self.delete_object(&object_url).await?;
            info!(url = %object_url, "Removed blob");
        }
        Ok(())
    }
}
