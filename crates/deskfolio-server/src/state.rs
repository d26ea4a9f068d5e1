//! Shared application state

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use deskfolio_core::assets::{AssetStore, BlobAssetStore, LocalAssetStore};
use deskfolio_core::auth::AdminGate;
use deskfolio_core::catalog::{CatalogRepository, CatalogService, JsonFileCatalog, SqliteCatalog};
use deskfolio_core::config::{AssetBackend, CatalogBackend, Config};
use deskfolio_core::storage::{Database, DatabaseConfig};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CatalogService>,
    pub gate: Arc<AdminGate>,
    /// Root the local asset store writes under; `None` for the blob backend,
    /// which serves files itself
    pub asset_root: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire up repositories, stores, and the session gate per the config.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let repo: Arc<dyn CatalogRepository> = match config.catalog.backend {
            CatalogBackend::JsonFile => {
                Arc::new(JsonFileCatalog::new(config.catalog.resolved_json_path()?))
            }
            CatalogBackend::Sqlite => {
                let db_config = DatabaseConfig::with_path(config.catalog.resolved_sqlite_path()?);
                let db = Database::new(db_config)
                    .await
                    .context("Failed to open catalog database")?;
                Arc::new(SqliteCatalog::new(db))
            }
        };

        let (assets, asset_root): (Arc<dyn AssetStore>, Option<PathBuf>) =
            match config.assets.backend {
                AssetBackend::Local => {
                    let root = config.assets.resolved_public_root()?;
                    (Arc::new(LocalAssetStore::new(root.clone())), Some(root))
                }
                AssetBackend::Blob => {
                    let store = BlobAssetStore::new(
                        config.assets.blob.endpoint.clone(),
                        config.assets.blob.public_base.clone(),
                        config.assets.blob.resolved_bearer_token()?,
                    )?;
                    (Arc::new(store), None)
                }
            };

        let gate = AdminGate::from_env(config.auth.session_ttl_hours)
            .context("Admin credentials are not configured")?;

        Ok(Self {
            service: Arc::new(CatalogService::new(repo, assets)),
            gate: Arc::new(gate),
            asset_root,
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }
}
