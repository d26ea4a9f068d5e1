//! Configuration loading
//!
//! Settings come from a TOML file under the user config directory (or a path
//! given explicitly). Secrets are never read from that file: admin
//! credentials, the session secret, and the blob bearer token are
//! environment-only.

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable holding the blob-service bearer token
pub const BLOB_TOKEN_ENV: &str = "DESKFOLIO_BLOB_TOKEN";

/// Deskfolio configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub assets: AssetsConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub listen: String,
    /// Upper bound on a request body, which caps upload batches
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:4310".to_string(),
            max_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Which repository persists the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogBackend {
    #[default]
    JsonFile,
    Sqlite,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CatalogConfig {
    pub backend: CatalogBackend,
    /// Catalog file for the `json-file` backend
    pub json_path: Option<PathBuf>,
    /// Database file for the `sqlite` backend
    pub sqlite_path: Option<PathBuf>,
}

impl CatalogConfig {
    pub fn resolved_json_path(&self) -> anyhow::Result<PathBuf> {
        match &self.json_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("projects.json")),
        }
    }

    pub fn resolved_sqlite_path(&self) -> anyhow::Result<PathBuf> {
        match &self.sqlite_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("catalog.db")),
        }
    }
}

/// Which store persists uploaded assets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetBackend {
    #[default]
    Local,
    Blob,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AssetsConfig {
    pub backend: AssetBackend,
    /// Root directory for the `local` backend; files land under
    /// `<public-root>/projects/<name>/`
    pub public_root: Option<PathBuf>,
    pub blob: BlobConfig,
}

impl AssetsConfig {
    pub fn resolved_public_root(&self) -> anyhow::Result<PathBuf> {
        match &self.public_root {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("public")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BlobConfig {
    /// Blob-service endpoint, required for the `blob` backend
    pub endpoint: String,
    /// Base of the URLs handed to clients; defaults to the endpoint
    pub public_base: Option<String>,
    #[serde(skip)]
    pub bearer_token: Option<String>,
}

impl BlobConfig {
    pub fn resolved_bearer_token(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;
        Ok(env::var(BLOB_TOKEN_ENV).ok().filter(|t| !t.is_empty()))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.bearer_token.is_some() {
            return Err(anyhow!(
                "Blob bearer tokens must be provided via the {} environment variable, not stored in configuration",
                BLOB_TOKEN_ENV
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AuthConfig {
    /// Lifetime of admin session tokens
    pub session_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: crate::auth::DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

/// Get the data directory path (catalog file, SQLite database, local assets)
pub fn data_dir() -> anyhow::Result<PathBuf> {
    let dir = if let Ok(custom_dir) = env::var("DESKFOLIO_DATA_DIR") {
        PathBuf::from(custom_dir)
    } else {
        dirs::data_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?
            .join("deskfolio")
    };
    Ok(dir)
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("DESKFOLIO_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("deskfolio")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location, or defaults if the file
    /// doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from an explicit path; the file must exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.assets.blob.enforce_env_only()?;
        self.listen_addr()?;
        if self.assets.backend == AssetBackend::Blob && self.assets.blob.endpoint.trim().is_empty()
        {
            return Err(anyhow!(
                "assets.blob.endpoint is required when assets.backend is \"blob\""
            ));
        }
        if self.auth.session_ttl_hours < 1 {
            return Err(anyhow!("auth.session-ttl-hours must be at least 1"));
        }
        Ok(())
    }

    /// Parse the configured listen address
    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .listen
            .parse()
            .with_context(|| format!("Invalid listen address: {}", self.server.listen))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        Config::default().validate().expect("defaults should validate");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            listen = "0.0.0.0:8080"
            "#,
        )
        .expect("Failed to parse config");
        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.server.max_upload_bytes, 32 * 1024 * 1024);
        assert_eq!(config.catalog.backend, CatalogBackend::JsonFile);
        assert_eq!(config.auth.session_ttl_hours, 12);
    }

    #[test]
    fn test_backend_names_are_kebab_case() {
        let config: Config = toml::from_str(
            r#"
            [catalog]
            backend = "sqlite"

            [assets]
            backend = "blob"

            [assets.blob]
            endpoint = "https://blob.internal"
            "#,
        )
        .expect("Failed to parse config");
        assert_eq!(config.catalog.backend, CatalogBackend::Sqlite);
        assert_eq!(config.assets.backend, AssetBackend::Blob);
        config.validate().expect("config should validate");
    }

    #[test]
    fn test_blob_backend_requires_endpoint() {
        let config: Config = toml::from_str(
            r#"
            [assets]
            backend = "blob"
            "#,
        )
        .expect("Failed to parse config");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_listen_address_rejected() {
        let mut config = Config::default();
        config.server.listen = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bearer_token_must_come_from_env() {
        let mut config = Config::default();
        config.assets.blob.bearer_token = Some("secret".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bearer_token_in_file_is_ignored() {
        // `bearer-token` is marked skip; a value smuggled into the file must
        // not land in the struct.
        let config: Config = toml::from_str(
            r#"
            [assets.blob]
            endpoint = "https://blob.internal"
            bearer-token = "secret"
            "#,
        )
        .expect("Failed to parse config");
        assert!(config.assets.blob.bearer_token.is_none());
    }
}
