//! Deskfolio Core Library
//!
//! This crate provides the core functionality for Deskfolio, including:
//! - Catalog (project records, repository backends, service layer)
//! - Asset stores (local filesystem + remote blob service)
//! - Admin session gate (credential check + signed session tokens)
//! - Storage (SQLite pool and migrations for the document-store backend)
//! - Configuration (TOML file + environment overrides)

pub mod assets;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::assets::{AssetStore, AssetUpload};
    pub use crate::catalog::{CatalogRepository, CatalogService, Project, ProjectPatch};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
}
