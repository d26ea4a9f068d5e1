//! Project catalog
//!
//! The catalog is the full ordered collection of project records. Two
//! interchangeable repository backends persist it (flat JSON file or SQLite);
//! the service layer wraps a backend with validation and composes asset
//! uploads into project photo lists.

mod json_file;
mod repository;
mod service;
mod sqlite;

pub use json_file::JsonFileCatalog;
pub use repository::CatalogRepository;
pub use service::CatalogService;
pub use sqlite::SqliteCatalog;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Maximum accepted length for a project name
pub const MAX_NAME_LEN: usize = 200;

/// A portfolio project record
///
/// `name` is the primary key; there is no surrogate id. `photos` holds opaque
/// asset URLs whose order is the display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project name
    pub name: String,
    /// GitHub repository URL
    pub github: String,
    /// Live deployment URL, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live: Option<String>,
    /// Asset URLs in display order
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Project {
    /// Create a new project with the given name and GitHub URL
    pub fn new(name: impl Into<String>, github: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            github: github.into(),
            live: None,
            photos: Vec::new(),
        }
    }

    /// Set the live deployment URL
    pub fn with_live(mut self, live: impl Into<String>) -> Self {
        self.live = Some(live.into());
        self
    }

    /// Set the photo URL list
    pub fn with_photos(mut self, photos: Vec<String>) -> Self {
        self.photos = photos;
        self
    }

    /// Overwrite the fields present in the patch, keeping the rest.
    ///
    /// `name` is immutable; the patch cannot rename a project.
    pub fn apply(&mut self, patch: ProjectPatch) {
        if let Some(github) = patch.github {
            self.github = github;
        }
        if let Some(live) = patch.live {
            self.live = Some(live);
        }
        if let Some(photos) = patch.photos {
            self.photos = photos;
        }
    }

    /// Validate the record against the catalog invariants
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.github.trim().is_empty() {
            return Err(Error::Validation(
                "Project field 'github' must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A partial update for an existing project
///
/// Fields absent from the patch keep their prior values; `photos` replaces the
/// whole list (the caller submits existing-kept plus newly uploaded URLs).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
}

impl ProjectPatch {
    /// Validate that the patch cannot break catalog invariants when applied
    pub fn validate(&self) -> Result<()> {
        if let Some(github) = &self.github {
            if github.trim().is_empty() {
                return Err(Error::Validation(
                    "Project field 'github' must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Validate a project name (used both as the primary key and in lookups)
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation(
            "Project field 'name' must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "Project name exceeds {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}
