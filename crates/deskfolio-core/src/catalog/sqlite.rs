//! Document-store catalog backend
//!
//! Each project is one row in the `projects` table, keyed by a unique index
//! on `name`. Insertion order is preserved through the autoincrement rowid so
//! the catalog lists in the same order the flat-file backend produces.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::error::{Error, Result};
use crate::storage::Database;

use super::{CatalogRepository, Project, ProjectPatch};

/// Catalog repository backed by SQLite
pub struct SqliteCatalog {
    db: Database,
}

impl SqliteCatalog {
    /// Create a repository over an open database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Check if a project with the given name exists
    async fn name_exists(&self, name: &str) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM projects WHERE name = ?")
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    async fn fetch_all(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query("SELECT name, github, live, photos FROM projects ORDER BY id")
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(row_to_project).collect())
    }
}

/// Convert a database row to a Project
fn row_to_project(row: sqlx::sqlite::SqliteRow) -> Project {
    let photos: String = row.get("photos");
    Project {
        name: row.get("name"),
        github: row.get("github"),
        live: row.get("live"),
        photos: serde_json::from_str(&photos).unwrap_or_default(),
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalog {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn list(&self) -> Result<Vec<Project>> {
        self.fetch_all().await
    }

    async fn get(&self, name: &str) -> Result<Option<Project>> {
        let row = sqlx::query("SELECT name, github, live, photos FROM projects WHERE name = ?")
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(row_to_project))
    }

    async fn create(&self, project: Project) -> Result<Vec<Project>> {
        if self.name_exists(&project.name).await? {
            return Err(Error::Conflict(project.name));
        }

        let photos = serde_json::to_string(&project.photos)?;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO projects (name, github, live, photos, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&project.name)
        .bind(&project.github)
        .bind(&project.live)
        .bind(&photos)
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => {}
            // Backstop for the check/insert race: the unique index still holds.
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(Error::Conflict(project.name));
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!(name = %project.name, "Inserted project row");
        self.fetch_all().await
    }

    async fn update(&self, name: &str, patch: ProjectPatch) -> Result<Vec<Project>> {
        let Some(mut existing) = self.get(name).await? else {
            return Err(Error::NotFound(name.to_string()));
        };
        existing.apply(patch);

        let photos = serde_json::to_string(&existing.photos)?;
        sqlx::query(
            r#"
            UPDATE projects
            SET github = ?, live = ?, photos = ?, updated_at = ?
            WHERE name = ?
            "#,
        )
        .bind(&existing.github)
        .bind(&existing.live)
        .bind(&photos)
        .bind(Utc::now())
        .bind(name)
        .execute(self.db.pool())
        .await?;

        tracing::info!(name = %name, "Updated project row");
        self.fetch_all().await
    }

    async fn delete(&self, name: &str) -> Result<Vec<Project>> {
        let result = sqlx::query("DELETE FROM projects WHERE name = ?")
            .bind(name)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() > 0 {
            tracing::info!(name = %name, "Deleted project row");
        }
        self.fetch_all().await
    }
}
