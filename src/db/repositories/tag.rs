//! Tag repository
//!
//! This module provides:
//! - `TagRepository` trait defining the interface for tag data access
//! - `SqlxTagRepository` implementing the trait for SQLite and MySQL
//!
//! `sync_blog_tags` is the write half of tag reconciliation: tag upserts and
//! the association rewrite for one blog run inside a single transaction.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{BlogTag, Tag, TagDraft, TagNamespace};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Get tag by its normalized identifier
    async fn get_by_id(&self, id: &str) -> Result<Option<Tag>>;

    /// Tags linked to a blog, once each, in association order
    async fn get_by_blog_id(&self, blog_id: i64) -> Result<Vec<Tag>>;

    /// Tags of `namespace` whose display name occurs in `text` (ASCII case-insensitive)
    async fn find_in_text(&self, text: &str, namespace: TagNamespace) -> Result<Vec<Tag>>;

    /// Raw association rows of a blog, duplicates included
    async fn list_blog_tags(&self, blog_id: i64) -> Result<Vec<BlogTag>>;

    /// Upsert `drafts` as tags and link them to the blog, atomically.
    ///
    /// With `replace` the blog's previous associations are removed first.
    async fn sync_blog_tags(
        &self,
        blog_id: i64,
        drafts: &[TagDraft],
        namespace: TagNamespace,
        replace: bool,
    ) -> Result<()>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
}

impl SqlxTagRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Tag>> {
        let sql = "SELECT id, name, type FROM tags WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(sql)
                    .bind(id)
                    .fetch_optional(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to get tag by ID")?;
                row.as_ref().map(row_to_tag_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(sql)
                    .bind(id)
                    .fetch_optional(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to get tag by ID")?;
                row.as_ref().map(row_to_tag_mysql).transpose()
            }
        }
    }

    async fn get_by_blog_id(&self, blog_id: i64) -> Result<Vec<Tag>> {
        // GROUP BY collapses duplicated association rows
        let sql = r#"
            SELECT t.id, t.name, t.type
            FROM tags t
            INNER JOIN blog_tags bt ON bt.tag_id = t.id
            WHERE bt.blog_id = ?
            GROUP BY t.id, t.name, t.type
            ORDER BY MIN(bt.id)
        "#;
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(sql)
                    .bind(blog_id)
                    .fetch_all(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to get tags for blog")?;
                rows.iter().map(row_to_tag_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(sql)
                    .bind(blog_id)
                    .fetch_all(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to get tags for blog")?;
                rows.iter().map(row_to_tag_mysql).collect()
            }
        }
    }

    async fn find_in_text(&self, text: &str, namespace: TagNamespace) -> Result<Vec<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(
                    "SELECT id, name, type FROM tags WHERE type = ? AND instr(lower(?), lower(name)) > 0 ORDER BY name",
                )
                .bind(namespace.as_str())
                .bind(text)
                .fetch_all(self.pool.as_sqlite().unwrap())
                .await
                .context("Failed to find tags in text")?;
                rows.iter().map(row_to_tag_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(
                    "SELECT id, name, type FROM tags WHERE type = ? AND LOCATE(name, ?) > 0 ORDER BY name",
                )
                .bind(namespace.as_str())
                .bind(text)
                .fetch_all(self.pool.as_mysql().unwrap())
                .await
                .context("Failed to find tags in text")?;
                rows.iter().map(row_to_tag_mysql).collect()
            }
        }
    }

    async fn list_blog_tags(&self, blog_id: i64) -> Result<Vec<BlogTag>> {
        let sql = "SELECT id, blog_id, tag_id FROM blog_tags WHERE blog_id = ? ORDER BY id";
        let rows: Vec<(i64, i64, String)> = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query_as(sql)
                .bind(blog_id)
                .fetch_all(self.pool.as_sqlite().unwrap())
                .await
                .context("Failed to list blog tags")?,
            DatabaseDriver::Mysql => sqlx::query_as(sql)
                .bind(blog_id)
                .fetch_all(self.pool.as_mysql().unwrap())
                .await
                .context("Failed to list blog tags")?,
        };
        Ok(rows
            .into_iter()
            .map(|(id, blog_id, tag_id)| BlogTag { id, blog_id, tag_id })
            .collect())
    }

    async fn sync_blog_tags(
        &self,
        blog_id: i64,
        drafts: &[TagDraft],
        namespace: TagNamespace,
        replace: bool,
    ) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sync_blog_tags_sqlite(self.pool.as_sqlite().unwrap(), blog_id, drafts, namespace, replace).await
            }
            DatabaseDriver::Mysql => {
                sync_blog_tags_mysql(self.pool.as_mysql().unwrap(), blog_id, drafts, namespace, replace).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn sync_blog_tags_sqlite(
    pool: &SqlitePool,
    blog_id: i64,
    drafts: &[TagDraft],
    namespace: TagNamespace,
    replace: bool,
) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin tag sync")?;

    for draft in drafts {
        sqlx::query("INSERT OR IGNORE INTO tags (id, name, type) VALUES (?, ?, ?)")
            .bind(&draft.id)
            .bind(&draft.name)
            .bind(namespace.as_str())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to upsert tag '{}'", draft.id))?;
    }

    if replace {
        sqlx::query("DELETE FROM blog_tags WHERE blog_id = ?")
            .bind(blog_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear blog tags")?;
    }

    for draft in drafts {
        sqlx::query("INSERT INTO blog_tags (blog_id, tag_id) VALUES (?, ?)")
            .bind(blog_id)
            .bind(&draft.id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to link tag '{}' to blog {}", draft.id, blog_id))?;
    }

    tx.commit().await.context("Failed to commit tag sync")?;
    Ok(())
}

fn row_to_tag_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Tag> {
    let type_str: String = row.get("type");
    let tag_type = TagNamespace::from_str(&type_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid tag type: {}", type_str))?;
    Ok(Tag {
        id: row.get("id"),
        name: row.get("name"),
        tag_type,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn sync_blog_tags_mysql(
    pool: &MySqlPool,
    blog_id: i64,
    drafts: &[TagDraft],
    namespace: TagNamespace,
    replace: bool,
) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin tag sync")?;

    for draft in drafts {
        sqlx::query("INSERT IGNORE INTO tags (id, name, type) VALUES (?, ?, ?)")
            .bind(&draft.id)
            .bind(&draft.name)
            .bind(namespace.as_str())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to upsert tag '{}'", draft.id))?;
    }

    if replace {
        sqlx::query("DELETE FROM blog_tags WHERE blog_id = ?")
            .bind(blog_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear blog tags")?;
    }

    for draft in drafts {
        sqlx::query("INSERT INTO blog_tags (blog_id, tag_id) VALUES (?, ?)")
            .bind(blog_id)
            .bind(&draft.id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to link tag '{}' to blog {}", draft.id, blog_id))?;
    }

    tx.commit().await.context("Failed to commit tag sync")?;
    Ok(())
}

fn row_to_tag_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Tag> {
    let type_str: String = row.get("type");
    let tag_type = TagNamespace::from_str(&type_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid tag type: {}", type_str))?;
    Ok(Tag {
        id: row.get("id"),
        name: row.get("name"),
        tag_type,
    })
}
