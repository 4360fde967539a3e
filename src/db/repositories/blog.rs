//! Blog repository
//!
//! This module provides:
//! - `BlogRepository` trait defining the interface for blog data access
//! - `SqlxBlogRepository` implementing the trait for SQLite and MySQL
//!
//! Listings go through the shared SQL composition in `query`, so counting and
//! paging always see the same filter.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Blog, BlogQuery, BlogStatus, PageRequest, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use super::query::{count_blogs, select_blogs};

/// Blog repository trait
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Insert a blog; returns it with the store-assigned ID
    async fn create(&self, blog: &Blog) -> Result<Blog>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>>;

    /// Write every mutable column of `blog`. Returns false if the row is gone.
    async fn update(&self, blog: &Blog) -> Result<bool>;

    /// Returns false if no row was deleted
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Atomically add one to the view counter (NULL counts as 0).
    /// Returns false if the blog does not exist.
    async fn increment_view(&self, id: i64) -> Result<bool>;

    /// One page of a listing plus the total row count of the unpaged listing
    async fn find_page(&self, query: &BlogQuery, page: &PageRequest) -> Result<PagedResult<Blog>>;

    /// A whole listing, optionally capped at `limit` rows
    async fn find_all(&self, query: &BlogQuery, limit: Option<i64>) -> Result<Vec<Blog>>;
}

/// SQLx-based blog repository implementation
pub struct SqlxBlogRepository {
    pool: DynDatabasePool,
}

impl SqlxBlogRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BlogRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl BlogRepository for SqlxBlogRepository {
    async fn create(&self, blog: &Blog) -> Result<Blog> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_blog_sqlite(self.pool.as_sqlite().unwrap(), blog).await,
            DatabaseDriver::Mysql => create_blog_mysql(self.pool.as_mysql().unwrap(), blog).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>> {
        let query = format!("SELECT {} FROM blogs b WHERE b.id = ?", super::query::BLOG_COLUMNS);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&query)
                    .bind(id)
                    .fetch_optional(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to get blog by ID")?;
                row.as_ref().map(row_to_blog_sqlite).transpose()
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&query)
                    .bind(id)
                    .fetch_optional(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to get blog by ID")?;
                row.as_ref().map(row_to_blog_mysql).transpose()
            }
        }
    }

    async fn update(&self, blog: &Blog) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_blog_sqlite(self.pool.as_sqlite().unwrap(), blog).await,
            DatabaseDriver::Mysql => update_blog_mysql(self.pool.as_mysql().unwrap(), blog).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query("DELETE FROM blogs WHERE id = ?")
                .bind(id)
                .execute(self.pool.as_sqlite().unwrap())
                .await
                .context("Failed to delete blog")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query("DELETE FROM blogs WHERE id = ?")
                .bind(id)
                .execute(self.pool.as_mysql().unwrap())
                .await
                .context("Failed to delete blog")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn increment_view(&self, id: i64) -> Result<bool> {
        let sql = "UPDATE blogs SET view_count = COALESCE(view_count, 0) + 1 WHERE id = ?";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(id)
                .execute(self.pool.as_sqlite().unwrap())
                .await
                .context("Failed to increment view count")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(id)
                .execute(self.pool.as_mysql().unwrap())
                .await
                .context("Failed to increment view count")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn find_page(&self, query: &BlogQuery, page: &PageRequest) -> Result<PagedResult<Blog>> {
        let count = count_blogs(query);
        let select = select_blogs(query, Some((page.limit(), page.offset())));

        let (row_count, results) = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let pool = self.pool.as_sqlite().unwrap();
                let row_count: i64 = count
                    .sqlite()
                    .fetch_one(pool)
                    .await
                    .context("Failed to count blogs")?
                    .get("count");
                let rows = select
                    .sqlite()
                    .fetch_all(pool)
                    .await
                    .context("Failed to list blogs")?;
                let blogs = rows.iter().map(row_to_blog_sqlite).collect::<Result<Vec<_>>>()?;
                (row_count, blogs)
            }
            DatabaseDriver::Mysql => {
                let pool = self.pool.as_mysql().unwrap();
                let row_count: i64 = count
                    .mysql()
                    .fetch_one(pool)
                    .await
                    .context("Failed to count blogs")?
                    .get("count");
                let rows = select
                    .mysql()
                    .fetch_all(pool)
                    .await
                    .context("Failed to list blogs")?;
                let blogs = rows.iter().map(row_to_blog_mysql).collect::<Result<Vec<_>>>()?;
                (row_count, blogs)
            }
        };

        // A concurrent insert between the two statements can leave the count behind
        let row_count = row_count.max(page.offset().saturating_add(results.len() as i64));
        Ok(PagedResult::new(results, row_count, page))
    }

    async fn find_all(&self, query: &BlogQuery, limit: Option<i64>) -> Result<Vec<Blog>> {
        let select = select_blogs(query, limit.map(|l| (l, 0)));
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = select
                    .sqlite()
                    .fetch_all(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to list blogs")?;
                rows.iter().map(row_to_blog_sqlite).collect()
            }
            DatabaseDriver::Mysql => {
                let rows = select
                    .mysql()
                    .fetch_all(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to list blogs")?;
                rows.iter().map(row_to_blog_mysql).collect()
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_blog_sqlite(pool: &SqlitePool, blog: &Blog) -> Result<Blog> {
    let result = sqlx::query(
        r#"
        INSERT INTO blogs (name, description, content, image, tags, status, hot_flag, home_flag,
            view_count, seo_page_title, seo_alias, seo_keywords, seo_description, date_created, date_modified)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&blog.name)
    .bind(&blog.description)
    .bind(&blog.content)
    .bind(&blog.image)
    .bind(&blog.tags)
    .bind(blog.status.as_str())
    .bind(blog.hot_flag)
    .bind(blog.home_flag)
    .bind(blog.view_count)
    .bind(&blog.seo_page_title)
    .bind(&blog.seo_alias)
    .bind(&blog.seo_keywords)
    .bind(&blog.seo_description)
    .bind(blog.date_created)
    .bind(blog.date_modified)
    .execute(pool)
    .await
    .context("Failed to create blog")?;

    Ok(Blog {
        id: result.last_insert_rowid(),
        ..blog.clone()
    })
}

async fn update_blog_sqlite(pool: &SqlitePool, blog: &Blog) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE blogs SET name = ?, description = ?, content = ?, image = ?, tags = ?, status = ?,
            hot_flag = ?, home_flag = ?, seo_page_title = ?, seo_alias = ?, seo_keywords = ?,
            seo_description = ?, date_modified = ?
        WHERE id = ?
        "#,
    )
    .bind(&blog.name)
    .bind(&blog.description)
    .bind(&blog.content)
    .bind(&blog.image)
    .bind(&blog.tags)
    .bind(blog.status.as_str())
    .bind(blog.hot_flag)
    .bind(blog.home_flag)
    .bind(&blog.seo_page_title)
    .bind(&blog.seo_alias)
    .bind(&blog.seo_keywords)
    .bind(&blog.seo_description)
    .bind(blog.date_modified)
    .bind(blog.id)
    .execute(pool)
    .await
    .context("Failed to update blog")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_blog_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Blog> {
    let status_str: String = row.get("status");
    let status = BlogStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid blog status: {}", status_str))?;

    Ok(Blog {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        content: row.get("content"),
        image: row.get("image"),
        tags: row.get("tags"),
        status,
        hot_flag: row.get("hot_flag"),
        home_flag: row.get("home_flag"),
        view_count: row.get("view_count"),
        seo_page_title: row.get("seo_page_title"),
        seo_alias: row.get("seo_alias"),
        seo_keywords: row.get("seo_keywords"),
        seo_description: row.get("seo_description"),
        date_created: row.get("date_created"),
        date_modified: row.get("date_modified"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_blog_mysql(pool: &MySqlPool, blog: &Blog) -> Result<Blog> {
    let result = sqlx::query(
        r#"
        INSERT INTO blogs (name, description, content, image, tags, status, hot_flag, home_flag,
            view_count, seo_page_title, seo_alias, seo_keywords, seo_description, date_created, date_modified)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&blog.name)
    .bind(&blog.description)
    .bind(&blog.content)
    .bind(&blog.image)
    .bind(&blog.tags)
    .bind(blog.status.as_str())
    .bind(blog.hot_flag)
    .bind(blog.home_flag)
    .bind(blog.view_count)
    .bind(&blog.seo_page_title)
    .bind(&blog.seo_alias)
    .bind(&blog.seo_keywords)
    .bind(&blog.seo_description)
    .bind(blog.date_created)
    .bind(blog.date_modified)
    .execute(pool)
    .await
    .context("Failed to create blog")?;

    Ok(Blog {
        id: result.last_insert_id() as i64,
        ..blog.clone()
    })
}

async fn update_blog_mysql(pool: &MySqlPool, blog: &Blog) -> Result<bool> {
    // MySQL reports 0 affected rows when nothing changed, so check existence separately
    sqlx::query(
        r#"
        UPDATE blogs SET name = ?, description = ?, content = ?, image = ?, tags = ?, status = ?,
            hot_flag = ?, home_flag = ?, seo_page_title = ?, seo_alias = ?, seo_keywords = ?,
            seo_description = ?, date_modified = ?
        WHERE id = ?
        "#,
    )
    .bind(&blog.name)
    .bind(&blog.description)
    .bind(&blog.content)
    .bind(&blog.image)
    .bind(&blog.tags)
    .bind(blog.status.as_str())
    .bind(blog.hot_flag)
    .bind(blog.home_flag)
    .bind(&blog.seo_page_title)
    .bind(&blog.seo_alias)
    .bind(&blog.seo_keywords)
    .bind(&blog.seo_description)
    .bind(blog.date_modified)
    .bind(blog.id)
    .execute(pool)
    .await
    .context("Failed to update blog")?;

    let exists: i64 = sqlx::query("SELECT COUNT(*) AS count FROM blogs WHERE id = ?")
        .bind(blog.id)
        .fetch_one(pool)
        .await
        .context("Failed to check blog existence")?
        .get("count");

    Ok(exists > 0)
}

fn row_to_blog_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Blog> {
    let status_str: String = row.get("status");
    let status = BlogStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid blog status: {}", status_str))?;

    Ok(Blog {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        content: row.get("content"),
        image: row.get("image"),
        tags: row.get("tags"),
        status,
        hot_flag: row.get("hot_flag"),
        home_flag: row.get("home_flag"),
        view_count: row.get("view_count"),
        seo_page_title: row.get("seo_page_title"),
        seo_alias: row.get("seo_alias"),
        seo_keywords: row.get("seo_keywords"),
        seo_description: row.get("seo_description"),
        date_created: row.get("date_created"),
        date_modified: row.get("date_modified"),
    })
}
