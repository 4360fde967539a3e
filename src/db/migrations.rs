//! Database migrations
//!
//! Schema changes are embedded in the binary as SQL strings, one variant per
//! backend, and tracked in the `_migrations` table so each runs once.
//!
//! ```ignore
//! let pool = create_pool(&config.database).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

use anyhow::{Context, Result};
use sqlx::{MySqlPool, Row, SqlitePool};

use super::DynDatabasePool;
use crate::config::DatabaseDriver;

/// A database migration with SQL for both SQLite and MySQL
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number (unique, ascending)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    pub up_sqlite: &'static str,
    pub up_mysql: &'static str,
}

impl Migration {
    /// SQL for the given backend
    pub fn up_sql(&self, driver: DatabaseDriver) -> &'static str {
        match driver {
            DatabaseDriver::Sqlite => self.up_sqlite,
            DatabaseDriver::Mysql => self.up_mysql,
        }
    }
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_blogs",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS blogs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(256) NOT NULL,
                description VARCHAR(500),
                content TEXT,
                image VARCHAR(255),
                tags TEXT,
                status VARCHAR(20) NOT NULL DEFAULT 'active',
                hot_flag BOOLEAN NOT NULL DEFAULT 0,
                home_flag BOOLEAN NOT NULL DEFAULT 0,
                view_count INTEGER,
                seo_page_title VARCHAR(256),
                seo_alias VARCHAR(256),
                seo_keywords VARCHAR(256),
                seo_description VARCHAR(256),
                date_created TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                date_modified TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_blogs_status ON blogs(status);
            CREATE INDEX IF NOT EXISTS idx_blogs_date_created ON blogs(date_created);
            CREATE INDEX IF NOT EXISTS idx_blogs_view_count ON blogs(view_count);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS blogs (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                name VARCHAR(256) NOT NULL,
                description VARCHAR(500),
                content LONGTEXT,
                image VARCHAR(255),
                tags TEXT,
                status VARCHAR(20) NOT NULL DEFAULT 'active',
                hot_flag BOOLEAN NOT NULL DEFAULT FALSE,
                home_flag BOOLEAN NOT NULL DEFAULT FALSE,
                view_count BIGINT,
                seo_page_title VARCHAR(256),
                seo_alias VARCHAR(256),
                seo_keywords VARCHAR(256),
                seo_description VARCHAR(256),
                date_created DATETIME(6) NOT NULL,
                date_modified DATETIME(6) NOT NULL
            ) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;
            CREATE INDEX idx_blogs_status ON blogs(status);
            CREATE INDEX idx_blogs_date_created ON blogs(date_created);
            CREATE INDEX idx_blogs_view_count ON blogs(view_count);
        "#,
    },
    Migration {
        version: 2,
        name: "create_tags",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS tags (
                id VARCHAR(50) PRIMARY KEY,
                name VARCHAR(50) NOT NULL,
                type VARCHAR(50) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_tags_type ON tags(type);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS tags (
                id VARCHAR(50) PRIMARY KEY,
                name VARCHAR(50) NOT NULL,
                type VARCHAR(50) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            ) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;
            CREATE INDEX idx_tags_type ON tags(type);
        "#,
    },
    // No UNIQUE(blog_id, tag_id): readers tolerate duplicate pairs instead.
    Migration {
        version: 3,
        name: "create_blog_tags",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS blog_tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                blog_id INTEGER NOT NULL,
                tag_id VARCHAR(50) NOT NULL,
                FOREIGN KEY (blog_id) REFERENCES blogs(id) ON DELETE CASCADE,
                FOREIGN KEY (tag_id) REFERENCES tags(id)
            );
            CREATE INDEX IF NOT EXISTS idx_blog_tags_blog_id ON blog_tags(blog_id);
            CREATE INDEX IF NOT EXISTS idx_blog_tags_tag_id ON blog_tags(tag_id);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS blog_tags (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                blog_id BIGINT NOT NULL,
                tag_id VARCHAR(50) NOT NULL,
                FOREIGN KEY (blog_id) REFERENCES blogs(id) ON DELETE CASCADE,
                FOREIGN KEY (tag_id) REFERENCES tags(id)
            ) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;
            CREATE INDEX idx_blog_tags_blog_id ON blog_tags(blog_id);
            CREATE INDEX idx_blog_tags_tag_id ON blog_tags(tag_id);
        "#,
    },
];

/// Run all pending migrations.
///
/// Returns the number of migrations applied.
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;
    let mut count = 0;

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }
        tracing::info!(
            "Applying migration {}: {}",
            migration.version,
            migration.name
        );
        apply_migration(pool, migration)
            .await
            .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
        count += 1;
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    let sql = match pool.driver() {
        DatabaseDriver::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
        DatabaseDriver::Mysql => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INT PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
    };

    pool.execute(sql).await?;
    Ok(())
}

async fn applied_versions(pool: &DynDatabasePool) -> Result<Vec<i32>> {
    let versions = match pool.driver() {
        DatabaseDriver::Sqlite => {
            let rows = sqlx::query("SELECT version FROM _migrations ORDER BY version")
                .fetch_all(pool.as_sqlite().unwrap())
                .await?;
            rows.iter().map(|r| r.get::<i64, _>("version") as i32).collect()
        }
        DatabaseDriver::Mysql => {
            let rows = sqlx::query("SELECT version FROM _migrations ORDER BY version")
                .fetch_all(pool.as_mysql().unwrap())
                .await?;
            rows.iter().map(|r| r.get::<i32, _>("version")).collect()
        }
    };
    Ok(versions)
}

async fn apply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    match pool.driver() {
        DatabaseDriver::Sqlite => apply_migration_sqlite(pool.as_sqlite().unwrap(), migration).await,
        DatabaseDriver::Mysql => apply_migration_mysql(pool.as_mysql().unwrap(), migration).await,
    }
}

// SQLite DDL is transactional, so a half-applied migration rolls back.
async fn apply_migration_sqlite(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let mut tx = pool.begin().await?;
    for statement in split_sql_statements(migration.up_sql(DatabaseDriver::Sqlite)) {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }
    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

async fn apply_migration_mysql(pool: &MySqlPool, migration: &Migration) -> Result<()> {
    for statement in split_sql_statements(migration.up_sql(DatabaseDriver::Mysql)) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }
    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;
    Ok(())
}

fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Split a migration body into statements, dropping comment-only fragments
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty() && !is_comment_only(s))
        .collect()
}

fn is_comment_only(s: &str) -> bool {
    s.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

/// Number of migrations not yet applied
pub async fn pending_count(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;
    let applied = applied_versions(pool).await?;
    Ok(MIGRATIONS
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .count())
}
