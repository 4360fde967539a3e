//! SQL composition for blog listings
//!
//! Turns a `BlogQuery` into parameterised SQL shared by both backends. Both
//! SQLite and MySQL use `?` placeholders, so one statement text serves both;
//! only the binding step differs.

use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

use crate::models::{BlogQuery, BlogSort, BlogStatus};

/// Columns selected for a full `Blog` row
pub const BLOG_COLUMNS: &str = "b.id, b.name, b.description, b.content, b.image, b.tags, b.status, \
     b.hot_flag, b.home_flag, b.view_count, b.seo_page_title, b.seo_alias, b.seo_keywords, \
     b.seo_description, b.date_created, b.date_modified";

/// A bound value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlBind {
    Text(String),
    Int(i64),
}

/// Statement text plus its positional binds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    pub sql: String,
    pub binds: Vec<SqlBind>,
}

impl SqlQuery {
    pub fn sqlite(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        let mut query = sqlx::query(&self.sql);
        for bind in &self.binds {
            query = match bind {
                SqlBind::Text(s) => query.bind(s.as_str()),
                SqlBind::Int(n) => query.bind(*n),
            };
        }
        query
    }

    pub fn mysql(&self) -> Query<'_, MySql, MySqlArguments> {
        let mut query = sqlx::query(&self.sql);
        for bind in &self.binds {
            query = match bind {
                SqlBind::Text(s) => query.bind(s.as_str()),
                SqlBind::Int(n) => query.bind(*n),
            };
        }
        query
    }
}

/// Escape `LIKE` wildcards so the keyword matches literally under `ESCAPE '!'`
pub fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '!' | '%' | '_') {
            escaped.push('!');
        }
        escaped.push(c);
    }
    escaped
}

fn where_clause(query: &BlogQuery) -> (String, Vec<SqlBind>) {
    let mut conditions: Vec<&str> = Vec::new();
    let mut binds = Vec::new();

    if query.active_only {
        conditions.push("b.status = ?");
        binds.push(SqlBind::Text(BlogStatus::Active.as_str().to_string()));
    }
    if let Some(status) = query.status {
        conditions.push("b.status = ?");
        binds.push(SqlBind::Text(status.as_str().to_string()));
    }
    if query.hot_only {
        conditions.push("b.hot_flag = 1");
    }
    if let Some(keyword) = &query.keyword {
        conditions.push("b.name LIKE ? ESCAPE '!'");
        binds.push(SqlBind::Text(format!("%{}%", escape_like(keyword))));
    }
    if let Some(tag_id) = &query.tag_id {
        // EXISTS keeps one row per blog even if association rows are duplicated
        conditions.push("EXISTS (SELECT 1 FROM blog_tags bt WHERE bt.blog_id = b.id AND bt.tag_id = ?)");
        binds.push(SqlBind::Text(tag_id.clone()));
    }
    if let Some(id) = query.exclude_id {
        conditions.push("b.id <> ?");
        binds.push(SqlBind::Int(id));
    }

    if conditions.is_empty() {
        (String::new(), binds)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), binds)
    }
}

fn order_clause(sort: BlogSort) -> &'static str {
    match sort {
        BlogSort::Recent => " ORDER BY b.date_created DESC, b.id ASC",
        BlogSort::Popular => " ORDER BY COALESCE(b.view_count, 0) DESC, b.id ASC",
    }
}

/// `SELECT` of full blog rows, ordered, with an optional `(limit, offset)` window
pub fn select_blogs(query: &BlogQuery, window: Option<(i64, i64)>) -> SqlQuery {
    let (filter, mut binds) = where_clause(query);
    let mut sql = format!("SELECT {} FROM blogs b{}{}", BLOG_COLUMNS, filter, order_clause(query.sort));
    if let Some((limit, offset)) = window {
        sql.push_str(" LIMIT ? OFFSET ?");
        binds.push(SqlBind::Int(limit));
        binds.push(SqlBind::Int(offset));
    }
    SqlQuery { sql, binds }
}

/// `COUNT(*)` over the same filtered set as `select_blogs`
pub fn count_blogs(query: &BlogQuery) -> SqlQuery {
    let (filter, binds) = where_clause(query);
    SqlQuery {
        sql: format!("SELECT COUNT(*) AS count FROM blogs b{}", filter),
        binds,
    }
}
