//! Blog listing query description
//!
//! A `BlogQuery` says which blogs a listing wants and in which order. The
//! repository layer turns it into SQL.

use serde::{Deserialize, Serialize};

use super::BlogStatus;

/// Listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlogSort {
    /// Newest first
    #[default]
    Recent,
    /// Most viewed first
    Popular,
}

impl BlogSort {
    /// `"popular"` (any case) selects `Popular`; anything else is `Recent`.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("popular") {
            BlogSort::Popular
        } else {
            BlogSort::Recent
        }
    }
}

/// Filters and ordering for a blog listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogQuery {
    /// Substring match on the blog name
    pub keyword: Option<String>,
    /// Exact status
    pub status: Option<BlogStatus>,
    /// Restrict to `Active` blogs
    pub active_only: bool,
    /// Restrict to blogs flagged hot
    pub hot_only: bool,
    /// Restrict to blogs associated with this tag
    pub tag_id: Option<String>,
    /// Leave this blog out
    pub exclude_id: Option<i64>,
    pub sort: BlogSort,
}

impl BlogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Public listing: active blogs only
    pub fn public() -> Self {
        Self {
            active_only: true,
            ..Self::default()
        }
    }

    /// Set the keyword; blank keywords are dropped
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        let trimmed = keyword.trim();
        self.keyword = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn status(mut self, status: BlogStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn hot_only(mut self) -> Self {
        self.hot_only = true;
        self
    }

    pub fn tag(mut self, tag_id: impl Into<String>) -> Self {
        self.tag_id = Some(tag_id.into());
        self
    }

    pub fn exclude(mut self, id: i64) -> Self {
        self.exclude_id = Some(id);
        self
    }

    pub fn sort(mut self, sort: BlogSort) -> Self {
        self.sort = sort;
        self
    }
}
