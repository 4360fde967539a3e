//! Blog model
//!
//! This module provides:
//! - `Blog` entity representing a blog post
//! - `BlogStatus` enum for visibility states
//! - Input types for creating and updating blogs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Blog {
    /// Unique identifier, assigned by the store
    pub id: i64,
    /// Title
    pub name: String,
    /// Short summary
    pub description: Option<String>,
    /// Body (HTML or markdown, stored verbatim)
    pub content: Option<String>,
    /// Cover image URL
    pub image: Option<String>,
    /// Raw comma separated tag field as last submitted
    pub tags: Option<String>,
    /// Visibility status
    pub status: BlogStatus,
    /// Shown in "hot" lists
    #[serde(default)]
    pub hot_flag: bool,
    /// Shown on the home page
    #[serde(default)]
    pub home_flag: bool,
    /// View counter; absent means never viewed
    pub view_count: Option<i64>,
    pub seo_page_title: Option<String>,
    pub seo_alias: Option<String>,
    pub seo_keywords: Option<String>,
    pub seo_description: Option<String>,
    /// Creation timestamp
    pub date_created: DateTime<Utc>,
    /// Last update timestamp
    pub date_modified: DateTime<Utc>,
}

impl Blog {
    /// Build an unsaved blog from create input.
    ///
    /// The ID is 0 until the store assigns one.
    pub fn from_input(input: CreateBlogInput) -> Self {
        let now = input.date_created.unwrap_or_else(Utc::now);
        Self {
            id: 0,
            name: input.name,
            description: input.description,
            content: input.content,
            image: input.image,
            tags: input.tags,
            status: input.status.unwrap_or_default(),
            hot_flag: input.hot_flag,
            home_flag: input.home_flag,
            view_count: None,
            seo_page_title: input.seo_page_title,
            seo_alias: input.seo_alias,
            seo_keywords: input.seo_keywords,
            seo_description: input.seo_description,
            date_created: now,
            date_modified: now,
        }
    }

    /// Overwrite the fields present in `input`.
    pub fn apply(&mut self, input: &UpdateBlogInput) {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(description) = &input.description {
            self.description = Some(description.clone());
        }
        if let Some(content) = &input.content {
            self.content = Some(content.clone());
        }
        if let Some(image) = &input.image {
            self.image = Some(image.clone());
        }
        if let Some(tags) = &input.tags {
            self.tags = Some(tags.clone());
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(hot_flag) = input.hot_flag {
            self.hot_flag = hot_flag;
        }
        if let Some(home_flag) = input.home_flag {
            self.home_flag = home_flag;
        }
        if let Some(v) = &input.seo_page_title {
            self.seo_page_title = Some(v.clone());
        }
        if let Some(v) = &input.seo_alias {
            self.seo_alias = Some(v.clone());
        }
        if let Some(v) = &input.seo_keywords {
            self.seo_keywords = Some(v.clone());
        }
        if let Some(v) = &input.seo_description {
            self.seo_description = Some(v.clone());
        }
        self.date_modified = Utc::now();
    }
}

/// Blog visibility status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    /// Visible on public listings
    #[default]
    Active,
    /// Hidden from public listings
    Inactive,
}

impl BlogStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Active => "active",
            BlogStatus::Inactive => "inactive",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(BlogStatus::Active),
            "inactive" => Some(BlogStatus::Inactive),
            _ => None,
        }
    }
}

impl std::fmt::Display for BlogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new blog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBlogInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Free-text comma separated tags
    #[serde(default)]
    pub tags: Option<String>,
    /// Defaults to `Active`
    #[serde(default)]
    pub status: Option<BlogStatus>,
    #[serde(default)]
    pub hot_flag: bool,
    #[serde(default)]
    pub home_flag: bool,
    #[serde(default)]
    pub seo_page_title: Option<String>,
    #[serde(default)]
    pub seo_alias: Option<String>,
    #[serde(default)]
    pub seo_keywords: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
    /// Explicit creation time, used by imports; defaults to now
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
}

impl CreateBlogInput {
    /// Create a new CreateBlogInput with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the raw tag field
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: BlogStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Mark as hot
    pub fn with_hot_flag(mut self, hot_flag: bool) -> Self {
        self.hot_flag = hot_flag;
        self
    }

    /// Set the creation time
    pub fn with_date_created(mut self, date_created: DateTime<Utc>) -> Self {
        self.date_created = Some(date_created);
        self
    }
}

/// Input for updating an existing blog
///
/// `tags: None` keeps the current associations; `Some("")` clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBlogInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub tags: Option<String>,
    pub status: Option<BlogStatus>,
    pub hot_flag: Option<bool>,
    pub home_flag: Option<bool>,
    pub seo_page_title: Option<String>,
    pub seo_alias: Option<String>,
    pub seo_keywords: Option<String>,
    pub seo_description: Option<String>,
}

impl UpdateBlogInput {
    /// Create a new empty UpdateBlogInput
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the raw tag field
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: BlogStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_blog_status_roundtrip() {
        for status in [BlogStatus::Active, BlogStatus::Inactive] {
            assert_eq!(BlogStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(BlogStatus::from_str("ACTIVE"), Some(BlogStatus::Active));
        assert_eq!(BlogStatus::from_str("deleted"), None);
        assert_eq!(BlogStatus::default(), BlogStatus::Active);
    }

    #[test]
    fn test_from_input_defaults() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let blog = Blog::from_input(
            CreateBlogInput::new("Hello")
                .with_tags("rust, web")
                .with_date_created(created),
        );

        assert_eq!(blog.id, 0);
        assert_eq!(blog.name, "Hello");
        assert_eq!(blog.tags.as_deref(), Some("rust, web"));
        assert_eq!(blog.status, BlogStatus::Active);
        assert_eq!(blog.view_count, None);
        assert_eq!(blog.date_created, created);
        assert_eq!(blog.date_modified, created);
    }

    #[test]
    fn test_apply_only_touches_given_fields() {
        let mut blog = Blog::from_input(CreateBlogInput::new("Before").with_tags("a"));
        blog.description = Some("kept".to_string());

        blog.apply(&UpdateBlogInput::new().with_name("After").with_status(BlogStatus::Inactive));

        assert_eq!(blog.name, "After");
        assert_eq!(blog.status, BlogStatus::Inactive);
        assert_eq!(blog.description.as_deref(), Some("kept"));
        assert_eq!(blog.tags.as_deref(), Some("a"));
    }
}
