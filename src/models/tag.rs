//! Tag model
//!
//! Tags are keyed by their normalized label, so the same label always lands on
//! the same row. `BlogTag` is the join row between blogs and tags.

use serde::{Deserialize, Serialize};

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// Normalized identifier (primary key)
    pub id: String,
    /// Display label as first submitted
    pub name: String,
    /// Namespace the tag belongs to
    pub tag_type: TagNamespace,
}

impl Tag {
    pub fn new(id: impl Into<String>, name: impl Into<String>, tag_type: TagNamespace) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tag_type,
        }
    }
}

/// Which family of content a tag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TagNamespace {
    #[default]
    Blog,
    Product,
}

impl TagNamespace {
    /// Convert namespace to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TagNamespace::Blog => "blog",
            TagNamespace::Product => "product",
        }
    }

    /// Parse namespace from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blog" => Some(TagNamespace::Blog),
            "product" => Some(TagNamespace::Product),
            _ => None,
        }
    }
}

impl std::fmt::Display for TagNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Association row between a blog and a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogTag {
    pub id: i64,
    pub blog_id: i64,
    pub tag_id: String,
}

/// A parsed tag token waiting to be written: normalized id plus display label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    pub id: String,
    pub name: String,
}
