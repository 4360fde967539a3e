//! View models
//!
//! Each entity has exactly one external representation. Mapping copies a
//! fixed set of fields and cannot fail.

use serde::Serialize;

use crate::models::{Blog, PagedResult, Tag};

/// External representation of a blog
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BlogViewModel {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub tags: Option<String>,
    pub status: String,
    pub hot_flag: bool,
    pub home_flag: bool,
    pub view_count: Option<i64>,
    pub seo_page_title: Option<String>,
    pub seo_alias: Option<String>,
    pub seo_keywords: Option<String>,
    pub seo_description: Option<String>,
    pub date_created: String,
    pub date_modified: String,
}

impl From<Blog> for BlogViewModel {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            name: blog.name,
            description: blog.description,
            content: blog.content,
            image: blog.image,
            tags: blog.tags,
            status: blog.status.to_string(),
            hot_flag: blog.hot_flag,
            home_flag: blog.home_flag,
            view_count: blog.view_count,
            seo_page_title: blog.seo_page_title,
            seo_alias: blog.seo_alias,
            seo_keywords: blog.seo_keywords,
            seo_description: blog.seo_description,
            date_created: blog.date_created.to_rfc3339(),
            date_modified: blog.date_modified.to_rfc3339(),
        }
    }
}

/// External representation of a tag
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TagViewModel {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub tag_type: String,
}

impl From<Tag> for TagViewModel {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            tag_type: tag.tag_type.to_string(),
        }
    }
}

/// A blog together with its tags
#[derive(Debug, Serialize)]
pub struct BlogDetailResponse {
    #[serde(flatten)]
    pub blog: BlogViewModel,
    pub tag_list: Vec<TagViewModel>,
}

/// Paged listing envelope
#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub current_page: i64,
    pub page_size: i64,
    pub row_count: i64,
    pub page_count: i64,
    pub results: Vec<T>,
}

impl<T> PagedResponse<T> {
    pub fn from_paged<U: Into<T>>(paged: PagedResult<U>) -> Self {
        let page_count = paged.page_count();
        let paged = paged.map(Into::into);
        Self {
            current_page: paged.current_page,
            page_size: paged.page_size,
            row_count: paged.row_count,
            page_count,
            results: paged.results,
        }
    }
}
