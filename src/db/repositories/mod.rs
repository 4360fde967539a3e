//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the operations for one entity; `query` holds the
//! SQL composition shared by the blog listings.

pub mod blog;
pub mod query;
pub mod tag;

pub use blog::{BlogRepository, SqlxBlogRepository};
pub use tag::{SqlxTagRepository, TagRepository};
