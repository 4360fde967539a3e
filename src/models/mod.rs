//! Data models
//!
//! Entities stored in the database (Blog, Tag, BlogTag), the inputs used to
//! create and update them, and the listing/pagination types shared by the
//! repository, service and API layers.

mod blog;
mod paging;
mod query;
mod tag;

pub use blog::{Blog, BlogStatus, CreateBlogInput, UpdateBlogInput};
pub use paging::{PageRequest, PageRequestError, PagedResult};
pub use query::{BlogQuery, BlogSort};
pub use tag::{BlogTag, Tag, TagDraft, TagNamespace};
