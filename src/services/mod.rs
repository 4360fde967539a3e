//! Services layer - Business logic
//!
//! Services validate input, coordinate repositories and translate store
//! failures into their own error types.

pub mod blog;
pub mod tag;

pub use blog::{BlogService, BlogServiceError};
pub use tag::{normalize_tag_id, parse_tag_field, ReconcileMode, TagService, TagServiceError};
