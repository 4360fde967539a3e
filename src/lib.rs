//! Contentdesk - blog content backend
//!
//! Blogs carry a free-text tag field that is normalized into shared tag
//! entities, and are served through filtered, paged listings.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
