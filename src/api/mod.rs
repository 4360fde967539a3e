//! API layer - HTTP handlers and routing
//!
//! - Blog API endpoints (public listings and admin CRUD)
//! - Tag API endpoints
//!
//! All routes live under `/api/v1`.

pub mod blogs;
pub mod common;
pub mod error;
pub mod responses;
pub mod tags;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ContentConfig;
use crate::services::BlogService;

pub use error::{ApiError, ApiErrorDetail};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub blog_service: Arc<BlogService>,
    pub content: ContentConfig,
}

/// Build the API router (mounted under `/api/v1`)
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/blogs", blogs::public_router())
        .nest("/tags", tags::router())
        .nest("/admin/blogs", blogs::admin_router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .nest("/api/v1", build_api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
