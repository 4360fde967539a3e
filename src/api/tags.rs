//! Tag API endpoints
//!
//! - GET /api/v1/tags?search=...          - blog tags whose name occurs in the text
//! - GET /api/v1/tags/{tag_id}            - one tag
//! - GET /api/v1/tags/{tag_id}/blogs      - active blogs carrying the tag, paged

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::{ApiPath, ApiQuery, PageQuery};
use crate::api::responses::{BlogViewModel, PagedResponse, TagViewModel};
use crate::api::{ApiError, AppState};
use crate::models::TagNamespace;

/// Query parameters for tag search
#[derive(Debug, Default, Deserialize)]
pub struct SearchTagsQuery {
    #[serde(default)]
    pub search: String,
}

/// Build the tags router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_tags))
        .route("/{tag_id}", get(get_tag))
        .route("/{tag_id}/blogs", get(get_tag_blogs))
}

/// GET /api/v1/tags
async fn search_tags(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchTagsQuery>,
) -> Result<Json<Vec<TagViewModel>>, ApiError> {
    let tags = state
        .blog_service
        .tags_in_text(&query.search, TagNamespace::Blog)
        .await?;
    Ok(Json(tags.into_iter().map(TagViewModel::from).collect()))
}

/// GET /api/v1/tags/{tag_id}
async fn get_tag(
    State(state): State<AppState>,
    ApiPath(tag_id): ApiPath<String>,
) -> Result<Json<TagViewModel>, ApiError> {
    let tag = state.blog_service.get_tag(&tag_id).await?;
    Ok(Json(tag.into()))
}

/// GET /api/v1/tags/{tag_id}/blogs
async fn get_tag_blogs(
    State(state): State<AppState>,
    ApiPath(tag_id): ApiPath<String>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<Json<PagedResponse<BlogViewModel>>, ApiError> {
    let request = page.to_request(&state.content)?;
    state.blog_service.get_tag(&tag_id).await?;
    let paged = state.blog_service.list_by_tag(&tag_id, &request).await?;
    Ok(Json(PagedResponse::from_paged(paged)))
}
