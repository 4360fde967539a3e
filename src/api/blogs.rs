//! Blog API endpoints
//!
//! Public:
//! - GET  /api/v1/blogs                 - active blogs, paged
//! - GET  /api/v1/blogs/search          - active blogs by keyword, paged
//! - GET  /api/v1/blogs/latest          - newest active blogs
//! - GET  /api/v1/blogs/hot             - newest hot blogs
//! - GET  /api/v1/blogs/{id}            - one active blog with its tags
//! - GET  /api/v1/blogs/{id}/related    - other active blogs
//! - POST /api/v1/blogs/{id}/view       - count a view
//!
//! Admin:
//! - GET    /api/v1/admin/blogs         - all blogs, paged, optional keyword
//! - GET    /api/v1/admin/blogs/all     - all blogs unpaged, optional keyword
//! - GET    /api/v1/admin/blogs/names   - active blog names containing `name`
//! - POST   /api/v1/admin/blogs         - create
//! - GET    /api/v1/admin/blogs/{id}    - any blog with its tags
//! - PUT    /api/v1/admin/blogs/{id}    - update
//! - DELETE /api/v1/admin/blogs/{id}    - delete

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::{ApiPath, ApiQuery, PageQuery, SortQuery, TopQuery};
use crate::api::responses::{BlogDetailResponse, BlogViewModel, PagedResponse, TagViewModel};
use crate::api::{ApiError, AppState};
use crate::models::{BlogQuery, BlogStatus, CreateBlogInput, UpdateBlogInput};

#[derive(Debug, Default, Deserialize)]
pub struct KeywordQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    pub name: String,
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blogs))
        .route("/search", get(search_blogs))
        .route("/latest", get(latest_blogs))
        .route("/hot", get(hot_blogs))
        .route("/{id}", get(get_blog))
        .route("/{id}/related", get(related_blogs))
        .route("/{id}/view", post(increase_view))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(admin_list_blogs).post(create_blog))
        .route("/all", get(admin_all_blogs))
        .route("/names", get(blog_names))
        .route("/{id}", get(admin_get_blog).put(update_blog).delete(delete_blog))
}

fn to_view_models(blogs: Vec<crate::models::Blog>) -> Vec<BlogViewModel> {
    blogs.into_iter().map(BlogViewModel::from).collect()
}

async fn detail(state: &AppState, blog: crate::models::Blog) -> Result<BlogDetailResponse, ApiError> {
    let tags = state.blog_service.tags_for_blog(blog.id).await?;
    Ok(BlogDetailResponse {
        blog: blog.into(),
        tag_list: tags.into_iter().map(TagViewModel::from).collect(),
    })
}

// ============================================================================
// Public handlers
// ============================================================================

/// GET /api/v1/blogs
async fn list_blogs(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(sort): ApiQuery<SortQuery>,
) -> Result<Json<PagedResponse<BlogViewModel>>, ApiError> {
    let request = page.to_request(&state.content)?;
    let paged = state.blog_service.list_public(sort.sort(), &request).await?;
    Ok(Json(PagedResponse::from_paged(paged)))
}

/// GET /api/v1/blogs/search
async fn search_blogs(
    State(state): State<AppState>,
    ApiQuery(keyword): ApiQuery<KeywordQuery>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(sort): ApiQuery<SortQuery>,
) -> Result<Json<PagedResponse<BlogViewModel>>, ApiError> {
    let request = page.to_request(&state.content)?;
    let keyword = keyword.keyword.unwrap_or_default();
    let paged = state
        .blog_service
        .search(&keyword, sort.sort(), &request)
        .await?;
    Ok(Json(PagedResponse::from_paged(paged)))
}

/// GET /api/v1/blogs/latest
async fn latest_blogs(
    State(state): State<AppState>,
    ApiQuery(top): ApiQuery<TopQuery>,
) -> Result<Json<Vec<BlogViewModel>>, ApiError> {
    let blogs = state.blog_service.latest(top.top(&state.content)).await?;
    Ok(Json(to_view_models(blogs)))
}

/// GET /api/v1/blogs/hot
async fn hot_blogs(
    State(state): State<AppState>,
    ApiQuery(top): ApiQuery<TopQuery>,
) -> Result<Json<Vec<BlogViewModel>>, ApiError> {
    let blogs = state.blog_service.hot(top.top(&state.content)).await?;
    Ok(Json(to_view_models(blogs)))
}

/// GET /api/v1/blogs/{id}
///
/// Inactive blogs are reported as missing.
async fn get_blog(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<BlogDetailResponse>, ApiError> {
    let blog = state.blog_service.get_by_id(id).await?;
    if blog.status != BlogStatus::Active {
        return Err(ApiError::not_found(format!("Not found: blog {}", id)));
    }
    Ok(Json(detail(&state, blog).await?))
}

/// GET /api/v1/blogs/{id}/related
async fn related_blogs(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(top): ApiQuery<TopQuery>,
) -> Result<Json<Vec<BlogViewModel>>, ApiError> {
    let blogs = state
        .blog_service
        .related(id, top.top(&state.content))
        .await?;
    Ok(Json(to_view_models(blogs)))
}

/// POST /api/v1/blogs/{id}/view
async fn increase_view(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.blog_service.increase_view(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admin handlers
// ============================================================================

/// GET /api/v1/admin/blogs
async fn admin_list_blogs(
    State(state): State<AppState>,
    ApiQuery(keyword): ApiQuery<KeywordQuery>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<Json<PagedResponse<BlogViewModel>>, ApiError> {
    let request = page.to_request(&state.content)?;
    let query = match keyword.keyword {
        Some(k) => BlogQuery::new().keyword(k),
        None => BlogQuery::new(),
    };
    let paged = state.blog_service.list(&query, &request).await?;
    Ok(Json(PagedResponse::from_paged(paged)))
}

/// GET /api/v1/admin/blogs/all
async fn admin_all_blogs(
    State(state): State<AppState>,
    ApiQuery(keyword): ApiQuery<KeywordQuery>,
) -> Result<Json<Vec<BlogViewModel>>, ApiError> {
    let blogs = state.blog_service.list_all(keyword.keyword.as_deref()).await?;
    Ok(Json(to_view_models(blogs)))
}

/// GET /api/v1/admin/blogs/names
async fn blog_names(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NameQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.blog_service.names_matching(&query.name).await?))
}

/// POST /api/v1/admin/blogs
async fn create_blog(
    State(state): State<AppState>,
    Json(input): Json<CreateBlogInput>,
) -> Result<(StatusCode, Json<BlogDetailResponse>), ApiError> {
    let blog = state.blog_service.add(input).await?;
    Ok((StatusCode::CREATED, Json(detail(&state, blog).await?)))
}

/// GET /api/v1/admin/blogs/{id}
async fn admin_get_blog(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<BlogDetailResponse>, ApiError> {
    let blog = state.blog_service.get_by_id(id).await?;
    Ok(Json(detail(&state, blog).await?))
}

/// PUT /api/v1/admin/blogs/{id}
async fn update_blog(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    Json(input): Json<UpdateBlogInput>,
) -> Result<Json<BlogDetailResponse>, ApiError> {
    let blog = state.blog_service.update(id, input).await?;
    Ok(Json(detail(&state, blog).await?))
}

/// DELETE /api/v1/admin/blogs/{id}
async fn delete_blog(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.blog_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
