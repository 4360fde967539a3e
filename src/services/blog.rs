//! Blog service
//!
//! Application-level operations on blogs:
//! - create/update/delete with tag reconciliation in the blog namespace
//! - paged listings (admin, public, search, by tag) through one envelope
//! - top-N lists (latest, hot, related) and the view counter

use crate::db::repositories::BlogRepository;
use crate::models::{
    Blog, BlogQuery, BlogSort, CreateBlogInput, PageRequest, PageRequestError, PagedResult, Tag,
    TagNamespace, UpdateBlogInput,
};
use crate::services::tag::{parse_tag_field, ReconcileMode, TagService, TagServiceError};
use anyhow::Context;
use std::sync::Arc;

/// Width of the `blogs.name` column
const MAX_NAME_LENGTH: usize = 256;

/// Error types for blog service operations
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    #[error("Invalid tag label: '{0}'")]
    InvalidTagLabel(String),

    #[error("Invalid page request: {0}")]
    InvalidPageRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] anyhow::Error),
}

impl From<TagServiceError> for BlogServiceError {
    fn from(err: TagServiceError) -> Self {
        match err {
            TagServiceError::InvalidTagLabel(label) => BlogServiceError::InvalidTagLabel(label),
            TagServiceError::NotFound(id) => BlogServiceError::NotFound(format!("tag '{}'", id)),
            TagServiceError::PersistenceFailure(e) => BlogServiceError::PersistenceFailure(e),
        }
    }
}

impl From<PageRequestError> for BlogServiceError {
    fn from(err: PageRequestError) -> Self {
        BlogServiceError::InvalidPageRequest(err.0)
    }
}

/// Blog service
pub struct BlogService {
    repo: Arc<dyn BlogRepository>,
    tags: Arc<TagService>,
}

impl BlogService {
    pub fn new(repo: Arc<dyn BlogRepository>, tags: Arc<TagService>) -> Self {
        Self { repo, tags }
    }

    /// Create a blog and link its tags.
    ///
    /// The tag field is parsed before anything is written, so an invalid label
    /// leaves no trace. If linking fails after the insert, the new row is
    /// removed again.
    pub async fn add(&self, input: CreateBlogInput) -> Result<Blog, BlogServiceError> {
        validate_name(&input.name)?;
        let drafts = match input.tags.as_deref() {
            Some(raw) => parse_tag_field(raw)?,
            None => Vec::new(),
        };

        let created = self
            .repo
            .create(&Blog::from_input(input))
            .await
            .context("Failed to create blog")?;

        if let Err(err) = self
            .tags
            .apply(created.id, &drafts, TagNamespace::Blog, ReconcileMode::Create)
            .await
        {
            tracing::warn!(blog_id = created.id, "Tag sync failed, removing new blog: {}", err);
            if let Err(cleanup) = self.repo.delete(created.id).await {
                tracing::error!(blog_id = created.id, "Failed to remove blog after tag sync failure: {:#}", cleanup);
            }
            return Err(err.into());
        }

        tracing::info!(blog_id = created.id, tags = drafts.len(), "Blog created");
        Ok(created)
    }

    /// Update a blog.
    ///
    /// When `input.tags` is present the associations are rebuilt from it
    /// (a blank field clears them); otherwise they are left alone. If the
    /// rebuild fails the previous row is written back.
    pub async fn update(&self, id: i64, input: UpdateBlogInput) -> Result<Blog, BlogServiceError> {
        if let Some(name) = &input.name {
            validate_name(name)?;
        }
        let drafts = input.tags.as_deref().map(parse_tag_field).transpose()?;

        let previous = self.get_by_id(id).await?;
        let mut blog = previous.clone();
        blog.apply(&input);

        let updated = self.repo.update(&blog).await.context("Failed to update blog")?;
        if !updated {
            return Err(BlogServiceError::NotFound(format!("blog {}", id)));
        }

        if let Some(drafts) = drafts {
            if let Err(err) = self
                .tags
                .apply(id, &drafts, TagNamespace::Blog, ReconcileMode::Replace)
                .await
            {
                tracing::warn!(blog_id = id, "Tag sync failed, restoring blog: {}", err);
                if let Err(restore) = self.repo.update(&previous).await {
                    tracing::error!(blog_id = id, "Failed to restore blog after tag sync failure: {:#}", restore);
                }
                return Err(err.into());
            }
        }

        tracing::info!(blog_id = id, "Blog updated");
        Ok(blog)
    }

    /// Delete a blog; its associations go with it
    pub async fn delete(&self, id: i64) -> Result<(), BlogServiceError> {
        let deleted = self.repo.delete(id).await.context("Failed to delete blog")?;
        if !deleted {
            return Err(BlogServiceError::NotFound(format!("blog {}", id)));
        }
        tracing::info!(blog_id = id, "Blog deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Blog, BlogServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get blog")?
            .ok_or_else(|| BlogServiceError::NotFound(format!("blog {}", id)))
    }

    /// Generic paged listing
    pub async fn list(&self, query: &BlogQuery, page: &PageRequest) -> Result<PagedResult<Blog>, BlogServiceError> {
        self.repo
            .find_page(query, page)
            .await
            .context("Failed to list blogs")
            .map_err(Into::into)
    }

    /// Every blog whose name contains `keyword`, all statuses, newest first
    pub async fn list_all(&self, keyword: Option<&str>) -> Result<Vec<Blog>, BlogServiceError> {
        let mut query = BlogQuery::new();
        if let Some(keyword) = keyword {
            query = query.keyword(keyword);
        }
        self.repo
            .find_all(&query, None)
            .await
            .context("Failed to list blogs")
            .map_err(Into::into)
    }

    /// Active blogs
    pub async fn list_public(&self, sort: BlogSort, page: &PageRequest) -> Result<PagedResult<Blog>, BlogServiceError> {
        self.list(&BlogQuery::public().sort(sort), page).await
    }

    /// Active blogs whose name contains `keyword`
    pub async fn search(
        &self,
        keyword: &str,
        sort: BlogSort,
        page: &PageRequest,
    ) -> Result<PagedResult<Blog>, BlogServiceError> {
        self.list(&BlogQuery::public().keyword(keyword).sort(sort), page).await
    }

    /// Active blogs linked to `tag_id`, newest first
    pub async fn list_by_tag(&self, tag_id: &str, page: &PageRequest) -> Result<PagedResult<Blog>, BlogServiceError> {
        self.list(&BlogQuery::public().tag(tag_id), page).await
    }

    /// Newest active blogs
    pub async fn latest(&self, top: u32) -> Result<Vec<Blog>, BlogServiceError> {
        self.top(BlogQuery::public(), top).await
    }

    /// Newest active blogs flagged hot
    pub async fn hot(&self, top: u32) -> Result<Vec<Blog>, BlogServiceError> {
        self.top(BlogQuery::public().hot_only(), top).await
    }

    /// Newest active blogs other than `id`
    pub async fn related(&self, id: i64, top: u32) -> Result<Vec<Blog>, BlogServiceError> {
        self.top(BlogQuery::public().exclude(id), top).await
    }

    async fn top(&self, query: BlogQuery, top: u32) -> Result<Vec<Blog>, BlogServiceError> {
        if top == 0 {
            return Ok(Vec::new());
        }
        self.repo
            .find_all(&query, Some(i64::from(top)))
            .await
            .context("Failed to list blogs")
            .map_err(Into::into)
    }

    /// Names of active blogs containing `name`, for autocomplete
    pub async fn names_matching(&self, name: &str) -> Result<Vec<String>, BlogServiceError> {
        let blogs = self
            .repo
            .find_all(&BlogQuery::public().keyword(name), None)
            .await
            .context("Failed to search blog names")?;
        Ok(blogs.into_iter().map(|b| b.name).collect())
    }

    /// Count one view
    pub async fn increase_view(&self, id: i64) -> Result<(), BlogServiceError> {
        let found = self
            .repo
            .increment_view(id)
            .await
            .context("Failed to increase view count")?;
        if !found {
            return Err(BlogServiceError::NotFound(format!("blog {}", id)));
        }
        Ok(())
    }

    pub async fn tags_for_blog(&self, id: i64) -> Result<Vec<Tag>, BlogServiceError> {
        Ok(self.tags.tags_for_blog(id).await?)
    }

    pub async fn get_tag(&self, tag_id: &str) -> Result<Tag, BlogServiceError> {
        Ok(self.tags.get_tag(tag_id).await?)
    }

    pub async fn tags_in_text(&self, search_text: &str, namespace: TagNamespace) -> Result<Vec<Tag>, BlogServiceError> {
        Ok(self.tags.tags_in_text(search_text, namespace).await?)
    }
}

fn validate_name(name: &str) -> Result<(), BlogServiceError> {
    if name.trim().is_empty() {
        return Err(BlogServiceError::ValidationError("Blog name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(BlogServiceError::ValidationError(format!(
            "Blog name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxBlogRepository, SqlxTagRepository, TagRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::BlogStatus;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    struct Fixture {
        pool: DynDatabasePool,
        service: BlogService,
        tag_repo: Arc<dyn TagRepository>,
    }

    async fn setup_test_service() -> Fixture {
        let pool = create_test_pool()
            .await
            .expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let tag_repo = SqlxTagRepository::boxed(pool.clone());
        let tags = Arc::new(TagService::new(tag_repo.clone()));
        let service = BlogService::new(SqlxBlogRepository::boxed(pool.clone()), tags);
        Fixture { pool, service, tag_repo }
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    /// `n` active blogs, one hour apart, named "Post 0".."Post n-1"
    async fn seed(service: &BlogService, n: usize) -> Vec<Blog> {
        let mut blogs = Vec::new();
        for i in 0..n {
            let input = CreateBlogInput::new(format!("Post {}", i))
                .with_date_created(base_time() + Duration::hours(i as i64));
            blogs.push(service.add(input).await.expect("Failed to add blog"));
        }
        blogs
    }

    async fn count(pool: &DynDatabasePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool.as_sqlite().unwrap())
            .await
            .unwrap()
    }

    fn page(page: i64, size: i64) -> PageRequest {
        PageRequest::new(page, size).unwrap()
    }

    // ========================================================================
    // Create / update / delete
    // ========================================================================

    #[tokio::test]
    async fn test_add_normalizes_repeated_tag() {
        let f = setup_test_service().await;

        let blog = f
            .service
            .add(CreateBlogInput::new("Go tips").with_tags("Go, go, GO "))
            .await
            .unwrap();

        assert_eq!(count(&f.pool, "tags").await, 1);
        assert_eq!(count(&f.pool, "blog_tags").await, 1);
        let tags = f.service.tags_for_blog(blog.id).await.unwrap();
        assert_eq!(tags[0].id, "go");
        assert_eq!(tags[0].tag_type, TagNamespace::Blog);
    }

    #[tokio::test]
    async fn test_add_rejects_empty_name() {
        let f = setup_test_service().await;
        let result = f.service.add(CreateBlogInput::new("   ")).await;

        assert!(matches!(result, Err(BlogServiceError::ValidationError(_))));
        assert_eq!(count(&f.pool, "blogs").await, 0);
    }

    #[tokio::test]
    async fn test_add_invalid_tag_writes_nothing() {
        let f = setup_test_service().await;
        let result = f
            .service
            .add(CreateBlogInput::new("Post").with_tags("fine, ***"))
            .await;

        match result {
            Err(BlogServiceError::InvalidTagLabel(label)) => assert_eq!(label, "***"),
            other => panic!("expected InvalidTagLabel, got {:?}", other),
        }
        assert_eq!(count(&f.pool, "blogs").await, 0);
        assert_eq!(count(&f.pool, "tags").await, 0);
    }

    #[tokio::test]
    async fn test_add_with_empty_tag_field() {
        let f = setup_test_service().await;
        let blog = f.service.add(CreateBlogInput::new("Post").with_tags("")).await.unwrap();

        assert!(f.service.tags_for_blog(blog.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_tags() {
        let f = setup_test_service().await;
        let blog = f
            .service
            .add(CreateBlogInput::new("Post").with_tags("a,b"))
            .await
            .unwrap();

        let updated = f
            .service
            .update(blog.id, UpdateBlogInput::new().with_tags("c"))
            .await
            .unwrap();
        assert_eq!(updated.tags.as_deref(), Some("c"));

        let links = f.tag_repo.list_blog_tags(blog.id).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].tag_id, "c");
    }

    #[tokio::test]
    async fn test_update_without_tags_keeps_associations() {
        let f = setup_test_service().await;
        let blog = f
            .service
            .add(CreateBlogInput::new("Post").with_tags("rust"))
            .await
            .unwrap();

        let updated = f
            .service
            .update(blog.id, UpdateBlogInput::new().with_name("Renamed"))
            .await
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(f.service.get_by_id(blog.id).await.unwrap().name, "Renamed");
        assert_eq!(f.service.tags_for_blog(blog.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_with_blank_tags_clears() {
        let f = setup_test_service().await;
        let blog = f
            .service
            .add(CreateBlogInput::new("Post").with_tags("rust, web"))
            .await
            .unwrap();

        f.service
            .update(blog.id, UpdateBlogInput::new().with_tags(""))
            .await
            .unwrap();

        assert!(f.service.tags_for_blog(blog.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_invalid_tag_keeps_previous_state() {
        let f = setup_test_service().await;
        let blog = f
            .service
            .add(CreateBlogInput::new("Post").with_tags("rust"))
            .await
            .unwrap();

        let result = f
            .service
            .update(blog.id, UpdateBlogInput::new().with_name("Changed").with_tags("!!"))
            .await;

        assert!(matches!(result, Err(BlogServiceError::InvalidTagLabel(_))));
        assert_eq!(f.service.get_by_id(blog.id).await.unwrap().name, "Post");
        assert_eq!(f.service.tags_for_blog(blog.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_restores_row_when_tag_sync_fails() {
        let f = setup_test_service().await;
        let blog = f
            .service
            .add(CreateBlogInput::new("Post").with_tags("a"))
            .await
            .unwrap();
        sqlx::query("DROP TABLE blog_tags")
            .execute(f.pool.as_sqlite().unwrap())
            .await
            .unwrap();

        let result = f
            .service
            .update(blog.id, UpdateBlogInput::new().with_name("Changed").with_tags("b"))
            .await;

        assert!(matches!(result, Err(BlogServiceError::PersistenceFailure(_))));
        let stored = f.service.get_by_id(blog.id).await.unwrap();
        assert_eq!(stored.name, "Post");
        assert_eq!(stored.tags.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let f = setup_test_service().await;

        assert!(matches!(
            f.service.update(77, UpdateBlogInput::new().with_name("x")).await,
            Err(BlogServiceError::NotFound(_))
        ));
        assert!(matches!(f.service.delete(77).await, Err(BlogServiceError::NotFound(_))));
        assert!(matches!(f.service.get_by_id(77).await, Err(BlogServiceError::NotFound(_))));
        assert!(matches!(f.service.increase_view(77).await, Err(BlogServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_associations() {
        let f = setup_test_service().await;
        let blog = f
            .service
            .add(CreateBlogInput::new("Post").with_tags("a, b"))
            .await
            .unwrap();

        f.service.delete(blog.id).await.unwrap();

        assert_eq!(count(&f.pool, "blog_tags").await, 0);
        assert_eq!(count(&f.pool, "tags").await, 2);
    }

    // ========================================================================
    // Listings
    // ========================================================================

    #[tokio::test]
    async fn test_public_paging_over_25_items() {
        let f = setup_test_service().await;
        seed(&f.service, 25).await;

        let first = f.service.list_public(BlogSort::Recent, &page(1, 10)).await.unwrap();
        assert_eq!(first.results.len(), 10);
        assert_eq!(first.row_count, 25);
        assert_eq!(first.results[0].name, "Post 24");

        let third = f.service.list_public(BlogSort::Recent, &page(3, 10)).await.unwrap();
        assert_eq!(third.results.len(), 5);
        assert_eq!(third.row_count, 25);
        assert!(!third.has_next());
    }

    #[tokio::test]
    async fn test_public_listing_hides_inactive() {
        let f = setup_test_service().await;
        seed(&f.service, 3).await;
        f.service
            .add(CreateBlogInput::new("Hidden").with_status(BlogStatus::Inactive))
            .await
            .unwrap();

        let public = f.service.list_public(BlogSort::Recent, &page(1, 10)).await.unwrap();
        assert_eq!(public.row_count, 3);
        assert!(public.results.iter().all(|b| b.status == BlogStatus::Active));

        assert_eq!(f.service.list_all(None).await.unwrap().len(), 4);
        assert_eq!(f.service.list_all(Some("hid")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_popular_sort_orders_by_views() {
        let f = setup_test_service().await;
        let blogs = seed(&f.service, 3).await;
        for _ in 0..3 {
            f.service.increase_view(blogs[0].id).await.unwrap();
        }
        f.service.increase_view(blogs[2].id).await.unwrap();

        let popular = f.service.list_public(BlogSort::Popular, &page(1, 10)).await.unwrap();
        let views: Vec<i64> = popular.results.iter().map(|b| b.view_count.unwrap_or(0)).collect();
        assert_eq!(views, vec![3, 1, 0]);
        assert_eq!(popular.results[0].id, blogs[0].id);
    }

    #[tokio::test]
    async fn test_search_by_keyword() {
        let f = setup_test_service().await;
        f.service.add(CreateBlogInput::new("Learning Rust")).await.unwrap();
        f.service.add(CreateBlogInput::new("Rusty nails")).await.unwrap();
        f.service.add(CreateBlogInput::new("Gardening")).await.unwrap();

        let found = f.service.search("rust", BlogSort::Recent, &page(1, 10)).await.unwrap();
        assert_eq!(found.row_count, 2);

        let none = f.service.search("python", BlogSort::Recent, &page(1, 10)).await.unwrap();
        assert!(none.results.is_empty());
        assert_eq!(none.row_count, 0);
    }

    #[tokio::test]
    async fn test_list_by_tag() {
        let f = setup_test_service().await;
        f.service.add(CreateBlogInput::new("One").with_tags("rust")).await.unwrap();
        f.service.add(CreateBlogInput::new("Two").with_tags("Rust, web")).await.unwrap();
        f.service.add(CreateBlogInput::new("Three").with_tags("web")).await.unwrap();

        let rust = f.service.list_by_tag("rust", &page(1, 10)).await.unwrap();
        assert_eq!(rust.row_count, 2);

        let empty = f.service.list_by_tag("nothing", &page(1, 10)).await.unwrap();
        assert!(empty.results.is_empty());
        assert_eq!(empty.row_count, 0);
    }

    #[tokio::test]
    async fn test_list_by_tag_skips_inactive_blogs() {
        let f = setup_test_service().await;
        f.service
            .add(
                CreateBlogInput::new("Draft")
                    .with_tags("drafts")
                    .with_status(BlogStatus::Inactive),
            )
            .await
            .unwrap();

        assert_eq!(f.service.get_tag("drafts").await.unwrap().id, "drafts");
        let listed = f.service.list_by_tag("drafts", &page(1, 10)).await.unwrap();
        assert_eq!(listed.row_count, 0);
        assert!(listed.results.is_empty());
    }

    #[tokio::test]
    async fn test_list_with_huge_page_size() {
        let f = setup_test_service().await;
        seed(&f.service, 1).await;

        let listed = f
            .service
            .list_public(BlogSort::Recent, &page(1, i64::MAX))
            .await
            .unwrap();
        assert_eq!(listed.results.len(), 1);
        assert_eq!(listed.page_count(), 1);
        assert!(!listed.has_next());
    }

    #[tokio::test]
    async fn test_list_by_tag_with_duplicate_links() {
        let f = setup_test_service().await;
        let blog = f
            .service
            .add(CreateBlogInput::new("Dup").with_tags("rust"))
            .await
            .unwrap();
        sqlx::query("INSERT INTO blog_tags (blog_id, tag_id) VALUES (?, 'rust')")
            .bind(blog.id)
            .execute(f.pool.as_sqlite().unwrap())
            .await
            .unwrap();

        let listed = f.service.list_by_tag("rust", &page(1, 10)).await.unwrap();
        assert_eq!(listed.row_count, 1);
        assert_eq!(listed.results.len(), 1);
        assert_eq!(f.service.tags_for_blog(blog.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_top_lists() {
        let f = setup_test_service().await;
        let blogs = seed(&f.service, 4).await;
        f.service
            .update(blogs[1].id, UpdateBlogInput { hot_flag: Some(true), ..Default::default() })
            .await
            .unwrap();

        let latest = f.service.latest(2).await.unwrap();
        assert_eq!(latest.iter().map(|b| b.id).collect::<Vec<_>>(), vec![blogs[3].id, blogs[2].id]);

        let hot = f.service.hot(5).await.unwrap();
        assert_eq!(hot.len(), 1);
        assert_eq!(hot[0].id, blogs[1].id);

        let related = f.service.related(blogs[3].id, 5).await.unwrap();
        assert_eq!(related.len(), 3);
        assert!(related.iter().all(|b| b.id != blogs[3].id));

        assert!(f.service.latest(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_names_matching() {
        let f = setup_test_service().await;
        f.service.add(CreateBlogInput::new("Async Rust")).await.unwrap();
        f.service
            .add(CreateBlogInput::new("Rust draft").with_status(BlogStatus::Inactive))
            .await
            .unwrap();

        let names = f.service.names_matching("rust").await.unwrap();
        assert_eq!(names, vec!["Async Rust".to_string()]);
    }

    #[tokio::test]
    async fn test_increase_view_from_null() {
        let f = setup_test_service().await;
        let blog = seed(&f.service, 1).await.remove(0);
        assert_eq!(blog.view_count, None);

        f.service.increase_view(blog.id).await.unwrap();
        assert_eq!(f.service.get_by_id(blog.id).await.unwrap().view_count, Some(1));
    }

    #[test]
    fn test_page_request_error_conversion() {
        let err: BlogServiceError = PageRequest::new(0, 10).unwrap_err().into();
        assert!(matches!(err, BlogServiceError::InvalidPageRequest(_)));
    }
}
