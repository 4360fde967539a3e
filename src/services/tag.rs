//! Tag service
//!
//! Turns the free-text tag field of a blog into normalized tag identifiers and
//! keeps the blog's associations in step with it:
//! - `normalize_tag_id` maps a label to its identifier
//! - `parse_tag_field` splits, normalizes and de-duplicates a raw field
//! - `TagService::reconcile` writes the parsed set through the repository

use crate::db::repositories::TagRepository;
use crate::models::{Tag, TagDraft, TagNamespace};
use anyhow::Context;
use std::collections::HashSet;
use std::sync::Arc;

/// Width of the `tags.id` and `tags.name` columns
pub const MAX_TAG_LENGTH: usize = 50;

/// Error types for tag service operations
#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    /// A token of the tag field cannot become an identifier
    #[error("Invalid tag label: '{0}'")]
    InvalidTagLabel(String),

    #[error("Tag not found: {0}")]
    NotFound(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] anyhow::Error),
}

/// How reconciliation treats the blog's existing associations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// New blog: only insert
    Create,
    /// Existing blog: drop previous associations, then insert
    Replace,
}

/// Normalize a tag label into its identifier.
///
/// Transliterates to ASCII, lowercases and joins alphanumeric runs with `-`,
/// so labels differing only in case, accents or surrounding whitespace share
/// one identifier. The function is idempotent.
///
/// # Errors
/// `InvalidTagLabel` if nothing alphanumeric survives, or the trimmed label
/// or the identifier is longer than `MAX_TAG_LENGTH`.
pub fn normalize_tag_id(label: &str) -> Result<String, TagServiceError> {
    let trimmed = label.trim();
    let id = slug::slugify(trimmed);
    if id.is_empty() || id.len() > MAX_TAG_LENGTH || trimmed.chars().count() > MAX_TAG_LENGTH {
        return Err(TagServiceError::InvalidTagLabel(label.to_string()));
    }
    Ok(id)
}

/// Parse a raw comma separated tag field.
///
/// Blank tokens are skipped. Duplicate identifiers collapse onto the first
/// occurrence, whose trimmed label becomes the display name. Order of first
/// appearance is kept. Any invalid token fails the whole field.
pub fn parse_tag_field(raw: &str) -> Result<Vec<TagDraft>, TagServiceError> {
    let mut seen = HashSet::new();
    let mut drafts = Vec::new();

    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let id = normalize_tag_id(token)?;
        if seen.insert(id.clone()) {
            drafts.push(TagDraft {
                id,
                name: token.to_string(),
            });
        }
    }

    Ok(drafts)
}

/// Tag service
pub struct TagService {
    repo: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    /// Reconcile a blog's tag associations with a raw tag field.
    ///
    /// - `None`: nothing is touched.
    /// - blank field: `Create` touches nothing, `Replace` removes every association.
    /// - otherwise the parsed tags are upserted and linked in one transaction.
    ///
    /// Returns the identifiers now linked to the blog by this call.
    pub async fn reconcile(
        &self,
        blog_id: i64,
        raw_tags: Option<&str>,
        namespace: TagNamespace,
        mode: ReconcileMode,
    ) -> Result<Vec<String>, TagServiceError> {
        let Some(raw) = raw_tags else {
            return Ok(Vec::new());
        };
        let drafts = parse_tag_field(raw)?;
        self.apply(blog_id, &drafts, namespace, mode).await?;
        Ok(drafts.into_iter().map(|d| d.id).collect())
    }

    /// Write an already parsed tag set for a blog.
    pub async fn apply(
        &self,
        blog_id: i64,
        drafts: &[TagDraft],
        namespace: TagNamespace,
        mode: ReconcileMode,
    ) -> Result<(), TagServiceError> {
        if drafts.is_empty() && mode == ReconcileMode::Create {
            return Ok(());
        }

        self.repo
            .sync_blog_tags(blog_id, drafts, namespace, mode == ReconcileMode::Replace)
            .await
            .with_context(|| format!("Failed to reconcile tags of blog {}", blog_id))?;

        tracing::debug!(blog_id, count = drafts.len(), ?mode, "Reconciled blog tags");
        Ok(())
    }

    /// Tags linked to a blog
    pub async fn tags_for_blog(&self, blog_id: i64) -> Result<Vec<Tag>, TagServiceError> {
        self.repo
            .get_by_blog_id(blog_id)
            .await
            .context("Failed to get tags for blog")
            .map_err(Into::into)
    }

    /// Get a tag by identifier
    ///
    /// # Errors
    /// `NotFound` if no tag has this identifier
    pub async fn get_tag(&self, tag_id: &str) -> Result<Tag, TagServiceError> {
        self.repo
            .get_by_id(tag_id)
            .await
            .context("Failed to get tag")?
            .ok_or_else(|| TagServiceError::NotFound(tag_id.to_string()))
    }

    /// Tags of `namespace` whose name appears in `search_text`
    pub async fn tags_in_text(
        &self,
        search_text: &str,
        namespace: TagNamespace,
    ) -> Result<Vec<Tag>, TagServiceError> {
        if search_text.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.repo
            .find_in_text(search_text, namespace)
            .await
            .context("Failed to search tags")
            .map_err(Into::into)
    }
}
