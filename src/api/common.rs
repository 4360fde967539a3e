//! Common API utilities and shared query types

use axum::{
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::api::ApiError;
use crate::config::ContentConfig;
use crate::models::{BlogSort, PageRequest};
use crate::services::BlogServiceError;

/// `Query` whose rejection is the JSON error envelope
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(|rejection| ApiError::validation_error(rejection.body_text()))
    }
}

/// `Path` whose rejection is the JSON error envelope
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ApiPath(value))
            .map_err(|rejection| ApiError::validation_error(rejection.body_text()))
    }
}

/// Pagination query parameters
///
/// Missing values fall back to page 1 and the configured default size; sizes
/// above the configured maximum are clamped.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn to_request(&self, content: &ContentConfig) -> Result<PageRequest, ApiError> {
        let page = self.page.unwrap_or(1);
        let page_size = self
            .page_size
            .unwrap_or(i64::from(content.default_page_size))
            .min(i64::from(content.max_page_size));
        PageRequest::new(page, page_size).map_err(|e| BlogServiceError::from(e).into())
    }
}

/// Sort query parameter; anything but `popular` means newest first
#[derive(Debug, Default, Deserialize)]
pub struct SortQuery {
    pub sort: Option<String>,
}

impl SortQuery {
    pub fn sort(&self) -> BlogSort {
        self.sort.as_deref().map(BlogSort::parse).unwrap_or_default()
    }
}

/// `top` parameter of the short lists
#[derive(Debug, Default, Deserialize)]
pub struct TopQuery {
    pub top: Option<u32>,
}

impl TopQuery {
    pub fn top(&self, content: &ContentConfig) -> u32 {
        self.top
            .unwrap_or(content.top_count)
            .min(content.max_page_size)
    }
}
