//! Pagination request adapter
//!
//! Bridges a list endpoint and any [`Paginatable`] data source. The work is
//! split in two so handlers can post-process items in between:
//!
//! ```ignore
//! let page = fetch_page(&state.records, &query.controls, None, None).await?;
//! let page = page.map_items(|items| items.into_iter().map(Summary::from).collect());
//! Ok(format_response(page, &query.link_base))
//! ```
//!
//! [`paginate`] runs both steps for the common case.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::convert::Infallible;
use tracing::{debug, instrument, warn};

use super::links::{LinkBase, NavigationLinks, PageWindow};
use super::pagination::{
    build_options, normalize, PageControls, PaginationQuery, PaginationSettings, SearchCriteria,
    SearchOptions,
};
use crate::error::{ApiResult, PaginateError};

/// Arguments handed to the data source for one page.
///
/// `current_page` and `page` are both forwarded as read from the query;
/// reconciling them is up to the data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRequest {
    pub current_page: Option<u64>,
    pub page: Option<u64>,
    pub page_size: u32,
    pub options: SearchOptions,
}

/// A page as resolved by the data source.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub current_page: u64,
    pub before: Option<String>,
    pub after: Option<String>,
    pub page_count: u64,
    pub per_page: u32,
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> PageResult<T> {
    /// Replaces the items while keeping the resolved paging metadata.
    pub fn map_items<U, F>(self, f: F) -> PageResult<U>
    where
        F: FnOnce(Vec<T>) -> Vec<U>,
    {
        PageResult {
            current_page: self.current_page,
            before: self.before,
            after: self.after,
            page_count: self.page_count,
            per_page: self.per_page,
            total: self.total,
            items: f(self.items),
        }
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            current_page: self.current_page,
            before: self.before.clone(),
            after: self.after.clone(),
            page_count: self.page_count,
            per_page: self.per_page,
        }
    }
}

/// A data source that can search and paginate its records.
#[async_trait]
pub trait Paginatable: Send + Sync {
    type Item: Serialize + Send;

    async fn paginate(
        &self,
        criteria: SearchCriteria,
        request: PageRequest,
    ) -> Result<PageResult<Self::Item>, PaginateError>;
}

/// Response envelope for every paginated list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub page: u64,
    pub has_more: bool,
    pub links: NavigationLinks,
    pub page_count: u64,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    pub data: Vec<T>,
}

impl<T: Serialize> IntoResponse for PageEnvelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Extractor for list endpoints: normalized controls plus what the
/// navigation links need from the request. Never rejects.
#[derive(Debug, Clone)]
pub struct PageQuery {
    pub controls: PageControls,
    pub link_base: LinkBase,
}

#[async_trait]
impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
    PaginationSettings: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| &original.0)
            .unwrap_or(&parts.uri);
        let query = PaginationQuery::from_query(uri.query());
        let link_base = LinkBase::new(uri.path(), uri.query());

        let settings = PaginationSettings::from_ref(state);

        Ok(Self {
            controls: normalize(&query, &settings),
            link_base,
        })
    }
}

/// Builds the search options from `controls` and asks `model` for the page.
///
/// A collaborator failure is returned as an
/// [`ApiError`](crate::error::ApiError) and nothing else
/// happens for this request.
#[instrument(skip_all, fields(page = ?controls.page, page_size = controls.page_size))]
pub async fn fetch_page<M: Paginatable>(
    model: &M,
    controls: &PageControls,
    criteria: Option<SearchCriteria>,
    options: Option<SearchOptions>,
) -> ApiResult<PageResult<M::Item>> {
    let request = PageRequest {
        current_page: controls.current_page,
        page: controls.page,
        page_size: controls.page_size,
        options: build_options(controls, options),
    };
    let criteria = criteria.unwrap_or_default();

    match model.paginate(criteria, request).await {
        Ok(result) => {
            debug!(
                current_page = result.current_page,
                page_count = result.page_count,
                total = result.total,
                items = result.items.len(),
                "Page fetched"
            );
            Ok(result)
        }
        Err(e) => {
            warn!(error = %e, "Paginate request failed");
            Err(e.into())
        }
    }
}

/// Renders a resolved page into the response envelope.
pub fn format_response<T>(result: PageResult<T>, link_base: &LinkBase) -> PageEnvelope<T> {
    let window = result.window();
    let links = NavigationLinks::build(link_base, &window);

    PageEnvelope {
        page: result.current_page,
        has_more: window.has_next_pages(),
        links,
        page_count: result.page_count,
        total: result.total,
        before: result.before,
        after: result.after,
        data: result.items,
    }
}

/// Fetches and formats a page in one step.
pub async fn paginate<M: Paginatable>(
    model: &M,
    query: &PageQuery,
    criteria: Option<SearchCriteria>,
    options: Option<SearchOptions>,
) -> ApiResult<PageEnvelope<M::Item>> {
    let result = fetch_page(model, &query.controls, criteria, options).await?;
    Ok(format_response(result, &query.link_base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::Arc;

    /// Returns a fixed page and records what it was asked for.
    #[derive(Default)]
    struct FixedModel {
        calls: Arc<Mutex<Vec<(SearchCriteria, PageRequest)>>>,
        fail: bool,
    }

    #[async_trait]
    impl Paginatable for FixedModel {
        type Item = Value;

        async fn paginate(
            &self,
            criteria: SearchCriteria,
            request: PageRequest,
        ) -> Result<PageResult<Value>, PaginateError> {
            self.calls.lock().push((criteria, request));
            if self.fail {
                Err(PaginateError::Unavailable("connection refused".into()))
            } else {
                Ok(PageResult {
                    current_page: 1,
                    before: Some("i1".into()),
                    after: Some("i2".into()),
                    page_count: 1,
                    per_page: 20,
                    total: 2,
                    items: vec![json!({ "id": "i1" }), json!({ "id": "i2" })],
                })
            }
        }
    }

    fn query(raw: &str) -> PageQuery {
        PageQuery {
            controls: normalize(
                &PaginationQuery::from_query(Some(raw)),
                &PaginationSettings::default(),
            ),
            link_base: LinkBase::new("/items", Some(raw)),
        }
    }

    #[tokio::test]
    async fn success_formats_items_and_totals() {
        let model = FixedModel::default();
        let envelope = paginate(&model, &query(""), None, None).await.unwrap();

        let body = serde_json::to_value(&envelope).unwrap();
        assert_eq!(body["data"], json!([{ "id": "i1" }, { "id": "i2" }]));
        assert_eq!(body["total"], 2);
        assert_eq!(body["pageCount"], 1);
        assert_eq!(body["page"], 1);
        assert_eq!(body["hasMore"], false);
        assert_eq!(body["before"], "i1");
        assert_eq!(body["after"], "i2");
        assert!(body["links"]["prev"].is_null());
        assert!(body["links"]["next"].is_null());
    }

    #[tokio::test]
    async fn failure_is_reported_once_without_envelope() {
        let model = FixedModel {
            fail: true,
            ..Default::default()
        };
        let err = paginate(&model, &query("page=2"), None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Paginate(PaginateError::Unavailable(_))));
        assert_eq!(model.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn collaborator_receives_both_page_numbers_and_options() {
        let model = FixedModel::default();
        let q = query("page=3&currentPage=2&pageSize=5&sortBy=a,b&sortDirection=desc&before=X");
        let mut criteria = SearchCriteria::new();
        criteria.insert("category".into(), json!("alpha"));

        fetch_page(&model, &q.controls, Some(criteria.clone()), None)
            .await
            .unwrap();

        let calls = model.calls.lock();
        let (seen_criteria, request) = &calls[0];
        assert_eq!(seen_criteria, &criteria);
        assert_eq!(request.page, Some(3));
        assert_eq!(request.current_page, Some(2));
        assert_eq!(request.page_size, 5);
        assert_eq!(
            serde_json::to_value(&request.options).unwrap(),
            json!({ "sortBy": { "a": "desc", "b": 1 }, "before": "X" })
        );
    }

    #[tokio::test]
    async fn missing_criteria_defaults_to_empty() {
        let model = FixedModel::default();
        fetch_page(&model, &query("").controls, None, None)
            .await
            .unwrap();
        assert!(model.calls.lock()[0].0.is_empty());
    }

    #[tokio::test]
    async fn post_processed_items_replace_originals() {
        let model = FixedModel::default();
        let q = query("");
        let result = fetch_page(&model, &q.controls, None, None).await.unwrap();
        let result = result.map_items(|items| {
            items
                .into_iter()
                .map(|item| json!({ "ref": item["id"] }))
                .collect()
        });

        let envelope = format_response(result, &q.link_base);
        assert_eq!(envelope.data, vec![json!({ "ref": "i1" }), json!({ "ref": "i2" })]);
        assert_eq!(envelope.total, 2);
    }

    #[tokio::test]
    async fn identical_requests_render_identical_bodies() {
        let model = FixedModel::default();
        let q = query("sortBy=name&category=x");
        let first = serde_json::to_vec(&paginate(&model, &q, None, None).await.unwrap()).unwrap();
        let second = serde_json::to_vec(&paginate(&model, &q, None, None).await.unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn absent_cursors_are_omitted() {
        let result: PageResult<Value> = PageResult {
            current_page: 1,
            before: None,
            after: None,
            page_count: 0,
            per_page: 20,
            total: 0,
            items: vec![],
        };
        let body = serde_json::to_value(format_response(result, &LinkBase::new("/items", None)))
            .unwrap();
        let object = body.as_object().unwrap();
        assert!(!object.contains_key("before"));
        assert!(!object.contains_key("after"));
        assert_eq!(body["data"], json!([]));
    }
}
