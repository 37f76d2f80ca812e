use axum::{extract::State, http::HeaderMap, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::api::{
    fetch_page, format_response, paginate, Created, DataResponse, LinkBase, PageEnvelope,
    PageQuery, SearchCriteria,
};
use crate::app::AppState;
use crate::domain::{CreateRecordRequest, Record, RecordSummary};
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestIdExt;

/// Every non-pagination query pair is an equality filter.
fn criteria_from(link_base: &LinkBase) -> SearchCriteria {
    link_base
        .filter_pairs()
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect()
}

/// List records, one page at a time
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: PageQuery,
) -> ApiResult<PageEnvelope<Record>> {
    tracing::info!(
        request_id = ?headers.request_id(),
        page = ?query.controls.page,
        page_size = query.controls.page_size,
        "Listing records"
    );

    let criteria = criteria_from(&query.link_base);
    paginate(&state.records, &query, Some(criteria), None).await
}

/// List record summaries; items are projected after the page is resolved
pub async fn list_record_summaries(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: PageQuery,
) -> ApiResult<PageEnvelope<RecordSummary>> {
    tracing::info!(
        request_id = ?headers.request_id(),
        page = ?query.controls.page,
        "Listing record summaries"
    );

    let criteria = criteria_from(&query.link_base);
    let page = fetch_page(&state.records, &query.controls, Some(criteria), None).await?;
    let page = page.map_items(|items| items.into_iter().map(RecordSummary::from).collect());

    Ok(format_response(page, &query.link_base))
}

/// Create a new record
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRecordRequest>,
) -> ApiResult<Created<DataResponse<Record>>> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }

    let record = Record::new(req);
    tracing::info!(record_id = %record.id, name = %record.name, "Creating record");
    state.records.insert(record.clone());

    Ok(Created(DataResponse::new(record)))
}
