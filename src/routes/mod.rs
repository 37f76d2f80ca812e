pub mod health;
pub mod records;

use axum::{http::Uri, routing::get, Router};
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ApiError;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        // Records
        .route(
            "/records",
            get(records::list_records).post(records::create_record),
        )
        .route("/records/summaries", get(records::list_record_summaries))
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
