//! Request ID middleware for request tracing

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName},
    middleware::Next,
    response::Response,
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header name for request ID
pub const X_REQUEST_ID: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: Option<String>;
}

/// Sets a UUID v4 request ID when the client sent none and echoes it back
/// on the response.
pub fn request_id_layer() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    let header_name = HeaderName::from_static(X_REQUEST_ID);

    (
        SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid),
        PropagateRequestIdLayer::new(header_name),
    )
}

/// Makes the request ID visible to [`current_request_id`] for the rest of
/// the request. Must sit inside the layer that sets the header.
pub async fn scope_request_id(req: Request, next: Next) -> Response {
    let request_id = req.headers().request_id().map(str::to_string);
    REQUEST_ID.scope(request_id, next.run(req)).await
}

/// Request ID of the request being handled, if any.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(Clone::clone).ok().flatten()
}

/// Read the request ID back out of handler headers, for log correlation.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> Option<&str> {
        self.get(X_REQUEST_ID)?.to_str().ok()
    }
}
