//! HTTP routes

pub mod health;
pub mod rsvp;
pub mod site;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};
use http::{HeaderName, HeaderValue};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::rate_limit::submit_rate_limit;
use crate::state::AppState;

/// RSVP payloads are a handful of short strings
const BODY_LIMIT: usize = 64 * 1024;

static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Random v4 UUID per request
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes, no middleware
pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/site-config", get(site::site_config))
        .route("/api/photo-album", get(rsvp::photo_album))
        .route("/api/rsvp/validate", post(rsvp::validate))
}

/// Routes plus middleware and state, ready to serve
pub fn create_router(state: AppState) -> Router {
    let submit = Router::new()
        .route("/api/rsvp", post(rsvp::submit))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            submit_rate_limit,
        ));

    build_router()
        .merge(submit)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(REQUEST_ID.clone()))
        .layer(SetRequestIdLayer::new(
            REQUEST_ID.clone(),
            XRequestId,
        ))
        .with_state(state)
}
