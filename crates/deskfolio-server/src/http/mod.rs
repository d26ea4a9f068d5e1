//! HTTP surface
//!
//! One flat router: catalog CRUD under `/projects`, multipart uploads under
//! `/projects/upload`, locally stored assets under `/projects/:name/:file`,
//! and the admin login under `/auth`. Every mutating route requires a valid
//! session token; reads and the login itself do not.

pub mod error;
pub mod handlers;
pub mod statics;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method, Request};
use axum::middleware::{from_fn, from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tracing::Instrument;

use deskfolio_core::Error;

use crate::http::error::ApiError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/projects",
            get(handlers::list_projects)
                .post(handlers::create_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route("/projects/upload", post(handlers::upload_photos))
        .route("/projects/:name/:file", get(statics::serve_asset))
        .route("/auth", post(handlers::login))
        .route("/healthz", get(handlers::healthz))
        .layer(from_fn_with_state(state.clone(), require_session))
        .layer(from_fn(request_tracing))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
}

/// Reject mutating requests that don't carry a valid session token.
///
/// Reads pass through, as does `/auth` itself (it is how tokens are issued).
async fn require_session(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let exempt = matches!(
        *request.method(),
        Method::GET | Method::HEAD | Method::OPTIONS
    ) || request.uri().path() == "/auth";
    if exempt {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token.map(|token| state.gate.verify(token)) {
        Some(Ok(_)) => next.run(request).await,
        _ => ApiError::from(Error::AuthFailed).into_response(),
    }
}

async fn request_tracing(request: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %request.method(),
        route = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}
