//! Request handlers
//!
//! Every catalog mutation answers with the full updated catalog, so the admin
//! client never needs a follow-up fetch.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use deskfolio_core::assets::AssetUpload;
use deskfolio_core::catalog::{Project, ProjectPatch};
use deskfolio_core::Error;

use crate::http::error::ApiError;
use crate::state::AppState;

pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.service.list().await?))
}

pub async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<Project>, JsonRejection>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let Json(project) = payload.map_err(invalid_body)?;
    Ok(Json(state.service.create(project).await?))
}

/// PUT body: the target name plus any of `github`/`live`/`photos`
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    name: String,
    #[serde(flatten)]
    patch: ProjectPatch,
}

pub async fn update_project(
    State(state): State<AppState>,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;
    Ok(Json(
        state.service.update(&request.name, request.patch).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    name: Option<String>,
}

pub async fn delete_project(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let name = params.name.ok_or_else(|| {
        ApiError::from(Error::Validation(
            "Missing name query parameter".to_string(),
        ))
    })?;
    Ok(Json(state.service.delete(&name).await?))
}

/// Multipart form: `projectName` text field plus repeated `photos` files.
/// Responds with the stored URLs in input order.
pub async fn upload_photos(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<String>>, ApiError> {
    let mut name_hint = String::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed_form)? {
        let field_name = field.name().map(ToString::to_string);
        match field_name.as_deref() {
            Some("projectName") => {
                name_hint = field.text().await.map_err(malformed_form)?;
            }
            Some("photos") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(malformed_form)?;
                files.push(AssetUpload::new(file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    Ok(Json(state.service.upload_photos(&name_hint, &files).await?))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

/// Exchange the admin credential pair for a session token.
///
/// The response keeps the `{success}` shape the admin client checks; a
/// malformed body is treated the same as wrong credentials.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(_) => return failed_login(),
    };
    match state.gate.login(&request.username, &request.password) {
        Ok(session) => Json(LoginResponse {
            success: true,
            token: Some(session.token),
            expires_at: Some(session.expires_at),
        })
        .into_response(),
        Err(_) => failed_login(),
    }
}

fn failed_login() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(LoginResponse {
            success: false,
            token: None,
            expires_at: None,
        }),
    )
        .into_response()
}

pub async fn healthz(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    // Listing doubles as a liveness probe of the active catalog backend.
    let catalog = state.service.list().await?;
    Ok(Json(json!({
        "status": "ok",
        "catalog": state.service.catalog_backend(),
        "assets": state.service.asset_backend(),
        "projects": catalog.len(),
    })))
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::from(Error::Validation(rejection.body_text()))
}

fn malformed_form(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::from(Error::Validation(err.to_string()))
}
