//! Static serving for locally stored assets
//!
//! Upload URLs from the local store look like `/projects/<name>/<file>`; this
//! handler makes them retrievable. With the blob backend there is nothing to
//! serve locally and every lookup is a 404.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use deskfolio_core::assets::{sanitize_file_name, sanitize_name_hint, ASSET_PREFIX};

use crate::state::AppState;

pub async fn serve_asset(
    State(state): State<AppState>,
    Path((name, file)): Path<(String, String)>,
) -> Response {
    let Some(root) = &state.asset_root else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Ok(name) = sanitize_name_hint(&name) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Ok(file) = sanitize_file_name(&file) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    // Resolve symlinks and confirm the target is still under the store root.
    let path = root.join(ASSET_PREFIX).join(&name).join(&file);
    let Ok(canonical_root) = root.canonicalize() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Ok(canonical) = path.canonicalize() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !canonical.starts_with(&canonical_root) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match tokio::fs::read(&canonical).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&file))], bytes).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

fn content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type("a.png"), "image/png");
        assert_eq!(content_type("a.JPG"), "image/jpeg");
        assert_eq!(content_type("a.jpeg"), "image/jpeg");
        assert_eq!(content_type("a.webp"), "image/webp");
        assert_eq!(content_type("archive.tar.gz"), "application/octet-stream");
        assert_eq!(content_type("noext"), "application/octet-stream");
    }
}
