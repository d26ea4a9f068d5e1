//! Blob asset store behavior against a fake in-process blob service.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::put;
use axum::Router;
use deskfolio_core::assets::{AssetStore, AssetUpload, BlobAssetStore};
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct FakeBlob {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
}

async fn put_object(
    State(fake): State<FakeBlob>,
    Path((hint, file)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    fake.auth_headers.lock().await.push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    );
    // File names containing "reject" simulate a service-side failure.
    if file.contains("reject") {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    fake.objects
        .lock()
        .await
        .insert(format!("{hint}/{file}"), body.to_vec());
    StatusCode::OK
}

async fn delete_object(
    State(fake): State<FakeBlob>,
    Path((hint, file)): Path<(String, String)>,
) -> StatusCode {
    match fake.objects.lock().await.remove(&format!("{hint}/{file}")) {
        Some(_) => StatusCode::OK,
        None => StatusCode::NOT_FOUND,
    }
}

async fn spawn_fake() -> (FakeBlob, String) {
    let fake = FakeBlob::default();
    let app = Router::new()
        .route("/projects/:hint/:file", put(put_object).delete(delete_object))
        .with_state(fake.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve fake blob") });
    (fake, format!("http://{addr}"))
}

#[tokio::test]
async fn test_store_batch_uploads_in_order_with_bearer() {
    let (fake, endpoint) = spawn_fake().await;
    let store = BlobAssetStore::new(endpoint.clone(), None, Some("blob-secret".to_string()))
        .expect("Failed to build store");

    let files = vec![
        AssetUpload::new("a.png", b"aaa".to_vec()),
        AssetUpload::new("b.png", b"bbb".to_vec()),
    ];
    let urls = store
        .store_batch("demo", &files)
        .await
        .expect("store_batch failed");
    assert_eq!(
        urls,
        vec![
            format!("{endpoint}/projects/demo/a.png"),
            format!("{endpoint}/projects/demo/b.png"),
        ]
    );

    let objects = fake.objects.lock().await;
    assert_eq!(objects.get("demo/a.png").map(|v| v.as_slice()), Some(&b"aaa"[..]));
    assert_eq!(objects.get("demo/b.png").map(|v| v.as_slice()), Some(&b"bbb"[..]));
    drop(objects);

    let auth = fake.auth_headers.lock().await;
    assert_eq!(auth.len(), 2);
    assert!(auth
        .iter()
        .all(|header| header.as_deref() == Some("Bearer blob-secret")));
}

#[tokio::test]
async fn test_mid_batch_failure_removes_earlier_uploads() {
    let (fake, endpoint) = spawn_fake().await;
    let store = BlobAssetStore::new(endpoint, None, None).expect("Failed to build store");

    let files = vec![
        AssetUpload::new("a.png", b"aaa".to_vec()),
        AssetUpload::new("reject.png", b"bbb".to_vec()),
    ];
    let err = store.store_batch("demo", &files).await.unwrap_err();
    assert_eq!(err.code(), "UploadFailed");

    // The file stored before the failure was deleted again.
    assert!(fake.objects.lock().await.is_empty());
}

#[tokio::test]
async fn test_remove_deletes_objects_and_tolerates_missing() {
    let (fake, endpoint) = spawn_fake().await;
    let store = BlobAssetStore::new(endpoint, None, None).expect("Failed to build store");

    let urls = store
        .store_batch("demo", &[AssetUpload::new("a.png", b"aaa".to_vec())])
        .await
        .expect("store_batch failed");
    store.remove(&urls).await.expect("remove failed");
    assert!(fake.objects.lock().await.is_empty());

    // A second remove hits 404s, which are fine.
    store.remove(&urls).await.expect("second remove failed");
}

#[tokio::test]
async fn test_remove_rejects_urls_from_another_store() {
    let (_fake, endpoint) = spawn_fake().await;
    let store = BlobAssetStore::new(endpoint, None, None).expect("Failed to build store");

    let err = store
        .remove(&["https://elsewhere.example/projects/demo/a.png".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.code(), "Validation");
}

#[tokio::test]
async fn test_public_base_rewrites_urls_and_maps_back_on_remove() {
    let (fake, endpoint) = spawn_fake().await;
    let store = BlobAssetStore::new(
        endpoint,
        Some("https://cdn.example".to_string()),
        None,
    )
    .expect("Failed to build store");

    let urls = store
        .store_batch("demo", &[AssetUpload::new("a.png", b"x".to_vec())])
        .await
        .expect("store_batch failed");
    assert_eq!(urls, vec!["https://cdn.example/projects/demo/a.png"]);

    // Removal translates the public URL back to the service endpoint.
    store.remove(&urls).await.expect("remove failed");
    assert!(fake.objects.lock().await.is_empty());
}
