//! Resolution, page and download integration tests.
//!
//! Run with: `cargo test -p qrdrop-api --test resolve_test`

mod helpers;

use helpers::fixtures::{create_test_jpeg, create_test_mp4, file_form};
use helpers::{setup_test_app, TestApp};
use serde_json::Value;

async fn upload(app: &TestApp, filename: &str, mime: &str, data: Vec<u8>) -> String {
    let response = app
        .client()
        .post("/api/upload")
        .multipart(file_form(filename, mime, data))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    body["file_id"].as_str().expect("file_id").to_string()
}

#[tokio::test]
async fn test_resolve_uploaded_image() {
    let app = setup_test_app().await;
    let file_id = upload(&app, "photo.jpg", "image/jpeg", create_test_jpeg()).await;

    let response = app.client().get(&format!("/api/media/{}", file_id)).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["file_id"], file_id);
    assert_eq!(body["exists"], true);
    assert_eq!(body["is_video"], false);
    assert_eq!(body["file_extension"], "jpg");
    assert_eq!(body["filename"], "file.jpg");

    let media_url = body["media_url"].as_str().expect("media_url");
    assert!(media_url.starts_with(&format!(
        "{}/media/{}.jpg?",
        helpers::TEST_STORAGE_URL,
        file_id
    )));
    let qrcode_url = body["qrcode_url"].as_str().expect("qrcode_url");
    assert!(qrcode_url.starts_with(&format!(
        "{}/codes/{}_code.png?",
        helpers::TEST_STORAGE_URL,
        file_id
    )));
}

#[tokio::test]
async fn test_resolve_uploaded_video() {
    let app = setup_test_app().await;
    let file_id = upload(&app, "clip.mp4", "video/mp4", create_test_mp4()).await;

    let response = app.client().get(&format!("/api/media/{}", file_id)).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["is_video"], true);
    assert_eq!(body["file_extension"], "mp4");
    assert_eq!(body["filename"], "file.mp4");
}

#[tokio::test]
async fn test_resolve_is_repeatable() {
    let app = setup_test_app().await;
    let file_id = upload(&app, "photo.jpg", "image/jpeg", create_test_jpeg()).await;

    let first: Value = app
        .client()
        .get(&format!("/api/media/{}", file_id))
        .await
        .json();
    let second: Value = app
        .client()
        .get(&format!("/api/media/{}", file_id))
        .await
        .json();

    for field in ["file_id", "exists", "is_video", "file_extension", "filename"] {
        assert_eq!(first[field], second[field], "{} differs", field);
    }
}

#[tokio::test]
async fn test_resolve_unknown_id() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/api/media/2f1e3c4d-5b6a-4789-9abc-def012345678")
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["file_id"], "2f1e3c4d-5b6a-4789-9abc-def012345678");
    assert_eq!(body["exists"], false);
    assert_eq!(body["error"], "File does not exist");
}

#[tokio::test]
async fn test_resolve_malformed_id() {
    let app = setup_test_app().await;

    for raw in ["not-a-uuid", "2F1E3C4D5B6A47899ABCDEF012345678", "..%2F..%2Fetc"] {
        let response = app.client().get(&format!("/api/media/{}", raw)).await;
        assert_eq!(response.status_code(), 404, "{}", raw);
        let body: Value = response.json();
        assert_eq!(body["exists"], false);
    }
}

#[tokio::test]
async fn test_media_without_code_image_is_not_found() {
    let app = setup_test_app().await;
    let file_id = upload(&app, "photo.jpg", "image/jpeg", create_test_jpeg()).await;

    std::fs::remove_file(
        app.storage_root()
            .join(format!("codes/{}_code.png", file_id)),
    )
    .expect("remove code image");

    let response = app.client().get(&format!("/api/media/{}", file_id)).await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_code_image_without_media_is_not_found() {
    let app = setup_test_app().await;
    let file_id = upload(&app, "photo.jpg", "image/jpeg", create_test_jpeg()).await;

    std::fs::remove_file(app.storage_root().join(format!("media/{}.jpg", file_id)))
        .expect("remove media");

    let response = app.client().get(&format!("/api/media/{}", file_id)).await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "File does not exist");
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "local");
}

#[tokio::test]
async fn test_index_page() {
    let app = setup_test_app().await;

    let response = app.client().get("/").await;

    assert_eq!(response.status_code(), 200);
    assert!(response.text().contains("/api/upload"));
}

#[tokio::test]
async fn test_play_page_embeds_id() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/play/2f1e3c4d-5b6a-4789-9abc-def012345678")
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(response
        .text()
        .contains("data-file-id=\"2f1e3c4d-5b6a-4789-9abc-def012345678\""));
}

#[tokio::test]
async fn test_download_missing_code_image() {
    let app = setup_test_app().await;
    let file_id = upload(&app, "photo.jpg", "image/jpeg", create_test_jpeg()).await;

    // Scratch copies are discarded after upload
    let response = app.client().get(&format!("/download/{}", file_id)).await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "QR code file does not exist");
}

#[tokio::test]
async fn test_download_serves_local_remnant() {
    let app = setup_test_app().await;
    let file_id = "2f1e3c4d-5b6a-4789-9abc-def012345678";
    let png = helpers::fixtures::create_minimal_png();
    std::fs::write(
        app.qrcode_folder().join(format!("{}_code.png", file_id)),
        &png,
    )
    .expect("write remnant");

    let response = app.client().get(&format!("/download/{}", file_id)).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/png");
    assert!(response
        .header("content-disposition")
        .to_str()
        .expect("header")
        .starts_with("attachment"));
    assert_eq!(response.as_bytes().to_vec(), png);
}
