//! HTTP tests over in-memory stores and a mock bucket.
//!
//! Run with: `cargo test -p folio-api --test api_test`

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use chrono::{TimeDelta, Utc};
use folio_api::setup::routes::setup_routes;
use folio_api::AppState;
use folio_core::Config;
use folio_services::test_helpers::{
    work_fixture, MockProfileStore, MockStorage, MockTagStore, MockWorkStore,
};
use folio_services::Storage;
use serde_json::{json, Value};

struct TestApp {
    server: TestServer,
    storage: Arc<MockStorage>,
    works: Arc<MockWorkStore>,
}

fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars = vec![
        ("DATABASE_URL", "postgres://localhost/folio_test"),
        ("CLEANUP_ENABLED", "false"),
        ("UPLOAD_MAX_SIZE_MB", "1"),
    ];
    vars.extend_from_slice(extra);
    Config::from_lookup(|key| {
        vars.iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .expect("test config")
}

fn setup_test_app(extra: &[(&str, &str)]) -> TestApp {
    let config = test_config(extra);
    let storage = Arc::new(MockStorage::new());
    let works = Arc::new(MockWorkStore::new());

    let state = AppState::new(
        &config,
        works.clone(),
        Arc::new(MockProfileStore::new()),
        Arc::new(MockTagStore::new()),
        storage.clone(),
        None,
    );
    let router = setup_routes(&config, Arc::new(state)).expect("router");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        works,
    }
}

fn png_part(name: &str) -> Part {
    Part::bytes(vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4])
        .file_name(name.to_string())
        .mime_type("image/png")
}

#[tokio::test]
async fn test_health_without_database() {
    let app = setup_test_app(&[]);

    let response = app.server.get("/api/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["database"], "not_configured");
    assert_eq!(body["storage"], "healthy");
    assert_eq!(body["storage_backend"], "supabase");
}

#[tokio::test]
async fn test_upload_stores_file_in_requested_folder() {
    let app = setup_test_app(&[]);
    let form = MultipartForm::new()
        .add_text("folder", "trabalhos")
        .add_part("file", png_part("cover.png"));

    let response = app.server.post("/api/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);

    let path = data[0]["path"].as_str().unwrap();
    assert!(path.starts_with("trabalhos/"));
    assert!(path.ends_with(".png"));
    assert_eq!(data[0]["publicUrl"], app.storage.public_url(path));
    assert!(app.storage.has_object(path));
}

#[tokio::test]
async fn test_upload_defaults_folder() {
    let app = setup_test_app(&[("UPLOAD_DEFAULT_FOLDER", "misc")]);
    let form = MultipartForm::new().add_part("file", png_part("a.png"));

    let response = app.server.post("/api/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["data"][0]["path"].as_str().unwrap().starts_with("misc/"));
}

#[tokio::test]
async fn test_upload_rejects_disallowed_type_without_uploading() {
    let app = setup_test_app(&[]);
    let text = Part::bytes(b"hello".to_vec())
        .file_name("notes.txt")
        .mime_type("text/plain");
    let form = MultipartForm::new()
        .add_part("file", png_part("ok.png"))
        .add_part("file", text);

    let response = app.server.post("/api/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(app.storage.object_count(), 0);
}

#[tokio::test]
async fn test_upload_rejects_too_many_files() {
    let app = setup_test_app(&[("UPLOAD_MAX_FILES", "1")]);
    let form = MultipartForm::new()
        .add_part("file", png_part("a.png"))
        .add_part("file", png_part("b.png"));

    let response = app.server.post("/api/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.storage.object_count(), 0);
}

#[tokio::test]
async fn test_upload_without_file_is_bad_request() {
    let app = setup_test_app(&[]);
    let form = MultipartForm::new().add_text("folder", "trabalhos");

    let response = app.server.post("/api/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_create_then_delete_work_removes_its_images() {
    let app = setup_test_app(&[]);
    app.storage.insert_object("trabalhos/a.png", None);
    app.storage.insert_object("trabalhos/b.png", None);
    let a = app.storage.public_url("trabalhos/a.png");
    let b = app.storage.public_url("trabalhos/b.png");

    let created = app
        .server
        .post("/api/works")
        .json(&json!({
            "name": "Poster",
            "images": [a, b],
            "tags": ["design"],
            "kind": "imagem"
        }))
        .await;
    assert_eq!(created.status_code(), 201);
    let body: Value = created.json();
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let deleted = app.server.delete(&format!("/api/works/{}", id)).await;

    assert_eq!(deleted.status_code(), 200);
    assert!(!app.storage.has_object("trabalhos/a.png"));
    assert!(!app.storage.has_object("trabalhos/b.png"));
    assert!(app.works.snapshot().is_empty());
}

#[tokio::test]
async fn test_create_work_with_missing_images_is_rejected() {
    let app = setup_test_app(&[]);

    let response = app
        .server
        .post("/api/works")
        .json(&json!({ "name": "Empty", "tags": ["design"], "kind": "imagem" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = setup_test_app(&[]);

    let response = app
        .server
        .post("/api/works")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_unknown_work_is_not_found() {
    let app = setup_test_app(&[]);

    let response = app
        .server
        .get(&format!("/api/works/{}", uuid::Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_gallery_hides_hidden_works_but_admin_listing_does_not() {
    let app = setup_test_app(&[]);
    let mut hidden = work_fixture("hidden", &[&app.storage.public_url("trabalhos/h.png")]);
    hidden.front_page_hide = true;
    app.works.insert(hidden);
    app.works
        .insert(work_fixture("shown", &[&app.storage.public_url("trabalhos/s.png")]));

    let gallery: Value = app.server.get("/api/works").await.json();
    let all: Value = app.server.get("/api/works?all=true").await.json();

    assert_eq!(gallery["data"].as_array().unwrap().len(), 1);
    assert_eq!(gallery["data"][0]["name"], "shown");
    assert_eq!(all["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_tag_lifecycle() {
    let app = setup_test_app(&[]);

    let created = app
        .server
        .post("/api/admin/tags")
        .json(&json!({ "name": "  poster " }))
        .await;
    assert_eq!(created.status_code(), 201);
    let body: Value = created.json();
    assert_eq!(body["data"]["name"], "poster");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let duplicate = app
        .server
        .post("/api/admin/tags")
        .json(&json!({ "name": "poster" }))
        .await;
    assert_eq!(duplicate.status_code(), 409);

    let names: Value = app.server.get("/api/tags").await.json();
    assert_eq!(names["data"], json!(["poster"]));

    let deleted = app.server.delete(&format!("/api/admin/tags/{}", id)).await;
    assert_eq!(deleted.status_code(), 204);

    let names: Value = app.server.get("/api/tags").await.json();
    assert_eq!(names["data"], json!([]));
}

#[tokio::test]
async fn test_tag_in_use_cannot_be_deleted() {
    let app = setup_test_app(&[]);
    app.works
        .insert(work_fixture("w", &[&app.storage.public_url("trabalhos/a.png")]));

    let created: Value = app
        .server
        .post("/api/admin/tags")
        .json(&json!({ "name": "design" }))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let usage: Value = app.server.get("/api/admin/tags/usage/design").await.json();
    assert_eq!(usage["data"]["worksCount"], 1);

    let response = app.server.delete(&format!("/api/admin/tags/{}", id)).await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn test_profile_is_not_found_until_saved() {
    let app = setup_test_app(&[]);

    let missing = app.server.get("/api/config").await;
    assert_eq!(missing.status_code(), 404);

    let saved = app
        .server
        .put("/api/config")
        .json(&json!({ "name": "Iuri", "text": "Designer" }))
        .await;
    assert_eq!(saved.status_code(), 200);

    let found: Value = app.server.get("/api/config").await.json();
    assert_eq!(found["data"]["name"], "Iuri");
}

#[tokio::test]
async fn test_cleanup_dry_run_then_sweep() {
    let app = setup_test_app(&[]);
    let old = Some(Utc::now() - TimeDelta::minutes(90));
    app.storage.insert_object("trabalhos/kept.png", old);
    app.storage.insert_object("trabalhos/orphan.png", old);
    app.storage.insert_object("trabalhos/fresh.png", Some(Utc::now()));
    app.works.insert(work_fixture(
        "w",
        &[&app.storage.public_url("trabalhos/kept.png")],
    ));

    let dry: Value = app
        .server
        .post("/api/admin/cleanup")
        .json(&json!({ "dry_run": true }))
        .await
        .json();
    assert_eq!(dry["data"]["dryRun"], true);
    assert_eq!(dry["data"]["scanned"], 3);
    assert_eq!(dry["data"]["eligiblePaths"], json!(["trabalhos/orphan.png"]));
    assert!(app.storage.has_object("trabalhos/orphan.png"));

    let swept = app
        .server
        .post("/api/admin/cleanup")
        .json(&json!({ "max_age_minutes": 60 }))
        .await;
    assert_eq!(swept.status_code(), 200);
    let body: Value = swept.json();
    assert_eq!(body["data"]["deletedCount"], 1);
    assert!(!app.storage.has_object("trabalhos/orphan.png"));
    assert!(app.storage.has_object("trabalhos/kept.png"));
    assert!(app.storage.has_object("trabalhos/fresh.png"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app(&[]);

    let response = app.server.get("/api/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["paths"]["/api/upload"].is_object());
}
