//! API integration tests for the Petrii server
//!
//! The router runs on in-memory stores and a temporary upload directory, so
//! these tests need no database or object store.
//!
//! Coverage includes:
//! - registration, approval gating and login
//! - upload, listing, search and deletion of datasets
//! - authorization failures (401, 403) and validation errors (400, 413)

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use petrii_server::{
    api::create_router,
    auth::SessionManager,
    config::{AdminSeed, Config, UploadConfig},
    db::Stores,
    features::{admin::ensure_admin, FeatureState},
    storage::LocalBlobStore,
};

const SECRET: &[u8] = b"integration-secret-0123456789abc";
const ADMIN_EMAIL: &str = "admin@petrii.dev";
const ADMIN_PASSWORD: &str = "admin-password";
const BOUNDARY: &str = "petrii-test-boundary";

// ============================================================================
// Helper Functions
// ============================================================================

struct TestApp {
    router: Router,
    _uploads: TempDir,
}

async fn create_test_app() -> TestApp {
    create_test_app_with(UploadConfig::default()).await
}

async fn create_test_app_with(uploads: UploadConfig) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let stores = Stores::in_memory();
    let blobs = LocalBlobStore::open(dir.path(), "/uploads").await.unwrap();
    let sessions = SessionManager::new(SECRET, chrono::Duration::days(30));

    ensure_admin(
        stores.users.clone(),
        &AdminSeed {
            name: "Administrator".to_string(),
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        },
    )
    .await
    .unwrap();

    let mut config = Config::default();
    config.uploads = uploads;
    config.storage.uploads_dir = dir.path().to_path_buf();

    let state = FeatureState::new(&stores, Arc::new(blobs), Arc::new(sessions), uploads);
    TestApp {
        router: create_router(stores, state, &config),
        _uploads: dir,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    (status, json)
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

async fn get(app: &TestApp, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, request(Method::GET, uri, token).body(Body::empty()).unwrap()).await
}

async fn delete(app: &TestApp, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, request(Method::DELETE, uri, token).body(Body::empty()).unwrap()).await
}

async fn send_json(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    let request = request(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn register(app: &TestApp, name: &str, email: &str) -> (StatusCode, Value) {
    send_json(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        json!({"name": name, "email": email, "password": "secret1"}),
    )
    .await
}

async fn login(app: &TestApp, email: &str, password: &str) -> (StatusCode, Value) {
    send_json(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        json!({"email": email, "password": password}),
    )
    .await
}

async fn admin_token(app: &TestApp) -> String {
    let (status, body) = login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

/// Register, approve and log in a researcher. Returns `(user id, token)`.
async fn approved_researcher(app: &TestApp, name: &str, email: &str) -> (String, String) {
    let (status, body) = register(app, name, email).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let admin = admin_token(app).await;
    let (status, _) = send_json(
        app,
        Method::PUT,
        &format!("/api/admin/users/{}/status", id),
        Some(&admin),
        json!({"status": "approved"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = login(app, email, "secret1").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    (id, body["data"]["token"].as_str().unwrap().to_string())
}

struct Upload<'a> {
    title: &'a str,
    author: &'a str,
    experiment_type: &'a str,
    tags: &'a str,
    file: Option<(&'a str, &'a [u8])>,
}

impl Default for Upload<'_> {
    fn default() -> Self {
        Self {
            title: "Growth curve",
            author: "Ann Lee",
            experiment_type: "culture",
            tags: "",
            file: Some(("readings.csv", b"well,od600\nA1,0.42\n".as_slice())),
        }
    }
}

fn multipart_body(upload: &Upload<'_>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in [
        ("title", upload.title),
        ("author", upload.author),
        ("experimentType", upload.experiment_type),
        ("tags", upload.tags),
    ] {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content)) = upload.file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: text/csv\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(app: &TestApp, token: &str, upload: Upload<'_>) -> (StatusCode, Value) {
    let request = request(Method::POST, "/api/datasets/upload", Some(token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(&upload)))
        .unwrap();
    send(app, request).await
}

// ============================================================================
// Server
// ============================================================================

#[tokio::test]
async fn test_root_and_health() {
    let app = create_test_app().await;

    let (status, body) = get(&app, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Petrii Server");

    let (status, body) = get(&app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

// ============================================================================
// Registration, moderation and login
// ============================================================================

#[tokio::test]
async fn test_register_returns_pending_profile_without_token() {
    let app = create_test_app().await;

    let (status, body) = register(&app, "Ann", "ann@x.com").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["role"], "researcher");
    assert!(body["data"].get("token").is_none());
    assert!(body["data"].get("passwordHash").is_none());

    let (status, body) = register(&app, "Ann again", "ANN@x.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_validation() {
    let app = create_test_app().await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        json!({"name": "Ann", "email": "ann@x.com", "password": "abc"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send_json(&app, Method::POST, "/api/auth/register", None, json!({"name": "Ann"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_approval_gates_login() {
    let app = create_test_app().await;
    let (_, body) = register(&app, "Ann", "ann@x.com").await;
    let ann_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = login(&app, "ann@x.com", "secret1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "NOT_APPROVED");

    let admin = admin_token(&app).await;
    let (status, body) = get(&app, "/api/admin/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(listed, ["ann@x.com"]);

    let (status, body) = send_json(
        &app,
        Method::PUT,
        &format!("/api/admin/users/{}/status", ann_id),
        Some(&admin),
        json!({"status": "approved"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");

    let (status, body) = login(&app, "ann@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");
    let token = body["data"]["token"].as_str().unwrap();

    let (status, body) = get(&app, "/api/auth/me", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ann@x.com");
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let app = create_test_app().await;
    approved_researcher(&app, "Ann", "ann@x.com").await;

    let (wrong_status, wrong) = login(&app, "ann@x.com", "not-the-password").await;
    let (unknown_status, unknown) = login(&app, "nobody@x.com", "secret1").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
    assert_eq!(wrong["error"]["code"], "AUTHENTICATION_FAILED");
}

#[tokio::test]
async fn test_status_update_rules() {
    let app = create_test_app().await;
    let admin = admin_token(&app).await;
    let (_, body) = register(&app, "Ann", "ann@x.com").await;
    let uri = format!("/api/admin/users/{}/status", body["data"]["id"].as_str().unwrap());

    let (status, _) = send_json(&app, Method::PUT, &uri, Some(&admin), json!({"status": "pending"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, Method::PUT, &uri, Some(&admin), json!({"status": "banned"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, Method::PUT, &uri, Some(&admin), json!({"status": "rejected"})).await;
    assert_eq!(status, StatusCode::OK);

    // Same decision again is a no-op
    let (status, body) = send_json(&app, Method::PUT, &uri, Some(&admin), json!({"status": "rejected"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "rejected");

    let (status, _) = send_json(&app, Method::PUT, &uri, Some(&admin), json!({"status": "approved"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = format!("/api/admin/users/{}/status", uuid::Uuid::new_v4());
    let (status, body) = send_json(&app, Method::PUT, &missing, Some(&admin), json!({"status": "approved"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
async fn test_protected_routes_require_a_session() {
    let app = create_test_app().await;

    for uri in ["/api/datasets", "/api/datasets/search?q=x", "/api/admin/users", "/api/auth/me"] {
        let (status, body) = get(&app, uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    }

    let (status, body) = get(&app, "/api/datasets", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_researchers_cannot_use_admin_routes() {
    let app = create_test_app().await;
    let (id, token) = approved_researcher(&app, "Ann", "ann@x.com").await;

    let (status, body) = get(&app, "/api/admin/users", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, _) = get(&app, "/api/admin/datasets", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_json(
        &app,
        Method::PUT,
        &format!("/api/admin/users/{}/status", id),
        Some(&token),
        json!({"status": "approved"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Datasets
// ============================================================================

#[tokio::test]
async fn test_dataset_lifecycle() {
    let app = create_test_app().await;
    let (ann_id, ann) = approved_researcher(&app, "Ann", "ann@x.com").await;
    let (_, bob) = approved_researcher(&app, "Bob", "bob@x.com").await;

    let (status, body) = upload(
        &app,
        &ann,
        Upload {
            tags: "alpha,beta, gamma",
            ..Default::default()
        },
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let dataset = &body["data"];
    assert_eq!(dataset["tags"], json!(["alpha", "beta", "gamma"]));
    assert_eq!(dataset["ownerId"], ann_id.as_str());
    assert_eq!(dataset["originalFilename"], "readings.csv");
    assert!(dataset.get("content").is_none());
    let id = dataset["id"].as_str().unwrap().to_string();
    let location = dataset["fileLocation"].as_str().unwrap().to_string();

    // The stored file is served back at its public location
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(&location).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&served[..], b"well,od600\nA1,0.42\n");

    let (status, body) = get(&app, "/api/datasets/search?q=gamma", Some(&ann)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], id.as_str());

    let (status, body) = get(&app, "/api/datasets/search?q=gamma", Some(&bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = delete(&app, &format!("/api/datasets/{}", id), Some(&bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let admin = admin_token(&app).await;
    let (status, _) = delete(&app, &format!("/api/datasets/{}", id), Some(&admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = delete(&app, &format!("/api/datasets/{}", id), Some(&ann)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"id": id.as_str(), "deleted": true}));

    let (status, body) = get(&app, "/api/datasets", Some(&ann)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = delete(&app, &format!("/api/datasets/{}", id), Some(&ann)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_with_malformed_id_is_not_found() {
    let app = create_test_app().await;
    let (_, ann) = approved_researcher(&app, "Ann", "ann@x.com").await;

    let (status, body) = delete(&app, "/api/datasets/not-a-uuid", Some(&ann)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "Dataset not found");
}

#[tokio::test]
async fn test_search_matches_a_late_term_in_a_long_query() {
    let app = create_test_app().await;
    let (_, ann) = approved_researcher(&app, "Ann", "ann@x.com").await;

    let (status, _) = upload(
        &app,
        &ann,
        Upload {
            title: "zebrafish",
            ..Default::default()
        },
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut terms: Vec<String> = (0..32).map(|i| format!("miss{}", i)).collect();
    terms.push("zebrafish".to_string());
    let uri = format!("/api/datasets/search?q={}", terms.join("+"));

    let (status, body) = get(&app, &uri, Some(&ann)).await;
    assert_eq!(status, StatusCode::OK);
    let hits = body["data"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["title"], "zebrafish");
}

#[tokio::test]
async fn test_search_matches_content_and_requires_q() {
    let app = create_test_app().await;
    let (_, ann) = approved_researcher(&app, "Ann", "ann@x.com").await;

    upload(
        &app,
        &ann,
        Upload {
            title: "Screen",
            file: Some(("screen.txt", b"kinase inhibitor panel".as_slice())),
            ..Default::default()
        },
    )
    .await;
    upload(&app, &ann, Upload::default()).await;

    let (status, body) = get(&app, "/api/datasets/search?q=KINASE", Some(&ann)).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Screen"]);

    let (status, body) = get(&app, "/api/datasets/search?q=", Some(&ann)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = get(&app, "/api/datasets/search", Some(&ann)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_upload_validation() {
    let app = create_test_app().await;
    let (_, ann) = approved_researcher(&app, "Ann", "ann@x.com").await;

    let (status, body) = upload(
        &app,
        &ann,
        Upload {
            title: "  ",
            ..Default::default()
        },
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = upload(
        &app,
        &ann,
        Upload {
            file: None,
            ..Default::default()
        },
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = upload(
        &app,
        &ann,
        Upload {
            file: Some(("empty.csv", b"".as_slice())),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&app, "/api/datasets", Some(&ann)).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_oversized_uploads_are_rejected() {
    let app = create_test_app_with(UploadConfig {
        max_upload_bytes: 64 * 1024,
        max_record_bytes: 1024,
    })
    .await;
    let (_, ann) = approved_researcher(&app, "Ann", "ann@x.com").await;

    // Fits the request limit, but the indexed record does not
    let text = "x".repeat(4 * 1024);
    let (status, body) = upload(
        &app,
        &ann,
        Upload {
            file: Some(("big.txt", text.as_bytes())),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "CONTENT_TOO_LARGE");

    // Exceeds the request body limit itself
    let huge = vec![b'y'; 128 * 1024];
    let (status, _) = upload(
        &app,
        &ann,
        Upload {
            file: Some(("huge.txt", huge.as_slice())),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (_, body) = get(&app, "/api/datasets", Some(&ann)).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_admin_dataset_listing_includes_owner() {
    let app = create_test_app().await;
    let (ann_id, ann) = approved_researcher(&app, "Ann", "ann@x.com").await;
    upload(&app, &ann, Upload::default()).await;

    let admin = admin_token(&app).await;
    let (status, body) = get(&app, "/api/admin/datasets", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["owner"]["id"], ann_id.as_str());
    assert_eq!(listed[0]["owner"]["name"], "Ann");
    assert_eq!(listed[0]["owner"]["email"], "ann@x.com");
}
