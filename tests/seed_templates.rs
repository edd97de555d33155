//! Integration tests for `/seedDefaultTemplates`

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use scribe_relay::{
    auth::CallerClaims,
    config::Config,
    handlers::{self, AppState},
    store::{FileTemplateStore, MemoryTemplateStore, TemplateStore},
    templates::{TemplateDocument, TemplateKey},
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

const JWT_SECRET: &str = "seed-test-secret";

fn create_test_config(auth: &str) -> Config {
    let toml = format!(
        r#"
[server]
host = "127.0.0.1"
port = 3000

[openai]
base_url = "http://127.0.0.1:1/v1"
{auth}
"#
    );
    Config::from_str(&toml).expect("should parse test config")
}

fn auth_section() -> String {
    format!("\n[auth]\njwt_secret = \"{JWT_SECRET}\"\n")
}

fn create_test_app(config: Config, store: Arc<dyn TemplateStore>) -> Router {
    let state =
        AppState::with_store(Arc::new(config), store).expect("AppState::with_store should succeed");
    handlers::router(state)
}

fn token(uid: &str, exp_offset_secs: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let claims = CallerClaims {
        sub: uid.to_string(),
        exp: (now + exp_offset_secs) as u64,
        iss: None,
        aud: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn seed_request(bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/seedDefaultTemplates")
        .header("content-type", "application/json");
    if let Some(bearer) = bearer {
        builder = builder.header("authorization", format!("Bearer {bearer}"));
    }
    builder.body(Body::from(r#"{"data":null}"#)).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

#[tokio::test]
async fn test_authenticated_seed_writes_four_canonical_documents() {
    let store = Arc::new(MemoryTemplateStore::new());
    let app = create_test_app(create_test_config(&auth_section()), store.clone());

    let response = app
        .oneshot(seed_request(Some(&token("user-1", 3600))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"result": {"success": true}})
    );
    assert_eq!(store.len().await, 4);
    for key in TemplateKey::ALL {
        assert_eq!(
            store.get("user-1", key).await.unwrap(),
            Some(TemplateDocument::canonical(key)),
            "{key} should hold canonical content"
        );
    }
    assert_eq!(
        store
            .get("user-1", TemplateKey::Blank)
            .await
            .unwrap()
            .unwrap()
            .content,
        ""
    );
}

#[tokio::test]
async fn test_seeding_twice_is_idempotent() {
    let store = Arc::new(MemoryTemplateStore::new());
    let app = create_test_app(create_test_config(&auth_section()), store.clone());
    let bearer = token("user-1", 3600);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(seed_request(Some(&bearer)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(store.len().await, 4);
}

#[tokio::test]
async fn test_seed_only_touches_callers_collection() {
    let store = Arc::new(MemoryTemplateStore::new());
    store
        .put(
            "user-2",
            TemplateKey::TakeHistory,
            TemplateDocument {
                content: "custom".to_string(),
            },
        )
        .await
        .unwrap();
    let app = create_test_app(create_test_config(&auth_section()), store.clone());

    let response = app
        .oneshot(seed_request(Some(&token("user-1", 3600))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        store
            .get("user-2", TemplateKey::TakeHistory)
            .await
            .unwrap()
            .unwrap()
            .content,
        "custom"
    );
}

#[tokio::test]
async fn test_missing_token_is_unauthenticated_and_writes_nothing() {
    let store = Arc::new(MemoryTemplateStore::new());
    let app = create_test_app(create_test_config(&auth_section()), store.clone());

    let response = app.oneshot(seed_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({
            "error": {
                "status": "UNAUTHENTICATED",
                "message": "The function must be called while authenticated."
            }
        })
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_expired_token_is_unauthenticated() {
    let store = Arc::new(MemoryTemplateStore::new());
    let app = create_test_app(create_test_config(&auth_section()), store.clone());

    let response = app
        .oneshot(seed_request(Some(&token("user-1", -3600))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["status"], "UNAUTHENTICATED");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_without_configured_secret_every_caller_is_anonymous() {
    let store = Arc::new(MemoryTemplateStore::new());
    let app = create_test_app(create_test_config(""), store.clone());

    let response = app
        .oneshot(seed_request(Some(&token("user-1", 3600))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_identity_provider_subject_is_seeded() {
    let store = Arc::new(MemoryTemplateStore::new());
    let app = create_test_app(create_test_config(&auth_section()), store.clone());
    let uid = "auth0|5f7c8ec7c33c6c004bbafe82";

    let response = app
        .oneshot(seed_request(Some(&token(uid, 3600))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"result": {"success": true}})
    );
    for key in TemplateKey::ALL {
        assert_eq!(
            store.get(uid, key).await.unwrap(),
            Some(TemplateDocument::canonical(key))
        );
    }
}

#[tokio::test]
async fn test_identity_provider_subject_is_seeded_on_file_store() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let store = Arc::new(FileTemplateStore::new(dir.path()));
    let app = create_test_app(create_test_config(&auth_section()), store.clone());

    let response = app
        .oneshot(seed_request(Some(&token("auth0|abc", 3600))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        store
            .get("auth0|abc", TemplateKey::PresentIllness)
            .await
            .unwrap(),
        Some(TemplateDocument::canonical(TemplateKey::PresentIllness))
    );
}

#[tokio::test]
async fn test_store_failure_is_unknown_without_server_path() {
    // A store rooted at a regular file cannot create collection directories
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, b"plain file").unwrap();
    let store = Arc::new(FileTemplateStore::new(&blocker));
    let app = create_test_app(create_test_config(&auth_section()), store);

    let response = app
        .oneshot(seed_request(Some(&token("user-1", 3600))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["status"], "UNKNOWN");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(
        message.starts_with("template storage I/O error: "),
        "unexpected message: {message}"
    );
    assert!(
        !message.contains(&*dir.path().to_string_lossy()),
        "message leaks a server path: {message}"
    );
}

#[tokio::test]
async fn test_file_store_persists_seed() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let store = Arc::new(FileTemplateStore::new(dir.path()));
    let app = create_test_app(create_test_config(&auth_section()), store.clone());

    let response = app
        .oneshot(seed_request(Some(&token("user-1", 3600))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A fresh store over the same directory sees the documents
    let reopened = FileTemplateStore::new(dir.path());
    for key in TemplateKey::ALL {
        assert_eq!(
            reopened.get("user-1", key).await.unwrap(),
            Some(TemplateDocument::canonical(key))
        );
    }
    assert!(
        dir.path()
            .join("user-1")
            .join("presentIllness.json")
            .exists()
    );
}
