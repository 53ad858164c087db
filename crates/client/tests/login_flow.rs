//! End-to-end login against an in-process console API.

#[path = "../src/crypto/test_vectors.rs"]
mod test_vectors;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use console_client::{ConsoleClient, ErrorKind, HyperTransport, PublicKeyProvider};
use serde_json::{json, Value};

use test_vectors::{decrypt_1024, PKCS1_1024_PEM, SPKI_1024_PEM};

#[derive(Clone)]
struct Console {
    pem: &'static str,
    key_fetches: Arc<AtomicUsize>,
}

async fn public_key(State(console): State<Console>) -> Json<Value> {
    console.key_fetches.fetch_add(1, Ordering::SeqCst);
    Json(json!({"code": 0, "data": {"public_key": console.pem}}))
}

async fn login(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let marker = headers
        .get("x-encrypted-fields")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if marker != "password" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": format!("unexpected marker {marker:?}")})),
        );
    }
    let password = decrypt_1024(body["password"].as_str().unwrap_or_default());
    if body["username"] != "admin" || password != "hunter2" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "invalid credentials"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"data": {"token": "t-1", "user": {"username": "admin", "role": "owner"}}})),
    )
}

async fn spawn_console(pem: &'static str) -> (SocketAddr, Arc<AtomicUsize>) {
    let key_fetches = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route("/api/v1/crypto/public-key", get(public_key))
        .route("/api/v1/auth/login", post(login))
        .with_state(Console {
            pem,
            key_fetches: Arc::clone(&key_fetches),
        });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, key_fetches)
}

fn client_for(addr: SocketAddr) -> ConsoleClient<HyperTransport> {
    let transport =
        HyperTransport::new(&format!("http://{addr}/api/v1"), Duration::from_secs(5)).unwrap();
    ConsoleClient::new(Arc::new(transport))
}

#[tokio::test]
async fn login_with_spki_key() {
    let (addr, key_fetches) = spawn_console(SPKI_1024_PEM).await;
    let client = client_for(addr);

    let session = client.login("admin", "hunter2").await.unwrap();
    assert_eq!(session.token.as_deref(), Some("t-1"));
    assert_eq!(session.user["role"], "owner");

    client.login("admin", "hunter2").await.unwrap();
    assert_eq!(key_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn login_with_pkcs1_key() {
    let (addr, _) = spawn_console(PKCS1_1024_PEM).await;
    let session = client_for(addr).login("admin", "hunter2").await.unwrap();
    assert_eq!(session.user["username"], "admin");
}

#[tokio::test]
async fn wrong_password_is_a_network_error() {
    let (addr, _) = spawn_console(SPKI_1024_PEM).await;
    let err = client_for(addr).login("admin", "wrong").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.to_string().contains("authentication"));
}

#[tokio::test]
async fn custom_paths_are_honoured() {
    let (addr, _) = spawn_console(SPKI_1024_PEM).await;
    let transport = Arc::new(
        HyperTransport::new(&format!("http://{addr}/api"), Duration::from_secs(5)).unwrap(),
    );
    let keys = PublicKeyProvider::with_path(Arc::clone(&transport), "/v1/crypto/public-key");
    let client = ConsoleClient::with_provider(transport, keys).with_login_path("/v1/auth/login");
    client.login("admin", "hunter2").await.unwrap();
    assert!(client.public_keys().is_populated());
}
