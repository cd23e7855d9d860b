use super::*;
use crate::credentials::MemoryCredentialStore;
use axum::{
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use tokio::net::TcpListener;

async fn echo(headers: HeaderMap, uri: Uri) -> Json<Value> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({
        "authorization": authorization,
        "path": uri.path(),
        "query": uri.query(),
    }))
}

async fn login_form(Form(fields): Form<HashMap<String, String>>) -> impl IntoResponse {
    if fields.get("password").map(String::as_str) == Some("hunter22") {
        (StatusCode::OK, Json(json!({"access_token": "tok", "token_type": "bearer"})))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Authentication was unsuccessful."})),
        )
    }
}

async fn not_json() -> &'static str {
    "<html>oops</html>"
}

async fn spawn_server() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/api/echo/", get(echo))
        .route("/api/users/login/token/", post(login_form))
        .route("/api/broken/", get(not_json));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/api")
}

fn request(method: Method, path: &str) -> ApiRequest {
    ApiRequest {
        method,
        path: path.to_string(),
        body: None,
        query: Vec::new(),
    }
}

#[test]
fn api_path_always_has_leading_and_trailing_slash() {
    assert_eq!(format_api_path("users/me"), "/users/me/");
    assert_eq!(format_api_path("/users/me"), "/users/me/");
    assert_eq!(format_api_path("users/me/"), "/users/me/");
    assert_eq!(format_api_path("/"), "/");
    assert_eq!(format_api_path(""), "/");
}

#[test]
fn query_params_join_with_ampersand_and_encode_values() {
    let params = vec![
        ("starting_date".to_string(), "2021-05-01T10:00:00Z".to_string()),
        ("page_chunk_size".to_string(), "20".to_string()),
    ];
    assert_eq!(
        format_url_with_query_params("http://h/api/feed/cleanings/", &params),
        "http://h/api/feed/cleanings/?starting_date=2021-05-01T10%3A00%3A00Z&page_chunk_size=20"
    );
    assert_eq!(
        format_url_with_query_params("http://h/api/x/", &[]),
        "http://h/api/x/"
    );
    assert_eq!(
        format_url_with_query_params("http://h/", &[("q".into(), "a b".into())]),
        "http://h/?q=a%20b"
    );
}

#[test]
fn format_url_joins_base_and_normalized_path() {
    assert_eq!(
        format_url("http://localhost:5500/api/", "cleanings/abc", &[]),
        "http://localhost:5500/api/cleanings/abc/"
    );
}

#[tokio::test]
async fn injects_bearer_token_when_stored() {
    let base = spawn_server().await;
    let transport = HttpTransport::new(
        base,
        Arc::new(MemoryCredentialStore::with_access_token("secret-token")),
    );

    let mut req = request(Method::GET, "echo");
    req.query = vec![("page".into(), "2".into())];
    let response = transport.send(req).await.expect("send");

    assert_eq!(response.status, 200);
    assert_eq!(response.data["authorization"], "Bearer secret-token");
    assert_eq!(response.data["path"], "/api/echo/");
    assert_eq!(response.data["query"], "page=2");
}

#[tokio::test]
async fn omits_authorization_without_token() {
    let base = spawn_server().await;
    let transport = HttpTransport::new(base, Arc::new(MemoryCredentialStore::new()));

    let response = transport
        .send(request(Method::GET, "/echo"))
        .await
        .expect("send");
    assert!(response.data["authorization"].is_null());
}

#[tokio::test]
async fn form_body_is_url_encoded_and_status_errors_carry_body() {
    let base = spawn_server().await;
    let transport = HttpTransport::new(base, Arc::new(MemoryCredentialStore::new()));

    let mut ok = request(Method::POST, "/users/login/token/");
    ok.body = Some(RequestBody::Form(vec![
        ("username".into(), "a@b.c".into()),
        ("password".into(), "hunter22".into()),
    ]));
    let response = transport.send(ok).await.expect("login");
    assert_eq!(response.data["access_token"], "tok");

    let mut bad = request(Method::POST, "/users/login/token/");
    bad.body = Some(RequestBody::Form(vec![
        ("username".into(), "a@b.c".into()),
        ("password".into(), "nope".into()),
    ]));
    match transport.send(bad).await {
        Err(TransportError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body["detail"], "Authentication was unsuccessful.");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let base = spawn_server().await;
    let transport = HttpTransport::new(base, Arc::new(MemoryCredentialStore::new()));

    let err = transport
        .send(request(Method::GET, "/broken"))
        .await
        .expect_err("must fail");
    assert!(matches!(err, TransportError::MalformedBody { status: 200, .. }));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let transport = HttpTransport::new(
        format!("http://{addr}/api"),
        Arc::new(MemoryCredentialStore::new()),
    );
    let err = transport
        .send(request(Method::GET, "/echo"))
        .await
        .expect_err("must fail");
    assert!(matches!(err, TransportError::Network(_)));
}
