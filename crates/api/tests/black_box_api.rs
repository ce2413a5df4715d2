use std::sync::Arc;

use axum::{ServiceExt, extract::Request};
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use serde_json::json;

use userdesk_api::app::SharedUserService;
use userdesk_auth::{BcryptHasher, Hs256TokenIssuer, TokenIssuer};
use userdesk_core::{NewUser, User, UserId, UserUpdate};
use userdesk_infra::{DefaultUserService, InMemoryUserStore, ServiceError, ServiceResult, StoreError, UserService};

const BASE: &str = "/api/users";
const JWT_SECRET: &[u8] = b"test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(service: SharedUserService) -> Self {
        // Same router as prod, but over a test service and an ephemeral port.
        let app = userdesk_api::app::app(service, BASE);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}{}", addr, BASE);

        let handle = tokio::spawn(async move {
            axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
                .await
                .unwrap();
        });

        Self { base_url, handle }
    }

    async fn in_memory() -> Self {
        Self::spawn(in_memory_service()).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn token_issuer() -> Arc<Hs256TokenIssuer> {
    Arc::new(Hs256TokenIssuer::new(JWT_SECRET, ChronoDuration::minutes(10)))
}

fn in_memory_service() -> SharedUserService {
    Arc::new(DefaultUserService::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(BcryptHasher::new(4)),
        token_issuer(),
    ))
}

fn signup_body(email: &str) -> serde_json::Value {
    json!({
        "fullName": "Katherine Johnson",
        "userName": "katherine",
        "email": email,
        "password": "orbital",
    })
}

async fn signup(client: &reqwest::Client, srv: &TestServer, email: &str) -> serde_json::Value {
    let res = client
        .post(srv.url("/signup"))
        .json(&signup_body(email))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["user"].clone()
}

/// Every operation fails the way an unreachable database would.
struct FailingService;

fn down() -> ServiceError {
    ServiceError::from(StoreError::Unavailable("database is down".to_string()))
}

#[async_trait::async_trait]
impl UserService for FailingService {
    async fn list_users(&self) -> ServiceResult<Vec<User>> {
        Err(down())
    }

    async fn get_user(&self, _id: UserId) -> ServiceResult<Option<User>> {
        Err(down())
    }

    async fn create_user(&self, _record: NewUser) -> ServiceResult<User> {
        Err(down())
    }

    async fn update_user(&self, _record: UserUpdate, _id: UserId) -> ServiceResult<User> {
        Err(down())
    }

    async fn delete_user(&self, _id: UserId) -> ServiceResult<()> {
        Err(down())
    }

    async fn delete_all_users(&self) -> ServiceResult<()> {
        Err(down())
    }

    async fn log_user(&self, _email: &str, _password: &str) -> ServiceResult<Option<String>> {
        Err(down())
    }
}

/// Returns the empty-string token for any credentials.
struct EmptyTokenService;

#[async_trait::async_trait]
impl UserService for EmptyTokenService {
    async fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(Vec::new())
    }

    async fn get_user(&self, _id: UserId) -> ServiceResult<Option<User>> {
        Ok(None)
    }

    async fn create_user(&self, _record: NewUser) -> ServiceResult<User> {
        Err(down())
    }

    async fn update_user(&self, _record: UserUpdate, _id: UserId) -> ServiceResult<User> {
        Err(down())
    }

    async fn delete_user(&self, _id: UserId) -> ServiceResult<()> {
        Ok(())
    }

    async fn delete_all_users(&self) -> ServiceResult<()> {
        Ok(())
    }

    async fn log_user(&self, _email: &str, _password: &str) -> ServiceResult<Option<String>> {
        Ok(Some(String::new()))
    }
}

#[tokio::test]
async fn health_is_served_outside_the_base_path() {
    let srv = TestServer::in_memory().await;
    let root = srv.base_url.trim_end_matches(BASE).to_string();

    let res = reqwest::get(format!("{root}/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn signup_returns_envelope_and_get_round_trips() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/signup"))
        .json(&signup_body("kj@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["redirect"], "/verify");
    assert_eq!(body["message"], "signup successful, please login");
    assert!(body["user"].get("password").is_none());

    let id = body["user"]["id"].as_i64().unwrap();
    let res = client.get(srv.url(&format!("/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["id"], id);
    assert_eq!(fetched["fullName"], "Katherine Johnson");
    assert_eq!(fetched["userName"], "katherine");
    assert_eq!(fetched["email"], "kj@example.com");
    assert!(fetched.get("password").is_none());
}

#[tokio::test]
async fn signup_reports_each_mistyped_field() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/signup"))
        .json(&json!({ "fullName": 42, "userName": "u", "email": "e@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);

    assert_eq!(errors[0]["path"], "fullName");
    assert_eq!(errors[0]["value"], 42);
    assert_eq!(errors[0]["location"], "body");
    assert_eq!(errors[0]["msg"], "Invalid value");
    assert_eq!(errors[0]["type"], "field");

    assert_eq!(errors[1]["path"], "password");
    assert!(errors[1].get("value").is_none());
}

#[tokio::test]
async fn signup_without_body_fails_every_field() {
    let srv = TestServer::in_memory().await;

    let res = reqwest::Client::new()
        .post(srv.url("/signup"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["errors"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn unknown_id_is_a_400_with_literal_message() {
    let srv = TestServer::in_memory().await;

    let res = reqwest::get(srv.url("/999")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!("User could not be found!"));
}

#[tokio::test]
async fn non_numeric_id_reaches_the_failure_path() {
    let srv = TestServer::in_memory().await;

    let res = reqwest::get(srv.url("/abc")).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body.as_str().unwrap().contains("invalid identifier"));
}

#[tokio::test]
async fn undecodable_id_segment_still_answers_with_json() {
    let srv = TestServer::in_memory().await;

    let res = reqwest::get(srv.url("/%FF")).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body.as_str().unwrap().starts_with("invalid identifier"));
}

#[tokio::test]
async fn trailing_slash_reaches_the_same_handlers() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    let user = signup(&client, &srv, "kj@example.com").await;
    let id = user["id"].as_i64().unwrap();

    let res = client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let users: serde_json::Value = res.json().await.unwrap();
    assert_eq!(users.as_array().unwrap().len(), 1);

    let res = client.get(srv.url(&format!("/{id}/"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await.unwrap()["id"], id);

    let res = client.delete(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.get(srv.url("")).send().await.unwrap();
    assert_eq!(res.json::<serde_json::Value>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn list_returns_every_user() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await.unwrap(), json!([]));

    signup(&client, &srv, "a@example.com").await;
    signup(&client, &srv, "b@example.com").await;

    let res = client.get(srv.url("")).send().await.unwrap();
    let users: serde_json::Value = res.json().await.unwrap();
    let emails: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, ["a@example.com", "b@example.com"]);
}

#[tokio::test]
async fn update_replaces_fields_but_not_full_name() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    let user = signup(&client, &srv, "kj@example.com").await;
    let id = user["id"].as_i64().unwrap();

    let res = client
        .put(srv.url(&format!("/{id}")))
        .json(&json!({
            "fullName": "Ignored",
            "userName": "kj",
            "email": "kj@nasa.example",
            "password": "trajectory",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["id"], id);
    assert_eq!(updated["fullName"], "Katherine Johnson");
    assert_eq!(updated["userName"], "kj");
    assert_eq!(updated["email"], "kj@nasa.example");
    assert!(updated.get("password").is_none());

    // New password is live, old one is not.
    let res = client
        .post(srv.url("/login"))
        .json(&json!({ "email": "kj@nasa.example", "password": "trajectory" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn update_requires_string_fields() {
    let srv = TestServer::in_memory().await;

    let res = reqwest::Client::new()
        .put(srv.url("/1"))
        .json(&json!({ "userName": "kj", "email": ["not", "a", "string"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    let paths: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, ["email", "password"]);
}

#[tokio::test]
async fn update_of_unknown_user_is_a_500() {
    let srv = TestServer::in_memory().await;

    let res = reqwest::Client::new()
        .put(srv.url("/77"))
        .json(&json!({ "userName": "x", "email": "x@example.com", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!("user 77 not found"));
}

#[tokio::test]
async fn delete_is_204_whether_or_not_the_user_exists() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    let user = signup(&client, &srv, "kj@example.com").await;
    let id = user["id"].as_i64().unwrap();

    let res = client.delete(srv.url(&format!("/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.delete(srv.url(&format!("/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.get(srv.url(&format!("/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_all_empties_the_directory() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    signup(&client, &srv, "a@example.com").await;
    signup(&client, &srv, "b@example.com").await;

    let res = client.delete(srv.url("")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.get(srv.url("")).send().await.unwrap();
    assert_eq!(res.json::<serde_json::Value>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn login_sets_http_only_cookie_carrying_the_token() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    let user = signup(&client, &srv, "kj@example.com").await;

    let res = client
        .post(srv.url("/login"))
        .json(&json!({ "email": "kj@example.com", "password": "orbital" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("jwt cookie")
        .to_str()
        .unwrap()
        .to_string();

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "OK!");
    assert_eq!(body["message"], "Successfully login");

    let token = body["result"].as_str().unwrap();
    assert!(cookie.starts_with(&format!("jwt={token};")));
    assert!(cookie.contains("HttpOnly"));

    let claims = token_issuer().validate(token, Utc::now()).unwrap();
    assert_eq!(claims.sub, UserId::new(user["id"].as_i64().unwrap()));
}

#[tokio::test]
async fn login_with_wrong_credentials_is_a_400_envelope() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    signup(&client, &srv, "kj@example.com").await;

    for body in [
        json!({ "email": "kj@example.com", "password": "wrong" }),
        json!({ "email": "nobody@example.com", "password": "orbital" }),
        json!({ "email": 7 }),
    ] {
        let res = client.post(srv.url("/login")).json(&body).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.headers().get(reqwest::header::SET_COOKIE).is_none());

        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(
            body,
            json!({ "status": "Bad Request!", "message": "Wrong email or Password" })
        );
    }
}

#[tokio::test]
async fn empty_token_from_service_means_wrong_credentials() {
    let srv = TestServer::spawn(Arc::new(EmptyTokenService)).await;

    let res = reqwest::Client::new()
        .post(srv.url("/login"))
        .json(&json!({ "email": "a@example.com", "password": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Wrong email or Password");
}

#[tokio::test]
async fn service_failures_surface_as_500_with_message() {
    let srv = TestServer::spawn(Arc::new(FailingService)).await;
    let client = reqwest::Client::new();
    let expected = json!("store unavailable: database is down");

    let requests = [
        client.get(srv.url("")),
        client.get(srv.url("/1")),
        client.post(srv.url("/signup")).json(&signup_body("a@example.com")),
        client
            .put(srv.url("/1"))
            .json(&json!({ "userName": "u", "email": "e", "password": "p" })),
        client.delete(srv.url("/1")),
        client
            .post(srv.url("/login"))
            .json(&json!({ "email": "a@example.com", "password": "pw" })),
    ];

    for req in requests {
        let res = req.send().await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.json::<serde_json::Value>().await.unwrap(), expected);
    }
}

#[tokio::test]
async fn bulk_delete_failure_uses_generic_message() {
    let srv = TestServer::spawn(Arc::new(FailingService)).await;

    let res = reqwest::Client::new().delete(srv.url("")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Error deleting transaction numbers" }));
}
