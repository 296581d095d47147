mod common;

use std::sync::Arc;

use common::*;
use devcamper::mailer::MemoryMailer;
use devcamper::models::User;
use devcamper_core::axum::http::StatusCode;
use devcamper_data::{DocumentStore, Filter, FindQuery};
use devcamper_test::TestApp;
use serde_json::json;

async fn register(app: &TestApp, email: &str, role: &str) -> String {
    app.post("/api/v1/auth/register")
        .json(&json!({"name": "Jane Doe", "email": email, "password": "123456", "role": role}))
        .send()
        .await
        .assert_ok()
        .assert_success()
        .json_path("token")
}

#[tokio::test]
async fn register_then_me() {
    let h = seeded().await;
    let token = register(&h.app, "jane@gmail.com", "publisher").await;

    h.app
        .get("/api/v1/auth/me")
        .bearer(&token)
        .send()
        .await
        .assert_ok()
        .assert_json_path("data.email", "jane@gmail.com")
        .assert_json_path("data.role", "publisher")
        .assert_json_path_fn("data", |user| user.get("password").is_none());
}

#[tokio::test]
async fn register_sets_the_token_cookie() {
    let h = seeded().await;
    let resp = h
        .app
        .post("/api/v1/auth/register")
        .json(&json!({"name": "Jane", "email": "jane@gmail.com", "password": "123456"}))
        .send()
        .await
        .assert_ok();
    let token: String = resp.json_path("token");
    let cookie = resp.header("set-cookie").unwrap();
    assert!(cookie.starts_with(&format!("token={token};")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains(&format!("Max-Age={}", 30 * 24 * 60 * 60)));
}

#[tokio::test]
async fn admin_role_cannot_be_registered() {
    let h = seeded().await;
    h.app
        .post("/api/v1/auth/register")
        .json(&json!({"name": "Mallory", "email": "mallory@gmail.com", "password": "123456", "role": "admin"}))
        .send()
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn duplicate_emails_are_rejected() {
    let h = seeded().await;
    h.app
        .post("/api/v1/auth/register")
        .json(&json!({"name": "Copy", "email": "john@gmail.com", "password": "123456"}))
        .send()
        .await
        .assert_error(StatusCode::BAD_REQUEST, "Duplicate field value entered");
}

#[tokio::test]
async fn login_checks_credentials() {
    let h = seeded().await;
    register(&h.app, "jane@gmail.com", "user").await;

    h.app
        .post("/api/v1/auth/login")
        .json(&json!({"email": "jane@gmail.com"}))
        .send()
        .await
        .assert_error(StatusCode::BAD_REQUEST, "Please provide an email and password");

    h.app
        .post("/api/v1/auth/login")
        .json(&json!({"email": "jane@gmail.com", "password": "654321"}))
        .send()
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "Invalid credentials");

    h.app
        .post("/api/v1/auth/login")
        .json(&json!({"email": "nobody@gmail.com", "password": "123456"}))
        .send()
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "Invalid credentials");

    let token: String = h
        .app
        .post("/api/v1/auth/login")
        .json(&json!({"email": "jane@gmail.com", "password": "123456"}))
        .send()
        .await
        .assert_ok()
        .json_path("token");
    h.app
        .get("/api/v1/auth/me")
        .bearer(&token)
        .send()
        .await
        .assert_ok()
        .assert_json_path("data.name", "Jane Doe");
}

#[tokio::test]
async fn bad_or_orphaned_tokens_are_rejected() {
    let h = seeded().await;
    h.app
        .get("/api/v1/auth/me")
        .bearer("not-a-jwt")
        .send()
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "Not authorized to access this route");

    h.app
        .get("/api/v1/auth/me")
        .bearer(&h.token(MISSING_ID))
        .send()
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "Not authorized to access this route");

    h.app
        .get("/api/v1/auth/me")
        .header("authorization", format!("Basic {}", h.token(USER)))
        .send()
        .await
        .assert_unauthorized();
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let h = seeded().await;
    let resp = h
        .app
        .get("/api/v1/auth/logout")
        .send()
        .await
        .assert_ok()
        .assert_json_path("data", json!({}));
    assert!(resp.header("set-cookie").unwrap().starts_with("token=none;"));
}

#[tokio::test]
async fn update_details_and_password() {
    let h = seeded().await;
    let token = register(&h.app, "jane@gmail.com", "user").await;

    h.app
        .put("/api/v1/auth/updatedetails")
        .bearer(&token)
        .json(&json!({"name": "Jane Smith"}))
        .send()
        .await
        .assert_ok()
        .assert_json_path("data.name", "Jane Smith")
        .assert_json_path("data.email", "jane@gmail.com");

    h.app
        .put("/api/v1/auth/updatepassword")
        .bearer(&token)
        .json(&json!({"currentPassword": "wrong!", "newPassword": "abcdef"}))
        .send()
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "Password is incorrect");

    h.app
        .put("/api/v1/auth/updatepassword")
        .bearer(&token)
        .json(&json!({"currentPassword": "123456", "newPassword": "abcdef"}))
        .send()
        .await
        .assert_ok()
        .assert_json_path_fn("token", |t| t.is_string());

    h.app
        .post("/api/v1/auth/login")
        .json(&json!({"email": "jane@gmail.com", "password": "abcdef"}))
        .send()
        .await
        .assert_ok();
}

#[tokio::test]
async fn forgot_and_reset_password() {
    let h = seeded().await;
    register(&h.app, "jane@gmail.com", "user").await;

    h.app
        .post("/api/v1/auth/forgotpassword")
        .json(&json!({"email": "nobody@gmail.com"}))
        .send()
        .await
        .assert_error(StatusCode::NOT_FOUND, "There is no user with that email");

    h.app
        .post("/api/v1/auth/forgotpassword")
        .json(&json!({"email": "jane@gmail.com"}))
        .send()
        .await
        .assert_ok()
        .assert_json_path("data", "Email sent");

    let sent = h.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@gmail.com");
    let marker = "http://localhost:5000/api/v1/auth/resetpassword/";
    let start = sent[0].body.find(marker).unwrap() + marker.len();
    let raw = sent[0].body[start..].trim().to_string();
    assert_eq!(raw.len(), 40);

    h.app
        .put("/api/v1/auth/resetpassword/0000000000000000000000000000000000000000")
        .json(&json!({"password": "newpass"}))
        .send()
        .await
        .assert_error(StatusCode::BAD_REQUEST, "Invalid token");

    h.app
        .put(&format!("/api/v1/auth/resetpassword/{raw}"))
        .json(&json!({"password": "newpass"}))
        .send()
        .await
        .assert_ok()
        .assert_json_path_fn("token", |t| t.is_string());

    // A reset token works once.
    h.app
        .put(&format!("/api/v1/auth/resetpassword/{raw}"))
        .json(&json!({"password": "another"}))
        .send()
        .await
        .assert_error(StatusCode::BAD_REQUEST, "Invalid token");

    h.app
        .post("/api/v1/auth/login")
        .json(&json!({"email": "jane@gmail.com", "password": "newpass"}))
        .send()
        .await
        .assert_ok();
}

#[tokio::test]
async fn failed_mail_clears_the_reset_token() {
    let h = seeded_with(Arc::new(MemoryMailer::failing())).await;
    register(&h.app, "jane@gmail.com", "user").await;

    h.app
        .post("/api/v1/auth/forgotpassword")
        .json(&json!({"email": "jane@gmail.com"}))
        .send()
        .await
        .assert_error(StatusCode::INTERNAL_SERVER_ERROR, "Email could not be sent");

    let stored = h
        .state
        .store
        .find_one(
            FindQuery::new::<User>()
                .filter(Filter::eq("email", "jane@gmail.com"))
                .reveal_hidden(),
        )
        .await
        .unwrap()
        .unwrap();
    assert!(stored["resetPasswordToken"].is_null());
    assert!(stored["resetPasswordExpire"].is_null());
}
