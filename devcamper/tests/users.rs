mod common;

use common::*;
use devcamper_core::axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn user_admin_is_admin_only() {
    let h = seeded().await;
    h.app
        .get("/api/v1/users")
        .send()
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "Not authorized to access this route");
    h.app
        .get("/api/v1/users")
        .bearer(&h.token(PUBLISHER))
        .send()
        .await
        .assert_error(
            StatusCode::FORBIDDEN,
            "User role publisher is not authorized to access this route",
        );
}

#[tokio::test]
async fn lists_users_through_the_results_pipeline() {
    let h = seeded().await;
    h.app
        .get("/api/v1/users")
        .bearer(&h.token(ADMIN))
        .query("role", "publisher")
        .query("select", "name,email")
        .query("sort", "name")
        .send()
        .await
        .assert_ok()
        .assert_page_count(2)
        .assert_json_path("data[0].name", "John Doe")
        .assert_json_path("data[1].email", "publisher@gmail.com")
        .assert_json_path("data[0].role", serde_json::Value::Null);
}

#[tokio::test]
async fn admin_crud() {
    let h = seeded().await;
    let admin = h.token(ADMIN);

    let id: String = h
        .app
        .post("/api/v1/users")
        .bearer(&admin)
        .json(&json!({"name": "Ops", "email": "ops@gmail.com", "password": "123456", "role": "admin"}))
        .send()
        .await
        .assert_created()
        .assert_json_path("data.role", "admin")
        .assert_json_path_fn("data", |user| user.get("password").is_none())
        .json_path("data._id");

    h.app
        .get(&format!("/api/v1/users/{id}"))
        .bearer(&admin)
        .send()
        .await
        .assert_ok()
        .assert_json_path("data.email", "ops@gmail.com");

    h.app
        .put(&format!("/api/v1/users/{id}"))
        .bearer(&admin)
        .json(&json!({"role": "publisher"}))
        .send()
        .await
        .assert_ok()
        .assert_json_path("data.role", "publisher")
        .assert_json_path("data.name", "Ops");

    h.app
        .delete(&format!("/api/v1/users/{id}"))
        .bearer(&admin)
        .send()
        .await
        .assert_ok()
        .assert_json_path("data", json!({}));

    h.app
        .get(&format!("/api/v1/users/{id}"))
        .bearer(&admin)
        .send()
        .await
        .assert_error(StatusCode::NOT_FOUND, &format!("No user with the id of {id}"));
}

#[tokio::test]
async fn deleted_users_lose_access() {
    let h = seeded().await;
    let token = h.token(KEVIN);
    h.app
        .delete(&format!("/api/v1/users/{KEVIN}"))
        .bearer(&h.token(ADMIN))
        .send()
        .await
        .assert_ok();
    h.app
        .get("/api/v1/auth/me")
        .bearer(&token)
        .send()
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "Not authorized to access this route");
}
