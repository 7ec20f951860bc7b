//! End-to-end tests for accounts, sessions, permissions and the contact inbox

mod common;

use common::*;
use docportal_server::document::{DocumentStatus, DocumentStore};
use docportal_server::notifications::Notification;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn registration(email: &str) -> Value {
    json!({
        "email": email,
        "password": "grace-password-1",
        "first_name": "Grace",
        "last_name": "Hopper",
        "contact": TEST_CONTACT,
        "branch": TEST_BRANCH,
    })
}

fn contact_query() -> Value {
    json!({
        "full_name": "Grace Hopper",
        "email": "grace@navy.mil",
        "mobile": "5550100",
        "subject": "Broken link",
        "message": "The compilers notes do not open.",
    })
}

#[tokio::test]
async fn test_home_is_public() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_home().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body["user_id"].is_null());

    let client = TestClient::authenticated(server.base_url.clone()).await;
    let body: Value = client.get_home().await.json().await.unwrap();
    assert_eq!(body["user_id"], server.users.student.id);
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_profile().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Authentication required");

    assert_eq!(
        client.my_documents(None).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        client
            .upload_document("x", TEST_BRANCH, "Notes", "PDF", "x.pdf", PDF_BYTES)
            .await
            .status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        client.admin_stats().await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_students_are_refused_admin_routes() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    assert_eq!(client.admin_stats().await.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        client.admin_documents(&[]).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(client.admin_users(None).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        client
            .admin_delete_user(server.users.other_student.id)
            .await
            .status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        client.admin_queries(None).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_register_login_logout_flow() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.register(&registration("Grace@Navy.mil")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: Value = response.json().await.unwrap();
    assert_eq!(user["email"], "grace@navy.mil");
    assert_eq!(user["role"], "Student");
    assert!(user.get("password").is_none());

    // Registration sends a welcome email but does not log in
    let sent = server.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "grace@navy.mil");
    assert!(matches!(sent[0].1, Notification::Welcome { .. }));
    assert_eq!(client.get_profile().await.status(), StatusCode::UNAUTHORIZED);

    let response = client.login("grace@navy.mil", "grace-password-1").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let login: Value = response.json().await.unwrap();
    assert!(!login["token"].as_str().unwrap().is_empty());

    let profile: Value = client.get_profile().await.json().await.unwrap();
    assert_eq!(profile["first_name"], "Grace");

    assert_eq!(client.logout().await.status(), StatusCode::OK);
    assert_eq!(client.get_profile().await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_authenticates() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let login: Value = client
        .login(TEST_USER, TEST_PASS)
        .await
        .json()
        .await
        .unwrap();
    let token = login["token"].as_str().unwrap();

    let response = reqwest::Client::new()
        .get(format!("{}/v1/user/profile", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile: Value = response.json().await.unwrap();
    assert_eq!(profile["email"], TEST_USER);
}

#[tokio::test]
async fn test_duplicate_email_and_bad_credentials() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.register(&registration(&TEST_USER.to_uppercase())).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client.login(TEST_USER, "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = client.login("nobody@uni.edu", TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut invalid = registration("grace@navy.mil");
    invalid["contact"] = json!("12345");
    assert_eq!(
        client.register(&invalid).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_profile_update_and_password_change() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client
        .update_profile(&json!({
            "first_name": "Augusta",
            "last_name": "King",
            "contact": "9876543210",
            "branch": "Mechanical",
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile: Value = client.get_profile().await.json().await.unwrap();
    assert_eq!(profile["first_name"], "Augusta");
    assert_eq!(profile["branch"], "Mechanical");
    assert_eq!(profile["email"], TEST_USER);

    let response = client.change_password("wrong-password", "new-password-1").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client.change_password(TEST_PASS, "new-password-1").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let fresh = TestClient::new(server.base_url.clone());
    assert_eq!(
        fresh.login(TEST_USER, TEST_PASS).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        fresh.login(TEST_USER, "new-password-1").await.status(),
        StatusCode::CREATED
    );
}

#[tokio::test]
async fn test_contact_queries_reach_the_admin_inbox() {
    let server = TestServer::spawn().await;
    let visitor = TestClient::new(server.base_url.clone());

    let response = visitor.submit_contact(&contact_query()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let query: Value = response.json().await.unwrap();
    let id = query["id"].as_u64().unwrap() as usize;
    assert_eq!(query["is_read"], false);

    let sent = server.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "grace@navy.mil");

    let mut invalid = contact_query();
    invalid["email"] = json!("not an email");
    assert_eq!(
        visitor.submit_contact(&invalid).await.status(),
        StatusCode::BAD_REQUEST
    );

    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;
    let stats: Value = admin.admin_stats().await.json().await.unwrap();
    assert_eq!(stats["unread_queries"], 1);

    let unread: Value = admin.admin_queries(None).await.json().await.unwrap();
    assert_eq!(unread["total"], 1);
    assert_eq!(unread["items"][0]["subject"], "Broken link");

    let opened: Value = admin.admin_query(id).await.json().await.unwrap();
    assert_eq!(opened["is_read"], true);

    let unread: Value = admin.admin_queries(None).await.json().await.unwrap();
    assert_eq!(unread["total"], 0);
    let read: Value = admin.admin_queries(Some("true")).await.json().await.unwrap();
    assert_eq!(read["total"], 1);

    assert_eq!(
        admin.admin_query(id + 100).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        admin.admin_queries(Some("maybe")).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_admin_deletes_user_with_documents() {
    let server = TestServer::spawn().await;
    let alan = server.users.other_student.id;
    let document = server
        .seed_document(DocumentSeed::new(alan, "Enigma", DocumentStatus::Accept))
        .await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;

    let users: Value = admin.admin_users(None).await.json().await.unwrap();
    assert_eq!(users["total"], 3);

    let response = admin.admin_delete_user(alan).await;
    assert_eq!(response.status(), StatusCode::OK);
    let deleted: Value = response.json().await.unwrap();
    assert_eq!(deleted["email"], OTHER_USER);

    assert!(server.documents.get_document(document).unwrap().is_none());
    let users: Value = admin.admin_users(None).await.json().await.unwrap();
    assert_eq!(users["total"], 2);

    let stale = TestClient::new(server.base_url.clone());
    assert_eq!(
        stale.login(OTHER_USER, OTHER_PASS).await.status(),
        StatusCode::UNAUTHORIZED
    );

    assert_eq!(
        admin.admin_delete_user(server.users.admin.id).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        admin.admin_delete_user(alan).await.status(),
        StatusCode::NOT_FOUND
    );
}
