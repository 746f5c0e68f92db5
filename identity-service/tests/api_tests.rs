mod common;

use auth::TokenService;
use chrono::Duration;
use common::TestApp;
use common::TOKEN_SECRET;
use identity_service::domain::account::models::AccountId;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["account"]["username"], "nicola");
    assert_eq!(body["data"]["account"]["email"], "nicola@example.com");
    assert!(body["data"]["account"]["id"].is_string());
    assert!(body["data"]["account"]["created_at"].is_string());
    assert!(!body["data"]["access_token"].as_str().unwrap().is_empty());
    assert!(!body["data"]["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(body["data"]["token_type"], "bearer");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    // Create first account
    app.post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Same email with different case and username
    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola2",
            "email": "Nicola@Example.COM",
            "password": "pass_word!2"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::spawn().await;

    // Create first account
    app.post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Same username with different case and email
    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "NICOLA",
            "email": "other@example.com",
            "password": "pass_word!2"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_invalid_username() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "n",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("minimum 3 characters"));
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "not-an-email",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("email"));
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;

    app.post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["account"]["username"], "nicola");
    assert!(!body["data"]["access_token"].as_str().unwrap().is_empty());
    assert!(!body["data"]["refresh_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::spawn().await;

    app.post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "Correct_Password!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nicola@example.com",
            "password": "Wrong_Password!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"].is_string());
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nobody@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"].is_string());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;

    app.post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "Correct_Password!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let wrong_password = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nicola@example.com",
            "password": "Wrong_Password!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let unknown_email = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nobody@example.com",
            "password": "Wrong_Password!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // A caller must not be able to probe which addresses are registered.
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_password_body: serde_json::Value = wrong_password
        .json()
        .await
        .expect("Failed to parse response");
    let unknown_email_body: serde_json::Value = unknown_email
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(wrong_password_body, unknown_email_body);
}

#[tokio::test]
async fn test_login_inactive_account() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let account_id = AccountId::from_string(register_body["data"]["account"]["id"].as_str().unwrap())
        .expect("Failed to parse account id");

    app.repository.deactivate(&account_id);

    // The password is correct, so the inactive state is what fails.
    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"].as_str().unwrap().contains("inactive"));
}

#[tokio::test]
async fn test_login_stamps_last_login() {
    let app = TestApp::spawn().await;

    app.post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let login_response = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let login_body: serde_json::Value = login_response
        .json()
        .await
        .expect("Failed to parse response");
    let access_token = login_body["data"]["access_token"].as_str().unwrap();

    let response = app
        .get_authenticated("/api/auth/profile", access_token)
        .send()
        .await
        .expect("Failed to execute request");

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["last_login_at"].is_string());
}

#[tokio::test]
async fn test_refresh_issues_working_access_token() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let refresh_token = register_body["data"]["refresh_token"].as_str().unwrap();

    let response = app
        .post("/api/auth/refresh")
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["token_type"], "bearer");

    // The new access token authenticates protected calls.
    let access_token = body["data"]["access_token"].as_str().unwrap();
    let profile_response = app
        .get_authenticated("/api/auth/profile", access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(profile_response.status(), StatusCode::OK);

    let profile_body: serde_json::Value = profile_response
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(profile_body["data"]["username"], "nicola");
}

#[tokio::test]
async fn test_refresh_token_is_reusable() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let refresh_token = register_body["data"]["refresh_token"].as_str().unwrap();

    // The refresh token is not rotated, so a second use succeeds too.
    for _ in 0..2 {
        let response = app
            .post("/api/auth/refresh")
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let access_token = register_body["data"]["access_token"].as_str().unwrap();

    let response = app
        .post("/api/auth/refresh")
        .json(&json!({ "refresh_token": access_token }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("expected refresh"));
}

#[tokio::test]
async fn test_refresh_rejects_garbage() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/refresh")
        .json(&json!({ "refresh_token": "not.a.token" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"].is_string());
}

#[tokio::test]
async fn test_refresh_rejects_expired_refresh_token() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let account_id = register_body["data"]["account"]["id"].as_str().unwrap();

    // Same secret as the server, but the lifetime has already elapsed.
    let expired_issuer =
        TokenService::with_lifetimes(TOKEN_SECRET, Duration::minutes(-5), Duration::days(-1));
    let expired_refresh = expired_issuer
        .issue_refresh(account_id)
        .expect("Failed to issue token");

    let response = app
        .post("/api/auth/refresh")
        .json(&json!({ "refresh_token": expired_refresh }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn test_get_profile_success() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let access_token = register_body["data"]["access_token"].as_str().unwrap();

    let response = app
        .get_authenticated("/api/auth/profile", access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["id"], register_body["data"]["account"]["id"]);
    assert_eq!(body["data"]["username"], "nicola");
    assert_eq!(body["data"]["email"], "nicola@example.com");
    assert_eq!(body["data"]["auth_provider"], "local");
    assert_eq!(body["data"]["is_active"], true);
    assert_eq!(body["data"]["is_verified"], false);
    assert!(body["data"]["created_at"].is_string());
    // Registration alone is not a login.
    assert!(body["data"]["last_login_at"].is_null());
}

#[tokio::test]
async fn test_profile_requires_authorization_header() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/auth/profile")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"].is_string());
}

#[tokio::test]
async fn test_profile_rejects_malformed_header() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/auth/profile")
        .header("Authorization", "Token abc123")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_rejects_garbled_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get_authenticated("/api/auth/profile", "not.a.token")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"].as_str().unwrap().contains("invalid"));
}

#[tokio::test]
async fn test_profile_rejects_expired_token() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let account_id = register_body["data"]["account"]["id"].as_str().unwrap();

    let expired_issuer =
        TokenService::with_lifetimes(TOKEN_SECRET, Duration::minutes(-5), Duration::days(7));
    let expired_access = expired_issuer
        .issue_access(account_id)
        .expect("Failed to issue token");

    let response = app
        .get_authenticated("/api/auth/profile", &expired_access)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn test_profile_rejects_refresh_token_as_bearer() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let refresh_token = register_body["data"]["refresh_token"].as_str().unwrap();

    // Only access tokens authenticate API calls.
    let response = app
        .get_authenticated("/api/auth/profile", refresh_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("expected access"));
}

#[tokio::test]
async fn test_profile_rejects_token_for_unknown_account() {
    let app = TestApp::spawn().await;

    // Valid signature, but no account behind the subject.
    let token = app
        .token_service
        .issue_access(uuid::Uuid::new_v4())
        .expect("Failed to issue token");

    let response = app
        .get_authenticated("/api/auth/profile", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_rejects_token_for_deleted_account() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let access_token = register_body["data"]["access_token"].as_str().unwrap();
    let account_id = AccountId::from_string(register_body["data"]["account"]["id"].as_str().unwrap())
        .expect("Failed to parse account id");

    // The token outlives its account.
    app.repository.remove(&account_id);

    let response = app
        .get_authenticated("/api/auth/profile", access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_rejects_inactive_account() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let access_token = register_body["data"]["access_token"].as_str().unwrap();
    let account_id = AccountId::from_string(register_body["data"]["account"]["id"].as_str().unwrap())
        .expect("Failed to parse account id");

    app.repository.deactivate(&account_id);

    // The token is still valid, but the strict gateway rejects the account.
    let response = app
        .get_authenticated("/api/auth/profile", access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"].as_str().unwrap().contains("inactive"));
}

#[tokio::test]
async fn test_update_profile_success() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let access_token = register_body["data"]["access_token"].as_str().unwrap();

    let response = app
        .put_authenticated("/api/auth/profile", access_token)
        .json(&json!({
            "username": "renamed",
            "avatar_url": "https://avatars.example/nicola.png"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["username"], "renamed");
    assert_eq!(
        body["data"]["avatar_url"],
        "https://avatars.example/nicola.png"
    );

    // The change is visible on the next read.
    let profile_response = app
        .get_authenticated("/api/auth/profile", access_token)
        .send()
        .await
        .expect("Failed to execute request");

    let profile_body: serde_json::Value = profile_response
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(profile_body["data"]["username"], "renamed");
}

#[tokio::test]
async fn test_update_profile_partial_update() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let access_token = register_body["data"]["access_token"].as_str().unwrap();

    let response = app
        .put_authenticated("/api/auth/profile", access_token)
        .json(&json!({
            "avatar_url": "https://avatars.example/nicola.png"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["username"], "nicola");
    assert_eq!(
        body["data"]["avatar_url"],
        "https://avatars.example/nicola.png"
    );
}

#[tokio::test]
async fn test_update_profile_duplicate_username() {
    let app = TestApp::spawn().await;

    app.post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "other",
            "email": "other@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let access_token = register_body["data"]["access_token"].as_str().unwrap();

    let response = app
        .put_authenticated("/api/auth/profile", access_token)
        .json(&json!({ "username": "nicola" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_update_profile_invalid_username() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let access_token = register_body["data"]["access_token"].as_str().unwrap();

    let response = app
        .put_authenticated("/api/auth/profile", access_token)
        .json(&json!({ "username": "has spaces" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_logout_success() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let access_token = register_body["data"]["access_token"].as_str().unwrap();

    let response = app
        .post_authenticated("/api/auth/logout", access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("Logged out"));
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/logout")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_allows_inactive_account() {
    let app = TestApp::spawn().await;

    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let register_body: serde_json::Value = register_response
        .json()
        .await
        .expect("Failed to parse response");
    let access_token = register_body["data"]["access_token"].as_str().unwrap();
    let account_id = AccountId::from_string(register_body["data"]["account"]["id"].as_str().unwrap())
        .expect("Failed to parse account id");

    app.repository.deactivate(&account_id);

    // Discarding tokens must keep working after deactivation.
    let response = app
        .post_authenticated("/api/auth/logout", access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_full_session_workflow() {
    let app = TestApp::spawn().await;

    // 1. Register
    let register_response = app
        .post("/api/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(register_response.status(), StatusCode::OK);

    // 2. Login
    let login_response = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(login_response.status(), StatusCode::OK);

    let login_body: serde_json::Value = login_response
        .json()
        .await
        .expect("Failed to parse response");
    let access_token = login_body["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();
    let refresh_token = login_body["data"]["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    // 3. Access a protected endpoint
    let profile_response = app
        .get_authenticated("/api/auth/profile", &access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(profile_response.status(), StatusCode::OK);

    // 4. Update the profile
    let update_response = app
        .put_authenticated("/api/auth/profile", &access_token)
        .json(&json!({ "username": "renamed" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(update_response.status(), StatusCode::OK);

    // 5. Trade the refresh token for a new access token
    let refresh_response = app
        .post("/api/auth/refresh")
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(refresh_response.status(), StatusCode::OK);

    let refresh_body: serde_json::Value = refresh_response
        .json()
        .await
        .expect("Failed to parse response");
    let renewed_access = refresh_body["data"]["access_token"].as_str().unwrap();

    // 6. The renewed token sees the updated profile
    let renewed_profile_response = app
        .get_authenticated("/api/auth/profile", renewed_access)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(renewed_profile_response.status(), StatusCode::OK);

    let renewed_profile_body: serde_json::Value = renewed_profile_response
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(renewed_profile_body["data"]["username"], "renamed");

    // 7. Logout, then clients discard their tokens
    let logout_response = app
        .post_authenticated("/api/auth/logout", &access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(logout_response.status(), StatusCode::OK);

    // 8. A garbled token stays rejected
    let invalid_response = app
        .get_authenticated("/api/auth/profile", "invalid")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(invalid_response.status(), StatusCode::UNAUTHORIZED);
}
