//! API integration tests.

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use ittools::auth::TokenCodec;
use ittools::user::{CredentialStore, UserRole};

mod common;
use common::{bound_context, login, register, register_and_login, request, send, test_app};

/// Test that health endpoint works without authentication.
#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;

    let response = send(&app, request(Method::GET, "/health", None, None)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert!(response.body["version"].is_string());
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let app = test_app().await;

    let registered = register(&app, "bob", "bob@x.com", "pw123", Some("ROLE_USER")).await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.body, json!("User registered successfully"));

    let response = login(&app, "bob", "pw123").await;
    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["token"].as_str().unwrap();

    let claims = app.codec().verify(token).unwrap();
    assert_eq!(TokenCodec::extract_subject(&claims), "bob");
    assert_eq!(TokenCodec::extract_roles(&claims), ["ROLE_USER".to_string()]);

    let context = bound_context(&app, token).await;
    assert_eq!(context.status, StatusCode::OK);
    assert_eq!(
        context.body,
        json!({ "subject": "bob", "authorities": ["ROLE_USER"] })
    );

    let profile = send(&app, request(Method::GET, "/user/profile", Some(token), None)).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["username"], "bob");
    assert_eq!(profile.body["email"], "bob@x.com");
    assert_eq!(profile.body["role"], "USER");
    assert_eq!(profile.body["isPremium"], false);
    assert!(profile.body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = test_app().await;
    register(&app, "bob", "bob@x.com", "pw123", None).await;

    let wrong_password = login(&app, "bob", "nope").await;
    let unknown_user = login(&app, "nobody", "pw123").await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
    assert_eq!(wrong_password.body["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_register_duplicates_conflict() {
    let app = test_app().await;
    assert_eq!(
        register(&app, "bob", "bob@x.com", "pw123", None).await.status,
        StatusCode::CREATED
    );

    let same_name = register(&app, "bob", "other@x.com", "pw123", None).await;
    assert_eq!(same_name.status, StatusCode::CONFLICT);
    assert_eq!(same_name.body["error"], "Username already exists");

    let same_email = register(&app, "bobby", "bob@x.com", "pw123", None).await;
    assert_eq!(same_email.status, StatusCode::CONFLICT);
    assert_eq!(same_email.body["error"], "Email already registered");

    // The first registration is untouched.
    assert_eq!(login(&app, "bob", "pw123").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let app = test_app().await;

    let bad_role = register(&app, "bob", "bob@x.com", "pw123", Some("ROOT")).await;
    assert_eq!(bad_role.status, StatusCode::BAD_REQUEST);

    let bad_email = register(&app, "bob", "not-an-email", "pw123", None).await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let empty_password = register(&app, "bob", "bob@x.com", "", None).await;
    assert_eq!(empty_password.status, StatusCode::BAD_REQUEST);

    assert_eq!(
        login(&app, "bob", "pw123").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = test_app().await;

    let response = send(&app, request(Method::GET, "/user/profile", None, None)).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_token_is_treated_as_anonymous() {
    let app = test_app().await;

    // Public routes still work.
    let health = send(&app, request(Method::GET, "/health", Some("not.a.jwt"), None)).await;
    assert_eq!(health.status, StatusCode::OK);

    // Protected routes see no principal.
    let profile = send(
        &app,
        request(Method::GET, "/user/profile", Some("not.a.jwt"), None),
    )
    .await;
    assert_eq!(profile.status, StatusCode::UNAUTHORIZED);
    assert_eq!(profile.body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_anonymous() {
    let app = test_app().await;
    register(&app, "bob", "bob@x.com", "pw123", None).await;
    let user = app.state.users.find_by_username("bob").await.unwrap().unwrap();

    let forged = TokenCodec::new("some-other-secret-that-is-also-32-characters", 3600)
        .issue(&user)
        .unwrap();

    let profile = send(&app, request(Method::GET, "/user/profile", Some(&forged), None)).await;
    assert_eq!(profile.status, StatusCode::UNAUTHORIZED);
    assert_eq!(profile.body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = test_app().await;
    register(&app, "bob", "bob@x.com", "pw123", None).await;
    let user = app.state.users.find_by_username("bob").await.unwrap().unwrap();

    let issued_at = chrono::Utc::now().timestamp() - app.config.token_ttl_secs - 60;
    let expired = app.codec().issue_at(&user, issued_at).unwrap();

    let profile = send(&app, request(Method::GET, "/user/profile", Some(&expired), None)).await;
    assert_eq!(profile.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        profile.body,
        json!({ "error": "Token expired", "code": "TOKEN_EXPIRED" })
    );

    // Expiry is rejected even where no principal is needed...
    let health = send(&app, request(Method::GET, "/health", Some(&expired), None)).await;
    assert_eq!(health.body["code"], "TOKEN_EXPIRED");

    // ...but never on the login and register paths.
    let relogin = send(
        &app,
        request(
            Method::POST,
            "/auth/login",
            Some(&expired),
            Some(json!({ "username": "bob", "password": "pw123" })),
        ),
    )
    .await;
    assert_eq!(relogin.status, StatusCode::OK);
}

#[tokio::test]
async fn test_options_passes_through_with_expired_token() {
    let app = test_app().await;
    register(&app, "bob", "bob@x.com", "pw123", None).await;
    let user = app.state.users.find_by_username("bob").await.unwrap().unwrap();
    let expired = app.codec().issue_at(&user, 0).unwrap();

    let response = send(
        &app,
        request(Method::OPTIONS, "/api/tools", Some(&expired), None),
    )
    .await;

    assert_ne!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_concurrent_logins_issue_distinct_tokens() {
    let app = test_app().await;
    register(&app, "bob", "bob@x.com", "pw123", None).await;

    let (first, second) = tokio::join!(
        login(&app, "bob", "pw123"),
        login(&app, "bob", "pw123")
    );
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);

    let first = first.body["token"].as_str().unwrap().to_string();
    let second = second.body["token"].as_str().unwrap().to_string();
    assert_ne!(first, second);

    for token in [&first, &second] {
        let profile = send(&app, request(Method::GET, "/user/profile", Some(token), None)).await;
        assert_eq!(profile.status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_token_outlives_deleted_user() {
    let app = test_app().await;
    let token = register_and_login(&app, "bob", None).await;
    let user = app.state.users.find_by_username("bob").await.unwrap().unwrap();

    app.state.users.delete(&user.id).await.unwrap();

    // Still authenticates; the lookup behind it fails.
    assert!(app.codec().verify(&token).is_ok());
    let profile = send(&app, request(Method::GET, "/user/profile", Some(&token), None)).await;
    assert_eq!(profile.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upgrade_to_premium() {
    let app = test_app().await;
    let token = register_and_login(&app, "bob", None).await;

    let response = send(
        &app,
        request(Method::PUT, "/user/upgrade-to-premium", Some(&token), None),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["isPremium"], true);
}

#[tokio::test]
async fn test_tool_management_requires_admin() {
    let app = test_app().await;
    let user_token = register_and_login(&app, "bob", None).await;
    let admin_token = register_and_login(&app, "alice", Some("ADMIN")).await;

    let new_tool = json!({ "name": "IBAN Parser", "category": "Parsers", "path": "/tools/iban" });

    let forbidden = send(
        &app,
        request(Method::POST, "/api/tools", Some(&user_token), Some(new_tool.clone())),
    )
    .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.body["code"], "FORBIDDEN");

    let anonymous = send(
        &app,
        request(Method::POST, "/api/tools", None, Some(new_tool.clone())),
    )
    .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let created = send(
        &app,
        request(Method::POST, "/api/tools", Some(&admin_token), Some(new_tool)),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let tool_id = created.body["toolId"].as_str().unwrap().to_string();
    assert_eq!(created.body["enabled"], true);

    let listed = send(&app, request(Method::GET, "/api/tools", Some(&user_token), None)).await;
    assert_eq!(listed.status, StatusCode::OK);
    let names: Vec<&str> = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(names, ["IBAN Parser"]);

    let toggled = send(
        &app,
        request(
            Method::POST,
            &format!("/api/tools/{}/toggle?enabled=false&premium=true", tool_id),
            Some(&admin_token),
            None,
        ),
    )
    .await;
    assert_eq!(toggled.status, StatusCode::OK);
    assert_eq!(toggled.body["enabled"], false);
    assert_eq!(toggled.body["premium"], true);

    let user_delete = send(
        &app,
        request(Method::DELETE, &format!("/api/tools/{}", tool_id), Some(&user_token), None),
    )
    .await;
    assert_eq!(user_delete.status, StatusCode::FORBIDDEN);

    let deleted = send(
        &app,
        request(Method::DELETE, &format!("/api/tools/{}", tool_id), Some(&admin_token), None),
    )
    .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let missing = send(
        &app,
        request(Method::DELETE, &format!("/api/tools/{}", tool_id), Some(&admin_token), None),
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_registration_carries_admin_authority() {
    let app = test_app().await;
    let token = register_and_login(&app, "alice", Some("ROLE_ADMIN")).await;

    let context = bound_context(&app, &token).await;
    assert_eq!(context.body["authorities"], json!(["ROLE_ADMIN"]));

    let claims = app.codec().verify(&token).unwrap();
    assert_eq!(TokenCodec::extract_roles(&claims), ["ROLE_ADMIN".to_string()]);

    let user = app.state.users.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(user.role, UserRole::Admin);
}

#[tokio::test]
async fn test_favorites_flow() {
    let app = test_app().await;
    let token = register_and_login(&app, "bob", None).await;

    let empty = send(&app, request(Method::GET, "/api/favorites", Some(&token), None)).await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.body, json!([]));

    let missing_name = send(
        &app,
        request(Method::POST, "/api/favorites", Some(&token), Some(json!({}))),
    )
    .await;
    assert_eq!(missing_name.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_name.body["error"], "Tool name is required");

    let added = send(
        &app,
        request(
            Method::POST,
            "/api/favorites",
            Some(&token),
            Some(json!({ "toolName": "Phone Parser" })),
        ),
    )
    .await;
    assert_eq!(added.status, StatusCode::CREATED);
    assert_eq!(added.body["toolName"], "Phone Parser");

    // Adding twice is harmless.
    send(
        &app,
        request(
            Method::POST,
            "/api/favorites",
            Some(&token),
            Some(json!({ "toolName": "Phone Parser" })),
        ),
    )
    .await;

    let listed = send(&app, request(Method::GET, "/api/favorites", Some(&token), None)).await;
    assert_eq!(listed.body, json!(["Phone Parser"]));

    let removed = send(
        &app,
        request(
            Method::DELETE,
            "/api/favorites/Phone%20Parser",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["message"], "Tool removed from favorites");

    let again = send(
        &app,
        request(
            Method::DELETE,
            "/api/favorites/Phone%20Parser",
            Some(&token),
            None,
        ),
    )
    .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorites_are_per_user() {
    let app = test_app().await;
    let bob = register_and_login(&app, "bob", None).await;
    let carol = register_and_login(&app, "carol", None).await;

    send(
        &app,
        request(
            Method::POST,
            "/api/favorites",
            Some(&bob),
            Some(json!({ "toolName": "IBAN Parser" })),
        ),
    )
    .await;

    let carols = send(&app, request(Method::GET, "/api/favorites", Some(&carol), None)).await;
    assert_eq!(carols.body, Value::Array(vec![]));
}
