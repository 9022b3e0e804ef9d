//! Test utilities and common setup.

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use ittools::api;
use ittools::auth::{AuthConfig, CurrentUser, TokenCodec, session_filter};
use ittools::db::Database;

/// Secret shared by the test app and tokens minted directly in tests.
pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

/// Access token the fake GitHub hands out.
pub const FAKE_ACCESS_TOKEN: &str = "gho_fake_access_token";

/// Authorization code the fake GitHub rejects.
pub const REJECTED_CODE: &str = "bad-code";

/// Create a test AuthConfig with a JWT secret and a cheap bcrypt cost.
pub fn test_auth_config() -> AuthConfig {
    let mut config = AuthConfig::default();
    config.jwt_secret = Some(TEST_SECRET.to_string());
    config.bcrypt_cost = 4;
    config.github.client_id = "test-client".to_string();
    config.github.frontend_callback_url = "http://localhost:5173/auth/github/callback".to_string();
    config
}

/// A router plus the state behind it.
pub struct TestApp {
    pub router: Router,
    pub state: api::AppState,
    pub config: AuthConfig,
}

impl TestApp {
    /// Codec with the same secret and TTL as the app.
    pub fn codec(&self) -> TokenCodec {
        TokenCodec::new(TEST_SECRET, self.config.token_ttl_secs)
    }
}

/// Response status, headers and body (JSON if it parses, otherwise a string).
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Create a test application backed by an in-memory database.
pub async fn test_app() -> TestApp {
    test_app_with_config(test_auth_config()).await
}

/// Create a test application with a custom auth configuration.
pub async fn test_app_with_config(config: AuthConfig) -> TestApp {
    let db = Database::in_memory().await.unwrap();
    let state = api::AppState::new(&db, &config).unwrap();
    let router = api::create_router(state.clone());
    TestApp {
        router,
        state,
        config,
    }
}

/// Build a request with an optional bearer token and JSON body.
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request through the router.
pub async fn send(app: &TestApp, request: Request<Body>) -> TestResponse {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Run `token` through the session filter alone and return the security
/// context it binds, as `{subject, authorities}`.
pub async fn bound_context(app: &TestApp, token: &str) -> TestResponse {
    async fn whoami(user: CurrentUser) -> Json<Value> {
        let context = user.context();
        Json(json!({
            "subject": context.subject(),
            "authorities": context.authorities(),
        }))
    }

    let router = Router::new()
        .route("/whoami", get(whoami))
        .layer(axum::middleware::from_fn_with_state(
            app.state.auth.clone(),
            session_filter,
        ));

    let filtered = TestApp {
        router,
        state: app.state.clone(),
        config: app.config.clone(),
    };
    send(&filtered, request(Method::GET, "/whoami", Some(token), None)).await
}

/// Register a local user.
pub async fn register(
    app: &TestApp,
    username: &str,
    email: &str,
    password: &str,
    role: Option<&str>,
) -> TestResponse {
    let mut body = json!({
        "username": username,
        "email": email,
        "password": password,
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    send(app, request(Method::POST, "/auth/register", None, Some(body))).await
}

/// Log in a local user.
pub async fn login(app: &TestApp, username: &str, password: &str) -> TestResponse {
    send(
        app,
        request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": username, "password": password })),
        ),
    )
    .await
}

/// Register a user and return a fresh token for it.
pub async fn register_and_login(app: &TestApp, username: &str, role: Option<&str>) -> String {
    let email = format!("{}@example.com", username);
    let registered = register(app, username, &email, "pw123", role).await;
    assert_eq!(registered.status, StatusCode::CREATED);

    let response = login(app, username, "pw123").await;
    assert_eq!(response.status, StatusCode::OK);
    response.body["token"].as_str().unwrap().to_string()
}

/// Start a fake GitHub on an ephemeral port and return its base URL.
///
/// The token endpoint rejects [`REJECTED_CODE`]; the user endpoints require
/// [`FAKE_ACCESS_TOKEN`].
pub async fn spawn_fake_github(profile: Value, emails: Value) -> String {
    async fn access_token(Json(body): Json<Value>) -> Json<Value> {
        if body["code"] == REJECTED_CODE {
            Json(json!({ "error": "bad_verification_code" }))
        } else {
            Json(json!({ "access_token": FAKE_ACCESS_TOKEN, "token_type": "bearer" }))
        }
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            == Some(format!("Bearer {}", FAKE_ACCESS_TOKEN).as_str())
    }

    let app = Router::new()
        .route("/login/oauth/access_token", post(access_token))
        .route(
            "/user",
            get(move |headers: HeaderMap| {
                let profile = profile.clone();
                async move {
                    if authorized(&headers) {
                        Ok(Json(profile))
                    } else {
                        Err(StatusCode::UNAUTHORIZED)
                    }
                }
            }),
        )
        .route(
            "/user/emails",
            get(move |headers: HeaderMap| {
                let emails = emails.clone();
                async move {
                    if authorized(&headers) {
                        Ok(Json(emails))
                    } else {
                        Err(StatusCode::UNAUTHORIZED)
                    }
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Auth config whose GitHub endpoints point at a fake server.
pub fn github_config(base_url: &str) -> AuthConfig {
    let mut config = test_auth_config();
    config.github.token_url = format!("{}/login/oauth/access_token", base_url);
    config.github.profile_url = format!("{}/user", base_url);
    config.github.emails_url = format!("{}/user/emails", base_url);
    config
}

/// Pull the token out of a `...?token=...` redirect.
pub fn token_from_location(location: &str) -> String {
    let (_, encoded) = location.split_once("?token=").unwrap();
    urlencoding::decode(encoded).unwrap().into_owned()
}
