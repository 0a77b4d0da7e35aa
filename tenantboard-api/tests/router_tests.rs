//! Router tests that need no database
//!
//! The router runs over a pool pointed at a closed port, so every response
//! here is produced by routing, CORS, authentication or validation before a
//! query would be issued (or, for health, by the failed query itself).

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use common::{offline_app, send, token_for};
use tenantboard_shared::{auth::jwt::TokenType, models::user::UserRole};

#[tokio::test]
async fn test_health_reports_disconnected_database() {
    let app = offline_app(&[]);

    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["database"], "disconnected");
    assert!(body["message"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let app = offline_app(&[]);

    let (status, body) = send(&app, Method::GET, "/api/does-not-exist", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = offline_app(&[]);

    for (method, uri) in [
        (Method::GET, "/api/auth/me"),
        (Method::GET, "/api/tenants"),
        (Method::GET, "/api/tenants/users"),
        (Method::GET, "/api/projects"),
        (Method::POST, "/api/projects"),
        (Method::DELETE, "/api/projects/00000000-0000-0000-0000-000000000000"),
        (Method::PATCH, "/api/projects/tasks/00000000-0000-0000-0000-000000000000/status"),
    ] {
        let (status, body) = send(&app, method.clone(), uri, None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "unauthorized");
        assert_eq!(body["message"], "Authentication required");
    }
}

#[tokio::test]
async fn test_malformed_and_foreign_tokens_rejected() {
    let app = offline_app(&[]);

    let (status, body) = send(&app, Method::GET, "/api/projects", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let signed_elsewhere = tenantboard_shared::auth::jwt::create_token(
        &tenantboard_shared::auth::jwt::Claims::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UserRole::Admin,
            TokenType::Access,
        ),
        "a-completely-different-secret-of-32-chars",
    )
    .unwrap();
    let (status, _) = send(&app, Method::GET, "/api/projects", Some(signed_elsewhere.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_basic_scheme_rejected() {
    let app = offline_app(&[]);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/projects")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = offline_app(&[]);
    let refresh = token_for(Uuid::new_v4(), Uuid::new_v4(), UserRole::User, TokenType::Refresh);

    let (status, _) = send(&app, Method::GET, "/api/auth/me", Some(refresh.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_cannot_refresh() {
    let app = offline_app(&[]);
    let access = token_for(Uuid::new_v4(), Uuid::new_v4(), UserRole::User, TokenType::Access);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/refresh",
        None,
        Some(json!({ "refreshToken": access })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_login_validation_errors() {
    let app = offline_app(&[]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "nope", "password": "", "tenantSubdomain": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = offline_app(&[]);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"email\":"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_registration_rejects_weak_password_and_reserved_subdomain() {
    let app = offline_app(&[]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tenants",
        None,
        Some(json!({
            "tenantName": "Acme",
            "subdomain": "acme-weak",
            "adminEmail": "ada@acme.test",
            "adminPassword": "weak",
            "adminFullName": "Ada"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "adminPassword");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register-tenant",
        None,
        Some(json!({
            "tenantName": "Acme",
            "subdomain": "Admin",
            "adminEmail": "ada@acme.test",
            "adminPassword": "Str0ng!Pass",
            "adminFullName": "Ada"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "subdomain");
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/projects")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_cors_allowlist() {
    let app = offline_app(&[]);

    let response = app
        .clone()
        .oneshot(preflight("http://localhost:3000"))
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );

    let response = app.oneshot(preflight("https://evil.example")).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_dev_bypass_mirrors_origin() {
    let app = offline_app(&[("CORS_DEV_BYPASS", "true")]);

    let response = app
        .oneshot(preflight("http://10.0.0.7:8081"))
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://10.0.0.7:8081"
    );
}

#[tokio::test]
async fn test_security_headers_on_error_responses() {
    let app = offline_app(&[("APP_ENV", "production")]);

    let response = app
        .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("strict-transport-security").is_some());
}
