//! Serves the router on a real socket and talks to it over HTTP
//!
//! The database is unreachable, which is exactly what the health endpoint
//! should report.

mod common;

use std::net::SocketAddr;

use reqwest::{header, StatusCode};
use serde_json::Value;

async fn spawn_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = common::offline_app(&[]);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

#[tokio::test]
async fn test_server_answers_over_http() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{}/api/health", addr))
        .header(header::ORIGIN, "http://localhost:3000")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["database"], "disconnected");

    let response = client
        .post(format!("http://{}/api/v2/anything", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route not found");
}
