//! Success envelope.
//!
//! Every successful response body is `{"success": true, "data": ..., "message"?: ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// JSON success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
            status: StatusCode::OK,
        }
    }

    /// 201 with the created resource
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn render<T: Serialize>(resp: ApiResponse<T>) -> (StatusCode, serde_json::Value) {
        let response = resp.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ok_envelope() {
        let (status, body) = render(ApiResponse::ok(json!({ "id": 1 }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "data": { "id": 1 } }));
    }

    #[tokio::test]
    async fn test_created_with_message() {
        let (status, body) =
            render(ApiResponse::created(json!([])).with_message("Project created")).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Project created");
        assert_eq!(body["data"], json!([]));
    }
}
