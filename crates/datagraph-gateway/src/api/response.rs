//! JSON response envelope shared by every gateway route

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::data::errors::{ErrorDetail, GatewayError};

/// `{code, statusText, message, data}` envelope. `error` is only present on failures.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonEnvelope<T> {
    pub code: u16,
    pub status_text: String,
    pub message: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl<T: Serialize> JsonEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            status_text: String::new(),
            message: String::new(),
            data: Some(data),
            error: None,
        }
    }
}

impl<T: Serialize> IntoResponse for JsonEnvelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// API error: any gateway failure answered with a 500 envelope.
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(kind = self.0.kind(), "Graph request failed: {}", self.0);
        let detail: ErrorDetail = self.0.detail();
        let envelope: JsonEnvelope<()> = JsonEnvelope {
            code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            status_text: "error".to_string(),
            message: detail.message.clone(),
            data: None,
            error: serde_json::to_value(&detail).ok(),
        };
        envelope.into_response()
    }
}
