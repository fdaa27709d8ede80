use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use crate::utils::MonitorError;

impl MonitorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MonitorError::InvalidAddress(_)
            | MonitorError::InvalidTxHash(_)
            | MonitorError::Validation(_) => StatusCode::BAD_REQUEST,
            MonitorError::NotFound(_) => StatusCode::NOT_FOUND,
            // the indexer credential is ours, not the caller's
            MonitorError::Unauthorized => StatusCode::BAD_GATEWAY,
            MonitorError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            MonitorError::Upstream { .. } | MonitorError::Http(_) => StatusCode::BAD_GATEWAY,
            MonitorError::BatchInProgress | MonitorError::AlreadyAlerted(_) => StatusCode::CONFLICT,
            MonitorError::ChainUnavailable(_) | MonitorError::RpcError(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        
        (status, body).into_response()
    }
}
