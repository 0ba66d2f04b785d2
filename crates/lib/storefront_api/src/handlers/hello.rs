//! Root endpoint.

use axum::Json;

use crate::models::MessageResponse;

/// `GET /`: liveness greeting.
pub async fn hello_world() -> Json<MessageResponse> {
    Json(MessageResponse::new("Hello World"))
}
