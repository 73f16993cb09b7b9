//! Mapping failures onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::AuthError;
use crate::authoring::PublishError;
use crate::source::FetchError;

pub enum ServerError {
    NotFound,
    BadRequest(String),
    Unauthorized(AuthError),
    Fetch(FetchError),
    Publish(PublishError),
}

impl From<FetchError> for ServerError {
    fn from(e: FetchError) -> Self {
        ServerError::Fetch(e)
    }
}

impl From<PublishError> for ServerError {
    fn from(e: PublishError) -> Self {
        ServerError::Publish(e)
    }
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ServerError::Publish(e) => match e {
                PublishError::Validation(_) => StatusCode::BAD_REQUEST,
                PublishError::Auth(_) => StatusCode::UNAUTHORIZED,
                PublishError::InFlight => StatusCode::CONFLICT,
                PublishError::Upload(_) | PublishError::Persist(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ServerError::NotFound => "post not found".to_string(),
            ServerError::BadRequest(message) => message.clone(),
            ServerError::Unauthorized(e) => e.to_string(),
            ServerError::Fetch(e) => e.to_string(),
            ServerError::Publish(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("{}", message);
        } else {
            tracing::debug!("{}: {}", status, message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
