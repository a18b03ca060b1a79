use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use localshop_core::{CoreError, ErrorKind};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Core(CoreError),
    Anyhow(anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Core(err) => match err.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Ownership => StatusCode::FORBIDDEN,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InsufficientStock | ErrorKind::InvalidStateTransition => StatusCode::CONFLICT,
                ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            match &self {
                AppError::Core(err) => tracing::error!("Internal Server Error: {}", err),
                AppError::Anyhow(err) => tracing::error!("Internal Server Error: {}", err),
            }
            "Internal Server Error".to_string()
        } else {
            match self {
                AppError::Core(err) => err.to_string(),
                AppError::Anyhow(err) => err.to_string(),
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        match err.into().downcast::<CoreError>() {
            Ok(core) => Self::Core(core),
            Err(other) => Self::Anyhow(other),
        }
    }
}
