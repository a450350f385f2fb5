use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use askama::Template;
use thiserror::Error;

use crate::backend::ApiError;

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    message: &'a str,
}

/// Failures a handler cannot turn into a toast.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to render template: {0}")]
    Template(#[from] askama::Error),

    #[error("failed to sign session token: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Backend(#[from] ApiError),

    #[error("malformed form data: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::Template(_) | AppError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{}", self);
        }

        let body = match status {
            StatusCode::NOT_FOUND => "Page not found".to_string(),
            StatusCode::BAD_REQUEST => self.to_string(),
            _ => "Something went wrong".to_string(),
        };
        match (ErrorTemplate { message: &body }).render() {
            Ok(page) => (status, Html(page)).into_response(),
            Err(e) => {
                log::error!("failed to render error page: {}", e);
                (status, body).into_response()
            }
        }
    }
}
