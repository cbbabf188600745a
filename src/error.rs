//! Application errors and their HTML rendering.
//!
//! Every error reaching a handler boundary is logged with the request id and turned
//! into a generic error page. Database and template details stay in the logs.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::io;

use crate::middleware::RequestId;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Template rendering error: {0}")]
    Template(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code and the message shown to the client.
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Store(e) if e.is_unavailable() => {
                (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        }
    }
}

/// An [`AppError`] tagged with the id of the request that produced it.
#[derive(Debug)]
pub struct AppErrorResponse {
    pub error: AppError,
    pub request_id: Option<RequestId>,
}

impl From<AppError> for AppErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error,
            request_id: None,
        }
    }
}

/// Attaches a request id to any error convertible into [`AppError`].
pub trait ResultExt<T> {
    fn with_request_id(self, request_id: &RequestId) -> Result<T, AppErrorResponse>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn with_request_id(self, request_id: &RequestId) -> Result<T, AppErrorResponse> {
        self.map_err(|e| AppErrorResponse {
            error: e.into(),
            request_id: Some(request_id.clone()),
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        AppErrorResponse::from(self).into_response()
    }
}

impl IntoResponse for AppErrorResponse {
    fn into_response(self) -> Response {
        let (status, message) = self.error.status_and_message();
        let request_id = self
            .request_id
            .as_ref()
            .map(|id| id.0.to_string())
            .unwrap_or_default();

        tracing::error!(
            request_id = %request_id,
            status = status.as_u16(),
            error = %self.error,
            "Request failed"
        );

        let reference = if request_id.is_empty() {
            String::new()
        } else {
            format!("<p class=\"request-id\">Request ID: {}</p>", request_id)
        };

        let body = format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>Error {}</title>
    <link rel="stylesheet" href="/static/css/style.css">
</head>
<body>
    <div class="container">
        <div class="error-page">
            <h1>Error {}</h1>
            <p>{}</p>
            {}
            <a href="/">Return to recipes</a>
        </div>
    </div>
</body>
</html>"#,
            status.as_u16(),
            status.as_u16(),
            message,
            reference
        );

        (status, Html(body)).into_response()
    }
}
