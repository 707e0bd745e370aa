use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::server::utils::header_utils::cors_headers;

pub type AppResult<T> = Result<T, Error>;

/// every failure the edge can hand back to a browser. the message is what the client sees, so
/// keep it short
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    // relayed non-success, the upstream status is passed back as is
    #[error("Upstream returned {}", .0.as_u16())]
    Upstream(StatusCode),

    #[error("{0}")]
    InternalServerErrorWithContext(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(status) => *status,
            Self::InternalServerErrorWithContext(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        if self.status_code().is_server_error() {
            error!("responding with {}: {}", self.status_code(), self);
        }
    }
}

/// json rendering `{"error": "..."}`, used by the metadata endpoint
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.log();
        let body = json!({ "error": self.to_string() });
        (self.status_code(), cors_headers(), Json(body)).into_response()
    }
}

/// plain text rendering for the relay, players and devtools read these bodies directly
#[derive(Debug)]
pub struct PlainTextError(pub Error);

impl From<Error> for PlainTextError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for PlainTextError {
    fn into_response(self) -> Response {
        self.0.log();

        let mut headers: HeaderMap = cors_headers();
        headers.insert(
            header::CONTENT_TYPE,
            "text/plain; charset=utf-8"
                .parse()
                .expect("Static header value should parse"),
        );

        (self.0.status_code(), headers, self.0.to_string()).into_response()
    }
}
