//! Mapping engine failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Display, From};
use folio_library::error::{Error as LibraryError, ErrorKind};
use serde_json::json;

#[derive(Debug, Display, From)]
pub enum ApiError {
    /// Missing or unknown bearer token.
    #[display("authentication required")]
    #[from(skip)]
    Unauthorized,
    /// A query parameter the engine never gets to see was invalid.
    #[display("{_0}")]
    #[from(skip)]
    BadRequest(String),
    #[display("{_0}")]
    Library(LibraryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Library(err) => match &**err {
                ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::MalformedReference(_) | ErrorKind::TooLarge => StatusCode::BAD_REQUEST,
                ErrorKind::Persistence
                | ErrorKind::Cache
                | ErrorKind::Storage
                | ErrorKind::Render
                | ErrorKind::Notify => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }
        // Only the top-level kind goes to the client; the tree stays in the log.
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::EntityKind;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::PermissionDenied, StatusCode::FORBIDDEN)]
    #[case(ErrorKind::NotFound, StatusCode::NOT_FOUND)]
    #[case(ErrorKind::MalformedReference(EntityKind::Series), StatusCode::BAD_REQUEST)]
    #[case(ErrorKind::TooLarge, StatusCode::BAD_REQUEST)]
    #[case(ErrorKind::Persistence, StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(ErrorKind::Render, StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status(#[case] kind: ErrorKind, #[case] expected: StatusCode) {
        assert_eq!(ApiError::from(exn::Exn::from(kind)).status(), expected);
    }

    #[test]
    fn test_unauthorized() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }
}
