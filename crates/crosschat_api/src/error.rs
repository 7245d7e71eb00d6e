use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::sources::SourceError;
use crate::storage::StoreError;

/// Every way a handler can fail, mapped onto an HTTP status
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Solve(#[from] crosschat_crossword::Error),

    #[error("{0}")]
    Decode(#[from] crosschat_puz::read::Error),

    #[error("{0}")]
    Storage(#[from] StoreError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("no puzzle has been selected for this channel")]
    NoState,

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        use crosschat_crossword::Error as Solve;

        match self {
            // The decode and grammar layers only ever reject bad input
            ApiError::Decode(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,

            ApiError::Solve(Solve::StateConflict { .. }) => StatusCode::CONFLICT,
            ApiError::Solve(_) => StatusCode::BAD_REQUEST,

            ApiError::NoState => StatusCode::NOT_FOUND,

            ApiError::Storage(_) | ApiError::Source(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        } else {
            tracing::debug!(%status, error = %message, "request rejected");
        }

        (status, message).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Storage(StoreError::Codec(err))
    }
}

pub type Result<T> = core::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use crosschat_crossword::Status;

    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        use crosschat_crossword::Error as Solve;

        let conflict = ApiError::Solve(Solve::StateConflict {
            status: Status::Complete,
        });
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let bad_clue = ApiError::Solve(Solve::BadClue {
            clue: "x".to_string(),
        });
        assert_eq!(bad_clue.status(), StatusCode::BAD_REQUEST);

        assert_eq!(ApiError::NoState.status(), StatusCode::NOT_FOUND);

        let storage = ApiError::Storage(StoreError::Backend("down".into()));
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
