use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::header,
    response::{IntoResponse, Response},
};
use msgboard_api::Error as ApiError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    pub fn permission_denied() -> Error {
        Error::Api(ApiError::PermissionDenied)
    }

    fn into_api(self) -> ApiError {
        match self {
            Error::Anyhow(err) => {
                tracing::error!(?err, "internal server error");
                if cfg!(test) {
                    ApiError::Unknown(format!("Internal server error: {err:?}"))
                } else {
                    ApiError::Unknown(String::from("Internal server error, see logs for details"))
                }
            }
            Error::Api(err) => {
                tracing::info!("returning error to client: {err}");
                err
            }
        }
    }
}

// Malformed bodies and query strings still get the board's error envelope
impl From<JsonRejection> for Error {
    fn from(r: JsonRejection) -> Error {
        Error::Api(ApiError::InvalidRequest(r.body_text()))
    }
}

impl From<QueryRejection> for Error {
    fn from(r: QueryRejection) -> Error {
        Error::Api(ApiError::InvalidRequest(r.body_text()))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let err = self.into_api();
        (
            err.status_code(),
            [(header::CONTENT_TYPE, "application/json")],
            err.contents(),
        )
            .into_response()
    }
}
