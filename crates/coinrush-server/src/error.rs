//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`; the response body always
//! carries a machine-readable `kind` next to the human-readable message.
//! Malformed JSON is rejected 400 through [`ApiJson`] before any repository
//! access.

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coinrush_core::CoinrushError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Domain error carried to the HTTP layer
#[derive(Debug)]
pub struct ApiError(pub CoinrushError);

impl From<CoinrushError> for ApiError {
    fn from(err: CoinrushError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: &'a str,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoinrushError::Invalid { .. } => StatusCode::BAD_REQUEST,
            CoinrushError::NotFound { .. } => StatusCode::NOT_FOUND,
            CoinrushError::LimitExceeded { .. } => StatusCode::FORBIDDEN,
            CoinrushError::Conflict { .. } => StatusCode::CONFLICT,
            CoinrushError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            kind: self.0.kind(),
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// JSON extractor whose rejections use the service's 400 error shape
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(CoinrushError::invalid(rejection.body_text()))),
        }
    }
}
