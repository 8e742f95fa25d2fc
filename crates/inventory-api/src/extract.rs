//! Request extractors that answer malformed input with the API's own error body

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

pub(crate) const INVALID_BODY_MESSAGE: &str = "Datos inválidos.";
pub(crate) const INVALID_ID_MESSAGE: &str = "Identificador inválido.";

/// JSON body extractor
///
/// A body that is missing, not JSON, or of the wrong shape becomes a 400
/// `{"message"}` response. The decoder's detail is only logged.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            debug!("Rejected request body ({}): {}", e.status(), e.body_text());
            ApiError::bad_request(INVALID_BODY_MESSAGE)
        })?;

        Ok(ApiJson(value))
    }
}

/// Path parameter extractor with the same error contract as [`ApiJson`]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                debug!("Rejected path parameters: {}", e.body_text());
                ApiError::bad_request(INVALID_ID_MESSAGE)
            })?;

        Ok(ApiPath(value))
    }
}
