//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use roompoll_common::AppError;
use serde::Deserialize;

/// JSON body extractor whose rejections use the API error envelope.
#[derive(Debug, Clone)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Request body carrying an admin code next to the operation's own fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminInput<T> {
    pub admin_code: String,
    #[serde(flatten)]
    pub input: T,
}
