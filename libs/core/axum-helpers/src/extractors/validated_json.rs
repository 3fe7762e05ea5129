//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Any body problem (missing content type, syntax error, wrong field types)
/// and any failed `Validate` rule is rejected with a 400 [`AppError`].
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CreateNotification {
///     #[validate(length(min = 1))]
///     r#type: String,
/// }
///
/// async fn create(ValidatedJson(payload): ValidatedJson<CreateNotification>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
