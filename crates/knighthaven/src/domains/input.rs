use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ServiceError;

/// JSON body extractor whose rejections (bad syntax, wrong field types, wrong
/// content type) answer 400 with the usual `{"error": ..}` payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ServiceError::validation(rejection.body_text())),
        }
    }
}

/// Form values that arrive as JSON numbers from API clients and as strings
/// from multipart forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexibleNumber {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FlexibleNumber {
    /// Whole numbers only; `"4"` and `4.0` qualify, `4.5` and `"four"` do not.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FlexibleNumber::Integer(value) => Some(*value),
            FlexibleNumber::Float(value) if value.fract() == 0.0 && value.is_finite() => {
                Some(*value as i64)
            }
            FlexibleNumber::Float(_) => None,
            FlexibleNumber::Text(raw) => raw.trim().parse::<i64>().ok(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, FlexibleNumber::Text(raw) if raw.trim().is_empty())
    }
}

impl From<&str> for FlexibleNumber {
    fn from(value: &str) -> Self {
        FlexibleNumber::Text(value.to_string())
    }
}
