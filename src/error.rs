//! API error type and the request extractors that funnel every boundary
//! rejection into it.

use crate::store::StoreError;
use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use serde_path_to_error::Segment;
use thiserror::Error;
use tracing::error;

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const BASKET_ITEM_NOT_FOUND: &str = "Basket item not found";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed, missing or wrong-typed request input. Answered with 422.
    #[error("{message}")]
    Validation {
        loc: Vec<String>,
        kind: &'static str,
        message: String,
    },
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

type BodyPathError = serde_path_to_error::Error<serde_json::Error>;

/// The deserializer error behind a body rejection, carrying the path of
/// the offending field.
fn body_path_error(rejection: &JsonRejection) -> Option<&BodyPathError> {
    let mut source = std::error::Error::source(rejection);
    while let Some(err) = source {
        if let Some(found) = err.downcast_ref::<BodyPathError>() {
            return Some(found);
        }
        source = err.source();
    }
    None
}

/// `["body", <field>, ...]` for the field a body rejection points at.
///
/// serde reports a missing field against its parent object, so the field
/// name is taken from the message in that case.
fn body_location(err: &BodyPathError) -> (Vec<String>, bool) {
    let mut loc = vec!["body".to_string()];
    for segment in err.path().iter() {
        match segment {
            Segment::Map { key } => loc.push(key.clone()),
            Segment::Seq { index } => loc.push(index.to_string()),
            Segment::Enum { variant } => loc.push(variant.clone()),
            Segment::Unknown => {}
        }
    }

    let message = err.inner().to_string();
    let missing = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next());
    if let Some(field) = missing {
        loc.push(field.to_string());
    }
    (loc, missing.is_some())
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let (loc, missing) = match body_path_error(&rejection) {
            Some(err) => body_location(err),
            None => (vec!["body".to_string()], false),
        };
        let kind = match &rejection {
            _ if missing => "missing",
            JsonRejection::JsonDataError(_) => "value_error",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            _ => "body_error",
        };
        ApiError::Validation {
            loc,
            kind,
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        let kind = match &rejection {
            PathRejection::FailedToDeserializePathParams(_) => "int_parsing",
            _ => "path_error",
        };
        ApiError::Validation {
            loc: vec!["path".to_string()],
            kind,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { loc, kind, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "detail": [{ "type": kind, "loc": loc, "msg": message }]
                })),
            )
                .into_response(),
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": message }))).into_response()
            }
            ApiError::Store(err) => {
                error!(error = %err, "store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

/// `Json` body extractor whose rejections are [`ApiError::Validation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// `Path` extractor whose rejections are [`ApiError::Validation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ApiPath(value))
    }
}
