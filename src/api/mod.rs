use crate::core::error::ArenaError;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use log::error;
use serde_json::json;
use std::convert::Infallible;
use std::str::FromStr;
use uuid::Uuid;

pub mod channel;
pub mod chats;
pub mod reference;

pub const SESSION_COOKIE: &str = "session_id";

pub fn router() -> Router {
    Router::new()
        .merge(chats::router())
        .merge(reference::router())
}

/// The raw `session_id` cookie, if the client sent one. Its value is opaque.
#[derive(Debug)]
pub struct ExtractSession(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        let session = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            // a header that is not valid UTF-8 cannot carry a readable session
            .filter_map(|cookies| cookies.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.trim().to_owned());

        Ok(ExtractSession(session))
    }
}

/// Parses an id taken from the path. Anything that is not a UUID cannot name an entity.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ArenaError> {
    Uuid::from_str(raw).map_err(|_| ArenaError::not_found(format!("{what} not found")))
}

impl IntoResponse for ArenaError {
    fn into_response(self) -> Response {
        let status = match &self {
            ArenaError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ArenaError::NotFound(_) => StatusCode::NOT_FOUND,
            ArenaError::Conflict(_) => StatusCode::CONFLICT,
            ArenaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            ArenaError::Internal(detail) => {
                error!("internal error: {detail}");
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message, "code": self.code() }))).into_response()
    }
}
