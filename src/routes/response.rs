use actix_web::body::BoxBody;
use actix_web::http::{header::ContentType, StatusCode};
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError};
use serde::Serialize;

use crate::storage::StoreError;

/// Successful result of an endpoint, written as the JSON encoding of `T`.
#[derive(Debug)]
pub struct Envelope<T>(pub T);

#[derive(Serialize)]
struct ErrorBody {
    #[serde(rename = "Err")]
    err: String,
}

impl<T: Serialize> Responder for Envelope<T> {
    type Body = BoxBody;

    // The body is fully encoded before the response is built, so a failure can
    // still turn into a clean 500.
    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        match serde_json::to_vec(&self.0) {
            Ok(body) => HttpResponse::Ok()
                .content_type(ContentType::json())
                .body(body),
            Err(err) => ApiError::Serialization(err).error_response(),
        }
    }
}

#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Failed to serialize the response.")]
    Serialization(#[source] serde_json::Error),
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        if let ApiError::Serialization(err) = self {
            tracing::error!("Failed to serialize the response: {:?}", err);
            return HttpResponse::InternalServerError().finish();
        }

        HttpResponse::build(self.status_code()).json(ErrorBody {
            err: self.to_string(),
        })
    }
}
