use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};

/// Failures surfaced by operations that talk to the audience store.
#[derive(thiserror::Error)]
pub enum ServiceError {
    /// The upstream API answered with a non-success status.
    #[error("Upstream API responded with {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("{0} was not found in the subscriber list")]
    NotFound(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

#[derive(serde::Serialize)]
struct ErrorBody {
    detail: String,
}

impl std::fmt::Debug for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            ServiceError::Upstream { body, .. } => format!("Upstream request failed: {}", body),
            ServiceError::NotFound(_) => String::from("Email not found in the subscriber list"),
            ServiceError::Unexpected(_) => String::from("An unexpected error occurred"),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody { detail })
    }
}

/// Builds the JSON body used for request validation failures.
pub fn bad_request(detail: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorBody { detail })
}

/// Answers bodies that cannot be deserialized (missing fields, malformed JSON) with the
/// same shape as the other validation failures.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::error!("Invalid request body: {}", err);
    let response = bad_request(err.to_string());

    InternalError::from_response(err, response).into()
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
