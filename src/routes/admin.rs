use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};

use crate::analytics::Analytics;
use crate::audience_client::AudienceClient;
use crate::authentication::{basic_authentication, validate_credentials};
use crate::config::AdminSettings;
use crate::error::{error_chain_fmt, ServiceError};

#[derive(serde::Serialize)]
pub struct AdminStats {
    pub total_subscribers: u64,
    pub active_subscribers: u64,
    pub unsubscribed: u64,
}

#[derive(thiserror::Error)]
pub enum AdminError {
    #[error("Authentication failed.")]
    AuthError(#[source] anyhow::Error),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl std::fmt::Debug for AdminError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for AdminError {
    fn status_code(&self) -> StatusCode {
        match self {
            AdminError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AdminError::Service(err) => err.status_code(),
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AdminError::AuthError(_) => HttpResponse::build(StatusCode::UNAUTHORIZED)
                .append_header((header::WWW_AUTHENTICATE, r#"Basic realm="admin""#))
                .finish(),
            AdminError::Service(err) => err.error_response(),
        }
    }
}

#[tracing::instrument(
    name = "Admin stats handler",
    skip(request, admin, analytics, audience),
    fields(username = tracing::field::Empty)
)]
pub async fn handle_admin_stats(
    request: HttpRequest,
    admin: web::Data<AdminSettings>,
    analytics: web::Data<Analytics>,
    audience: web::Data<AudienceClient>,
) -> Result<HttpResponse, AdminError> {
    let credentials = basic_authentication(request.headers()).map_err(AdminError::AuthError)?;
    tracing::Span::current().record("username", &tracing::field::display(&credentials.username));
    validate_credentials(&credentials, &admin).map_err(|err| AdminError::AuthError(err.into()))?;

    let snapshot = analytics.update(&audience).await?;

    Ok(HttpResponse::Ok().json(AdminStats {
        total_subscribers: snapshot.total_subscribers,
        active_subscribers: snapshot.active_subscribers,
        unsubscribed: snapshot.unsubscribed_count,
    }))
}
