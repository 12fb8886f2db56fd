use actix_web::HttpResponse;

/// Liveness check. It never touches the audience or email providers.
#[tracing::instrument(name = "Health check")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
