use actix_web::{web, HttpResponse};

use crate::analytics::Analytics;
use crate::audience_client::AudienceClient;
use crate::error::ServiceError;

/// Refreshes the counts before answering, so the report is never older than the request.
#[tracing::instrument(name = "Analytics report handler", skip(analytics, audience))]
pub async fn handle_get_analytics(
    analytics: web::Data<Analytics>,
    audience: web::Data<AudienceClient>,
) -> Result<HttpResponse, ServiceError> {
    analytics.update(&audience).await?;

    Ok(HttpResponse::Ok().json(analytics.report().await))
}
