use actix_web::{web, HttpResponse};

use crate::domain::preferences::Preferences;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::error::{bad_request, ServiceError};
use crate::subscription::SubscriptionService;

#[derive(serde::Serialize)]
pub struct PreferencesBody {
    pub preferences: Preferences,
}

#[tracing::instrument(name = "Subscriber preferences handler", skip(email, subscriptions), fields(subscriber_email = %email))]
pub async fn handle_get_preferences(
    email: web::Path<String>,
    subscriptions: web::Data<SubscriptionService>,
) -> Result<HttpResponse, ServiceError> {
    let email = match SubscriberEmail::parse(email.into_inner()) {
        Ok(email) => email,
        Err(err) => return Ok(bad_request(err)),
    };

    let preferences = subscriptions.preferences(&email).await?;

    Ok(HttpResponse::Ok().json(PreferencesBody { preferences }))
}
