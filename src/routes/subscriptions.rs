use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{
    analytics::Analytics,
    audience_client::AudienceClient,
    domain::{
        new_subscriber::{NewSubscriber, NewSubscriberBody},
        subscriber_email::SubscriberEmail,
    },
    error::{bad_request, ServiceError},
    subscription::SubscriptionService,
};

#[derive(Deserialize)]
pub struct UnsubscribeBody {
    pub email: String,
}

#[derive(Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[tracing::instrument(
    name = "Subscribe handler",
    skip(body, subscriptions, analytics, audience),
    fields(
        subscriber_email = %body.email,
        subscriber_first_name = %body.first_name
    )
)]
pub async fn handle_subscribe(
    body: web::Json<NewSubscriberBody>,
    subscriptions: web::Data<SubscriptionService>,
    analytics: web::Data<Analytics>,
    audience: web::Data<AudienceClient>,
) -> Result<HttpResponse, ServiceError> {
    let new_subscriber: NewSubscriber = match body.try_into() {
        Ok(subscriber) => subscriber,
        Err(err) => {
            tracing::error!("Validation error: {:?}", err);
            return Ok(bad_request(err));
        }
    };

    let outcome = subscriptions.subscribe(&new_subscriber).await?;

    refresh_analytics(&analytics, &audience).await;

    Ok(HttpResponse::Ok().json(MessageBody {
        message: outcome.message(),
    }))
}

#[tracing::instrument(
    name = "Unsubscribe handler",
    skip(body, subscriptions, analytics, audience),
    fields(subscriber_email = %body.email)
)]
pub async fn handle_unsubscribe(
    body: web::Json<UnsubscribeBody>,
    subscriptions: web::Data<SubscriptionService>,
    analytics: web::Data<Analytics>,
    audience: web::Data<AudienceClient>,
) -> Result<HttpResponse, ServiceError> {
    let email = match SubscriberEmail::parse(body.into_inner().email) {
        Ok(email) => email,
        Err(err) => {
            tracing::error!("Validation error: {:?}", err);
            return Ok(bad_request(err));
        }
    };

    subscriptions.unsubscribe(&email).await?;

    refresh_analytics(&analytics, &audience).await;

    Ok(HttpResponse::Ok().json(MessageBody {
        message: "Unsubscribe successful! Confirmation email sent.",
    }))
}

/// The subscription change already happened, so a failed refresh is only logged.
async fn refresh_analytics(analytics: &Analytics, audience: &AudienceClient) {
    if let Err(err) = analytics.update(audience).await {
        tracing::error!("Failed to refresh analytics: {:?}", err);
    }
}
