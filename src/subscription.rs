use std::sync::Arc;

use crate::audience_client::{AudienceClient, ContactChanges, NewContactBody};
use crate::domain::new_subscriber::NewSubscriber;
use crate::domain::preferences::Preferences;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscription_outcome::SubscriptionOutcome;
use crate::error::ServiceError;
use crate::notifications::Notifier;

/// Keeps the audience store in line with subscribe and unsubscribe requests. Contacts are
/// identified by email only.
pub struct SubscriptionService {
    audience: Arc<AudienceClient>,
    notifier: Notifier,
}

impl SubscriptionService {
    pub fn new(audience: Arc<AudienceClient>, notifier: Notifier) -> Self {
        SubscriptionService { audience, notifier }
    }

    /// Upserts the contact by email and re-activates it. The welcome email is best-effort:
    /// its failure is logged and never changes the outcome.
    #[tracing::instrument(
        name = "Subscribing a contact",
        skip(self, new_subscriber),
        fields(subscriber_email = %new_subscriber.email)
    )]
    pub async fn subscribe(
        &self,
        new_subscriber: &NewSubscriber,
    ) -> Result<SubscriptionOutcome, ServiceError> {
        let first_name = new_subscriber.first_name.as_ref();
        let last_name = new_subscriber.last_name.as_ref();
        let existing_contact = self
            .audience
            .find_contact_by_email(&new_subscriber.email)
            .await?;

        let outcome = match existing_contact {
            Some(contact) => {
                tracing::info!("Updating existing subscriber {}", contact.id);
                let changes =
                    ContactChanges::resubscribe(first_name, last_name, &new_subscriber.preferences);
                self.audience.update_contact(&contact.id, &changes).await?;

                SubscriptionOutcome::Updated
            }
            None => {
                tracing::info!("Adding a new subscriber");
                let body = NewContactBody::new(
                    &new_subscriber.email,
                    first_name,
                    last_name,
                    &new_subscriber.preferences,
                );
                let contact_id = self.audience.create_contact(&body).await?;
                tracing::info!("Created contact {}", contact_id);

                SubscriptionOutcome::Created
            }
        };

        if let Err(err) = self.notifier.send_welcome_email(new_subscriber).await {
            tracing::error!("Failed to send a welcome email: {:?}", err);
        }

        Ok(outcome)
    }

    /// Flags the contact as unsubscribed and sends a best-effort confirmation.
    #[tracing::instrument(name = "Unsubscribing a contact", skip(self, email), fields(subscriber_email = %email))]
    pub async fn unsubscribe(&self, email: &SubscriberEmail) -> Result<(), ServiceError> {
        let contact = match self.audience.find_contact_by_email(email).await? {
            Some(contact) => contact,
            None => {
                tracing::warn!("Email not found in the subscriber list");
                return Err(ServiceError::NotFound(email.to_string()));
            }
        };

        tracing::info!(
            "Contact {} before unsubscribe: unsubscribed = {}",
            contact.id,
            contact.unsubscribed
        );

        self.audience
            .update_contact(&contact.id, &ContactChanges::unsubscribe())
            .await?;

        match self.audience.get_contact(&contact.id).await {
            Ok(updated) => tracing::info!(
                "Contact {} after unsubscribe: unsubscribed = {}",
                updated.id,
                updated.unsubscribed
            ),
            Err(err) => tracing::warn!("Failed to read back the unsubscribed contact: {:?}", err),
        }

        if let Err(err) = self.notifier.send_unsubscribe_confirmation(email).await {
            tracing::error!("Failed to send an unsubscribe confirmation email: {:?}", err);
        }

        Ok(())
    }

    #[tracing::instrument(name = "Fetching subscriber preferences", skip(self, email), fields(subscriber_email = %email))]
    pub async fn preferences(&self, email: &SubscriberEmail) -> Result<Preferences, ServiceError> {
        self.audience
            .find_contact_by_email(email)
            .await?
            .map(|contact| contact.data.preferences)
            .ok_or_else(|| ServiceError::NotFound(email.to_string()))
    }
}
