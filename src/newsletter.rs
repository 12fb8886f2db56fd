use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::audience_client::AudienceClient;
use crate::config::ABTestConfig;
use crate::domain::contact::Contact;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::error::ServiceError;
use crate::templates::{render, TemplateContext, TemplateError, NEWSLETTER_TEMPLATE};

/// Outcome of one newsletter run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DispatchReport {
    pub sent: u64,
    pub failed: u64,
    /// Active contacts whose stored email is not a valid address.
    pub skipped: u64,
}

pub struct NewsletterDispatcher {
    audience: Arc<AudienceClient>,
    email_client: Arc<EmailClient>,
    ab_test: ABTestConfig,
    team_name: String,
}

impl NewsletterDispatcher {
    pub fn new(
        audience: Arc<AudienceClient>,
        email_client: Arc<EmailClient>,
        ab_test: ABTestConfig,
        team_name: String,
    ) -> Self {
        NewsletterDispatcher {
            audience,
            email_client,
            ab_test,
            team_name,
        }
    }

    /// Sends the newsletter to every active contact. A failure for one recipient is logged
    /// and never stops the others; only the initial listing can fail the run.
    #[tracing::instrument(name = "Sending the scheduled newsletter", skip(self))]
    pub async fn send_scheduled_newsletter(&self) -> Result<DispatchReport, ServiceError> {
        let contacts = self.audience.list_contacts().await?;
        let mut report = DispatchReport::default();

        for contact in contacts.iter().filter(|contact| contact.is_active()) {
            let recipient = match SubscriberEmail::parse(contact.email.clone()) {
                Ok(recipient) => recipient,
                Err(err) => {
                    tracing::warn!(
                        "Skipping contact {} because of an invalid email address: {}",
                        contact.id,
                        err
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            match self.send_to(contact, &recipient).await {
                Ok(()) => report.sent += 1,
                Err(err) => {
                    tracing::error!("Failed to send the newsletter to {}: {:?}", recipient, err);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Newsletter dispatched: sent {}, failed {}, skipped {}",
            report.sent,
            report.failed,
            report.skipped
        );

        Ok(report)
    }

    async fn send_to(&self, contact: &Contact, recipient: &SubscriberEmail) -> Result<(), anyhow::Error> {
        let subject = choose_subject(recipient.as_ref(), &self.ab_test);
        let html_body = render_newsletter(contact, subject, &self.team_name)?;

        self.email_client
            .send_email(recipient, subject, &html_body)
            .await?;

        Ok(())
    }
}

/// Picks the A/B subject for `email`. The choice only depends on the email, so a subscriber
/// keeps the same variant across runs.
pub fn choose_subject<'a>(email: &str, config: &'a ABTestConfig) -> &'a str {
    if variant_draw(email) < config.test_percentage {
        &config.subject_a
    } else {
        &config.subject_b
    }
}

/// Uniform value in [0, 1) seeded by the SHA-256 digest of `email`.
fn variant_draw(email: &str) -> f64 {
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&Sha256::digest(email.as_bytes()));

    StdRng::from_seed(seed).gen::<f64>()
}

/// Renders the body for `contact`: a greeting plus one block per followed catalog topic.
pub fn render_newsletter(
    contact: &Contact,
    subject: &str,
    team_name: &str,
) -> Result<String, TemplateError> {
    let topic_blocks: String = contact
        .preferences()
        .topics()
        .iter()
        .map(|topic| {
            format!(
                r#"<div class="topic topic-{}"><h2>{}</h2><p>{}</p></div>"#,
                topic.as_ref(),
                topic.title(),
                topic.summary()
            )
        })
        .collect();

    let context = TemplateContext::new()
        .insert_escaped("subject", subject)
        .insert_escaped("first_name", contact.first_name())
        .insert_raw("topic_blocks", topic_blocks)
        .insert_escaped("team_name", team_name);

    render(NEWSLETTER_TEMPLATE, &context)
}
