use std::sync::Arc;

use crate::config::WelcomeEmailSettings;
use crate::domain::new_subscriber::NewSubscriber;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::error::error_chain_fmt;
use crate::templates::{render, TemplateContext, TemplateError, WELCOME_EMAIL_TEMPLATE};

const UNSUBSCRIBE_SUBJECT: &str = "Unsubscribe Confirmation";
const UNSUBSCRIBE_BODY: &str = r#"
    <h1>Unsubscribe Confirmation</h1>
    <p>You have been successfully unsubscribed from our newsletter. We're sorry to see you go!</p>
"#;

#[derive(thiserror::Error)]
pub enum NotificationError {
    #[error("Failed to render the email body.")]
    Render(#[from] TemplateError),
    #[error("Failed to send the email.")]
    Send(#[from] reqwest::Error),
}

impl std::fmt::Debug for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Transactional emails sent on subscription changes. Callers decide what a failure means.
pub struct Notifier {
    email_client: Arc<EmailClient>,
    welcome_email: WelcomeEmailSettings,
}

impl Notifier {
    pub fn new(email_client: Arc<EmailClient>, welcome_email: WelcomeEmailSettings) -> Self {
        Notifier {
            email_client,
            welcome_email,
        }
    }

    #[tracing::instrument(
        name = "Send a welcome email to a subscriber",
        skip(self, new_subscriber),
        fields(subscriber_email = %new_subscriber.email)
    )]
    pub async fn send_welcome_email(
        &self,
        new_subscriber: &NewSubscriber,
    ) -> Result<(), NotificationError> {
        let html_body = self.render_welcome_email(new_subscriber)?;

        self.email_client
            .send_email(&new_subscriber.email, &self.welcome_email.subject, &html_body)
            .await?;

        tracing::info!("Welcome email sent successfully");

        Ok(())
    }

    #[tracing::instrument(
        name = "Send an unsubscribe confirmation email",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn send_unsubscribe_confirmation(
        &self,
        email: &SubscriberEmail,
    ) -> Result<(), NotificationError> {
        self.email_client
            .send_email(email, UNSUBSCRIBE_SUBJECT, UNSUBSCRIBE_BODY)
            .await?;

        tracing::info!("Unsubscribe confirmation email sent successfully");

        Ok(())
    }

    pub fn render_welcome_email(
        &self,
        new_subscriber: &NewSubscriber,
    ) -> Result<String, TemplateError> {
        let settings = &self.welcome_email;
        let first_name = new_subscriber.first_name.as_ref();
        let main_heading = render(
            &settings.main_heading,
            &TemplateContext::new().insert_escaped("first_name", first_name),
        )?;
        let expectations: String = settings
            .expectations
            .iter()
            .map(|item| format!("<li>{}</li>", htmlescape::encode_minimal(item.trim())))
            .collect();

        let context = TemplateContext::new()
            .insert_escaped("email_subject", &settings.subject)
            .insert_raw("header_color", settings.header_color.as_str())
            .insert_raw("logo_url", settings.logo_url.as_str())
            .insert_raw("main_heading", main_heading)
            .insert_escaped("first_name", first_name)
            .insert_escaped("last_name", new_subscriber.last_name.as_ref())
            .insert_raw("welcome_message", settings.welcome_message.as_str())
            .insert_raw("expectations", expectations)
            .insert_raw("closing_message", settings.closing_message.as_str())
            .insert_raw("team_name", settings.team_name.as_str());

        render(WELCOME_EMAIL_TEMPLATE, &context)
    }
}
