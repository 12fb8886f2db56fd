use anyhow::Context;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use std::time;
use uuid::Uuid;

use crate::domain::contact::Contact;
use crate::domain::preferences::Preferences;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::error::ServiceError;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);

/// Client of the provider audience API. Every call is a single attempt.
pub struct AudienceClient {
    http_client: Client,
    base_url: String,
    audience_id: String,
    api_key: Secret<String>,
}

#[derive(serde::Serialize)]
pub struct NewContactBody<'a> {
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    unsubscribed: bool,
    data: ContactDataBody<'a>,
}

/// Partial update of a contact. `None` fields are left untouched upstream.
#[derive(serde::Serialize, Default)]
pub struct ContactChanges<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unsubscribed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<ContactDataBody<'a>>,
}

#[derive(serde::Serialize)]
struct ContactDataBody<'a> {
    preferences: &'a Preferences,
}

#[derive(serde::Deserialize)]
struct ContactList {
    #[serde(default)]
    data: Vec<Contact>,
}

#[derive(serde::Deserialize)]
struct ContactReference {
    id: Uuid,
}

impl<'a> NewContactBody<'a> {
    pub fn new(
        email: &'a SubscriberEmail,
        first_name: &'a str,
        last_name: &'a str,
        preferences: &'a Preferences,
    ) -> Self {
        NewContactBody {
            email: email.as_ref(),
            first_name,
            last_name,
            unsubscribed: false,
            data: ContactDataBody { preferences },
        }
    }
}

impl<'a> ContactChanges<'a> {
    /// Overwrites the profile of a returning subscriber and re-activates it.
    pub fn resubscribe(first_name: &'a str, last_name: &'a str, preferences: &'a Preferences) -> Self {
        ContactChanges {
            first_name: Some(first_name),
            last_name: Some(last_name),
            unsubscribed: Some(false),
            data: Some(ContactDataBody { preferences }),
        }
    }

    pub fn unsubscribe() -> Self {
        ContactChanges {
            unsubscribed: Some(true),
            ..Default::default()
        }
    }
}

impl AudienceClient {
    pub fn new(
        base_url: String,
        audience_id: String,
        api_key: Secret<String>,
        timeout: Option<time::Duration>,
    ) -> Result<AudienceClient, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()?;

        Ok(AudienceClient {
            http_client,
            base_url,
            audience_id,
            api_key,
        })
    }

    fn contacts_url(&self) -> String {
        format!("{}/audiences/{}/contacts", self.base_url, self.audience_id)
    }

    fn contact_url(&self, contact_id: &Uuid) -> String {
        format!("{}/{}", self.contacts_url(), contact_id)
    }

    #[tracing::instrument(name = "Listing all contacts of the audience", skip(self))]
    pub async fn list_contacts(&self) -> Result<Vec<Contact>, ServiceError> {
        let request = self.http_client.get(self.contacts_url());
        let contacts: ContactList = self.execute(request).await?;

        tracing::info!("Successfully fetched {} contacts", contacts.data.len());

        Ok(contacts.data)
    }

    /// Returns the first contact whose email is exactly `email`.
    #[tracing::instrument(
        name = "Looking up a contact by email",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn find_contact_by_email(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Contact>, ServiceError> {
        let request = self
            .http_client
            .get(self.contacts_url())
            .query(&[("email", email.as_ref())]);
        let contacts: ContactList = self.execute(request).await?;

        Ok(contacts
            .data
            .into_iter()
            .find(|contact| contact.email == email.as_ref()))
    }

    #[tracing::instrument(name = "Fetching a contact", skip(self))]
    pub async fn get_contact(&self, contact_id: &Uuid) -> Result<Contact, ServiceError> {
        let request = self.http_client.get(self.contact_url(contact_id));

        self.execute(request).await
    }

    #[tracing::instrument(name = "Creating a contact", skip(self, body))]
    pub async fn create_contact(&self, body: &NewContactBody<'_>) -> Result<Uuid, ServiceError> {
        let request = self.http_client.post(self.contacts_url()).json(body);
        let created: ContactReference = self.execute(request).await?;

        Ok(created.id)
    }

    #[tracing::instrument(name = "Updating a contact", skip(self, changes))]
    pub async fn update_contact(
        &self,
        contact_id: &Uuid,
        changes: &ContactChanges<'_>,
    ) -> Result<Uuid, ServiceError> {
        let request = self.http_client.patch(self.contact_url(contact_id)).json(changes);
        let updated: ContactReference = self.execute(request).await?;

        Ok(updated.id)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = request
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .context("Failed to reach the audience API")?;

        let response = check_status(response).await?;

        response
            .json::<T>()
            .await
            .context("Failed to decode the audience API response")
            .map_err(ServiceError::from)
    }
}

async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    tracing::error!("Audience API responded with {}: {}", status.as_u16(), body);

    Err(ServiceError::Upstream {
        status: status.as_u16(),
        body,
    })
}
