use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::audience_client::AudienceClient;
use crate::domain::contact::Contact;
use crate::error::ServiceError;

/// Subscriber counts computed from the latest full listing of the audience.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AnalyticsSnapshot {
    pub total_subscribers: u64,
    pub active_subscribers: u64,
    #[serde(rename = "unsubscribed")]
    pub unsubscribed_count: u64,
    pub new_subscribers: u64,
    pub new_unsubscribers: u64,
    pub last_update: Option<DateTime<Utc>>,
}

impl AnalyticsSnapshot {
    /// Counts `contacts` and measures the deltas against `previous_update`. Without a
    /// previous update every contact counts as new.
    pub fn compute(
        previous_update: Option<DateTime<Utc>>,
        contacts: &[Contact],
        now: DateTime<Utc>,
    ) -> AnalyticsSnapshot {
        let total_subscribers = contacts.len() as u64;
        let active_subscribers = contacts.iter().filter(|contact| contact.is_active()).count() as u64;
        let unsubscribed_count = total_subscribers - active_subscribers;

        let (new_subscribers, new_unsubscribers) = match previous_update {
            Some(previous_update) => (
                contacts
                    .iter()
                    .filter(|contact| contact.created_after(previous_update))
                    .count() as u64,
                contacts
                    .iter()
                    .filter(|contact| contact.unsubscribed_after(previous_update))
                    .count() as u64,
            ),
            None => (total_subscribers, unsubscribed_count),
        };

        AnalyticsSnapshot {
            total_subscribers,
            active_subscribers,
            unsubscribed_count,
            new_subscribers,
            new_unsubscribers,
            last_update: Some(now),
        }
    }
}

/// Process-wide owner of the analytics snapshot, shared with the request handlers and the
/// scheduler. Readers never wait on the upstream fetch.
#[derive(Default)]
pub struct Analytics {
    snapshot: RwLock<AnalyticsSnapshot>,
    update_lock: Mutex<()>,
}

impl Analytics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the snapshot from a full listing of the audience. On failure the
    /// previous snapshot is left untouched.
    #[tracing::instrument(name = "Updating subscription analytics", skip(self, audience))]
    pub async fn update(&self, audience: &AudienceClient) -> Result<AnalyticsSnapshot, ServiceError> {
        let _guard = self.update_lock.lock().await;
        // Stamped before fetching so contacts created during the fetch are counted next time.
        let now = Utc::now();
        let contacts = audience.list_contacts().await?;
        let previous_update = self.snapshot.read().await.last_update;

        let snapshot = AnalyticsSnapshot::compute(previous_update, &contacts, now);
        *self.snapshot.write().await = snapshot.clone();

        tracing::info!(
            "Analytics updated: Total: {}, Active: {}, Unsubscribed: {}, New: {}, New Unsubscribers: {}",
            snapshot.total_subscribers,
            snapshot.active_subscribers,
            snapshot.unsubscribed_count,
            snapshot.new_subscribers,
            snapshot.new_unsubscribers
        );

        Ok(snapshot)
    }

    pub async fn report(&self) -> AnalyticsSnapshot {
        self.snapshot.read().await.clone()
    }
}
