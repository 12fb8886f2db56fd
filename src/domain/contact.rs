use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::preferences::Preferences;

/// A subscriber record as stored by the audience provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub unsubscribed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: ContactData,
}

/// Free-form data bag attached to a contact. Only `preferences` is interpreted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactData {
    #[serde(default)]
    pub preferences: Preferences,
}

impl Contact {
    pub fn is_active(&self) -> bool {
        !self.unsubscribed
    }

    pub fn preferences(&self) -> &Preferences {
        &self.data.preferences
    }

    pub fn first_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or_default()
    }

    pub fn created_after(&self, instant: DateTime<Utc>) -> bool {
        self.created_at > instant
    }

    /// An unsubscribed contact whose last modification happened after `instant`.
    /// Contacts without an `updated_at` never count.
    pub fn unsubscribed_after(&self, instant: DateTime<Utc>) -> bool {
        self.unsubscribed && self.updated_at.map_or(false, |updated_at| updated_at > instant)
    }
}
