use actix_web::web;
use serde::Deserialize;

use crate::domain::preferences::Preferences;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_name::SubscriberName;

#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub first_name: SubscriberName,
    pub last_name: SubscriberName,
    pub preferences: Preferences,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscriberBody {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub preferences: Vec<String>,
}

impl TryFrom<web::Json<NewSubscriberBody>> for NewSubscriber {
    type Error = String;

    fn try_from(body: web::Json<NewSubscriberBody>) -> Result<Self, Self::Error> {
        let body = body.into_inner();
        let email = SubscriberEmail::parse(body.email)?;
        let first_name = SubscriberName::parse(body.first_name)?;
        let last_name = SubscriberName::parse(body.last_name)?;

        Ok(NewSubscriber {
            email,
            first_name,
            last_name,
            preferences: Preferences::new(body.preferences),
        })
    }
}
