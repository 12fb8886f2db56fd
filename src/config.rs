use chrono::Weekday;
use config::{Config, ConfigError, File};
use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::time;

use crate::domain::subscriber_email::SubscriberEmail;

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub audience: AudienceSettings,
    pub email_client: EmailClientSettings,
    pub welcome_email: WelcomeEmailSettings,
    pub newsletter: NewsletterSettings,
    pub admin: AdminSettings,
    pub scheduler: SchedulerSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct AudienceSettings {
    pub base_url: String,
    pub audience_id: String,
    // secrecy protects secret information and prevents them to be exposed (eg: via logs)
    pub api_key: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_email: String,
    pub api_key: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

/// Branding used to render the welcome email.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct WelcomeEmailSettings {
    pub subject: String,
    pub header_color: String,
    pub logo_url: String,
    /// Template receiving a `{first_name}` placeholder.
    pub main_heading: String,
    pub welcome_message: String,
    pub expectations: Vec<String>,
    pub closing_message: String,
    pub team_name: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct NewsletterSettings {
    pub ab_test: ABTestConfig,
}

/// Subject lines competing in the newsletter A/B test.
///
/// `test_percentage` is the share of subscribers receiving `subject_a`.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct ABTestConfig {
    pub subject_a: String,
    pub subject_b: String,
    pub test_percentage: f64,
}

#[derive(serde::Deserialize, Clone)]
pub struct AdminSettings {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct SchedulerSettings {
    pub enabled: bool,
    pub newsletter_weekday: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub newsletter_hour: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub newsletter_minute: u32,
}

impl Settings {
    pub fn get_address(&self) -> String {
        format!(
            "{}:{}",
            self.application.get_host(),
            self.application.get_port()
        )
    }

    pub fn get_email_client_sender(&self) -> Result<SubscriberEmail, String> {
        self.email_client.get_sender_email()
    }

    pub fn set_email_client_base_url(&mut self, new_base_url: String) {
        self.email_client.base_url = new_base_url
    }

    pub fn set_audience_base_url(&mut self, new_base_url: String) {
        self.audience.base_url = new_base_url
    }

    pub fn set_app_port(&mut self, port: u16) {
        self.application.port = port;
    }

    pub fn disable_scheduler(&mut self) {
        self.scheduler.enabled = false;
    }

    /// Checks the values serde cannot validate on its own.
    pub fn validate(&self) -> Result<(), String> {
        self.get_email_client_sender()?;
        self.newsletter.ab_test.validate()?;
        self.scheduler.validate()
    }
}

impl ApplicationSettings {
    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_host(&self) -> String {
        self.host.clone()
    }
}

impl AudienceSettings {
    pub fn get_timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.timeout_milliseconds)
    }
}

impl EmailClientSettings {
    pub fn get_sender_email(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(self.sender_email.clone())
    }

    pub fn get_timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.timeout_milliseconds)
    }
}

impl ABTestConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.test_percentage) {
            return Err(format!(
                "{} is not a valid A/B test percentage. It must be between 0 and 1.",
                self.test_percentage
            ));
        }

        Ok(())
    }
}

impl SchedulerSettings {
    pub fn get_newsletter_weekday(&self) -> Result<Weekday, String> {
        self.newsletter_weekday
            .parse::<Weekday>()
            .map_err(|_| format!("{} is not a valid weekday", self.newsletter_weekday))
    }

    pub fn validate(&self) -> Result<(), String> {
        self.get_newsletter_weekday()?;

        if self.newsletter_hour > 23 || self.newsletter_minute > 59 {
            return Err(format!(
                "{:02}:{:02} is not a valid newsletter time",
                self.newsletter_hour, self.newsletter_minute
            ));
        }

        Ok(())
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir()
        .map_err(|err| ConfigError::Message(format!("Failed to determine the current directory: {}", err)))?;
    let config_directory = root_path.join("config");
    // Uses development environment by default
    let enviroment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(enviroment.as_str());

    // It merges the base configuration file with the one from the specific environment (development or production)
    let settings = Config::builder()
        .add_source(File::from(config_base_filepath).required(true))
        .add_source(File::from(config_env_filepath).required(true))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_AUDIENCE__API_KEY would set Settings.audience.api_key
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    tracing::info!("Application environment = {:?}", enviroment);

    let settings: Settings = settings.try_deserialize()?;

    settings.validate().map_err(ConfigError::Message)?;

    Ok(settings)
}
