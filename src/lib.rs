pub mod analytics;
pub mod audience_client;
pub mod authentication;
pub mod config;
pub mod domain;
pub mod email_client;
pub mod error;
pub mod newsletter;
pub mod notifications;
pub mod routes;
pub mod scheduler;
pub mod startup;
pub mod subscription;
pub mod telemetry;
pub mod templates;
