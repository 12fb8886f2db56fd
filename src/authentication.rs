use actix_web::http::header::HeaderMap;
use anyhow::Context;
use base64::Engine;
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};

use crate::config::AdminSettings;

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials.")]
    InvalidCredentials(#[source] anyhow::Error),
}

pub fn basic_authentication(headers: &HeaderMap) -> Result<Credentials, anyhow::Error> {
    let header_value = headers
        .get("Authorization")
        .context("The 'Authorization' header was missing")?
        .to_str()
        .context("The 'Authorization' header was not a valid UTF8 string.")?;

    let base64encoded_credentials = header_value
        .strip_prefix("Basic ")
        .context("The authorization scheme was not 'Basic'.")?;

    let decoded_credentials = base64::engine::general_purpose::STANDARD
        .decode(base64encoded_credentials)
        .context("Failed to base64-decode 'Basic' credentials.")?;

    let decoded_credentials = String::from_utf8(decoded_credentials)
        .context("The decoded credential string is not valid UTF8.")?;

    let mut credentials = decoded_credentials.splitn(2, ':');
    let username = credentials
        .next()
        .ok_or_else(|| anyhow::anyhow!("A username must be provided in 'Basic' auth."))?
        .to_string();
    let password = credentials
        .next()
        .ok_or_else(|| anyhow::anyhow!("A password must be provided in 'Basic' auth."))?
        .to_string();

    Ok(Credentials {
        username,
        password: Secret::new(password),
    })
}

/// Checks `credentials` against the configured admin account. Digests are compared so the
/// comparison does not depend on where the first differing byte is.
#[tracing::instrument(name = "Validate admin credentials", skip(credentials, admin), fields(username = %credentials.username))]
pub fn validate_credentials(credentials: &Credentials, admin: &AdminSettings) -> Result<(), AuthError> {
    let username_matches = digest(&credentials.username) == digest(&admin.username);
    let password_matches =
        digest(credentials.password.expose_secret()) == digest(admin.password.expose_secret());

    if username_matches && password_matches {
        return Ok(());
    }

    Err(AuthError::InvalidCredentials(anyhow::anyhow!(
        "Unknown username or wrong password."
    )))
}

fn digest(value: &str) -> Vec<u8> {
    Sha256::digest(value.as_bytes()).to_vec()
}
