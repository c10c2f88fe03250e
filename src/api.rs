// API client module: a small blocking HTTP client for the Prowl public API
// plus the types that make up a notification request.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::UserError;

/// Endpoint used when `PROWL_API_URL` is not set.
pub const DEFAULT_ENDPOINT: &str = "https://api.prowlapp.com/publicapi/add";

/// A Prowl API key: exactly 40 lowercase hexadecimal digits.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ApiKey {
    type Err = UserError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let valid = value.len() == 40
            && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if valid {
            Ok(ApiKey(value.to_string()))
        } else {
            Err(UserError::InvalidApiKey)
        }
    }
}

// Keep keys out of logs and debug output.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({}…)", &self.0[..4])
    }
}

/// A fully populated notification. Serializes to the form fields of the
/// `add` call, in order, leaving out empty optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub apikey: ApiKey,
    pub application: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub priority: i8,
}

fn is_zero(priority: &i8) -> bool {
    *priority == 0
}

/// Blocking client for the notification endpoint.
#[derive(Clone)]
pub struct ProwlClient {
    client: Client,
    endpoint: String,
}

impl ProwlClient {
    /// Create a client for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ProwlClient {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a client configured from the environment variable
    /// `PROWL_API_URL`, falling back to the public endpoint.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("PROWL_API_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
        Self::new(endpoint)
    }

    /// POST the notification as form fields. A non-success status becomes
    /// `UserError::Server` carrying the response body.
    pub fn send(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            endpoint = %self.endpoint,
            application = %notification.application,
            priority = notification.priority,
            "sending notification"
        );

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
        spinner.set_message("Sending notification...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let res = self
            .client
            .post(&self.endpoint)
            .form(notification)
            .send();
        spinner.finish_and_clear();

        let res = res.context("Failed to send notification request")?;
        let status = res.status();
        tracing::debug!(%status, "response received");
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(UserError::Server { status, body }.into());
        }
        Ok(())
    }
}
