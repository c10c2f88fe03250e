// Command line surface. Parsing is left to clap; everything after that
// (positional mapping, mutual exclusion, priority range, fallbacks) lives
// here as plain functions so it can be tested without a process.

use anyhow::Result;
use clap::Parser;
use serde_json::Value;
use std::error::Error as _;
use std::path::PathBuf;
use std::str::FromStr;

use crate::api::{ApiKey, Notification};
use crate::error::UserError;
use crate::settings::{Settings, DEFAULT_API_KEY};

const USAGE: &str = "prowl --help
       prowl --set-api-key=<api-key>
       prowl [<options>] [[<event>] <description>]";

/// Deliver a notification using Prowl for iOS.
#[derive(Debug, Parser)]
#[command(name = "prowl", version, override_usage = USAGE)]
pub struct Cli {
    /// The event part of the notification.
    #[arg(value_name = "EVENT")]
    first: Option<String>,
    /// The description part of the notification. Defaults to the URL
    /// specified using --url, if one is specified. Otherwise the description
    /// is mandatory.
    #[arg(value_name = "DESCRIPTION")]
    second: Option<String>,
    /// The application part of the notification. Defaults to the current
    /// user's name and the host's name in the form of <username>@<hostname>.
    #[arg(short, long)]
    application: Option<String>,
    /// URL that should be opened when the notification is activated.
    #[arg(short, long)]
    url: Option<String>,
    /// The priority of the notification, a number from -2 to 2.
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    priority: i64,
    /// API key to use for the notification.
    #[arg(short = 'k', long, value_parser = ApiKey::from_str)]
    api_key: Option<ApiKey>,
    /// Set the default API key used for calls where -k is not specified.
    #[arg(long, value_parser = ApiKey::from_str)]
    set_api_key: Option<ApiKey>,
    /// Settings file holding the default API key [default: ~/opt/etc/prowl.json].
    #[arg(long, env = "PROWL_SETTINGS_FILE", value_name = "PATH")]
    pub settings_file: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// The free-form positional arguments, after the "0" workaround.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Positionals {
    None,
    One(String),
    Two(String, String),
}

impl Positionals {
    pub fn new(first: Option<String>, second: Option<String>) -> Self {
        match (first.map(api_argument), second.map(api_argument)) {
            (None, _) => Positionals::None,
            (Some(description), None) => Positionals::One(description),
            (Some(event), Some(description)) => Positionals::Two(event, description),
        }
    }

    /// Map the positionals onto `(event, description)`. Without positionals
    /// the URL doubles as the description.
    pub fn into_fields(self, url: Option<&str>) -> Result<(Option<String>, String), UserError> {
        match self {
            Positionals::None => url
                .map(|url| (None, url.to_string()))
                .ok_or(UserError::MissingDescription),
            Positionals::One(description) => Ok((None, description)),
            Positionals::Two(event, description) => Ok((Some(event), description)),
        }
    }
}

/// The API rejects the bare string "0" as a field value.
pub fn api_argument(value: String) -> String {
    if value == "0" {
        "0 ".into()
    } else {
        value
    }
}

/// One-line message for an argument parsing failure. Validation errors of
/// our own types are reported with their own message.
pub fn parse_error_message(err: &clap::Error) -> String {
    if let Some(user_error) = err.source().and_then(|source| source.downcast_ref::<UserError>()) {
        return user_error.to_string();
    }
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

/// What a single invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Store a new default API key.
    SetApiKey(ApiKey),
    /// Send one notification.
    Notify(NotifyRequest),
}

/// A validated notification whose API key and application may still need
/// their fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRequest {
    pub event: Option<String>,
    pub description: String,
    pub application: Option<String>,
    pub url: Option<String>,
    pub priority: i8,
    pub api_key: Option<ApiKey>,
}

impl Cli {
    /// Validate the parsed arguments and decide what to do.
    pub fn into_invocation(self) -> Result<Invocation, UserError> {
        let Cli {
            first,
            second,
            application,
            url,
            priority,
            api_key,
            set_api_key,
            ..
        } = self;

        if let Some(key) = set_api_key {
            let others_given = first.is_some()
                || second.is_some()
                || application.is_some()
                || url.is_some()
                || priority != 0
                || api_key.is_some();
            if others_given {
                return Err(UserError::SetApiKeyConflict);
            }
            return Ok(Invocation::SetApiKey(key));
        }

        let (event, description) = Positionals::new(first, second).into_fields(url.as_deref())?;
        let priority = i8::try_from(priority)
            .ok()
            .filter(|p| (-2..=2).contains(p))
            .ok_or(UserError::InvalidPriority(priority))?;

        Ok(Invocation::Notify(NotifyRequest {
            event,
            description,
            application,
            url,
            priority,
            api_key,
        }))
    }
}

impl NotifyRequest {
    /// Fill in the API key from the settings store and the application from
    /// `default_application` where they were not given.
    pub fn resolve(
        self,
        settings: &mut Settings,
        default_application: impl FnOnce() -> String,
    ) -> Result<Notification> {
        let apikey = match self.api_key {
            Some(key) => key,
            None => stored_api_key(settings)?,
        };
        let application = self.application.unwrap_or_else(default_application);

        Ok(Notification {
            apikey,
            application,
            url: self.url,
            event: self.event,
            description: self.description,
            priority: self.priority,
        })
    }
}

fn stored_api_key(settings: &mut Settings) -> Result<ApiKey> {
    match settings.get(DEFAULT_API_KEY, Value::Null)? {
        Value::Null => Err(UserError::MissingApiKey.into()),
        Value::String(key) => Ok(key.parse()?),
        _ => Err(UserError::InvalidApiKey.into()),
    }
}
