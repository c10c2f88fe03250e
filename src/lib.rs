// Library root
// ------------
// The binary (`main.rs`) only parses arguments and reports errors; the
// work happens here.
//
// Module responsibilities:
// - `settings`: the JSON file holding the default API key.
// - `cli`: argument definitions and their normalization into an
//   `Invocation`.
// - `api`: API key and notification types plus the HTTP client.
// - `identity`: the `<user>@<host>` default application name.
// - `error`: errors reported to the user.
pub mod api;
pub mod cli;
pub mod error;
pub mod identity;
#[cfg(unix)]
pub mod interrupt;
pub mod logging;
pub mod settings;

use anyhow::Result;
use serde_json::Value;

use crate::api::ProwlClient;
use crate::cli::{Cli, Invocation};
use crate::settings::{Settings, DEFAULT_API_KEY};

/// Validate `cli` and perform its single side effect.
pub fn run(cli: Cli) -> Result<()> {
    let path = cli.settings_file.clone();
    let invocation = cli.into_invocation()?;

    let path = match path {
        Some(path) => path,
        None => Settings::default_path()?,
    };
    let mut settings = Settings::new(path);

    match invocation {
        Invocation::SetApiKey(key) => {
            settings.set(DEFAULT_API_KEY, Value::String(key.as_str().to_string()))?;
            tracing::info!(path = %settings.path().display(), "default API key stored");
        }
        Invocation::Notify(request) => {
            let notification = request.resolve(&mut settings, identity::default_application)?;
            ProwlClient::from_env()?.send(&notification)?;
        }
    }
    Ok(())
}
