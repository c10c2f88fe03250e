// Tracing setup. Logs go to stderr so they never mix with command output.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Level used for a given number of `-v` flags.
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// verbosity flags.
pub fn init(verbose: u8) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    // Only fails when a subscriber is already installed.
    let _ = subscriber.try_init();
}
