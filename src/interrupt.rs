// Ctrl-C handling. The blocking file and network calls cannot be cancelled
// cooperatively, so an interrupt ends the process from a watcher thread.

use anyhow::{Context, Result};
use signal_hook::consts::SIGINT;
use signal_hook::iterator::Signals;
use std::thread;

/// Exit status used when the user interrupts the invocation.
pub const INTERRUPTED_EXIT_CODE: i32 = 2;

/// Spawn a thread that reports the interrupt and exits with status 2 on
/// the first SIGINT.
pub fn install(program: String) -> Result<()> {
    let mut signals = Signals::new([SIGINT]).context("Failed to register SIGINT handler")?;

    thread::Builder::new()
        .name("signal-handler".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::debug!(signal, "received interrupt");
                eprintln!("{program}: Operation interrupted.");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        })
        .context("Failed to spawn signal handler thread")?;

    Ok(())
}
