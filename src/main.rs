// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, hand them to `prowl::run`.
// - Maps every error to `<program>: Error: <message>` and exit status 1.

use clap::Parser;
use std::path::Path;
use std::process::ExitCode;

use prowl::cli::{parse_error_message, Cli};

fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "prowl".into())
}

fn main() -> ExitCode {
    let program = program_name();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            eprintln!("{program}: Error: {}", parse_error_message(&err));
            return ExitCode::FAILURE;
        }
        Err(err) => {
            // Help and version go to stdout and are not failures.
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
    };

    prowl::logging::init(cli.verbose);

    #[cfg(unix)]
    {
        if let Err(err) = prowl::interrupt::install(program.clone()) {
            tracing::warn!(error = %err, "interrupts will not be reported");
        }
    }

    match prowl::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{program}: Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
