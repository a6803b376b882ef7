//! Phone Cart CLI

use std::{fmt::Display, process::ExitCode};

use tracing::error;

use cli::{args::Cli, logging::init_subscriber, run};

mod cli;

fn main() -> ExitCode {
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(error) => {
            // Help and version requests come back as errors too.
            _ = error.print();

            return if error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(error) = init_subscriber(&cli.logging) {
        report_error(format_args!("failed to initialise logging: {error}"));

        return ExitCode::FAILURE;
    }

    match run(&cli.store, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "command failed");
            report_error(&error);

            ExitCode::FAILURE
        }
    }
}

#[expect(clippy::print_stderr, reason = "errors are shown to the shopper")]
fn report_error(error: impl Display) {
    eprintln!("{error}");
}
