use std::io;
use std::process::ExitCode;

use clap::Parser;
use subconfig::cli::{Cli, run};
use tracing::{Level, error};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut stdout = io::stdout().lock();
    if let Err(err) = run(&cli, &mut stdout) {
        error!("{err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}
