//! mvnpin CLI entry point.

use anyhow::Result;
use clap::Parser;
use mvnpin::cli::Cli;
use mvnpin::core::render_error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("mvnpin={default_level}"))),
        )
        .with_writer(std::io::stderr)
        .init();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(err) => {
            eprintln!("{}", render_error(&err));
            std::process::exit(1);
        }
    }
}
