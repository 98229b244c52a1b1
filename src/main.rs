use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod message;
mod port;
mod rx;
mod stats;
mod stop;
mod tx;

fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();
    init_logging(args.debug);

    let prog = std::env::args_os()
        .next()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "term-test".to_string());

    stop::install_sigint_handler().context("install SIGINT handler")?;
    let stop = stop::StopToken::with_sigint();

    let outcome = app::run(&args, &prog, &stop, &mut std::io::stdout().lock())?;
    Ok(outcome.exit_code())
}

/// Logs go to stderr; stdout carries usage and received-byte output.
fn init_logging(debug: bool) {
    let default = if debug {
        "term_test=debug"
    } else {
        "term_test=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
