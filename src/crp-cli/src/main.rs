mod batch;
mod cli;
mod commands;
mod config;

use anyhow::{bail, Result};
use clap::Parser;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "crp=debug,crp_cli=debug"
    } else {
        "crp=info,crp_cli=info"
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = default_filter(verbose);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(window) = cli.proximity_window {
        config.organize.proximity_window = window;
    }
    if cli.strict {
        config.organize.strict_join = true;
    }

    if let Some(command) = cli.command {
        let summary = match command {
            Commands::Extract(args) => commands::extract::handle(
                &args.input,
                args.dotnet,
                args.parser_dir,
                &config.extract,
            )?,
        };
        std::process::exit(summary.exit_code());
    }

    if let Some(list) = &cli.file {
        if cli.output.is_some() {
            eprintln!("Warning: --output is ignored with --file; each folder is written to <folder>_organized");
        }
        let summary = commands::organize::handle_list(list, &config.organize, cli.verbose)?;
        std::process::exit(summary.exit_code());
    }

    let Some(input) = &cli.input else {
        bail!("Either --input or --file is required");
    };
    if !input.is_dir() {
        bail!("Input directory '{}' does not exist", input.display());
    }

    commands::organize::handle_directory(
        input,
        cli.output.as_deref(),
        &config.organize,
        cli.verbose,
    )
}
