//! meetbook CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use meetbook_client::cli::{Cli, Command, ConfigAction};
use meetbook_client::commands;
use meetbook_client::config::AppConfig;
use meetbook_client::error::{ClientError, ClientResult};
use meetbook_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else if matches!(cli.command, Some(Command::Server { .. })) {
        TracingConfig::daemon()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path).map_err(ClientError::Config)?,
        None => AppConfig::load().map_err(ClientError::Config)?,
    };

    match &cli.command {
        Some(Command::Server { memory }) => commands::server::run(&cli, &config, *memory).await,
        Some(Command::Types) => commands::types::run(&cli, &config).await,
        Some(Command::Dates {
            meeting_type,
            start,
            days,
        }) => commands::dates::run(&cli, &config, meeting_type, *start, *days).await,
        Some(Command::Slots {
            meeting_type,
            date,
            timezone,
        }) => commands::slots::run(&cli, &config, meeting_type, date, timezone.as_deref()).await,
        Some(Command::Book {
            meeting_type,
            start,
            name,
            email,
            timezone,
            notes,
        }) => {
            let mut booking = meetbook_protocol::BookingRequest::new(meeting_type, start)
                .guest(name, email, timezone);
            if let Some(notes) = notes {
                booking = booking.with_notes(notes);
            }
            commands::book::run(&cli, &config, booking).await
        }
        Some(Command::Status) => commands::status::status(&cli, &config).await,
        Some(Command::Stop) => commands::status::stop(&cli, &config).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(cli.config.as_deref()),
        },
        None => {
            println!("meetbook - booking availability for your calendar");
            println!();
            println!("Run 'meetbook --help' for usage information.");
            println!();
            println!("Quick start:");
            println!("  1. Describe your availability in {}", AppConfig::default_path().display());
            println!("  2. Start the daemon: meetbook server");
            println!("  3. List open slots: meetbook slots 30 2026-02-09");
            Ok(())
        }
    }
}
