//! Command-line interface definition.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// meetbook - booking availability for your calendar
#[derive(Debug, Parser)]
#[command(name = "meetbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "MEETBOOK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the daemon socket
    #[arg(long, env = "MEETBOOK_SOCKET", global = true)]
    pub socket_path: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the daemon in the foreground
    Server {
        /// Use an in-memory calendar instead of Google
        #[arg(long)]
        memory: bool,
    },

    /// List meeting types
    Types,

    /// Show which days can be booked
    Dates {
        /// Meeting type slug
        meeting_type: String,

        /// First day to show (defaults to today)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Number of days to show
        #[arg(long, default_value = "14")]
        days: u32,
    },

    /// List bookable slots for a date
    Slots {
        /// Meeting type slug
        meeting_type: String,

        /// Date as YYYY-MM-DD
        date: String,

        /// Show times in this IANA timezone
        #[arg(long, short = 'z')]
        timezone: Option<String>,
    },

    /// Book a slot
    Book {
        /// Meeting type slug
        meeting_type: String,

        /// Slot start as an RFC 3339 timestamp
        start: String,

        /// Guest name
        #[arg(long)]
        name: String,

        /// Guest email
        #[arg(long)]
        email: String,

        /// Guest IANA timezone
        #[arg(long, short = 'z')]
        timezone: String,

        /// Notes for the host
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show daemon status
    Status,

    /// Stop the daemon
    Stop,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_book() {
        let cli = Cli::try_parse_from([
            "meetbook",
            "book",
            "30",
            "2026-02-09T17:00:00Z",
            "--name",
            "Ada",
            "--email",
            "ada@example.com",
            "-z",
            "Europe/London",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Some(Command::Book {
                meeting_type,
                timezone,
                notes,
                ..
            }) => {
                assert_eq!(meeting_type, "30");
                assert_eq!(timezone, "Europe/London");
                assert_eq!(notes, None);
            }
            other => panic!("expected book, got {other:?}"),
        }
    }

    #[test]
    fn parses_dates_with_defaults() {
        let cli = Cli::try_parse_from(["meetbook", "dates", "30"]).unwrap();
        match cli.command {
            Some(Command::Dates { start, days, .. }) => {
                assert_eq!(start, None);
                assert_eq!(days, 14);
            }
            other => panic!("expected dates, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_start_date() {
        assert!(Cli::try_parse_from(["meetbook", "dates", "30", "--start", "soon"]).is_err());
    }

    #[test]
    fn book_requires_guest_details() {
        assert!(Cli::try_parse_from(["meetbook", "book", "30", "2026-02-09T17:00:00Z"]).is_err());
    }
}
