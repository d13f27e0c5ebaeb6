//! `meetbook types`: list the meeting type catalog.

use meetbook_core::MeetingType;
use meetbook_protocol::{Request, Response};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::error::ClientResult;

use super::{client, into_result, print_json, unexpected};

pub async fn run(cli: &Cli, config: &AppConfig) -> ClientResult<()> {
    let response = into_result(client(cli, config).send(Request::ListMeetingTypes).await?)?;
    let Response::MeetingTypes { meeting_types } = response else {
        return Err(unexpected(&response));
    };

    if cli.json {
        return print_json(&meeting_types);
    }
    for line in render(&meeting_types) {
        println!("{}", line);
    }
    Ok(())
}

fn render(meeting_types: &[MeetingType]) -> Vec<String> {
    if meeting_types.is_empty() {
        return vec!["No meeting types configured.".to_string()];
    }
    meeting_types
        .iter()
        .map(|t| {
            let mut line = format!("{:<10} {:>4} min  {}", t.slug, t.duration_minutes, t.title);
            if t.buffer_minutes > 0 {
                line.push_str(&format!(" (buffer {} min)", t.buffer_minutes));
            }
            line
        })
        .collect()
}
