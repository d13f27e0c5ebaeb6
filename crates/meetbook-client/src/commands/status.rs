//! `meetbook status` and `meetbook stop`.

use meetbook_protocol::{Request, Response, StatusInfo};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::error::ClientResult;

use super::{client, into_result, print_json, unexpected};

pub async fn status(cli: &Cli, config: &AppConfig) -> ClientResult<()> {
    let client = client(cli, config);
    if !client.socket_exists() {
        println!("daemon not running ({})", client.socket_path().display());
        return Ok(());
    }

    let response = into_result(client.send(Request::Status).await?)?;
    let Response::Status { info } = response else {
        return Err(unexpected(&response));
    };

    if cli.json {
        return print_json(&info);
    }
    for line in render(&info) {
        println!("{}", line);
    }
    Ok(())
}

pub async fn stop(cli: &Cli, config: &AppConfig) -> ClientResult<()> {
    let response = into_result(client(cli, config).send(Request::Shutdown).await?)?;
    match response {
        Response::Ok => {
            println!("daemon stopping");
            Ok(())
        }
        other => Err(unexpected(&other)),
    }
}

fn render(info: &StatusInfo) -> Vec<String> {
    vec![
        format!("uptime:        {}", format_uptime(info.uptime_seconds)),
        format!("calendar:      {}", info.gateway),
        format!("timezone:      {}", info.timezone),
        format!("meeting types: {}", info.meeting_types),
        format!("requests:      {}", info.requests_served),
    ]
}

fn format_uptime(seconds: u64) -> String {
    let (hours, rest) = (seconds / 3600, seconds % 3600);
    let (minutes, secs) = (rest / 60, rest % 60);
    if hours > 0 {
        format!("{}h{:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m{:02}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
