//! `meetbook dates`: which days can be booked.

use chrono::{NaiveDate, Utc};

use meetbook_core::DateAvailability;
use meetbook_protocol::{Request, Response};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::error::ClientResult;

use super::{client, into_result, print_json, unexpected};

pub async fn run(
    cli: &Cli,
    config: &AppConfig,
    meeting_type: &str,
    start: Option<NaiveDate>,
    days: u32,
) -> ClientResult<()> {
    let start = start.unwrap_or_else(|| today(config));
    let request = Request::get_dates(meeting_type, start, days);
    let response = into_result(client(cli, config).send(request).await?)?;
    let Response::Dates { dates, .. } = response else {
        return Err(unexpected(&response));
    };

    if cli.json {
        return print_json(&dates);
    }
    for line in render(&dates) {
        println!("{}", line);
    }
    Ok(())
}

/// Today in the site's timezone when one is configured, else UTC.
fn today(config: &AppConfig) -> NaiveDate {
    let now = Utc::now();
    match config.site {
        Some(ref site) => now.with_timezone(&site.timezone).date_naive(),
        None => now.date_naive(),
    }
}

fn render(dates: &[DateAvailability]) -> Vec<String> {
    dates
        .iter()
        .map(|d| {
            let mark = if d.available { "open" } else { "-" };
            format!("{} {}  {}", d.date.format("%a"), d.date, mark)
        })
        .collect()
}
