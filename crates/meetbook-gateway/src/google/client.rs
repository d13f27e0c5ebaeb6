//! Google Calendar API client.
//!
//! Thin HTTP layer: builds requests, maps status codes onto
//! [`GatewayError`] codes, and parses the handful of fields the engine needs.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use meetbook_core::{BusyPeriod, TimeWindow};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GatewayError, GatewayResult};

/// Builds the shared HTTP client.
pub(crate) fn http_client(timeout: Duration) -> GatewayResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("meetbook/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| GatewayError::configuration(format!("failed to create HTTP client: {}", e)))
}

/// Maps a non-2xx status onto a gateway error.
pub(crate) fn status_error(status: u16, body: &str) -> GatewayError {
    match status {
        401 => GatewayError::authentication("access token expired or invalid"),
        403 => GatewayError::authorization(format!("access denied to calendar: {}", body)),
        404 => GatewayError::not_found(format!("calendar or event not found: {}", body)),
        429 => GatewayError::rate_limited("rate limit exceeded"),
        _ => GatewayError::server(format!("API error ({}): {}", status, body)),
    }
}

fn request_error(e: reqwest::Error) -> GatewayError {
    let message = if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        format!("request failed: {}", e)
    };
    GatewayError::network(message).with_source(e)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FreeBusyRequest<'a> {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub time_zone: &'a str,
    pub items: Vec<FreeBusyItem<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FreeBusyItem<'a> {
    pub id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FreeBusyResponse {
    #[serde(default)]
    pub calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FreeBusyCalendar {
    #[serde(default)]
    pub busy: Vec<ApiTimePeriod>,
    #[serde(default)]
    pub errors: Vec<ApiCalendarError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiTimePeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCalendarError {
    #[serde(default)]
    pub reason: String,
}

impl FreeBusyResponse {
    /// Extracts busy periods for `calendar_id`.
    ///
    /// A per-calendar error (e.g. `notFound`) fails the whole query rather
    /// than reporting the calendar as free.
    pub fn into_busy(mut self, calendar_id: &str) -> GatewayResult<Vec<BusyPeriod>> {
        let calendar = self.calendars.remove(calendar_id).ok_or_else(|| {
            GatewayError::invalid_response(format!("calendar {} missing from response", calendar_id))
        })?;

        if let Some(err) = calendar.errors.first() {
            return Err(match err.reason.as_str() {
                "notFound" => GatewayError::not_found(format!("calendar {} not found", calendar_id)),
                "forbidden" | "accessDenied" => {
                    GatewayError::authorization(format!("no access to calendar {}", calendar_id))
                }
                other => GatewayError::server(format!("free/busy error: {}", other)),
            });
        }

        Ok(calendar
            .busy
            .into_iter()
            .map(|p| BusyPeriod::new(p.start, p.end))
            .collect())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EventDateTime<'a> {
    #[serde(rename = "dateTime")]
    pub date_time: DateTime<Utc>,
    #[serde(rename = "timeZone")]
    pub time_zone: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventAttendee<'a> {
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConferenceSolutionKey {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateConferenceRequest {
    pub request_id: String,
    pub conference_solution_key: ConferenceSolutionKey,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConferenceDataRequest {
    pub create_request: CreateConferenceRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Reminders {
    pub use_default: bool,
}

/// Body of an `events.insert` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventInsert<'a> {
    pub summary: &'a str,
    pub description: &'a str,
    pub start: EventDateTime<'a>,
    pub end: EventDateTime<'a>,
    pub attendees: Vec<EventAttendee<'a>>,
    pub conference_data: ConferenceDataRequest,
    pub reminders: Reminders,
}

/// The fields of a Calendar event the gateway reads back.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub hangout_link: Option<String>,
    #[serde(default)]
    pub conference_data: Option<ApiConferenceData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiConferenceData {
    #[serde(default)]
    pub entry_points: Vec<ApiEntryPoint>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiEntryPoint {
    #[serde(default)]
    pub uri: Option<String>,
}

impl ApiEvent {
    /// `hangoutLink` if set, else the first conference entry point.
    pub fn join_link(&self) -> Option<String> {
        self.hangout_link
            .clone()
            .filter(|l| !l.is_empty())
            .or_else(|| {
                self.conference_data
                    .as_ref()
                    .and_then(|c| c.entry_points.first())
                    .and_then(|e| e.uri.clone())
                    .filter(|l| !l.is_empty())
            })
    }
}

/// Low-level client for the Calendar v3 REST API.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl GoogleCalendarClient {
    pub fn new(http_client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(calendar_id)
        )
    }

    /// `POST /freeBusy` for one calendar.
    pub async fn free_busy(
        &self,
        access_token: &str,
        calendar_id: &str,
        time_zone: &str,
        range: TimeWindow,
    ) -> GatewayResult<Vec<BusyPeriod>> {
        let body = FreeBusyRequest {
            time_min: range.start,
            time_max: range.end,
            time_zone,
            items: vec![FreeBusyItem { id: calendar_id }],
        };

        let response = self
            .http_client
            .post(format!("{}/freeBusy", self.api_base))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let parsed: FreeBusyResponse = read_json(response).await?;
        let busy = parsed.into_busy(calendar_id)?;
        debug!(calendar_id, count = busy.len(), "fetched busy periods");
        Ok(busy)
    }

    /// `POST /calendars/{id}/events` with conference creation and invites.
    pub async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &EventInsert<'_>,
    ) -> GatewayResult<ApiEvent> {
        let response = self
            .http_client
            .post(self.events_url(calendar_id))
            .bearer_auth(access_token)
            .query(&[("conferenceDataVersion", "1"), ("sendUpdates", "all")])
            .json(event)
            .send()
            .await
            .map_err(request_error)?;

        read_json(response).await
    }

    /// `GET /calendars/{id}/events/{eventId}`.
    pub async fn get_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> GatewayResult<ApiEvent> {
        let url = format!("{}/{}", self.events_url(calendar_id), urlencoding::encode(event_id));
        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(request_error)?;

        read_json(response).await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> GatewayResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::network(format!("failed to read response: {}", e)))?;

    if !status.is_success() {
        if status.is_server_error() {
            warn!(status = status.as_u16(), "calendar API server error");
        }
        return Err(status_error(status.as_u16(), &body));
    }

    serde_json::from_str(&body)
        .map_err(|e| GatewayError::invalid_response(format!("failed to parse response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayErrorCode;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 9, h, m, 0).unwrap()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_error(401, "").code(), GatewayErrorCode::AuthenticationFailed);
        assert_eq!(status_error(403, "").code(), GatewayErrorCode::AuthorizationFailed);
        assert_eq!(status_error(404, "").code(), GatewayErrorCode::NotFound);
        assert_eq!(status_error(429, "").code(), GatewayErrorCode::RateLimited);
        assert_eq!(status_error(500, "boom").code(), GatewayErrorCode::ServerError);
        assert_eq!(status_error(400, "bad").code(), GatewayErrorCode::ServerError);
    }

    #[test]
    fn free_busy_request_shape() {
        let body = FreeBusyRequest {
            time_min: utc(8, 0),
            time_max: utc(20, 0),
            time_zone: "America/Los_Angeles",
            items: vec![FreeBusyItem { id: "primary" }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["timeMin"], "2026-02-09T08:00:00Z");
        assert_eq!(value["timeMax"], "2026-02-09T20:00:00Z");
        assert_eq!(value["timeZone"], "America/Los_Angeles");
        assert_eq!(value["items"][0]["id"], "primary");
    }

    #[test]
    fn free_busy_response_parsing() {
        let json = r#"{
            "kind": "calendar#freeBusy",
            "calendars": {
                "primary": {
                    "busy": [
                        {"start": "2026-02-09T10:00:00-08:00", "end": "2026-02-09T11:00:00-08:00"},
                        {"start": "2026-02-09T20:00:00Z", "end": "2026-02-09T20:30:00Z"}
                    ]
                }
            }
        }"#;
        let parsed: FreeBusyResponse = serde_json::from_str(json).unwrap();
        let busy = parsed.into_busy("primary").unwrap();
        assert_eq!(busy.len(), 2);
        assert_eq!(busy[0].start, utc(18, 0));
        assert_eq!(busy[0].end, utc(19, 0));
    }

    #[test]
    fn free_busy_calendar_error() {
        let json = r#"{"calendars": {"primary": {"errors": [{"domain": "global", "reason": "notFound"}]}}}"#;
        let parsed: FreeBusyResponse = serde_json::from_str(json).unwrap();
        let err = parsed.into_busy("primary").unwrap_err();
        assert_eq!(err.code(), GatewayErrorCode::NotFound);
    }

    #[test]
    fn free_busy_missing_calendar() {
        let parsed: FreeBusyResponse = serde_json::from_str(r#"{"calendars": {}}"#).unwrap();
        let err = parsed.into_busy("primary").unwrap_err();
        assert_eq!(err.code(), GatewayErrorCode::InvalidResponse);
    }

    #[test]
    fn event_insert_shape() {
        let event = EventInsert {
            summary: "Meeting with Ada",
            description: "Meeting with Ada",
            start: EventDateTime {
                date_time: utc(18, 0),
                time_zone: "America/Los_Angeles",
            },
            end: EventDateTime {
                date_time: utc(18, 30),
                time_zone: "America/Los_Angeles",
            },
            attendees: vec![
                EventAttendee {
                    email: "host@example.com",
                    response_status: Some("accepted"),
                },
                EventAttendee {
                    email: "ada@example.com",
                    response_status: None,
                },
            ],
            conference_data: ConferenceDataRequest {
                create_request: CreateConferenceRequest {
                    request_id: "req-1".to_string(),
                    conference_solution_key: ConferenceSolutionKey {
                        kind: "hangoutsMeet",
                    },
                },
            },
            reminders: Reminders { use_default: true },
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["start"]["dateTime"], "2026-02-09T18:00:00Z");
        assert_eq!(value["start"]["timeZone"], "America/Los_Angeles");
        assert_eq!(value["attendees"][0]["responseStatus"], "accepted");
        assert!(value["attendees"][1].get("responseStatus").is_none());
        assert_eq!(
            value["conferenceData"]["createRequest"]["conferenceSolutionKey"]["type"],
            "hangoutsMeet"
        );
        assert_eq!(value["conferenceData"]["createRequest"]["requestId"], "req-1");
        assert_eq!(value["reminders"]["useDefault"], true);
    }

    #[test]
    fn join_link_prefers_hangout_link() {
        let event: ApiEvent = serde_json::from_str(
            r#"{
                "id": "evt1",
                "hangoutLink": "https://meet.google.com/aaa-bbbb-ccc",
                "conferenceData": {"entryPoints": [{"uri": "https://meet.google.com/zzz"}]}
            }"#,
        )
        .unwrap();
        assert_eq!(event.join_link().as_deref(), Some("https://meet.google.com/aaa-bbbb-ccc"));
    }

    #[test]
    fn join_link_falls_back_to_entry_point() {
        let event: ApiEvent = serde_json::from_str(
            r#"{"id": "evt1", "conferenceData": {"entryPoints": [{"entryPointType": "video", "uri": "https://meet.google.com/zzz"}]}}"#,
        )
        .unwrap();
        assert_eq!(event.join_link().as_deref(), Some("https://meet.google.com/zzz"));
    }

    #[test]
    fn join_link_missing() {
        let event: ApiEvent = serde_json::from_str(
            r#"{"id": "evt1", "conferenceData": {"createRequest": {"status": {"statusCode": "pending"}}}}"#,
        )
        .unwrap();
        assert_eq!(event.id, "evt1");
        assert!(event.join_link().is_none());
    }

    #[test]
    fn api_base_trailing_slash_trimmed() {
        let client = GoogleCalendarClient::new(reqwest::Client::new(), "http://localhost:9/v3/");
        assert_eq!(
            client.events_url("host@example.com"),
            "http://localhost:9/v3/calendars/host%40example.com/events"
        );
    }
}
