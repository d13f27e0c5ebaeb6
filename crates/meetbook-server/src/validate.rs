//! Request validation.
//!
//! Everything here runs before any calendar call. Messages are shown to the
//! guest as-is.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use meetbook_core::{MeetingType, SiteConfig};
use meetbook_protocol::{BookingRequest, SlotQuery};
use regex::Regex;

use crate::error::EngineError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid date regex"));

/// A slot query that passed validation.
#[derive(Debug, Clone)]
pub struct ValidSlotQuery {
    pub meeting_type: MeetingType,
    pub date: NaiveDate,
    /// Zone the guest views slots in. Defaults to the base timezone.
    pub timezone: Tz,
}

/// A booking that passed validation.
#[derive(Debug, Clone)]
pub struct ValidBooking {
    pub meeting_type: MeetingType,
    pub start: DateTime<Utc>,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_timezone: Tz,
    pub notes: Option<String>,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Parses a `YYYY-MM-DD` date. Shape and calendar validity both count.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    if !DATE_RE.is_match(date) {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn parse_timezone(name: &str) -> Result<Tz, EngineError> {
    name.parse::<Tz>()
        .map_err(|_| EngineError::validation(format!("Invalid timezone: {}", name)))
}

fn known_meeting_type(config: &SiteConfig, slug: &str) -> Result<MeetingType, EngineError> {
    config
        .meeting_type(slug)
        .cloned()
        .ok_or_else(|| EngineError::validation(format!("Unknown meeting type: {}", slug)))
}

pub fn validate_slot_query(
    config: &SiteConfig,
    query: &SlotQuery,
) -> Result<ValidSlotQuery, EngineError> {
    if query.meeting_type.is_empty() {
        return Err(EngineError::validation("Missing required parameter: meeting_type"));
    }
    if query.date.is_empty() {
        return Err(EngineError::validation("Missing required parameter: date"));
    }

    let date = parse_date(&query.date)
        .ok_or_else(|| EngineError::validation("Invalid date format. Use YYYY-MM-DD"))?;

    let timezone = match query.timezone.as_deref() {
        Some(name) if !name.is_empty() => parse_timezone(name)?,
        _ => config.timezone,
    };

    let meeting_type = known_meeting_type(config, &query.meeting_type)?;

    Ok(ValidSlotQuery {
        meeting_type,
        date,
        timezone,
    })
}

pub fn validate_booking(
    config: &SiteConfig,
    request: &BookingRequest,
    now: DateTime<Utc>,
) -> Result<ValidBooking, EngineError> {
    if request.meeting_type.is_empty() {
        return Err(EngineError::validation("Missing required field: meeting_type"));
    }
    if request.start_time.is_empty() {
        return Err(EngineError::validation("Missing required field: start_time"));
    }

    let guest_name = request.guest_name.trim();
    if guest_name.is_empty() {
        return Err(EngineError::validation("Please enter your name"));
    }

    if !is_valid_email(&request.guest_email) {
        return Err(EngineError::validation("Please enter a valid email address"));
    }

    if request.guest_timezone.is_empty() {
        return Err(EngineError::validation("Missing required field: guest_timezone"));
    }
    let guest_timezone = parse_timezone(&request.guest_timezone)?;

    let meeting_type = known_meeting_type(config, &request.meeting_type)?;

    let start = DateTime::parse_from_rfc3339(&request.start_time)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| EngineError::validation("Invalid start time. Use an RFC 3339 timestamp"))?;

    if start < now {
        return Err(EngineError::validation("Cannot book a time in the past"));
    }

    let notes = request
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(ValidBooking {
        meeting_type,
        start,
        guest_name: guest_name.to_string(),
        guest_email: request.guest_email.clone(),
        guest_timezone,
        notes,
    })
}
