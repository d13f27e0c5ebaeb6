//! Request and response types for the meetbook protocol.

use chrono::{DateTime, NaiveDate, Utc};
use meetbook_core::{DateAvailability, MeetingType, TimeSlot};
use serde::{Deserialize, Serialize};

use crate::PROTOCOL_VERSION;

/// Message envelope wrapping all protocol messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Protocol version (always "1" for v1).
    pub protocol_version: String,
    /// Request ID, echoed back in the response.
    pub request_id: String,
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Creates a new envelope with the current protocol version.
    pub fn new(request_id: impl Into<String>, payload: T) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            request_id: request_id.into(),
            payload,
        }
    }

    pub fn request(request_id: impl Into<String>, request: T) -> Self {
        Self::new(request_id, request)
    }

    pub fn response(request_id: impl Into<String>, response: T) -> Self {
        Self::new(request_id, response)
    }

    /// Checks if this envelope uses a compatible protocol version.
    pub fn is_compatible(&self) -> bool {
        self.protocol_version == PROTOCOL_VERSION
    }
}

/// Requests a client can send to the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Liveness check.
    Ping,

    /// Daemon status.
    Status,

    /// Graceful shutdown.
    Shutdown,

    /// List the meeting type catalog.
    ListMeetingTypes,

    /// Day-level availability for a calendar view.
    GetDates {
        meeting_type: String,
        start_date: NaiveDate,
        days: u32,
    },

    /// Bookable slots for one date.
    GetSlots {
        #[serde(flatten)]
        query: SlotQuery,
    },

    /// Book a slot.
    Book {
        #[serde(flatten)]
        booking: BookingRequest,
    },
}

impl Request {
    pub fn get_dates(meeting_type: impl Into<String>, start_date: NaiveDate, days: u32) -> Self {
        Self::GetDates {
            meeting_type: meeting_type.into(),
            start_date,
            days,
        }
    }

    pub fn get_slots(query: SlotQuery) -> Self {
        Self::GetSlots { query }
    }

    pub fn book(booking: BookingRequest) -> Self {
        Self::Book { booking }
    }
}

/// A slot query as received from a client.
///
/// Fields are kept as raw strings; the server validates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotQuery {
    #[serde(default)]
    pub meeting_type: String,
    /// Calendar date, `YYYY-MM-DD`.
    #[serde(default)]
    pub date: String,
    /// Guest timezone, defaults to the site's base timezone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl SlotQuery {
    pub fn new(meeting_type: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            meeting_type: meeting_type.into(),
            date: date.into(),
            timezone: None,
        }
    }

    /// Builder: set the guest timezone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// A booking submission. Empty strings count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub meeting_type: String,
    /// RFC 3339 instant.
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub guest_email: String,
    #[serde(default)]
    pub guest_timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BookingRequest {
    pub fn new(meeting_type: impl Into<String>, start_time: impl Into<String>) -> Self {
        Self {
            meeting_type: meeting_type.into(),
            start_time: start_time.into(),
            ..Default::default()
        }
    }

    /// Builder: set the guest's name, email and timezone.
    pub fn guest(
        mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        timezone: impl Into<String>,
    ) -> Self {
        self.guest_name = name.into();
        self.guest_email = email.into();
        self.guest_timezone = timezone.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Slots offered for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub timezone: String,
    /// The full meeting type, so callers can render title and duration.
    pub meeting_type: MeetingType,
    pub slots: Vec<TimeSlot>,
}

/// Outcome of a booking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Created,
    /// Input rejected before any calendar call.
    Invalid,
    /// The slot was taken between query and booking.
    Conflict,
    /// Calendar credentials are not usable.
    Unavailable,
    Failed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Invalid => "invalid",
            Self::Conflict => "conflict",
            Self::Unavailable => "unavailable",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a booking submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResponse {
    pub success: bool,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Video join link, empty when the conference was not ready in time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meet_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Guest-facing error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BookingResponse {
    /// A successful booking.
    pub fn created(
        event_id: impl Into<String>,
        meet_link: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            success: true,
            status: BookingStatus::Created,
            event_id: Some(event_id.into()),
            meet_link: Some(meet_link.into()),
            start_time: Some(start_time),
            end_time: Some(end_time),
            error: None,
        }
    }

    /// A failed booking with a guest-facing message.
    pub fn rejected(status: BookingStatus, error: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            event_id: None,
            meet_link: None,
            start_time: None,
            end_time: None,
            error: Some(error.into()),
        }
    }
}

/// Responses the daemon sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Pong,

    Status {
        #[serde(flatten)]
        info: StatusInfo,
    },

    MeetingTypes {
        meeting_types: Vec<MeetingType>,
    },

    Dates {
        meeting_type: String,
        dates: Vec<DateAvailability>,
    },

    Slots {
        #[serde(flatten)]
        slots: SlotsResponse,
    },

    Booking {
        #[serde(flatten)]
        booking: BookingResponse,
    },

    /// Generic acknowledgement.
    Ok,

    Error {
        #[serde(flatten)]
        error: ErrorResponse,
    },
}

impl Response {
    pub fn status(info: StatusInfo) -> Self {
        Self::Status { info }
    }

    pub fn meeting_types(meeting_types: Vec<MeetingType>) -> Self {
        Self::MeetingTypes { meeting_types }
    }

    pub fn dates(meeting_type: impl Into<String>, dates: Vec<DateAvailability>) -> Self {
        Self::Dates {
            meeting_type: meeting_type.into(),
            dates,
        }
    }

    pub fn slots(slots: SlotsResponse) -> Self {
        Self::Slots { slots }
    }

    pub fn booking(booking: BookingResponse) -> Self {
        Self::Booking { booking }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorResponse::new(code, message),
        }
    }

    /// Returns true unless this is an error response.
    ///
    /// A rejected booking is still a successful exchange; check
    /// [`BookingResponse::success`] for the booking outcome.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    pub fn as_error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// Daemon status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub uptime_seconds: u64,
    /// Name of the calendar gateway in use.
    pub gateway: String,
    /// Base timezone of the site.
    pub timezone: String,
    pub meeting_types: usize,
    /// Requests served since startup.
    #[serde(default)]
    pub requests_served: u64,
}

impl StatusInfo {
    pub fn new(uptime_seconds: u64, gateway: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            uptime_seconds,
            gateway: gateway.into(),
            timezone: timezone.into(),
            meeting_types: 0,
            requests_served: 0,
        }
    }

    pub fn with_meeting_types(mut self, count: usize) -> Self {
        self.meeting_types = count;
        self
    }

    pub fn with_requests_served(mut self, count: u64) -> Self {
        self.requests_served = count;
        self
    }
}

/// Error codes for error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InternalError,
    /// Input failed validation.
    InvalidRequest,
    Timeout,
    /// Calendar credentials are not usable.
    ServiceUnavailable,
    /// The calendar returned some other failure.
    ProviderError,
    ShuttingDown,
}

impl ErrorCode {
    /// Human-readable description of the code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InternalError => "An internal error occurred",
            Self::InvalidRequest => "The request was invalid",
            Self::Timeout => "The request timed out",
            Self::ServiceUnavailable => "Calendar service unavailable",
            Self::ProviderError => "Calendar service returned an error",
            Self::ShuttingDown => "Server is shutting down",
        }
    }
}

/// Error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl std::error::Error for ErrorResponse {}
