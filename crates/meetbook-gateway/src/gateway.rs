//! CalendarGateway trait definition.
//!
//! The gateway is the only boundary between the availability engine and the
//! remote calendar. It answers two questions: which intervals are busy in a
//! range, and please create this event.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use meetbook_core::{BusyPeriod, TimeWindow};

use crate::error::{GatewayError, GatewayResult};

/// A boxed future, used to keep [`CalendarGateway`] object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An event to create on the host's calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Guest invited to the event.
    pub attendee_email: String,
}

impl NewEvent {
    pub fn new(summary: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            summary: summary.into(),
            description: String::new(),
            start,
            end,
            attendee_email: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_attendee(mut self, email: impl Into<String>) -> Self {
        self.attendee_email = email.into();
        self
    }
}

/// An event the calendar accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    pub event_id: String,
    /// Video join link. Empty if the conference was not ready in time.
    pub meet_link: String,
}

/// A remote calendar the engine reads busy time from and books into.
pub trait CalendarGateway: Send + Sync {
    /// Short name used in logs and status output.
    fn name(&self) -> &str;

    /// Returns busy periods intersecting `range`, in any order.
    fn query_busy_periods(&self, range: TimeWindow) -> BoxFuture<'_, GatewayResult<Vec<BusyPeriod>>>;

    /// Creates an event with a video conference and invites the attendee.
    fn create_event(&self, event: NewEvent) -> BoxFuture<'_, GatewayResult<CreatedEvent>>;
}

/// A gateway that fails every call with the same error.
///
/// Used when the calendar is not configured so the daemon can still start
/// and answer with "temporarily unavailable".
#[derive(Debug)]
pub struct ErrorGateway {
    name: String,
    error: GatewayError,
}

impl ErrorGateway {
    pub fn new(name: impl Into<String>, error: GatewayError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    fn error(&self) -> GatewayError {
        GatewayError::new(self.error.code(), self.error.message()).with_gateway(&self.name)
    }
}

impl CalendarGateway for ErrorGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn query_busy_periods(&self, _range: TimeWindow) -> BoxFuture<'_, GatewayResult<Vec<BusyPeriod>>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn create_event(&self, _event: NewEvent) -> BoxFuture<'_, GatewayResult<CreatedEvent>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }
}
