//! Booking reconciliation.
//!
//! A slot offered a minute ago may be gone by the time the guest submits.
//! The reconciler asks the calendar again for exactly `[start, end)` and only
//! creates the event if nothing is there. Buffers are not applied on this
//! recheck. Two bookings racing for the same slot can both pass it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use meetbook_core::{Owner, SiteConfig, TimeWindow};
use meetbook_gateway::{CalendarGateway, NewEvent};
use tracing::{info, instrument, warn};

use crate::error::EngineError;
use crate::validate::ValidBooking;

/// A booking that reached the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub event_id: String,
    /// May be empty if the conference was not ready in time.
    pub meet_link: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Clone)]
pub struct BookingReconciler {
    config: Arc<SiteConfig>,
    gateway: Arc<dyn CalendarGateway>,
}

impl BookingReconciler {
    pub fn new(config: Arc<SiteConfig>, gateway: Arc<dyn CalendarGateway>) -> Self {
        Self { config, gateway }
    }

    #[instrument(skip(self, booking), fields(meeting_type = %booking.meeting_type.slug, start = %booking.start))]
    pub async fn book(&self, booking: ValidBooking) -> Result<Confirmation, EngineError> {
        let window = TimeWindow::from_duration(booking.start, booking.meeting_type.duration());

        let busy = self.gateway.query_busy_periods(window).await?;
        if !busy.is_empty() {
            warn!(busy = busy.len(), "slot taken since it was offered");
            return Err(EngineError::Conflict);
        }

        let event = NewEvent::new(
            format!("Meeting with {}", booking.guest_name),
            window.start,
            window.end,
        )
        .with_description(event_description(&booking, &self.config.owner))
        .with_attendee(&booking.guest_email);

        let created = self.gateway.create_event(event).await?;
        info!(event_id = %created.event_id, "booking created");

        Ok(Confirmation {
            event_id: created.event_id,
            meet_link: created.meet_link,
            start: window.start,
            end: window.end,
        })
    }
}

/// Event body: guest details, optional notes and a footer pointing back to
/// the booking page.
pub fn event_description(booking: &ValidBooking, owner: &Owner) -> String {
    let mut lines = vec![
        format!("Meeting with {}", booking.guest_name),
        format!("Email: {}", booking.guest_email),
        format!("Timezone: {}", booking.guest_timezone.name()),
    ];

    if let Some(notes) = booking.notes.as_deref() {
        lines.push(format!("\nNotes:\n{}", notes));
    }

    if let Some(url) = owner.booking_url.as_deref() {
        lines.push(format!("\nBooked via {}", url));
    }

    lines.join("\n")
}
