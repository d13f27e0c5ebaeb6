//! Slot queries against the live calendar.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use meetbook_core::{
    MeetingType, SiteConfig, TimeError, TimeSlot, TimeWindow, filter_available, generate_candidates,
};
use meetbook_gateway::CalendarGateway;
use tracing::{debug, instrument};

use crate::error::EngineError;

impl From<TimeError> for EngineError {
    fn from(err: TimeError) -> Self {
        EngineError::validation(err.to_string())
    }
}

/// Computes bookable slots for one date.
#[derive(Clone)]
pub struct SlotService {
    config: Arc<SiteConfig>,
    gateway: Arc<dyn CalendarGateway>,
}

impl SlotService {
    pub fn new(config: Arc<SiteConfig>, gateway: Arc<dyn CalendarGateway>) -> Self {
        Self { config, gateway }
    }

    /// Generates candidates for `date`, then drops the ones that are too
    /// soon or collide with busy time.
    ///
    /// A day without configured availability returns an empty list without
    /// asking the calendar.
    #[instrument(skip(self, meeting_type), fields(meeting_type = %meeting_type.slug))]
    pub async fn available_slots(
        &self,
        date: NaiveDate,
        meeting_type: &MeetingType,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>, EngineError> {
        let candidates = generate_candidates(&self.config, date, meeting_type)?;
        if candidates.is_empty() {
            debug!("no availability configured");
            return Ok(Vec::new());
        }

        let day = TimeWindow::for_local_date(date, &self.config.timezone)?;
        let busy = self.gateway.query_busy_periods(day).await?;

        let slots = filter_available(&candidates, meeting_type, now, &busy);
        debug!(
            candidates = candidates.len(),
            busy = busy.len(),
            available = slots.len(),
            "filtered slots"
        );
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};
    use chrono_tz::America::Los_Angeles;
    use meetbook_core::{AvailabilityWindow, BusyPeriod, WeeklyAvailability};
    use meetbook_gateway::{GatewayErrorCode, MemoryGateway};

    fn config() -> SiteConfig {
        SiteConfig::new(Los_Angeles)
            .with_availability(WeeklyAvailability::default().with_day(
                Weekday::Mon,
                AvailabilityWindow::parse("09:00", "12:00").unwrap(),
            ))
            .with_meeting_type(MeetingType::new("30", "30 minutes", 30).with_buffer(15))
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()
    }

    fn service(gateway: Arc<MemoryGateway>) -> SlotService {
        SlotService::new(Arc::new(config()), gateway)
    }

    #[tokio::test]
    async fn free_calendar_offers_every_candidate() {
        let gateway = Arc::new(MemoryGateway::new());
        let config = config();
        let mt = config.meeting_type("30").unwrap();

        let slots = service(gateway.clone())
            .available_slots(monday(), mt, now())
            .await
            .unwrap();

        // 09:00..=11:30 every 15 minutes
        assert_eq!(slots.len(), 11);
        assert_eq!(
            slots[0].start_time,
            Utc.with_ymd_and_hms(2026, 2, 9, 17, 0, 0).unwrap()
        );
        assert_eq!(gateway.query_count(), 1);
    }

    #[tokio::test]
    async fn busy_time_is_removed_with_buffer() {
        // 10:00-10:30 local
        let gateway = Arc::new(MemoryGateway::new().with_busy(BusyPeriod::new(
            Utc.with_ymd_and_hms(2026, 2, 9, 18, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 2, 9, 18, 30, 0).unwrap(),
        )));
        let config = config();
        let mt = config.meeting_type("30").unwrap();

        let slots = service(gateway).available_slots(monday(), mt, now()).await.unwrap();

        let starts: Vec<_> = slots
            .iter()
            .map(|s| s.start_time.with_timezone(&Los_Angeles).format("%H:%M").to_string())
            .collect();
        assert_eq!(starts, ["09:00", "09:15", "10:45", "11:00", "11:15", "11:30"]);
    }

    #[tokio::test]
    async fn closed_day_skips_the_calendar() {
        let gateway = Arc::new(MemoryGateway::new());
        let config = config();
        let mt = config.meeting_type("30").unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();

        let slots = service(gateway.clone()).available_slots(sunday, mt, now()).await.unwrap();
        assert!(slots.is_empty());
        assert_eq!(gateway.query_count(), 0);
    }

    #[tokio::test]
    async fn gateway_errors_are_classified() {
        let gateway = Arc::new(MemoryGateway::new());
        let config = config();
        let mt = config.meeting_type("30").unwrap();

        gateway.fail_queries(Some(GatewayErrorCode::AuthenticationFailed));
        let err = service(gateway.clone())
            .available_slots(monday(), mt, now())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::GatewayAuth(_)));

        gateway.fail_queries(Some(GatewayErrorCode::ServerError));
        let err = service(gateway).available_slots(monday(), mt, now()).await.unwrap_err();
        assert!(matches!(err, EngineError::GatewayTransient(_)));
    }
}
