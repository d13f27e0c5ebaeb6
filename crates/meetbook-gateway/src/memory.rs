//! In-memory calendar gateway.
//!
//! Keeps busy periods and created events in process memory. Used by the
//! daemon's `--memory` mode for local development and by the tests. Created
//! events count as busy, so booking the same slot twice conflicts.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use meetbook_core::{BusyPeriod, TimeWindow};
use tracing::{debug, info};

use crate::conference::JoinLinkPoll;
use crate::error::{GatewayError, GatewayErrorCode, GatewayResult};
use crate::gateway::{BoxFuture, CalendarGateway, CreatedEvent, NewEvent};

/// An event stored by the [`MemoryGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    pub event_id: String,
    pub event: NewEvent,
    pub meet_link: String,
}

#[derive(Debug, Default)]
struct State {
    busy: Vec<BusyPeriod>,
    events: Vec<StoredEvent>,
    query_failure: Option<GatewayErrorCode>,
    create_failure: Option<GatewayErrorCode>,
}

/// A calendar held entirely in memory.
#[derive(Debug)]
pub struct MemoryGateway {
    name: String,
    state: Mutex<State>,
    next_id: AtomicU64,
    queries: AtomicU32,
    /// Number of polls before a join link appears. Zero means immediately.
    join_link_delay: u32,
    poll: JoinLinkPoll,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            name: "memory".to_string(),
            state: Mutex::new(State::default()),
            next_id: AtomicU64::new(1),
            queries: AtomicU32::new(0),
            join_link_delay: 0,
            poll: JoinLinkPoll::default(),
        }
    }

    /// Builder: seed a busy period.
    pub fn with_busy(self, period: BusyPeriod) -> Self {
        self.lock().busy.push(period);
        self
    }

    /// Builder: the join link only appears after `polls` poll attempts.
    pub fn with_join_link_delay(mut self, polls: u32) -> Self {
        self.join_link_delay = polls;
        self
    }

    /// Builder: override the join link poll policy.
    pub fn with_poll(mut self, poll: JoinLinkPoll) -> Self {
        self.poll = poll;
        self
    }

    /// Makes every busy-period query fail with `code`, or clears it.
    pub fn fail_queries(&self, code: Option<GatewayErrorCode>) {
        self.lock().query_failure = code;
    }

    /// Makes every event creation fail with `code`, or clears it.
    pub fn fail_creates(&self, code: Option<GatewayErrorCode>) {
        self.lock().create_failure = code;
    }

    /// Adds a busy period.
    pub fn add_busy(&self, period: BusyPeriod) {
        self.lock().busy.push(period);
    }

    /// Returns every event created so far.
    pub fn events(&self) -> Vec<StoredEvent> {
        self.lock().events.clone()
    }

    /// Number of busy-period queries served.
    pub fn query_count(&self) -> u32 {
        self.queries.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn failure(&self, code: GatewayErrorCode) -> GatewayError {
        GatewayError::new(code, "injected failure").with_gateway(&self.name)
    }

    fn busy_in(&self, range: TimeWindow) -> GatewayResult<Vec<BusyPeriod>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        if let Some(code) = state.query_failure {
            return Err(self.failure(code));
        }

        let events = state
            .events
            .iter()
            .map(|e| BusyPeriod::new(e.event.start, e.event.end));
        let busy = state
            .busy
            .iter()
            .copied()
            .chain(events)
            .filter(|b| range.overlaps(b.start, b.end))
            .collect();
        Ok(busy)
    }

    fn insert(&self, event: NewEvent) -> GatewayResult<String> {
        let mut state = self.lock();
        if let Some(code) = state.create_failure {
            return Err(self.failure(code));
        }

        let event_id = format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        info!(event_id = %event_id, start = %event.start, "stored event");
        state.events.push(StoredEvent {
            event_id: event_id.clone(),
            event,
            meet_link: String::new(),
        });
        Ok(event_id)
    }

    fn set_link(&self, event_id: &str, link: &str) {
        let mut state = self.lock();
        if let Some(stored) = state.events.iter_mut().find(|e| e.event_id == event_id) {
            stored.meet_link = link.to_string();
        }
    }
}

impl CalendarGateway for MemoryGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn query_busy_periods(&self, range: TimeWindow) -> BoxFuture<'_, GatewayResult<Vec<BusyPeriod>>> {
        Box::pin(async move { self.busy_in(range) })
    }

    fn create_event(&self, event: NewEvent) -> BoxFuture<'_, GatewayResult<CreatedEvent>> {
        Box::pin(async move {
            let event_id = self.insert(event)?;
            let link = format!("https://meet.example.com/{}", event_id);

            let meet_link = if self.join_link_delay == 0 {
                link
            } else {
                let delay = self.join_link_delay;
                let ready = link.clone();
                self.poll
                    .run(move |attempt| {
                        let ready = ready.clone();
                        async move { Ok((attempt >= delay).then_some(ready)) }
                    })
                    .await
            };

            self.set_link(&event_id, &meet_link);
            debug!(event_id = %event_id, has_link = !meet_link.is_empty(), "event created");
            Ok(CreatedEvent { event_id, meet_link })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 9, h, m, 0).unwrap()
    }

    fn day() -> TimeWindow {
        TimeWindow::new(utc(0, 0), Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn returns_seeded_busy_periods_in_range() {
        let gateway = MemoryGateway::new()
            .with_busy(BusyPeriod::new(utc(10, 0), utc(11, 0)))
            .with_busy(BusyPeriod::new(
                Utc.with_ymd_and_hms(2026, 2, 11, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 2, 11, 11, 0, 0).unwrap(),
            ));

        let busy = gateway.query_busy_periods(day()).await.unwrap();
        assert_eq!(busy, vec![BusyPeriod::new(utc(10, 0), utc(11, 0))]);
        assert_eq!(gateway.query_count(), 1);
    }

    #[tokio::test]
    async fn created_events_become_busy() {
        let gateway = MemoryGateway::new();
        let created = gateway
            .create_event(NewEvent::new("Meeting with Ada", utc(14, 0), utc(14, 30)))
            .await
            .unwrap();

        assert_eq!(created.event_id, "mem-1");
        assert_eq!(created.meet_link, "https://meet.example.com/mem-1");

        let busy = gateway
            .query_busy_periods(TimeWindow::new(utc(14, 0), utc(14, 30)))
            .await
            .unwrap();
        assert_eq!(busy.len(), 1);
        assert_eq!(gateway.events()[0].meet_link, created.meet_link);
    }

    #[tokio::test]
    async fn injected_failures() {
        let gateway = MemoryGateway::new();
        gateway.fail_queries(Some(GatewayErrorCode::AuthenticationFailed));
        let err = gateway.query_busy_periods(day()).await.unwrap_err();
        assert!(err.is_credential_problem());

        gateway.fail_queries(None);
        assert!(gateway.query_busy_periods(day()).await.is_ok());

        gateway.fail_creates(Some(GatewayErrorCode::ServerError));
        let err = gateway
            .create_event(NewEvent::new("x", utc(9, 0), utc(9, 30)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), GatewayErrorCode::ServerError);
        assert!(gateway.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_join_link_is_polled() {
        let gateway = MemoryGateway::new().with_join_link_delay(2);
        let created = gateway
            .create_event(NewEvent::new("x", utc(9, 0), utc(9, 30)))
            .await
            .unwrap();
        assert_eq!(created.meet_link, "https://meet.example.com/mem-1");
    }

    #[tokio::test(start_paused = true)]
    async fn join_link_never_ready_is_empty() {
        let gateway = MemoryGateway::new().with_join_link_delay(6);
        let created = gateway
            .create_event(NewEvent::new("x", utc(9, 0), utc(9, 30)))
            .await
            .unwrap();
        assert!(created.meet_link.is_empty());
        assert_eq!(gateway.events().len(), 1);
    }
}
