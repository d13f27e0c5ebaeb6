//! [`CalendarGateway`] implementation for Google Calendar.

use meetbook_core::{BusyPeriod, TimeWindow};
use tracing::{debug, info, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{BoxFuture, CalendarGateway, CreatedEvent, NewEvent};

use super::client::{
    ConferenceDataRequest, ConferenceSolutionKey, CreateConferenceRequest, EventAttendee,
    EventDateTime, EventInsert, GoogleCalendarClient, Reminders, http_client,
};
use super::config::GoogleConfig;
use super::tokens::TokenCache;

const GATEWAY_NAME: &str = "google";

/// Google Calendar gateway.
pub struct GoogleGateway {
    config: GoogleConfig,
    tokens: TokenCache,
    client: GoogleCalendarClient,
}

impl GoogleGateway {
    /// Creates a gateway after validating `config`.
    pub fn new(config: GoogleConfig) -> GatewayResult<Self> {
        config
            .validate()
            .map_err(|e| GatewayError::configuration(e).with_gateway(GATEWAY_NAME))?;

        let http = http_client(config.timeout)?;
        let tokens = TokenCache::new(
            http.clone(),
            config.credentials.clone(),
            config.refresh_token.clone(),
            config.token_url.clone(),
        );
        let client = GoogleCalendarClient::new(http, config.api_base.clone());

        Ok(Self {
            config,
            tokens,
            client,
        })
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    /// Drops the cached token on credential errors so the next call
    /// refreshes instead of reusing a token Google already rejected.
    async fn note_error(&self, err: GatewayError) -> GatewayError {
        if err.is_credential_problem() {
            self.tokens.invalidate().await;
        }
        err.with_gateway(GATEWAY_NAME)
    }

    async fn busy_periods(&self, range: TimeWindow) -> GatewayResult<Vec<BusyPeriod>> {
        let token = match self.tokens.access_token().await {
            Ok(token) => token,
            Err(e) => return Err(self.note_error(e).await),
        };

        match self
            .client
            .free_busy(&token, &self.config.calendar_id, &self.config.timezone, range)
            .await
        {
            Ok(busy) => Ok(busy),
            Err(e) => Err(self.note_error(e).await),
        }
    }

    async fn insert(&self, event: NewEvent) -> GatewayResult<CreatedEvent> {
        let token = match self.tokens.access_token().await {
            Ok(token) => token,
            Err(e) => return Err(self.note_error(e).await),
        };

        let tz = self.config.timezone.as_str();
        let body = EventInsert {
            summary: &event.summary,
            description: &event.description,
            start: EventDateTime {
                date_time: event.start,
                time_zone: tz,
            },
            end: EventDateTime {
                date_time: event.end,
                time_zone: tz,
            },
            attendees: vec![
                EventAttendee {
                    email: &self.config.owner_email,
                    response_status: Some("accepted"),
                },
                EventAttendee {
                    email: &event.attendee_email,
                    response_status: None,
                },
            ],
            conference_data: ConferenceDataRequest {
                create_request: CreateConferenceRequest {
                    request_id: uuid::Uuid::new_v4().to_string(),
                    conference_solution_key: ConferenceSolutionKey {
                        kind: "hangoutsMeet",
                    },
                },
            },
            reminders: Reminders { use_default: true },
        };

        let created = match self
            .client
            .insert_event(&token, &self.config.calendar_id, &body)
            .await
        {
            Ok(created) => created,
            Err(e) => return Err(self.note_error(e).await),
        };

        if created.id.is_empty() {
            return Err(
                GatewayError::invalid_response("created event has no id").with_gateway(GATEWAY_NAME)
            );
        }
        info!(event_id = %created.id, "created calendar event");

        let meet_link = match created.join_link() {
            Some(link) => link,
            None => {
                debug!(event_id = %created.id, "conference pending, polling for join link");
                let calendar_id = self.config.calendar_id.as_str();
                let event_id = created.id.as_str();
                let token = token.as_str();
                self.config
                    .join_link_poll
                    .run(move |_| async move {
                        self.client
                            .get_event(token, calendar_id, event_id)
                            .await
                            .map(|e| e.join_link())
                    })
                    .await
            }
        };

        if meet_link.is_empty() {
            warn!(event_id = %created.id, "event created without a join link");
        }

        Ok(CreatedEvent {
            event_id: created.id,
            meet_link,
        })
    }
}

impl CalendarGateway for GoogleGateway {
    fn name(&self) -> &str {
        GATEWAY_NAME
    }

    fn query_busy_periods(&self, range: TimeWindow) -> BoxFuture<'_, GatewayResult<Vec<BusyPeriod>>> {
        Box::pin(self.busy_periods(range))
    }

    fn create_event(&self, event: NewEvent) -> BoxFuture<'_, GatewayResult<CreatedEvent>> {
        Box::pin(self.insert(event))
    }
}
