//! Request/response dispatch.
//!
//! Routes each request to validation, the slot service or the booking
//! reconciler, and turns [`EngineError`]s into protocol responses. Calendar
//! credential problems are logged here with full detail; clients only ever
//! see "temporarily unavailable".

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use meetbook_core::{SiteConfig, date_availability};
use meetbook_gateway::CalendarGateway;
use meetbook_protocol::{
    BookingRequest, BookingResponse, BookingStatus, ErrorCode, Request, Response, SlotQuery,
    SlotsResponse, StatusInfo,
};
use tracing::{Span, debug, error, info, warn};

use crate::booking::BookingReconciler;
use crate::error::{EngineError, ServerError, ServerResult};
use crate::signals::ShutdownHandle;
use crate::slots::SlotService;
use crate::socket::Connection;
use crate::validate::{validate_booking, validate_slot_query};

/// Largest `days` a single date availability request may ask for.
pub const MAX_DATE_RANGE_DAYS: u32 = 62;

const SLOTS_UNAVAILABLE: &str = "Calendar service temporarily unavailable. Please try again later.";
const SLOTS_FAILED: &str = "Failed to fetch available slots. Please try again.";
const BOOKING_CONFLICT: &str = "This time slot is no longer available. Please select another time.";
const BOOKING_UNAVAILABLE: &str = "Booking service temporarily unavailable. Please try again later.";
const BOOKING_FAILED: &str = "Failed to create booking. Please try again.";

/// Source of "now". Replaced in tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Counters shared by every connection.
#[derive(Debug)]
pub struct ServerState {
    start_time: DateTime<Utc>,
    requests_served: AtomicU64,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            start_time: Utc::now(),
            requests_served: AtomicU64::new(0),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        let duration = Utc::now() - self.start_time;
        duration.num_seconds().max(0) as u64
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }

    fn record_request(&self) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
    }
}

pub type SharedState = Arc<ServerState>;

pub fn new_shared_state() -> SharedState {
    Arc::new(ServerState::new())
}

/// Handles requests against one site configuration and calendar.
#[derive(Clone)]
pub struct RequestHandler {
    config: Arc<SiteConfig>,
    gateway: Arc<dyn CalendarGateway>,
    slots: SlotService,
    reconciler: BookingReconciler,
    state: SharedState,
    shutdown: Option<ShutdownHandle>,
    clock: Clock,
}

impl RequestHandler {
    pub fn new(config: Arc<SiteConfig>, gateway: Arc<dyn CalendarGateway>, state: SharedState) -> Self {
        Self {
            slots: SlotService::new(config.clone(), gateway.clone()),
            reconciler: BookingReconciler::new(config.clone(), gateway.clone()),
            config,
            gateway,
            state,
            shutdown: None,
            clock: Arc::new(Utc::now),
        }
    }

    /// Builder: a `shutdown` request triggers this handle.
    pub fn with_shutdown(mut self, handle: ShutdownHandle) -> Self {
        self.shutdown = Some(handle);
        self
    }

    /// Builder: override the clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn status_info(&self) -> StatusInfo {
        StatusInfo::new(
            self.state.uptime_seconds(),
            self.gateway.name(),
            self.config.timezone.name(),
        )
        .with_meeting_types(self.config.meeting_types.len())
        .with_requests_served(self.state.requests_served())
    }

    /// Handles a single request.
    #[tracing::instrument(skip(self), fields(request_type, duration_ms))]
    pub async fn handle(&self, request: &Request) -> Response {
        let start = std::time::Instant::now();
        let request_type = request_type(request);
        Span::current().record("request_type", request_type);
        self.state.record_request();

        let response = match request {
            Request::Ping => Response::Pong,
            Request::Status => Response::status(self.status_info()),
            Request::Shutdown => {
                info!("shutdown requested by client");
                if let Some(handle) = &self.shutdown {
                    handle.trigger();
                }
                Response::Ok
            }
            Request::ListMeetingTypes => Response::meeting_types(self.config.meeting_types.clone()),
            Request::GetDates {
                meeting_type,
                start_date,
                days,
            } => self.get_dates(meeting_type, *start_date, *days),
            Request::GetSlots { query } => self.get_slots(query).await,
            Request::Book { booking } => Response::booking(self.book(booking).await),
        };

        let duration = start.elapsed();
        Span::current().record("duration_ms", duration.as_millis());
        debug!(
            request_type,
            duration_ms = duration.as_millis(),
            success = response.is_success(),
            "request handled"
        );

        response
    }

    fn get_dates(&self, meeting_type: &str, start_date: NaiveDate, days: u32) -> Response {
        if self.config.meeting_type(meeting_type).is_none() {
            return Response::error(
                ErrorCode::InvalidRequest,
                format!("Unknown meeting type: {}", meeting_type),
            );
        }
        if days == 0 || days > MAX_DATE_RANGE_DAYS {
            return Response::error(
                ErrorCode::InvalidRequest,
                format!("days must be between 1 and {}", MAX_DATE_RANGE_DAYS),
            );
        }

        match date_availability(&self.config, start_date, days, self.now()) {
            Ok(dates) => Response::dates(meeting_type, dates),
            Err(e) => Response::error(ErrorCode::InvalidRequest, e.to_string()),
        }
    }

    async fn get_slots(&self, query: &SlotQuery) -> Response {
        let result = async {
            let valid = validate_slot_query(&self.config, query)?;
            let slots = self
                .slots
                .available_slots(valid.date, &valid.meeting_type, self.now())
                .await?;
            Ok::<_, EngineError>(SlotsResponse {
                date: valid.date,
                timezone: valid.timezone.name().to_string(),
                meeting_type: valid.meeting_type,
                slots,
            })
        }
        .await;

        match result {
            Ok(slots) => Response::slots(slots),
            Err(e) => {
                log_engine_error(&e);
                match e {
                    EngineError::Validation(message) => {
                        Response::error(ErrorCode::InvalidRequest, message)
                    }
                    EngineError::GatewayAuth(_) => {
                        Response::error(ErrorCode::ServiceUnavailable, SLOTS_UNAVAILABLE)
                    }
                    EngineError::Conflict | EngineError::GatewayTransient(_) => {
                        Response::error(ErrorCode::ProviderError, SLOTS_FAILED)
                    }
                }
            }
        }
    }

    async fn book(&self, request: &BookingRequest) -> BookingResponse {
        let result = async {
            let valid = validate_booking(&self.config, request, self.now())?;
            self.reconciler.book(valid).await
        }
        .await;

        match result {
            Ok(c) => BookingResponse::created(c.event_id, c.meet_link, c.start, c.end),
            Err(e) => {
                log_engine_error(&e);
                match e {
                    EngineError::Validation(message) => {
                        BookingResponse::rejected(BookingStatus::Invalid, message)
                    }
                    EngineError::Conflict => {
                        BookingResponse::rejected(BookingStatus::Conflict, BOOKING_CONFLICT)
                    }
                    EngineError::GatewayAuth(_) => {
                        BookingResponse::rejected(BookingStatus::Unavailable, BOOKING_UNAVAILABLE)
                    }
                    EngineError::GatewayTransient(_) => {
                        BookingResponse::rejected(BookingStatus::Failed, BOOKING_FAILED)
                    }
                }
            }
        }
    }

    /// Serves requests on `conn` until the client disconnects.
    pub async fn handle_connection(&self, mut conn: Connection) -> ServerResult<()> {
        loop {
            match conn.read_request().await {
                Ok(Some(envelope)) => {
                    let response = self.handle(&envelope.payload).await;
                    conn.respond(&envelope.request_id, response).await?;

                    if self.shutdown.as_ref().is_some_and(ShutdownHandle::is_shutdown) {
                        return Err(ServerError::Shutdown);
                    }
                }
                Ok(None) => {
                    debug!("client disconnected");
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "error reading request");
                    return Err(e);
                }
            }
        }
    }
}

fn request_type(request: &Request) -> &'static str {
    match request {
        Request::Ping => "ping",
        Request::Status => "status",
        Request::Shutdown => "shutdown",
        Request::ListMeetingTypes => "list_meeting_types",
        Request::GetDates { .. } => "get_dates",
        Request::GetSlots { .. } => "get_slots",
        Request::Book { .. } => "book",
    }
}

fn log_engine_error(err: &EngineError) {
    match err {
        EngineError::Validation(message) => debug!(%message, "rejected invalid request"),
        EngineError::Conflict => info!("booking conflict"),
        EngineError::GatewayAuth(source) => error!(
            gateway = source.gateway().unwrap_or("unknown"),
            code = source.code().as_str(),
            error = %source,
            "calendar credentials rejected"
        ),
        EngineError::GatewayTransient(source) => warn!(
            gateway = source.gateway().unwrap_or("unknown"),
            code = source.code().as_str(),
            error = %source,
            "calendar request failed"
        ),
    }
}

/// Connection handler closure for [`SocketServer::run`](crate::SocketServer::run).
pub fn make_connection_handler(
    handler: RequestHandler,
) -> impl Fn(Connection) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static {
    move |conn| {
        let handler = handler.clone();
        Box::pin(async move {
            if let Err(e) = handler.handle_connection(conn).await
                && !matches!(e, ServerError::Shutdown)
            {
                warn!(error = %e, "connection handler error");
            }
        })
    }
}
