//! Core types: site config, civil time, slot generation, availability

pub mod availability;
pub mod config;
pub mod slots;
pub mod time;
pub mod tracing;

pub use availability::{
    BusyPeriod, DateAvailability, TimeSlot, date_availability, day_of_week, filter_available,
    is_date_bookable, is_slot_busy, meets_minimum_notice,
};
pub use config::{
    AvailabilityWindow, ConfigError, MeetingType, Owner, SiteConfig, WeeklyAvailability,
};
pub use slots::{CandidateSlot, SLOT_INTERVAL_MINUTES, generate_candidates};
pub use time::{TimeError, TimeWindow, local_to_utc};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
