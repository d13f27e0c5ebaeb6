//! Host site configuration.
//!
//! The [`SiteConfig`] describes everything the availability engine needs to
//! know about the host: the base timezone, the weekly availability windows,
//! and the catalog of bookable meeting types. It is parsed from the `[site]`
//! section of the TOML configuration, validated once, and then shared
//! read-only for the life of the process.

use std::collections::HashSet;

use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors found while loading or validating the site configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse site config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An availability window does not end after it starts.
    #[error("availability window for {day} must start before it ends ({start} >= {end})")]
    EmptyWindow {
        day: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    },

    /// A meeting type has no slug.
    #[error("meeting type '{title}' has an empty slug")]
    EmptySlug { title: String },

    /// Two meeting types share a slug.
    #[error("duplicate meeting type slug '{0}'")]
    DuplicateSlug(String),

    /// A meeting type has a zero duration.
    #[error("meeting type '{0}' must have a positive duration")]
    ZeroDuration(String),

    /// The booking horizon is beyond [`SiteConfig::MAX_BOOKING_DAYS`].
    #[error("max_booking_days must be at most {max} (got {days})")]
    HorizonTooLong { days: u32, max: u32 },

    /// A meeting type's notice is beyond [`MeetingType::MAX_MIN_NOTICE_HOURS`].
    #[error("meeting type '{slug}' min_notice_hours must be at most {max} (got {hours})")]
    NoticeTooLong { slug: String, hours: u32, max: u32 },
}

/// Profile information about the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Owner {
    /// Display name of the host.
    pub name: String,
    /// Short tagline shown next to the host's name.
    pub tagline: String,
    /// Public booking page URL, mentioned in created events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
}

/// A recurring availability window for one day of the week.
///
/// Times are local to the site's base timezone and written as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    /// Local start time of the window.
    #[serde(
        serialize_with = "serialize_hhmm",
        deserialize_with = "deserialize_hhmm"
    )]
    pub start: NaiveTime,
    /// Local end time of the window.
    #[serde(
        serialize_with = "serialize_hhmm",
        deserialize_with = "deserialize_hhmm"
    )]
    pub end: NaiveTime,
}

impl AvailabilityWindow {
    /// Creates a window from two local times.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parses a window from `"HH:MM"` strings.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        let start = NaiveTime::parse_from_str(start, "%H:%M").ok()?;
        let end = NaiveTime::parse_from_str(end, "%H:%M").ok()?;
        Some(Self { start, end })
    }
}

/// Weekly availability. A `None` entry means the host is never bookable
/// that day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyAvailability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunday: Option<AvailabilityWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday: Option<AvailabilityWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<AvailabilityWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<AvailabilityWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thursday: Option<AvailabilityWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friday: Option<AvailabilityWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturday: Option<AvailabilityWindow>,
}

impl WeeklyAvailability {
    /// Returns the window configured for a weekday.
    pub fn for_weekday(&self, day: Weekday) -> Option<&AvailabilityWindow> {
        match day {
            Weekday::Sun => self.sunday.as_ref(),
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
        }
    }

    /// Returns a mutable slot for a weekday's window.
    pub fn slot_mut(&mut self, day: Weekday) -> &mut Option<AvailabilityWindow> {
        match day {
            Weekday::Sun => &mut self.sunday,
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
        }
    }

    /// Builder: set the window for a weekday.
    pub fn with_day(mut self, day: Weekday, window: AvailabilityWindow) -> Self {
        *self.slot_mut(day) = Some(window);
        self
    }

    /// Iterates over all configured days, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &AvailabilityWindow)> {
        [
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ]
        .into_iter()
        .filter_map(|day| self.for_weekday(day).map(|w| (day, w)))
    }
}

/// A bookable meeting type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingType {
    /// Unique identifier used in booking links.
    pub slug: String,
    /// Human-readable title.
    pub title: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Length of the meeting in minutes.
    #[serde(alias = "duration")]
    pub duration_minutes: u32,
    /// Minutes that must stay free before and after the meeting.
    #[serde(default)]
    pub buffer_minutes: u32,
    /// Minimum lead time between now and the meeting start.
    #[serde(default)]
    pub min_notice_hours: u32,
    /// Display color (CSS hex).
    #[serde(default)]
    pub color: String,
}

impl MeetingType {
    /// Creates a meeting type with no buffer and no minimum notice.
    pub fn new(slug: impl Into<String>, title: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            description: String::new(),
            duration_minutes,
            buffer_minutes: 0,
            min_notice_hours: 0,
            color: String::new(),
        }
    }

    /// Builder: set buffer minutes.
    pub fn with_buffer(mut self, minutes: u32) -> Self {
        self.buffer_minutes = minutes;
        self
    }

    /// Builder: set minimum notice hours.
    pub fn with_min_notice(mut self, hours: u32) -> Self {
        self.min_notice_hours = hours;
        self
    }

    /// Builder: set description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Meeting length as a chrono duration.
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Buffer as a chrono duration.
    pub fn buffer(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.buffer_minutes))
    }

    /// Largest accepted `min_notice_hours`, ten years.
    pub const MAX_MIN_NOTICE_HOURS: u32 = 24 * 3650;

    /// Minimum notice as a chrono duration.
    pub fn min_notice(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.min_notice_hours))
    }
}

/// Complete, validated host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base timezone for all availability windows.
    #[serde(serialize_with = "serialize_tz", deserialize_with = "deserialize_tz")]
    pub timezone: Tz,

    /// How many days ahead bookings may be made.
    #[serde(default = "default_max_booking_days")]
    pub max_booking_days: u32,

    /// Host profile.
    #[serde(default)]
    pub owner: Owner,

    /// Weekly availability windows.
    #[serde(default)]
    pub availability: WeeklyAvailability,

    /// Bookable meeting types.
    #[serde(default)]
    pub meeting_types: Vec<MeetingType>,
}

fn default_max_booking_days() -> u32 {
    SiteConfig::DEFAULT_MAX_BOOKING_DAYS
}

impl SiteConfig {
    /// Default booking horizon in days.
    pub const DEFAULT_MAX_BOOKING_DAYS: u32 = 30;

    /// Largest accepted booking horizon, ten years.
    pub const MAX_BOOKING_DAYS: u32 = 3650;

    /// Creates an empty configuration in the given base timezone.
    pub fn new(timezone: Tz) -> Self {
        Self {
            owner: Owner::default(),
            timezone,
            availability: WeeklyAvailability::default(),
            meeting_types: Vec::new(),
            max_booking_days: Self::DEFAULT_MAX_BOOKING_DAYS,
        }
    }

    /// Parses and validates a configuration from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder: set weekly availability.
    pub fn with_availability(mut self, availability: WeeklyAvailability) -> Self {
        self.availability = availability;
        self
    }

    /// Builder: add a meeting type.
    pub fn with_meeting_type(mut self, meeting_type: MeetingType) -> Self {
        self.meeting_types.push(meeting_type);
        self
    }

    /// Builder: set the booking horizon.
    pub fn with_max_booking_days(mut self, days: u32) -> Self {
        self.max_booking_days = days;
        self
    }

    /// Builder: set the owner profile.
    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = owner;
        self
    }

    /// Looks up a meeting type by slug.
    pub fn meeting_type(&self, slug: &str) -> Option<&MeetingType> {
        self.meeting_types.iter().find(|mt| mt.slug == slug)
    }

    /// Returns the availability window for a weekday.
    pub fn window_for(&self, day: Weekday) -> Option<&AvailabilityWindow> {
        self.availability.for_weekday(day)
    }

    /// Checks the invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_booking_days > Self::MAX_BOOKING_DAYS {
            return Err(ConfigError::HorizonTooLong {
                days: self.max_booking_days,
                max: Self::MAX_BOOKING_DAYS,
            });
        }

        for (day, window) in self.availability.iter() {
            if window.start >= window.end {
                return Err(ConfigError::EmptyWindow {
                    day,
                    start: window.start,
                    end: window.end,
                });
            }
        }

        let mut seen = HashSet::new();
        for mt in &self.meeting_types {
            if mt.slug.trim().is_empty() {
                return Err(ConfigError::EmptySlug {
                    title: mt.title.clone(),
                });
            }
            if !seen.insert(mt.slug.as_str()) {
                return Err(ConfigError::DuplicateSlug(mt.slug.clone()));
            }
            if mt.duration_minutes == 0 {
                return Err(ConfigError::ZeroDuration(mt.slug.clone()));
            }
            if mt.min_notice_hours > MeetingType::MAX_MIN_NOTICE_HOURS {
                return Err(ConfigError::NoticeTooLong {
                    slug: mt.slug.clone(),
                    hours: mt.min_notice_hours,
                    max: MeetingType::MAX_MIN_NOTICE_HOURS,
                });
            }
        }

        Ok(())
    }
}

fn serialize_hhmm<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format("%H:%M").to_string())
}

fn deserialize_hhmm<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
    let value = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&value, "%H:%M")
        .map_err(|e| serde::de::Error::custom(format!("invalid time '{}': {}", value, e)))
}

fn serialize_tz<S: Serializer>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(tz.name())
}

fn deserialize_tz<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tz, D::Error> {
    let value = String::deserialize(deserializer)?;
    value
        .parse::<Tz>()
        .map_err(|_| serde::de::Error::custom(format!("unknown timezone '{}'", value)))
}
