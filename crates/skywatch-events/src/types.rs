use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AstroError;

/// Widest window the upstream accepts in a single request.
pub const MAX_WINDOW_DAYS: u32 = 30;

/// A single event pulled out of an upstream response.
///
/// All four fields are raw, unescaped text; an absent source yields `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub name: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub when: String,
    pub extra: String,
}

/// Result of running extraction plus fallbacks over one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventsOutcome {
    /// At least one event was recovered.
    Found(Vec<NormalizedEvent>),
    /// Nothing matched; callers show an empty-state message, not an error.
    Empty,
}

impl EventsOutcome {
    #[must_use]
    pub fn from_events(events: Vec<NormalizedEvent>) -> Self {
        if events.is_empty() {
            Self::Empty
        } else {
            Self::Found(events)
        }
    }

    #[must_use]
    pub fn events(&self) -> &[NormalizedEvent] {
        match self {
            Self::Found(events) => events,
            Self::Empty => &[],
        }
    }

    #[must_use]
    pub fn into_events(self) -> Vec<NormalizedEvent> {
        match self {
            Self::Found(events) => events,
            Self::Empty => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Parameters for one upstream events request.
#[derive(Debug, Clone, PartialEq)]
pub struct EventsQuery {
    pub body: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub from_date: NaiveDate,
    pub days: u32,
}

impl EventsQuery {
    /// Builds a validated query. `days` is clamped to `1..=30`.
    ///
    /// # Errors
    ///
    /// Returns [`AstroError::InvalidQuery`] if the body name is empty or not
    /// alphanumeric, or if the coordinates are out of range.
    pub fn new(
        body: &str,
        latitude: f64,
        longitude: f64,
        from_date: NaiveDate,
        days: u32,
    ) -> Result<Self, AstroError> {
        let body = body.trim().to_ascii_lowercase();
        if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AstroError::InvalidQuery(format!(
                "body must be a non-empty alphanumeric name, got '{body}'"
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AstroError::InvalidQuery(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AstroError::InvalidQuery(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }

        Ok(Self {
            body,
            latitude,
            longitude,
            elevation: 0.0,
            from_date,
            days: days.clamp(1, MAX_WINDOW_DAYS),
        })
    }

    #[must_use]
    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }

    /// Last day of the window (`from_date + days`).
    #[must_use]
    pub fn to_date(&self) -> NaiveDate {
        self.from_date
            .checked_add_days(Days::new(u64::from(self.days)))
            .unwrap_or(NaiveDate::MAX)
    }
}
