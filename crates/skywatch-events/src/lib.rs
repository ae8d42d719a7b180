//! Astronomy-event extraction for loosely structured upstream JSON.
//!
//! [`extract_events`] walks an arbitrary response tree and pulls out every
//! object that looks like an event; [`extract_with_fallback`] layers the
//! caller-level fallbacks on top. [`AstroClient`] fetches the raw documents.

pub mod client;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod fields;
pub mod types;

pub use client::AstroClient;
pub use error::{upstream_error, AstroError, FailureKind};
pub use extract::{extract_events, MAX_DEPTH};
pub use fallback::{extract_with_fallback, EMPTY_MESSAGE};
pub use fields::{is_event_candidate, normalize_event};
pub use types::{EventsOutcome, EventsQuery, NormalizedEvent};
