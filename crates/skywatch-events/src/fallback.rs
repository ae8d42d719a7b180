//! Caller-level fallbacks for responses the tree walk cannot classify.

use serde_json::Value;

use crate::extract::extract_events;
use crate::fields::normalize_event;
use crate::types::{EventsOutcome, NormalizedEvent};

/// Message shown to users when neither the walk nor the fallbacks find
/// anything.
pub const EMPTY_MESSAGE: &str = "no events found";

/// Runs [`extract_events`] and, if it finds nothing, tries in order:
///
/// 1. a top-level `data` array, each element normalized directly;
/// 2. a top-level `events` array, likewise;
/// 3. a top-level array, likewise.
///
/// The fallbacks skip the candidate test, so rows that only carry a name or
/// only a type still come through. The first non-empty result wins.
#[must_use]
pub fn extract_with_fallback(root: &Value) -> EventsOutcome {
    let outcome = EventsOutcome::from_events(extract_events(root));
    if !outcome.is_empty() {
        return outcome;
    }

    let fallbacks = [
        root.get("data").and_then(Value::as_array),
        root.get("events").and_then(Value::as_array),
        root.as_array(),
    ];

    for items in fallbacks.into_iter().flatten() {
        let outcome = EventsOutcome::from_events(normalize_all(items));
        if !outcome.is_empty() {
            tracing::debug!(count = outcome.events().len(), "events recovered by fallback");
            return outcome;
        }
    }

    EventsOutcome::Empty
}

fn normalize_all(items: &[Value]) -> Vec<NormalizedEvent> {
    items.iter().map(normalize_event).collect()
}
