//! Heuristic depth-first walk over an arbitrary upstream response.
//!
//! The routing rules are tuned to real upstream payloads and are kept as-is:
//!
//! - an object with a `data` array descends into that array only;
//! - otherwise an object with an `events` array descends into that array only;
//! - otherwise an object is tested as a candidate and, matched or not, all of
//!   its property values are walked in insertion order.
//!
//! Because matching does not stop descent, an event whose children also
//! qualify produces several overlapping records. They are not deduplicated.

use serde_json::Value;

use crate::fields::{is_event_candidate, normalize_event};
use crate::types::NormalizedEvent;

/// Deepest level (root = 0) at which nodes are still inspected.
pub const MAX_DEPTH: usize = 10;

const DATA_ENVELOPE_KEY: &str = "data";
const EVENTS_ENVELOPE_KEY: &str = "events";

/// Collects every event-like object in `root`, in pre-order.
///
/// Never fails: scalars, unmatched objects and anything below
/// [`MAX_DEPTH`] simply contribute nothing.
#[must_use]
pub fn extract_events(root: &Value) -> Vec<NormalizedEvent> {
    fn walk(node: &Value, depth: usize, out: &mut Vec<NormalizedEvent>) {
        if !(node.is_object() || node.is_array()) {
            return;
        }
        if depth > MAX_DEPTH {
            return;
        }

        match node {
            Value::Array(items) => {
                for item in items {
                    walk(item, depth + 1, out);
                }
            }
            Value::Object(map) => {
                if let Some(items) = envelope(node) {
                    for item in items {
                        walk(item, depth + 1, out);
                    }
                    return;
                }

                if is_event_candidate(node) {
                    out.push(normalize_event(node));
                }

                for value in map.values() {
                    walk(value, depth + 1, out);
                }
            }
            _ => {}
        }
    }

    let mut events = Vec::new();
    walk(root, 0, &mut events);
    events
}

/// Returns the wrapped array for the two known envelope shapes, `data`
/// taking precedence over `events`.
pub(crate) fn envelope(node: &Value) -> Option<&Vec<Value>> {
    node.get(DATA_ENVELOPE_KEY)
        .and_then(Value::as_array)
        .or_else(|| node.get(EVENTS_ENVELOPE_KEY).and_then(Value::as_array))
}
