//! Field-priority lookup shared by the tree walker and the fallbacks.
//!
//! Each output field has an ordered list of source keys. The first key whose
//! value is truthy wins; `null`, `false`, numeric zero and `""` count as
//! absent, so `{"name": "", "body": "Jupiter"}` resolves to `"Jupiter"`.

use serde_json::{Map, Value};

use crate::types::NormalizedEvent;

pub const NAME_KEYS: [&str; 5] = ["name", "body", "object", "target", "bodyName"];
pub const TYPE_KEYS: [&str; 5] = ["type", "event_type", "category", "kind", "eventType"];
pub const WHEN_KEYS: [&str; 6] = ["time", "date", "occursAt", "peak", "instant", "datetime"];
pub const EXTRA_KEYS: [&str; 5] = ["magnitude", "mag", "altitude", "note", "description"];

/// Key whose whole value is serialized into `extra` when none of
/// [`EXTRA_KEYS`] is set.
pub const EXTRA_OBJECT_KEY: &str = "extra";

/// Truthiness as the upstream front ends apply it.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Renders a JSON value as display text.
///
/// Strings are returned verbatim, integral floats below `1e21` drop their
/// fractional part (`2.0` becomes `"2"`), other floats use the shortest
/// round-trip form (`1e-7`), composites become compact JSON.
#[must_use]
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return n.to_string();
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
                _ => n.to_string(),
            }
        }
        Value::Array(_) | Value::Object(_) => compact_json(value),
    }
}

fn compact_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Returns the first truthy value among `keys`, in order.
fn first_truthy<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| is_truthy(value))
}

fn pick(map: &Map<String, Value>, keys: &[&str]) -> String {
    first_truthy(map, keys).map(value_to_text).unwrap_or_default()
}

/// `true` iff `node` is an object with a truthy name-group value and a
/// truthy type-group value. Either group alone is not enough.
#[must_use]
pub fn is_event_candidate(node: &Value) -> bool {
    node.as_object().is_some_and(|map| {
        first_truthy(map, &TYPE_KEYS).is_some() && first_truthy(map, &NAME_KEYS).is_some()
    })
}

/// Maps one node to a [`NormalizedEvent`] via the field-priority tables.
///
/// Does not check candidacy; a non-object yields an all-empty record.
#[must_use]
pub fn normalize_event(node: &Value) -> NormalizedEvent {
    let Some(map) = node.as_object() else {
        return NormalizedEvent::default();
    };

    let extra = match first_truthy(map, &EXTRA_KEYS) {
        Some(value) => value_to_text(value),
        None => map
            .get(EXTRA_OBJECT_KEY)
            .filter(|value| is_truthy(value))
            .map(compact_json)
            .unwrap_or_default(),
    };

    NormalizedEvent {
        name: pick(map, &NAME_KEYS),
        event_type: pick(map, &TYPE_KEYS),
        when: pick(map, &WHEN_KEYS),
        extra,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn falsy_values() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!(-0.0), json!("")] {
            assert!(!is_truthy(&v), "{v} should be falsy");
        }
    }

    #[test]
    fn truthy_values() {
        for v in [json!(true), json!(1), json!(-2.5), json!("0"), json!(" "), json!([]), json!({})] {
            assert!(is_truthy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn value_to_text_formats_numbers() {
        assert_eq!(value_to_text(&json!(42)), "42");
        assert_eq!(value_to_text(&json!(-7)), "-7");
        assert_eq!(value_to_text(&json!(2.0)), "2");
        assert_eq!(value_to_text(&json!(-1.5)), "-1.5");
        assert_eq!(value_to_text(&json!(408.25)), "408.25");
        assert_eq!(value_to_text(&json!(1e-7)), "1e-7");
        assert_eq!(value_to_text(&json!(1.5e300)), "1.5e300");
    }

    #[test]
    fn value_to_text_formats_composites_as_json() {
        assert_eq!(value_to_text(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(value_to_text(&json!([1, "x"])), r#"[1,"x"]"#);
        assert_eq!(value_to_text(&json!(true)), "true");
    }

    #[test]
    fn empty_name_falls_through_to_body() {
        let node = json!({"name": "", "body": "Jupiter", "type": "opposition"});
        let event = normalize_event(&node);
        assert_eq!(event.name, "Jupiter");
        assert_eq!(event.event_type, "opposition");
    }

    #[test]
    fn earlier_key_wins_over_later_key() {
        let node = json!({"bodyName": "late", "target": "early", "kind": "k", "type": "t"});
        let event = normalize_event(&node);
        assert_eq!(event.name, "early");
        assert_eq!(event.event_type, "t");
    }

    #[test]
    fn zero_magnitude_falls_through_to_mag() {
        let node = json!({"magnitude": 0, "mag": -1.2, "name": "Venus", "type": "elongation"});
        assert_eq!(normalize_event(&node).extra, "-1.2");
    }

    #[test]
    fn extra_object_is_serialized_when_no_extra_keys() {
        let node = json!({
            "name": "Sun",
            "type": "eclipse",
            "extra": {"obscuration": 0.42, "kind": "partial"}
        });
        assert_eq!(
            normalize_event(&node).extra,
            r#"{"obscuration":0.42,"kind":"partial"}"#
        );
    }

    #[test]
    fn extra_string_is_serialized_as_json() {
        let node = json!({"name": "Sun", "type": "eclipse", "extra": "annular"});
        assert_eq!(normalize_event(&node).extra, r#""annular""#);
    }

    #[test]
    fn description_beats_extra_object() {
        let node = json!({
            "name": "Sun",
            "type": "eclipse",
            "description": "visible from Europe",
            "extra": {"ignored": true}
        });
        assert_eq!(normalize_event(&node).extra, "visible from Europe");
    }

    #[test]
    fn when_uses_priority_order() {
        let node = json!({"datetime": "late", "peak": "2025-08-12T20:00:00Z", "date": null});
        assert_eq!(normalize_event(&node).when, "2025-08-12T20:00:00Z");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let event = normalize_event(&json!({"unrelated": 1}));
        assert_eq!(event, NormalizedEvent::default());
    }

    #[test]
    fn non_object_normalizes_to_empty_record() {
        assert_eq!(normalize_event(&json!("Mars")), NormalizedEvent::default());
        assert_eq!(normalize_event(&json!([1, 2])), NormalizedEvent::default());
    }

    #[test]
    fn candidate_requires_both_groups() {
        assert!(is_event_candidate(&json!({"name": "Mars", "type": "opposition"})));
        assert!(is_event_candidate(&json!({"target": "M31", "category": "transit"})));
        assert!(!is_event_candidate(&json!({"name": "Mars"})));
        assert!(!is_event_candidate(&json!({"type": "opposition"})));
        assert!(!is_event_candidate(&json!({"name": "", "type": "opposition"})));
        assert!(!is_event_candidate(&json!({"name": "Mars", "kind": 0})));
        assert!(!is_event_candidate(&json!(["name", "type"])));
    }

    #[test]
    fn composite_name_counts_as_present() {
        let node = json!({"body": {"id": "moon"}, "type": "occultation"});
        assert!(is_event_candidate(&node));
        assert_eq!(normalize_event(&node).name, r#"{"id":"moon"}"#);
    }
}
