//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use skywatch_events::{NormalizedEvent, EMPTY_MESSAGE};

const HEADER: &str = "when\ttype\tname\textra";

/// Renders events as tab-separated rows under a header line, or the
/// empty-state message when there are none.
pub(crate) fn render_table(events: &[NormalizedEvent]) -> String {
    if events.is_empty() {
        return format!("{EMPTY_MESSAGE}\n");
    }

    let mut out = String::with_capacity(64 * (events.len() + 1));
    out.push_str(HEADER);
    out.push('\n');
    for event in events {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}",
            cell(&event.when),
            cell(&event.event_type),
            cell(&event.name),
            cell(&event.extra)
        );
    }
    out
}

/// Tabs and line breaks inside a value would break the column layout.
fn cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
