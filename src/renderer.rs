//! # Status Rendering
//!
//! Terminal rendering of decoder status for development mode and the polling
//! loop. A status line is intentionally one short row so it reads well in a
//! systemd journal.

use crate::StatusSnapshot;

/// Format a snapshot as a single status line.
///
/// The decoded time is shown only while it is valid; otherwise a placeholder
/// keeps the column layout stable across polls.
pub fn format_status(status: &StatusSnapshot) -> String {
    let time = if status.valid {
        format!("{:02}:{:02}", status.hour, status.minute)
    } else {
        "--:--".to_string()
    };

    format!(
        "{} +{:02}s  signal:{} valid:{}",
        time,
        status.second,
        if status.signal { "yes" } else { " no" },
        if status.valid { "yes" } else { " no" },
    )
}

/// Print a snapshot to stdout.
pub fn draw_ascii(status: &StatusSnapshot) {
    println!("{}", format_status(status));
}
