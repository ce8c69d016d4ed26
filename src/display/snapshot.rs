//! Snapshot display formatting
//!
//! Formats snapshot folders for `list` and `prune` output.

use chrono::NaiveDateTime;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::backup::{is_expired, SnapshotInfo};

#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Snapshot")]
    name: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

/// Format snapshots as a table, marking those older than `cutoff`
pub fn format_snapshot_table(
    snapshots: &[SnapshotInfo],
    now: NaiveDateTime,
    cutoff: NaiveDateTime,
) -> String {
    if snapshots.is_empty() {
        return "No snapshots found.".to_string();
    }

    let rows = snapshots.iter().enumerate().map(|(i, s)| SnapshotRow {
        index: i + 1,
        name: s.id.to_string(),
        age: format_age(now.signed_duration_since(s.id.timestamp())),
        status: if is_expired(&s.id, cutoff) {
            "expired"
        } else {
            "kept"
        },
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

/// Format an age in human-readable form
pub fn format_age(duration: chrono::Duration) -> String {
    let total_minutes = duration.num_minutes();

    if total_minutes < 1 {
        return "just now".to_string();
    }
    if total_minutes < 60 {
        return format!("{}m", total_minutes);
    }

    let hours = total_minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 60 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}
