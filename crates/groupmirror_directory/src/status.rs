//! Sync status reported to readers.

use crate::group::{count_members, DirectorySnapshot};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt::Write;
use std::time::Duration;

/// Status of a directory mirror.
///
/// `last_sync` is the start of the most recent attempt, successful or not.
/// `last_success` is the start of the most recent attempt that published a
/// snapshot. Timestamps that were never set serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    /// Start of the last sync attempt.
    pub last_sync: Option<DateTime<Utc>>,
    /// How long the last attempt took.
    #[serde(serialize_with = "serialize_duration")]
    pub last_sync_duration: Duration,
    /// When the next attempt is scheduled.
    pub next_sync: Option<DateTime<Utc>>,
    /// Number of groups in the published snapshot.
    pub known_groups: usize,
    /// Number of member entries in the published snapshot.
    pub known_users: usize,
    /// Whether an attempt is running right now.
    pub sync_in_progress: bool,
    /// Start of the last attempt that succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,
}

impl Status {
    /// Recomputes the group and member counts from a snapshot.
    ///
    /// `None` (nothing published yet) resets both counts to zero.
    pub fn update_counts(&mut self, snapshot: Option<&DirectorySnapshot>) {
        self.known_groups = snapshot.map_or(0, |s| s.len());
        self.known_users = snapshot.map_or(0, count_members);
    }
}

fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_duration(*duration))
}

/// Formats a duration the way Go's `time.Duration` prints: `15s`,
/// `1m30.5s`, `2h0m0s`, `250ms`, `0s`.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", with_fraction(nanos, 1_000));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", with_fraction(nanos, 1_000_000));
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let _ = write!(out, "{}s", with_fraction(nanos % 60_000_000_000, 1_000_000_000));
    out
}

/// `value / unit` with the remainder as trimmed decimal digits.
fn with_fraction(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.to_string().len() - 1;
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
