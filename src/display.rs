//! Text helpers shared by the CLI tables and the TUI widgets.

use chrono::{DateTime, Utc};

use johny::models::MasteryLevel;

/// One filled cell per level, out of four.
pub fn mastery_bar(level: MasteryLevel) -> String {
    let filled = level.as_i32() as usize;
    let empty = MasteryLevel::MAX.as_i32() as usize - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

pub fn format_when(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let date = at.format("%Y-%m-%d");
    if at <= now {
        format!("{} (due)", date)
    } else {
        date.to_string()
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
