use chrono::{Duration, NaiveTime};
use unicode_width::UnicodeWidthStr;

/// Format a NaiveTime to "HH:MM"
pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// "1sa 5dk", or "45dk" under an hour. Negative durations read as zero.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_minutes().max(0);
    let (hours, minutes) = (total / 60, total % 60);
    if hours > 0 {
        format!("{}sa {}dk", hours, minutes)
    } else {
        format!("{}dk", minutes)
    }
}

/// Create a simple ASCII progress bar from a ratio in `[0, 1]`
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Right-pads `s` to `width` terminal columns.
pub fn pad_right(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_reads_hours_and_minutes() {
        assert_eq!(format_remaining(Duration::minutes(65)), "1sa 5dk");
        assert_eq!(format_remaining(Duration::minutes(45)), "45dk");
        assert_eq!(format_remaining(Duration::minutes(120)), "2sa 0dk");
        assert_eq!(format_remaining(Duration::minutes(-3)), "0dk");
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0.5, 4), "██░░");
        assert_eq!(progress_bar(2.0, 3), "███");
        assert_eq!(progress_bar(f64::NAN, 2), "░░");
    }

    #[test]
    fn padding_counts_columns_not_bytes() {
        assert_eq!(pad_right("Öğle", 6), "Öğle  ");
        assert_eq!(pad_right("İkindi", 3), "İkindi");
    }
}
