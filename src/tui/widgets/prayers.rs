use chrono::NaiveTime;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::{PrayerName, PreferenceSet, Schedule};
use crate::tui::theme;
use crate::utils::format::{format_time, pad_right};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    schedule: Option<&Schedule>,
    prefs: &PreferenceSet,
    active: Option<PrayerName>,
    now: NaiveTime,
) {
    let block = Block::default()
        .title(Span::styled(" Vakitler ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::panel());

    let items: Vec<ListItem> = PrayerName::ALL
        .iter()
        .map(|&name| {
            let instant = schedule.map(|s| s.instant(name));
            let time_str = instant.map(format_time).unwrap_or_else(|| "--:--".to_string());

            let is_active = active == Some(name);
            let passed = instant.is_some_and(|t| t <= now) && !is_active;
            let (marker, name_style) = if is_active {
                ("▸ ", theme::highlight())
            } else if passed {
                ("  ", theme::muted())
            } else {
                ("  ", theme::bold())
            };
            let bell = if prefs.is_enabled(name) { "🔔" } else { "  " };

            ListItem::new(Line::from(vec![
                Span::styled(format!("  {}", marker), theme::highlight()),
                Span::styled(pad_right(name.display_name(), 9), name_style),
                Span::styled(pad_right(&time_str, 8), if passed { theme::muted() } else { theme::bold() }),
                Span::styled(bell, theme::accent()),
            ]))
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
