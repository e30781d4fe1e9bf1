use chrono::NaiveDateTime;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::{PrayerMap, PrayerName, PreferenceSet};
use crate::tui::theme;
use crate::utils::format::pad_right;

/// Per-prayer reminder switches. `scheduled` holds the fire time of each
/// reminder currently waiting.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    prefs: &PreferenceSet,
    scheduled: &PrayerMap<Option<NaiveDateTime>>,
    focus: usize,
) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(Span::styled(" Bildirim Ayarları ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::highlight())
        .style(theme::panel());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let items: Vec<ListItem> = PrayerName::ALL
        .iter()
        .map(|&name| {
            let (switch, style) = if prefs.is_enabled(name) {
                ("[açık] ", theme::accent())
            } else {
                ("[kapalı]", theme::muted())
            };
            let next = match scheduled[name] {
                Some(at) => format!("  {}", at.format("%H:%M")),
                None => String::new(),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {}", pad_right(name.display_name(), 9)), theme::bold()),
                Span::styled(switch, style),
                Span::styled(next, theme::muted()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(theme::highlight())
        .highlight_symbol("▸");
    let mut state = ListState::default().with_selected(Some(focus));
    frame.render_stateful_widget(list, rows[0], &mut state);

    frame.render_widget(
        Paragraph::new(Span::styled(" [Space] aç/kapat  ·  [Esc] kapat", theme::muted())),
        rows[1],
    );
}
