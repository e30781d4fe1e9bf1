use chrono::NaiveDateTime;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{City, Schedule};
use crate::tui::theme;
use crate::utils::hijri::hijri_line;

pub fn render(frame: &mut Frame, area: Rect, city: &City, schedule: Option<&Schedule>, now: NaiveDateTime) {
    let title_line = Line::from(vec![
        Span::styled("  vakit  ", theme::accent().add_modifier(Modifier::BOLD)),
        Span::styled("·  ", theme::muted()),
        Span::styled(city.label.as_str(), theme::bold()),
    ]);

    let gregorian = schedule
        .and_then(|s| s.date_info().readable.clone())
        .unwrap_or_else(|| now.format("%d.%m.%Y").to_string());
    let mut date_spans = Vec::new();
    if let Some(hijri) = schedule.and_then(hijri_line) {
        date_spans.push(Span::styled(hijri, theme::highlight()));
        date_spans.push(Span::styled("  ·  ", theme::muted()));
    }
    date_spans.push(Span::styled(gregorian, theme::muted()));
    date_spans.push(Span::styled("  ·  ", theme::muted()));
    date_spans.push(Span::styled(now.format("%H:%M").to_string(), theme::muted()));

    let text = vec![title_line, Line::from(date_spans)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent())
        .style(theme::base());

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
