use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

use crate::timeline::{DayMinute, TimelineView};
use crate::tui::theme;
use crate::utils::format::format_time;

fn day_marker(at: DayMinute) -> &'static str {
    match at.day_offset() {
        d if d < 0 => " (dün)",
        0 => "",
        _ => " (yarın)",
    }
}

/// Countdown to the active prayer with the interval's elapsed share.
pub fn render(frame: &mut Frame, area: Rect, view: Option<&TimelineView>, status: Option<&str>) {
    let block = Block::default()
        .title(Span::styled(" Sıradaki Vakit ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::panel());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(view) = view else {
        let message = status.unwrap_or("Vakitler yükleniyor...");
        let paragraph = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(message, theme::muted()))])
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, inner);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let headline = Line::from(vec![
        Span::styled(view.active_prayer.display_name(), theme::highlight()),
        Span::styled(" vaktine  ", theme::muted()),
        Span::styled(view.remaining_label(), theme::bold()),
    ]);
    frame.render_widget(Paragraph::new(headline).alignment(Alignment::Center), rows[0]);

    let span = Line::from(Span::styled(
        format!(
            "{}{}  →  {}{}",
            format_time(view.interval_start.time()),
            day_marker(view.interval_start),
            format_time(view.interval_end.time()),
            day_marker(view.interval_end)
        ),
        theme::muted(),
    ));
    frame.render_widget(Paragraph::new(span).alignment(Alignment::Center), rows[1]);

    let gauge = Gauge::default()
        .gauge_style(theme::gauge())
        .ratio(view.progress.clamp(0.0, 1.0))
        .label(format!("{}%", view.percent()));
    frame.render_widget(gauge, rows[3]);

    if let Some(status) = status {
        frame.render_widget(
            Paragraph::new(Span::styled(status, theme::alert())).alignment(Alignment::Center),
            rows[4],
        );
    }
}
