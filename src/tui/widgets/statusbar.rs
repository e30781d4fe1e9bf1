use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, pending_reminders: usize) {
    let hints = [
        ("[c]", " şehir  "),
        ("[n]", " bildirimler  "),
        ("[r]", " yenile  "),
        ("[?]", " yardım  "),
        ("[q]", " çıkış"),
    ];

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(key, theme::accent()));
        spans.push(Span::styled(label, theme::muted()));
    }
    spans.push(Span::styled(format!("   🔔 {}", pending_reminders), theme::muted()));

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
