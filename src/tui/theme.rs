use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(14, 18, 24);
pub const PANEL: Color = Color::Rgb(22, 28, 38);
pub const BORDER: Color = Color::Rgb(48, 60, 78);
pub const TEXT: Color = Color::Rgb(222, 228, 236);
pub const TEXT_MUTED: Color = Color::Rgb(118, 132, 150);
pub const ACCENT: Color = Color::Rgb(86, 182, 194);
pub const HIGHLIGHT: Color = Color::Rgb(232, 190, 92);
pub const ALERT: Color = Color::Rgb(214, 96, 84);
pub const TRACK: Color = Color::Rgb(34, 42, 56);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn panel() -> Style {
    Style::default().fg(TEXT).bg(PANEL)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

pub fn muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

/// The prayer being counted down to.
pub fn highlight() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn alert() -> Style {
    Style::default().fg(ALERT)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn gauge() -> Style {
    Style::default().fg(ACCENT).bg(TRACK)
}
