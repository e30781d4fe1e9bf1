use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::city::search;
use crate::models::City;
use crate::tui::theme;

/// Search box plus filtered list over the built-in cities.
#[derive(Debug, Clone)]
pub struct CityPicker {
    cities: Vec<City>,
    query: String,
    matches: Vec<City>,
    selected: usize,
}

impl CityPicker {
    pub fn new(cities: Vec<City>, current: &City) -> Self {
        let selected = cities.iter().position(|c| c == current).unwrap_or(0);
        Self {
            matches: cities.clone(),
            cities,
            query: String::new(),
            selected,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn push(&mut self, c: char) {
        self.query.push(c);
        self.refilter();
    }

    pub fn pop(&mut self) {
        self.query.pop();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.matches = search(&self.cities, &self.query);
        self.selected = 0;
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.selected + 1 < self.matches.len() {
            self.selected += 1;
        }
    }

    pub fn selected(&self) -> Option<&City> {
        self.matches.get(self.selected)
    }

    pub fn matches(&self) -> &[City] {
        &self.matches
    }
}

pub fn render(frame: &mut Frame, area: Rect, picker: &CityPicker) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(Span::styled(" Şehir Seç ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::highlight())
        .style(theme::panel());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let search_line = Line::from(vec![
        Span::styled(" Ara: ", theme::muted()),
        Span::styled(picker.query(), theme::bold()),
        Span::styled("█", theme::accent()),
    ]);
    frame.render_widget(Paragraph::new(search_line), rows[0]);

    if picker.matches().is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(" Eşleşen şehir yok", theme::muted())),
            rows[1],
        );
    } else {
        let items: Vec<ListItem> = picker
            .matches()
            .iter()
            .map(|c| ListItem::new(Span::styled(format!(" {}", c.label), theme::bold())))
            .collect();
        let list = List::new(items)
            .highlight_style(theme::highlight())
            .highlight_symbol("▸");
        let mut state = ListState::default().with_selected(Some(picker.selected));
        frame.render_stateful_widget(list, rows[1], &mut state);
    }

    frame.render_widget(
        Paragraph::new(Span::styled(" [Enter] seç  ·  [Esc] kapat", theme::muted())),
        rows[2],
    );
}
