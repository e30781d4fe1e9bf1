use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;
use std::sync::mpsc::Sender;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::models::city::builtin_cities;
use crate::models::{City, PrayerMap, PrayerName, PreferenceSet, Schedule};
use crate::prayer_times::{FetchOutcome, Fetched, Origin, ScheduleFetcher, ScheduleSource};
use crate::reminders::{Dispatcher, Notifier, ReminderScheduler};
use crate::storage::{load_preferences, save_city, save_preferences};
use crate::timeline::{compute, RefreshLoop, RefreshTick, SharedSchedule, TimelineView};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::city_picker::{self, CityPicker};
use crate::tui::widgets::{header, next_prayer, notifications, prayers, statusbar};
use crate::utils::clock;

#[derive(Debug, Clone)]
pub enum Overlay {
    None,
    Cities(CityPicker),
    Notifications { focus: usize },
    Help,
}

/// What the dashboard is wired to. Built by `main`.
pub struct Services<N: Notifier> {
    pub store: Connection,
    pub source: Arc<dyn ScheduleSource>,
    pub scheduler: ReminderScheduler<N>,
    pub dispatcher: Option<Dispatcher>,
}

pub struct App<N: Notifier> {
    pub should_quit: bool,
    pub overlay: Overlay,
    city: City,
    prefs: PreferenceSet,
    store: Connection,
    schedule: SharedSchedule,
    view: Option<TimelineView>,
    now: NaiveDateTime,
    fetcher: ScheduleFetcher,
    /// Sequence number of the fetch still in flight, if any.
    in_flight: Option<u64>,
    /// The shown schedule is a stored copy; keep retrying the live source.
    from_cache: bool,
    status: Option<String>,
    scheduler: ReminderScheduler<N>,
    _dispatcher: Option<Dispatcher>,
    events: Sender<Event>,
}

impl<N: Notifier> App<N> {
    pub fn new(
        services: Services<N>,
        city: City,
        initial: Option<Schedule>,
        events: Sender<Event>,
        now: NaiveDateTime,
    ) -> Self {
        let prefs = load_preferences(&services.store);
        let view = initial.as_ref().map(|s| compute(s, now.time()));
        App {
            should_quit: false,
            overlay: Overlay::None,
            city,
            prefs,
            store: services.store,
            schedule: Arc::new(RwLock::new(initial)),
            view,
            now,
            fetcher: ScheduleFetcher::new(services.source),
            in_flight: None,
            from_cache: false,
            status: None,
            scheduler: services.scheduler,
            _dispatcher: services.dispatcher,
            events,
        }
    }

    pub fn shared_schedule(&self) -> SharedSchedule {
        Arc::clone(&self.schedule)
    }

    fn current_schedule(&self) -> Option<Schedule> {
        self.schedule
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_schedule(&self, schedule: Option<Schedule>) {
        *self
            .schedule
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = schedule;
    }

    /// Starts a fetch for the selected city unless one is already running.
    pub fn request_schedule(&mut self, date: NaiveDate) {
        if self.in_flight.is_some() {
            return;
        }
        self.force_request(date);
    }

    fn force_request(&mut self, date: NaiveDate) {
        let tx = self.events.clone();
        let seq = self.fetcher.request(self.city.clone(), date, move |outcome| {
            let _ = tx.send(Event::Fetched(outcome));
        });
        self.in_flight = Some(seq);
    }

    pub fn on_fetched(&mut self, outcome: FetchOutcome, now: NaiveDateTime) {
        if !self.fetcher.is_current(&outcome) || outcome.city != self.city {
            log::debug!("dropping stale schedule #{} for {}", outcome.seq, outcome.city.label);
            return;
        }
        self.in_flight = None;
        self.now = now;
        match outcome.result {
            Ok(Fetched { schedule, origin }) => {
                log::info!("schedule for {} on {} loaded", self.city.label, schedule.calendar_date());
                self.view = Some(compute(&schedule, now.time()));
                self.set_schedule(Some(schedule));
                self.from_cache = origin == Origin::Cached;
                self.status = self
                    .from_cache
                    .then(|| "Vakitler yenilenemedi, kayıtlı vakitler gösteriliyor".to_string());
                self.replan(now);
            }
            Err(e) => {
                log::warn!("fetching schedule for {} failed: {}", self.city.label, e);
                self.status = Some(format!(
                    "{} vakitleri alınamadı: {}",
                    outcome.date.format("%d.%m.%Y"),
                    e
                ));
            }
        }
    }

    /// A missing, previous-day or cache-served schedule triggers a fetch for
    /// the tick's day.
    pub fn on_refresh(&mut self, tick: RefreshTick) {
        self.now = tick.at;
        self.view = tick.view;
        if self.view.is_none() || tick.stale || self.from_cache {
            self.request_schedule(tick.at.date());
        }
    }

    fn replan(&mut self, now: NaiveDateTime) {
        let Some(schedule) = self.current_schedule() else {
            return;
        };
        if let Err(e) = self.scheduler.replan(&schedule, &self.prefs, now) {
            log::warn!("could not reschedule reminders: {}", e);
            self.status = Some(format!("Bildirimler güncellenemedi: {}", e));
        }
    }

    pub fn select_city(&mut self, city: City, now: NaiveDateTime) {
        self.overlay = Overlay::None;
        if city == self.city {
            return;
        }
        log::info!("city changed to {}", city.label);
        if let Err(e) = save_city(&self.store, &city) {
            log::warn!("{:#}", e);
        }
        self.city = city;
        self.set_schedule(None);
        self.view = None;
        self.from_cache = false;
        self.status = None;
        // Reminders for the previous city must not fire.
        if let Err(e) = self.scheduler.apply(&[]) {
            log::warn!("could not cancel reminders: {}", e);
        }
        self.force_request(now.date());
    }

    pub fn toggle_preference(&mut self, name: PrayerName, now: NaiveDateTime) {
        self.prefs.toggle(name);
        if let Err(e) = save_preferences(&self.store, &self.prefs) {
            log::warn!("{:#}", e);
        }
        self.replan(now);
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: NaiveDateTime) {
        // Only handle actual key presses, some terminals also report releases
        if key.kind != KeyEventKind::Press {
            return;
        }
        match &mut self.overlay {
            Overlay::None => self.handle_dashboard_key(key, now),
            Overlay::Help => self.overlay = Overlay::None,
            Overlay::Cities(picker) => match key.code {
                KeyCode::Esc => self.overlay = Overlay::None,
                KeyCode::Up => picker.up(),
                KeyCode::Down => picker.down(),
                KeyCode::Backspace => picker.pop(),
                KeyCode::Enter => {
                    if let Some(city) = picker.selected().cloned() {
                        self.select_city(city, now);
                    }
                }
                KeyCode::Char(c) => picker.push(c),
                _ => {}
            },
            Overlay::Notifications { focus } => match key.code {
                KeyCode::Esc | KeyCode::Char('n') => self.overlay = Overlay::None,
                KeyCode::Up => *focus = focus.saturating_sub(1),
                KeyCode::Down => *focus = (*focus + 1).min(PrayerName::ALL.len() - 1),
                KeyCode::Char(' ') | KeyCode::Enter => {
                    let name = PrayerName::ALL[*focus];
                    self.toggle_preference(name, now);
                }
                _ => {}
            },
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, now: NaiveDateTime) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') => {
                self.overlay = Overlay::Cities(CityPicker::new(builtin_cities(), &self.city));
            }
            KeyCode::Char('n') => self.overlay = Overlay::Notifications { focus: 0 },
            KeyCode::Char('?') => self.overlay = Overlay::Help,
            KeyCode::Char('r') => self.request_schedule(now.date()),
            _ => {}
        }
    }

    fn scheduled_times(&self) -> PrayerMap<Option<NaiveDateTime>> {
        PrayerMap::from_fn(|name| self.scheduler.active_for(name).map(|r| r.fire_at))
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(8),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(area);

        let schedule = self.current_schedule();
        header::render(frame, chunks[0], &self.city, schedule.as_ref(), self.now);
        next_prayer::render(frame, chunks[1], self.view.as_ref(), self.status.as_deref());
        prayers::render(
            frame,
            chunks[2],
            schedule.as_ref(),
            &self.prefs,
            self.view.as_ref().map(|v| v.active_prayer),
            self.now.time(),
        );
        statusbar::render(frame, chunks[3], self.scheduler.active().count());

        match &self.overlay {
            Overlay::None => {}
            Overlay::Cities(picker) => city_picker::render(frame, popup_area(area, 40, 20), picker),
            Overlay::Notifications { focus } => notifications::render(
                frame,
                popup_area(area, 44, 10),
                &self.prefs,
                &self.scheduled_times(),
                *focus,
            ),
            Overlay::Help => self.draw_help(frame, popup_area(area, 50, 12)),
        }
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        let rows = [
            ("c", "şehir seç"),
            ("n", "bildirim ayarları"),
            ("r", "vakitleri yeniden al"),
            ("q / Esc", "çıkış"),
        ];
        let mut lines = vec![Line::from("")];
        for (key, label) in rows {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<10}", key), theme::accent()),
                Span::styled(label, theme::bold()),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("  [herhangi bir tuş] kapat", theme::muted())));

        let block = Block::default()
            .title(Span::styled(" Yardım ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::highlight())
            .style(theme::panel());
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// A centered box of at most `width` x `height` cells.
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Run the TUI event loop.
pub fn run<N: Notifier>(
    services: Services<N>,
    city: City,
    initial: Option<Schedule>,
    refresh_period: Duration,
) -> Result<()> {
    let events = EventHandler::new(250);
    let mut app = App::new(services, city, initial, events.sender(), clock::now());

    let mut refresh = RefreshLoop::new(refresh_period);
    let tx = events.sender();
    refresh.start(app.shared_schedule(), clock::now, move |tick| {
        tx.send(Event::Refresh(tick)).is_ok()
    });

    let mut terminal = ratatui::init();
    let outcome = loop {
        if let Err(e) = terminal.draw(|frame| app.draw(frame)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                app.handle_key(key, clock::now());
                if app.should_quit {
                    break Ok(());
                }
            }
            Ok(Event::Refresh(tick)) => app.on_refresh(tick),
            Ok(Event::Fetched(outcome)) => app.on_fetched(outcome, clock::now()),
            Ok(Event::Resize) => {}
            Err(e) => break Err(e.into()),
        }
    };

    refresh.stop();
    ratatui::restore();
    outcome
}
