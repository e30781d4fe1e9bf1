use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CEvent, KeyEvent};

use crate::prayer_times::FetchOutcome;
use crate::timeline::RefreshTick;

/// Everything the dashboard reacts to, funnelled through one channel.
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Refresh(RefreshTick),
    Fetched(FetchOutcome),
    Resize,
}

pub struct EventHandler {
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(poll_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();
        let poll = Duration::from_millis(poll_ms);

        thread::spawn(move || loop {
            if !event::poll(poll).unwrap_or(false) {
                continue;
            }
            let forwarded = match event::read() {
                Ok(CEvent::Key(key)) => input_tx.send(Event::Key(key)),
                Ok(CEvent::Resize(_, _)) => input_tx.send(Event::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }

    /// Handle for background producers (refresh loop, fetcher).
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}
