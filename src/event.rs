use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};
use log::debug;

use crate::error::LoadError;
use crate::words::{ListSource, Word};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize(u16, u16),
    ListLoaded {
        list_id: String,
        result: Result<Vec<Word>, LoadError>,
    },
}

/// Funnels terminal input, ticks and background list loads into one channel
/// consumed by the UI loop.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    let forwarded = match event::read() {
                        Ok(Event::Key(key)) => input_tx.send(AppEvent::Key(key)),
                        Ok(Event::Resize(w, h)) => input_tx.send(AppEvent::Resize(w, h)),
                        _ => Ok(()),
                    };
                    if forwarded.is_err() {
                        return;
                    }
                } else if input_tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, tx }
    }

    /// Load `list_id` on a worker thread; the result arrives as
    /// [`AppEvent::ListLoaded`].
    pub fn load_list<L>(&self, source: L, list_id: String)
    where
        L: ListSource + Send + 'static,
    {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = source.load(&list_id);
            debug!("load of '{list_id}' finished (ok: {})", result.is_ok());
            let _ = tx.send(AppEvent::ListLoaded { list_id, result });
        });
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
