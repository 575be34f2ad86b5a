use std::{
    sync::mpsc::{Receiver, TryRecvError},
    time::{Duration, Instant},
};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{
    domain::events::{AppEvent, KeyInput},
    usecases::contracts::AppEventSource,
};

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(100);
const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Default)]
pub struct CrosstermEventSource;

impl AppEventSource for CrosstermEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>> {
        if !event::poll(EVENT_POLL_TIMEOUT)? {
            return Ok(Some(AppEvent::Tick));
        }

        match event::read()? {
            Event::Key(key) => Ok(map_key_event(key)),
            _ => Ok(None),
        }
    }
}

/// Merges background events (send completions, stream events) with terminal
/// input. Background events are drained first; a `Tick` is produced at least
/// every [`TICK_INTERVAL`] so timers keep running while the user types.
pub struct ChannelEventSource {
    background: Receiver<AppEvent>,
    terminal: CrosstermEventSource,
    last_tick: Instant,
}

impl ChannelEventSource {
    pub fn new(background: Receiver<AppEvent>) -> Self {
        Self {
            background,
            terminal: CrosstermEventSource,
            last_tick: Instant::now(),
        }
    }

    fn tick_due(&mut self) -> bool {
        if self.last_tick.elapsed() >= TICK_INTERVAL {
            self.last_tick = Instant::now();
            true
        } else {
            false
        }
    }
}

impl AppEventSource for ChannelEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>> {
        match self.background.try_recv() {
            Ok(event) => return Ok(Some(event)),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => {}
        }

        if self.tick_due() {
            return Ok(Some(AppEvent::Tick));
        }

        let event = self.terminal.next_event()?;
        if matches!(event, Some(AppEvent::Tick)) {
            self.last_tick = Instant::now();
        }
        Ok(event)
    }
}

/// Maps a terminal key press to an app event. Ctrl+C quits from any pane;
/// every other key is forwarded by name for the controller to interpret.
fn map_key_event(key: KeyEvent) -> Option<AppEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')) {
        return Some(AppEvent::QuitRequested);
    }

    let name = match key.code {
        KeyCode::Char(ch) => ch.to_string(),
        KeyCode::Enter => "enter".to_owned(),
        KeyCode::Esc => "esc".to_owned(),
        KeyCode::Backspace => "backspace".to_owned(),
        KeyCode::Delete => "delete".to_owned(),
        KeyCode::Left => "left".to_owned(),
        KeyCode::Right => "right".to_owned(),
        KeyCode::Up => "up".to_owned(),
        KeyCode::Down => "down".to_owned(),
        KeyCode::Home => "home".to_owned(),
        KeyCode::End => "end".to_owned(),
        KeyCode::Tab | KeyCode::BackTab => "tab".to_owned(),
        _ => return None,
    };

    Some(AppEvent::InputKey(KeyInput::new(name, ctrl)))
}

#[cfg(test)]
pub struct MockEventSource {
    queue: std::collections::VecDeque<AppEvent>,
}

#[cfg(test)]
impl MockEventSource {
    pub fn from(events: Vec<AppEvent>) -> Self {
        Self {
            queue: events.into(),
        }
    }
}

#[cfg(test)]
impl AppEventSource for MockEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>> {
        Ok(self.queue.pop_front())
    }
}
