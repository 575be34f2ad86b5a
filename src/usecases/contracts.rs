use anyhow::Result;

use crate::domain::{events::AppEvent, shell_state::ShellState};

pub trait AppEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>>;
}

/// Lifecycle of the conversation view: mount, events, unmount.
pub trait ShellOrchestrator {
    fn state(&self) -> &ShellState;
    fn state_mut(&mut self) -> &mut ShellState;

    /// Loads the first list page and opens the live stream. `open_partner`
    /// selects a conversation right away (from `--open`).
    fn on_mount(&mut self, open_partner: Option<String>) -> Result<()>;
    fn handle_event(&mut self, event: AppEvent) -> Result<()>;
    /// Closes the live stream and cancels any scheduled reconnect.
    fn on_unmount(&mut self);
}
