use anyhow::Result;

use crate::{
    domain::shell_state::ShellState,
    usecases::{
        context::AppContext,
        contracts::{AppEventSource, ShellOrchestrator},
    },
};

use super::{terminal::TerminalSession, view};

pub fn start(
    context: &AppContext,
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
    open_partner: Option<String>,
) -> Result<()> {
    tracing::info!(
        log_level = %context.config.logging.level,
        api_base_url = %context.config.api.base_url,
        open_partner = open_partner.as_deref(),
        "starting TUI shell"
    );

    let mut terminal = TerminalSession::new()?;
    run_loop(event_source, orchestrator, open_partner, |state| {
        terminal.draw(|frame| view::render(frame, state))
    })
}

/// Mounts the view, pumps events until the controller stops, and always
/// unmounts so the live stream is closed on every exit path.
fn run_loop<D>(
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
    open_partner: Option<String>,
    mut draw: D,
) -> Result<()>
where
    D: FnMut(&mut ShellState) -> Result<()>,
{
    let result = pump(event_source, orchestrator, open_partner, &mut draw);
    orchestrator.on_unmount();
    tracing::info!(clean_exit = result.is_ok(), "TUI shell stopped");
    result
}

fn pump<D>(
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
    open_partner: Option<String>,
    draw: &mut D,
) -> Result<()>
where
    D: FnMut(&mut ShellState) -> Result<()>,
{
    orchestrator.on_mount(open_partner)?;

    while orchestrator.state().is_running() {
        draw(orchestrator.state_mut())?;

        if let Some(event) = event_source.next_event()? {
            orchestrator.handle_event(event)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::{
        domain::events::{AppEvent, KeyInput},
        ui::event_source::MockEventSource,
    };

    #[derive(Default)]
    struct RecordingOrchestrator {
        state: ShellState,
        mounted_with: Option<Option<String>>,
        handled: Vec<AppEvent>,
        unmounted: bool,
        fail_mount: bool,
    }

    impl ShellOrchestrator for RecordingOrchestrator {
        fn state(&self) -> &ShellState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut ShellState {
            &mut self.state
        }

        fn on_mount(&mut self, open_partner: Option<String>) -> Result<()> {
            self.mounted_with = Some(open_partner);
            if self.fail_mount {
                anyhow::bail!("mount failed");
            }
            Ok(())
        }

        fn handle_event(&mut self, event: AppEvent) -> Result<()> {
            if event == AppEvent::QuitRequested {
                self.state.stop();
            }
            self.handled.push(event);
            Ok(())
        }

        fn on_unmount(&mut self) {
            self.unmounted = true;
        }
    }

    #[test]
    fn mock_source_produces_quit_event() {
        let mut source = MockEventSource::from(vec![AppEvent::QuitRequested]);

        assert_eq!(
            source.next_event().expect("must read mock event"),
            Some(AppEvent::QuitRequested)
        );
    }

    #[test]
    fn loop_mounts_handles_events_and_unmounts_on_quit() {
        let mut source = MockEventSource::from(vec![
            AppEvent::InputKey(KeyInput::new("j", false)),
            AppEvent::Tick,
            AppEvent::QuitRequested,
        ]);
        let mut orchestrator = RecordingOrchestrator::default();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("test terminal");
        let mut frames = 0;

        run_loop(&mut source, &mut orchestrator, Some("u1".to_owned()), |state| {
            frames += 1;
            terminal.draw(|frame| view::render(frame, state))?;
            Ok(())
        })
        .expect("loop should finish");

        assert_eq!(orchestrator.mounted_with, Some(Some("u1".to_owned())));
        assert_eq!(orchestrator.handled.len(), 3);
        assert_eq!(frames, 3);
        assert!(orchestrator.unmounted);
    }

    #[test]
    fn unmounts_even_when_mount_fails() {
        let mut source = MockEventSource::from(vec![]);
        let mut orchestrator = RecordingOrchestrator {
            fail_mount: true,
            ..RecordingOrchestrator::default()
        };

        let result = run_loop(&mut source, &mut orchestrator, None, |_| Ok(()));

        assert!(result.is_err());
        assert!(orchestrator.unmounted);
        assert!(orchestrator.handled.is_empty());
    }
}
