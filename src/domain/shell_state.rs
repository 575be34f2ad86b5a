use super::{
    conversation_list_state::ConversationListState, outbox::Outbox, stream_state::StreamPhase,
    text_input::TextInput, thread_state::ThreadState,
};

/// Which panel receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivePane {
    #[default]
    ConversationList,
    Thread,
    Compose,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-line message shown in the status bar until replaced or dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// What the status bar shows about the live stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStatus {
    pub phase: StreamPhase,
    pub reconnect_in_secs: Option<u64>,
}

impl Default for StreamStatus {
    fn default() -> Self {
        Self {
            phase: StreamPhase::Disconnected,
            reconnect_in_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    running: bool,
    active_pane: ActivePane,
    conversation_list: ConversationListState,
    thread: ThreadState,
    compose: TextInput,
    search: TextInput,
    outbox: Outbox,
    stream_status: StreamStatus,
    notice: Option<Notice>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            running: true,
            active_pane: ActivePane::default(),
            conversation_list: ConversationListState::default(),
            thread: ThreadState::default(),
            compose: TextInput::default(),
            search: TextInput::default(),
            outbox: Outbox::default(),
            stream_status: StreamStatus::default(),
            notice: None,
        }
    }
}

impl ShellState {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn active_pane(&self) -> ActivePane {
        self.active_pane
    }

    pub fn set_active_pane(&mut self, pane: ActivePane) {
        self.active_pane = pane;
    }

    pub fn conversation_list(&self) -> &ConversationListState {
        &self.conversation_list
    }

    pub fn conversation_list_mut(&mut self) -> &mut ConversationListState {
        &mut self.conversation_list
    }

    pub fn thread(&self) -> &ThreadState {
        &self.thread
    }

    pub fn thread_mut(&mut self) -> &mut ThreadState {
        &mut self.thread
    }

    pub fn compose(&self) -> &TextInput {
        &self.compose
    }

    pub fn compose_mut(&mut self) -> &mut TextInput {
        &mut self.compose
    }

    pub fn search(&self) -> &TextInput {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut TextInput {
        &mut self.search
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn outbox_mut(&mut self) -> &mut Outbox {
        &mut self.outbox
    }

    pub fn stream_status(&self) -> StreamStatus {
        self.stream_status
    }

    pub fn set_stream_status(&mut self, status: StreamStatus) {
        self.stream_status = status;
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn show_info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        });
    }

    pub fn show_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        });
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}
