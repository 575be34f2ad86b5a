use std::time::{Duration, Instant};

use anyhow::Result;

use crate::{
    domain::{
        events::{AppEvent, KeyInput, SendCompletion, StreamEnvelope, StreamEvent},
        message::MessageSender,
        shell_state::{ActivePane, ShellState, StreamStatus},
        stream_state::{ConnectionId, StreamCommand, StreamScope, StreamSubscription},
    },
    infra::{
        config::AppConfig,
        contracts::{Clock, ExternalOpener, SystemClock},
    },
    usecases::{
        deep_link::conversation_link,
        list_conversations::{list_conversations, ConversationsSource, ListConversationsQuery},
        live_updates::{apply_new_message, StreamConnector},
        load_messages::{load_messages, LoadMessagesQuery, MessagesSource},
        send_message::{complete_send, submit_message, MessageDispatcher, SendSettlement},
    },
};

use super::contracts::ShellOrchestrator;

const SHELL_CONVERSATION_OPENED: &str = "SHELL_CONVERSATION_OPENED";
const SHELL_LIST_REFRESH_FAILED: &str = "SHELL_LIST_REFRESH_FAILED";
const SHELL_THREAD_LOAD_FAILED: &str = "SHELL_THREAD_LOAD_FAILED";
const SHELL_SEND_FAILED: &str = "SHELL_SEND_FAILED";
const SHELL_STREAM_OPEN_FAILED: &str = "SHELL_STREAM_OPEN_FAILED";
const SHELL_STREAM_FAILED: &str = "SHELL_STREAM_FAILED";
const SHELL_STALE_STREAM_EVENT: &str = "SHELL_STALE_STREAM_EVENT";
const SHELL_LINK_FAILED: &str = "SHELL_LINK_FAILED";

/// Values the controller needs from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSettings {
    pub page_size: u32,
    pub search_debounce: Duration,
    pub web_base_url: String,
    pub current_user: MessageSender,
}

impl ShellSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            page_size: config.ui.page_size,
            search_debounce: Duration::from_millis(config.ui.search_debounce_ms),
            web_base_url: config.web.base_url.clone(),
            current_user: MessageSender {
                id: config.api.user_id.clone().unwrap_or_default(),
                name: "You".to_owned(),
                avatar_url: None,
                is_current_user: true,
            },
        }
    }
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

pub struct DefaultShellOrchestrator<A, D, S, O>
where
    A: ConversationsSource + MessagesSource,
    D: MessageDispatcher,
    S: StreamConnector,
    O: ExternalOpener,
{
    state: ShellState,
    api: A,
    dispatcher: D,
    connector: S,
    opener: O,
    clock: Box<dyn Clock>,
    settings: ShellSettings,
    subscription: StreamSubscription,
    stream: Option<(ConnectionId, S::Handle)>,
    search_deadline: Option<Instant>,
}

impl<A, D, S, O> DefaultShellOrchestrator<A, D, S, O>
where
    A: ConversationsSource + MessagesSource,
    D: MessageDispatcher,
    S: StreamConnector,
    O: ExternalOpener,
{
    pub fn new(api: A, dispatcher: D, connector: S, opener: O, settings: ShellSettings) -> Self {
        Self {
            state: ShellState::default(),
            api,
            dispatcher,
            connector,
            opener,
            clock: Box::new(SystemClock),
            settings,
            subscription: StreamSubscription::default(),
            stream: None,
            search_deadline: None,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn handle_key(&mut self, key: KeyInput) {
        match self.state.active_pane() {
            ActivePane::ConversationList => self.handle_list_key(&key.key),
            ActivePane::Thread => self.handle_thread_key(&key.key),
            ActivePane::Compose => self.handle_compose_key(&key),
            ActivePane::Search => self.handle_search_key(&key),
        }
    }

    fn handle_list_key(&mut self, key: &str) {
        match key {
            "q" => self.state.stop(),
            "j" | "down" => self.state.conversation_list_mut().select_next(),
            "k" | "up" => self.state.conversation_list_mut().select_previous(),
            "enter" | "l" => {
                if let Some(partner_id) = self
                    .state
                    .conversation_list()
                    .selected()
                    .map(|conversation| conversation.partner_id.clone())
                {
                    self.open_conversation(partner_id);
                }
            }
            "n" => {
                if let Some(page) = self.list_pagination_target(true) {
                    self.load_conversation_page(page);
                }
            }
            "p" => {
                if let Some(page) = self.list_pagination_target(false) {
                    self.load_conversation_page(page);
                }
            }
            "r" => self.refresh_conversations(),
            "u" => {
                let filters = self.state.conversation_list_mut().filters_mut();
                filters.unread_only = !filters.unread_only;
                self.load_conversation_page(1);
            }
            "/" => self.begin_search(),
            "i" | "tab" if self.state.thread().is_open() => {
                self.state.set_active_pane(if key == "i" {
                    ActivePane::Compose
                } else {
                    ActivePane::Thread
                });
            }
            "o" => self.open_link(self.selected_partner_id(), false),
            "y" => self.open_link(self.selected_partner_id(), true),
            "esc" => self.state.dismiss_notice(),
            _ => {}
        }
    }

    fn handle_thread_key(&mut self, key: &str) {
        match key {
            "q" => self.state.stop(),
            "j" | "down" => self.state.thread_mut().select_next(),
            "k" | "up" => self.state.thread_mut().select_previous(),
            "n" => {
                if let Some(page) = self.thread_pagination_target(true) {
                    self.load_thread_page(page);
                }
            }
            "p" => {
                if let Some(page) = self.thread_pagination_target(false) {
                    self.load_thread_page(page);
                }
            }
            "r" => {
                let page = self
                    .state
                    .thread()
                    .pagination()
                    .map_or(1, |pagination| pagination.page);
                self.load_thread_page(page);
                self.refresh_conversations();
            }
            "i" | "enter" => self.state.set_active_pane(ActivePane::Compose),
            "/" => self.begin_search(),
            "o" => self.open_link(self.open_partner_id(), false),
            "y" => self.open_link(self.open_partner_id(), true),
            "esc" | "h" | "tab" => self.state.set_active_pane(ActivePane::ConversationList),
            _ => {}
        }
    }

    fn handle_compose_key(&mut self, key: &KeyInput) {
        match key.key.as_str() {
            "enter" => self.submit_compose(),
            "esc" => self.state.set_active_pane(ActivePane::Thread),
            _ if key.ctrl => {}
            other => {
                self.state.compose_mut().apply_key(other);
            }
        }
    }

    fn handle_search_key(&mut self, key: &KeyInput) {
        match key.key.as_str() {
            "enter" => {
                self.search_deadline = None;
                self.apply_search();
                self.state.set_active_pane(ActivePane::ConversationList);
            }
            "esc" => {
                self.search_deadline = None;
                self.state.set_active_pane(ActivePane::ConversationList);
            }
            _ if key.ctrl => {}
            other => {
                if self.state.search_mut().apply_key(other) {
                    self.search_deadline = Some(self.clock.now() + self.settings.search_debounce);
                }
            }
        }
    }

    fn begin_search(&mut self) {
        let current = self.state.conversation_list().filters().search.clone();
        self.state.search_mut().restore(&current);
        self.state.set_active_pane(ActivePane::Search);
    }

    fn apply_search(&mut self) {
        let text = self.state.search().text();
        if self.state.conversation_list().filters().search == text {
            return;
        }
        self.state.conversation_list_mut().filters_mut().search = text;
        self.load_conversation_page(1);
    }

    fn selected_partner_id(&self) -> Option<String> {
        self.state
            .conversation_list()
            .selected()
            .map(|conversation| conversation.partner_id.clone())
    }

    fn open_partner_id(&self) -> Option<String> {
        self.state.thread().partner_id().map(ToOwned::to_owned)
    }

    fn list_pagination_target(&self, forward: bool) -> Option<u32> {
        let pagination = self.state.conversation_list().pagination()?;
        if forward {
            pagination.next_page()
        } else {
            pagination.previous_page()
        }
    }

    fn thread_pagination_target(&self, forward: bool) -> Option<u32> {
        let pagination = self.state.thread().pagination()?;
        if forward {
            pagination.next_page()
        } else {
            pagination.previous_page()
        }
    }

    fn list_query(&self, page: u32) -> ListConversationsQuery {
        ListConversationsQuery {
            filters: self.state.conversation_list().filters().clone(),
            page,
            limit: self.settings.page_size,
        }
    }

    fn refresh_conversations(&mut self) {
        let page = self.state.conversation_list().current_page();
        self.load_conversation_page(page);
    }

    fn load_conversation_page(&mut self, page: u32) {
        let query = self.list_query(page);
        self.state.conversation_list_mut().set_loading();

        match list_conversations(&self.api, query) {
            Ok(result) => self
                .state
                .conversation_list_mut()
                .set_ready(result.conversations, result.pagination),
            Err(error) => {
                tracing::warn!(
                    code = SHELL_LIST_REFRESH_FAILED,
                    page,
                    error = ?error,
                    "conversation list refresh failed"
                );
                self.state.conversation_list_mut().set_error();
                self.state.show_error(error.user_message());
            }
        }
    }

    fn open_conversation(&mut self, partner_id: String) {
        let title = self
            .state
            .conversation_list()
            .find(&partner_id)
            .map(|conversation| conversation.partner_name.clone())
            .unwrap_or_else(|| partner_id.clone());

        tracing::info!(
            code = SHELL_CONVERSATION_OPENED,
            partner_id = %partner_id,
            "opening conversation"
        );

        self.state
            .thread_mut()
            .set_loading(partner_id.clone(), title);
        self.state.conversation_list_mut().select_partner(&partner_id);
        self.state.set_active_pane(ActivePane::Thread);
        self.subscribe(StreamScope::partner(partner_id));
        self.load_thread_page(1);
    }

    fn load_thread_page(&mut self, page: u32) {
        let Some(partner_id) = self.open_partner_id() else {
            return;
        };
        self.state.thread_mut().set_page_loading();

        let query = LoadMessagesQuery::new(partner_id.clone()).with_page(page);
        match load_messages(&self.api, query) {
            Ok(result) => {
                self.state
                    .thread_mut()
                    .set_ready(result.messages, result.partner, result.pagination);
                self.state.conversation_list_mut().reset_unread(&partner_id);
            }
            Err(error) => {
                tracing::warn!(
                    code = SHELL_THREAD_LOAD_FAILED,
                    partner_id = %partner_id,
                    page,
                    error = ?error,
                    "message page load failed"
                );
                self.state.thread_mut().set_error();
                self.state.show_error(error.user_message());
            }
        }
    }

    fn submit_compose(&mut self) {
        let now_ms = self.clock.unix_ms();
        if let Err(error) = submit_message(
            &mut self.state,
            &self.dispatcher,
            &self.settings.current_user,
            now_ms,
        ) {
            self.state.show_error(error.user_message());
        }
    }

    fn handle_send_finished(&mut self, completion: SendCompletion) {
        let client_id = completion.client_id;
        match complete_send(&mut self.state, completion) {
            SendSettlement::Confirmed(_) => self.refresh_conversations(),
            SendSettlement::Failed {
                error,
                content_restored,
            } => {
                tracing::warn!(
                    code = SHELL_SEND_FAILED,
                    client_id = %client_id,
                    error = ?error,
                    content_restored,
                    "message send rolled back"
                );
                let mut notice = error.user_message();
                if content_restored {
                    notice.push_str(" Text restored to the input.");
                }
                self.state.show_error(notice);
            }
            SendSettlement::Stale => {}
        }
    }

    fn handle_stream(&mut self, envelope: StreamEnvelope) {
        let StreamEnvelope { connection, event } = envelope;
        if !self.subscription.is_current(connection) {
            tracing::debug!(
                code = SHELL_STALE_STREAM_EVENT,
                connection = connection.value(),
                "ignoring event from superseded stream"
            );
            return;
        }

        match event {
            StreamEvent::Connected => {
                self.subscription.on_connected(connection);
            }
            StreamEvent::NewMessage(message) => {
                apply_new_message(self.state.thread_mut(), message);
                self.refresh_conversations();
            }
            StreamEvent::Failed { reason } => {
                tracing::warn!(
                    code = SHELL_STREAM_FAILED,
                    connection = connection.value(),
                    reason = %reason,
                    "live stream failed; reconnect scheduled"
                );
                let now = self.clock.now();
                if let Some(close) = self.subscription.on_error(connection, now) {
                    self.execute(vec![close]);
                }
            }
        }
    }

    fn handle_tick(&mut self) {
        let now = self.clock.now();

        let scope = self.current_scope();
        if let Some(open) = self.subscription.poll_reconnect(now, scope) {
            self.execute(vec![open]);
        }

        if self.search_deadline.is_some_and(|deadline| deadline <= now) {
            self.search_deadline = None;
            self.apply_search();
        }
    }

    fn current_scope(&self) -> StreamScope {
        self.state
            .thread()
            .partner_id()
            .map_or_else(StreamScope::global, StreamScope::partner)
    }

    fn subscribe(&mut self, scope: StreamScope) {
        let commands = self.subscription.subscribe(scope);
        self.execute(commands);
    }

    fn execute(&mut self, commands: Vec<StreamCommand>) {
        for command in commands {
            match command {
                StreamCommand::Close { connection } => {
                    if self
                        .stream
                        .as_ref()
                        .is_some_and(|(current, _)| *current == connection)
                    {
                        self.stream = None;
                    }
                }
                StreamCommand::Open { connection, scope } => {
                    self.stream = None;
                    match self.connector.open(connection, &scope) {
                        Ok(handle) => self.stream = Some((connection, handle)),
                        Err(error) => {
                            tracing::warn!(
                                code = SHELL_STREAM_OPEN_FAILED,
                                connection = connection.value(),
                                error = ?error,
                                "live stream could not be opened"
                            );
                            let now = self.clock.now();
                            self.subscription.on_error(connection, now);
                        }
                    }
                }
            }
        }
    }

    fn sync_stream_status(&mut self) {
        let now = self.clock.now();
        let reconnect_in_secs = self
            .subscription
            .reconnect_in(now)
            .map(|remaining| remaining.as_millis().div_ceil(1_000) as u64);

        self.state.set_stream_status(StreamStatus {
            phase: self.subscription.phase(),
            reconnect_in_secs,
        });
    }

    fn open_link(&mut self, partner_id: Option<String>, copy: bool) {
        let Some(partner_id) = partner_id else {
            return;
        };

        let link = match conversation_link(&self.settings.web_base_url, &partner_id) {
            Ok(link) => link,
            Err(error) => {
                self.state.show_error(error.user_message());
                return;
            }
        };

        let outcome = if copy {
            self.opener.copy_to_clipboard(&link)
        } else {
            self.opener.open(&link)
        };

        match outcome {
            Ok(()) if copy => self.state.show_info(format!("Copied {link}")),
            Ok(()) => self.state.show_info(format!("Opened {link}")),
            Err(error) => {
                tracing::warn!(code = SHELL_LINK_FAILED, error = %error, "conversation link action failed");
                self.state.show_error(format!("{error:#}"));
            }
        }
    }
}

impl<A, D, S, O> ShellOrchestrator for DefaultShellOrchestrator<A, D, S, O>
where
    A: ConversationsSource + MessagesSource,
    D: MessageDispatcher,
    S: StreamConnector,
    O: ExternalOpener,
{
    fn state(&self) -> &ShellState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ShellState {
        &mut self.state
    }

    fn on_mount(&mut self, open_partner: Option<String>) -> Result<()> {
        self.load_conversation_page(1);
        match open_partner {
            Some(partner_id) => self.open_conversation(partner_id),
            None => self.subscribe(StreamScope::global()),
        }
        self.sync_stream_status();
        Ok(())
    }

    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Tick => self.handle_tick(),
            AppEvent::QuitRequested => self.state.stop(),
            AppEvent::InputKey(key) => self.handle_key(key),
            AppEvent::Stream(envelope) => self.handle_stream(envelope),
            AppEvent::SendFinished(completion) => self.handle_send_finished(completion),
        }

        self.sync_stream_status();
        Ok(())
    }

    fn on_unmount(&mut self) {
        if let Some(close) = self.subscription.dispose() {
            self.execute(vec![close]);
        }
        self.stream = None;
        self.search_deadline = None;
        self.sync_stream_status();
    }
}
