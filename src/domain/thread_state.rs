use uuid::Uuid;

use super::{
    conversation::Partner,
    message::{EntryId, Message, PendingMessage, ThreadEntry},
    pagination::Pagination,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadUiState {
    Empty,
    Loading,
    Ready,
    Error,
}

/// Outcome of matching a server confirmation against a pending entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The pending entry was swapped for the confirmed message in place.
    Replaced,
    /// The stream delivered the confirmed message first; the pending copy was dropped.
    AlreadyDelivered,
    /// The pending copy was gone (the thread was reloaded), so the confirmed
    /// message was appended instead.
    Appended,
    /// No pending entry with that client id is in this thread.
    Missing,
}

/// Scroll margin - number of items to keep visible above/below cursor before scrolling.
const SCROLL_MARGIN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadState {
    partner_id: Option<String>,
    title: String,
    entries: Vec<ThreadEntry>,
    pagination: Option<Pagination>,
    ui_state: ThreadUiState,
    selected_index: Option<usize>,
    scroll_offset: usize,
}

impl Default for ThreadState {
    fn default() -> Self {
        Self {
            partner_id: None,
            title: String::new(),
            entries: Vec::new(),
            pagination: None,
            ui_state: ThreadUiState::Empty,
            selected_index: None,
            scroll_offset: 0,
        }
    }
}

impl ThreadState {
    pub fn partner_id(&self) -> Option<&str> {
        self.partner_id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn entries(&self) -> &[ThreadEntry] {
        &self.entries
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    pub fn ui_state(&self) -> ThreadUiState {
        self.ui_state.clone()
    }

    /// Returns the selected entry index for scroll positioning.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// Returns the current scroll offset for the entry list.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn is_open(&self) -> bool {
        self.partner_id.is_some()
    }

    pub fn is_showing(&self, partner_id: &str) -> bool {
        self.partner_id.as_deref() == Some(partner_id)
    }

    /// Opens a new conversation: previous entries and pagination are dropped.
    pub fn set_loading(&mut self, partner_id: String, title: String) {
        self.partner_id = Some(partner_id);
        self.title = title;
        self.entries.clear();
        self.pagination = None;
        self.ui_state = ThreadUiState::Loading;
        self.selected_index = None;
        self.scroll_offset = 0;
    }

    /// Marks a page change inside the open conversation.
    pub fn set_page_loading(&mut self) {
        self.ui_state = ThreadUiState::Loading;
    }

    /// Replaces the entries wholesale with a freshly fetched page.
    pub fn set_ready(
        &mut self,
        messages: Vec<Message>,
        partner: Option<Partner>,
        pagination: Pagination,
    ) {
        if let Some(partner) = partner {
            if !partner.name.is_empty() {
                self.title = partner.name;
            }
        }

        let mut entries: Vec<ThreadEntry> = Vec::with_capacity(messages.len());
        for message in messages {
            let duplicate = entries
                .iter()
                .any(|entry| entry.id() == EntryId::Server(&message.id));
            if !duplicate {
                entries.push(ThreadEntry::Confirmed(message));
            }
        }

        self.selected_index = entries.len().checked_sub(1);
        self.entries = entries;
        self.pagination = Some(pagination);
        self.ui_state = ThreadUiState::Ready;
        self.scroll_offset = 0;
    }

    pub fn set_error(&mut self) {
        self.ui_state = ThreadUiState::Error;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn contains_server_id(&self, id: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.id() == EntryId::Server(id))
    }

    /// Appends a message delivered out of band. Returns `false` when an entry
    /// with the same server id already exists.
    pub fn append_incoming(&mut self, message: Message) -> bool {
        if self.contains_server_id(&message.id) {
            return false;
        }

        let follow_tail = self.is_following_tail();
        self.entries.push(ThreadEntry::Confirmed(message));
        if follow_tail {
            self.select_latest();
        }
        true
    }

    pub fn push_pending(&mut self, pending: PendingMessage) {
        self.entries.push(ThreadEntry::Pending(pending));
        self.select_latest();
    }

    pub fn confirm_pending(&mut self, client_id: Uuid, message: Message) -> Reconciliation {
        let Some(position) = self.pending_position(client_id) else {
            return Reconciliation::Missing;
        };

        if self.contains_server_id(&message.id) {
            self.remove_entry(position);
            return Reconciliation::AlreadyDelivered;
        }

        self.entries[position] = ThreadEntry::Confirmed(message);
        Reconciliation::Replaced
    }

    pub fn discard_pending(&mut self, client_id: Uuid) -> Option<PendingMessage> {
        let position = self.pending_position(client_id)?;
        match self.remove_entry(position) {
            ThreadEntry::Pending(pending) => Some(pending),
            ThreadEntry::Confirmed(_) => None,
        }
    }

    /// Selects the next entry (moves down in the list).
    pub fn select_next(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        self.selected_index = match self.selected_index {
            None => Some(0),
            Some(idx) if idx + 1 < self.entries.len() => Some(idx + 1),
            Some(idx) => Some(idx),
        };
    }

    /// Selects the previous entry (moves up in the list).
    pub fn select_previous(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        self.selected_index = match self.selected_index {
            None => Some(self.entries.len() - 1),
            Some(0) => Some(0),
            Some(idx) => Some(idx - 1),
        };
    }

    pub fn select_latest(&mut self) {
        self.selected_index = self.entries.len().checked_sub(1);
    }

    /// Updates the scroll offset based on the current selection and viewport height.
    /// Keeps SCROLL_MARGIN items visible around the cursor.
    ///
    /// `element_index` is the visual index in the list (accounting for date separators).
    pub fn update_scroll_offset(&mut self, element_index: usize, viewport_height: usize) {
        if viewport_height == 0 {
            return;
        }

        let effective_margin = SCROLL_MARGIN.min(viewport_height / 2);

        if element_index < self.scroll_offset + effective_margin {
            self.scroll_offset = element_index.saturating_sub(effective_margin);
        }

        let visible_bottom = self.scroll_offset + viewport_height;
        if element_index + effective_margin >= visible_bottom {
            self.scroll_offset =
                (element_index + effective_margin + 1).saturating_sub(viewport_height);
        }
    }

    fn is_following_tail(&self) -> bool {
        match self.selected_index {
            None => true,
            Some(index) => index + 1 >= self.entries.len(),
        }
    }

    fn pending_position(&self, client_id: Uuid) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.id() == EntryId::Client(client_id))
    }

    fn remove_entry(&mut self, position: usize) -> ThreadEntry {
        let removed = self.entries.remove(position);
        self.selected_index = match self.selected_index {
            _ if self.entries.is_empty() => None,
            Some(index) if index >= self.entries.len() => Some(self.entries.len() - 1),
            other => other,
        };
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::MessageSender;

    fn sender(id: &str, is_current_user: bool) -> MessageSender {
        MessageSender {
            id: id.to_owned(),
            name: id.to_uppercase(),
            avatar_url: None,
            is_current_user,
        }
    }

    fn message(id: &str, text: &str) -> Message {
        Message {
            id: id.to_owned(),
            content: text.to_owned(),
            created_at_ms: 1_000,
            read: false,
            sender: sender("u1", false),
            receiver_id: None,
        }
    }

    fn pending(text: &str) -> PendingMessage {
        PendingMessage {
            client_id: Uuid::new_v4(),
            receiver_id: "u1".to_owned(),
            content: text.to_owned(),
            created_at_ms: 2_000,
            sender: sender("me", true),
        }
    }

    fn open_thread(messages: Vec<Message>) -> ThreadState {
        let mut state = ThreadState::default();
        state.set_loading("u1".to_owned(), "Maria".to_owned());
        let total = messages.len();
        state.set_ready(messages, None, Pagination::single(total));
        state
    }

    fn ids(state: &ThreadState) -> Vec<String> {
        state
            .entries()
            .iter()
            .map(|entry| match entry.id() {
                EntryId::Server(id) => id.to_owned(),
                EntryId::Client(id) => id.to_string(),
            })
            .collect()
    }

    #[test]
    fn default_state_is_empty() {
        let state = ThreadState::default();

        assert_eq!(state.ui_state(), ThreadUiState::Empty);
        assert!(!state.is_open());
        assert!(state.entries().is_empty());
    }

    #[test]
    fn set_loading_switches_partner_and_drops_entries() {
        let mut state = open_thread(vec![message("m1", "hi")]);

        state.set_loading("u2".to_owned(), "Jon".to_owned());

        assert!(state.is_showing("u2"));
        assert_eq!(state.title(), "Jon");
        assert!(state.entries().is_empty());
        assert_eq!(state.pagination(), None);
        assert_eq!(state.ui_state(), ThreadUiState::Loading);
    }

    #[test]
    fn set_ready_selects_last_and_takes_partner_name() {
        let mut state = ThreadState::default();
        state.set_loading("u1".to_owned(), "u1".to_owned());

        state.set_ready(
            vec![message("m1", "a"), message("m2", "b")],
            Some(Partner {
                id: "u1".to_owned(),
                name: "Maria".to_owned(),
                avatar_url: None,
            }),
            Pagination::single(2),
        );

        assert_eq!(state.ui_state(), ThreadUiState::Ready);
        assert_eq!(state.selected_index(), Some(1));
        assert_eq!(state.title(), "Maria");
    }

    #[test]
    fn set_ready_drops_duplicate_ids_from_page() {
        let state = open_thread(vec![message("m1", "a"), message("m1", "a again")]);

        assert_eq!(ids(&state), vec!["m1"]);
    }

    #[test]
    fn append_incoming_ignores_known_id() {
        let mut state = open_thread(vec![message("m1", "a")]);

        assert!(state.append_incoming(message("m2", "b")));
        assert!(!state.append_incoming(message("m2", "b")));
        assert!(!state.append_incoming(message("m1", "a")));

        assert_eq!(ids(&state), vec!["m1", "m2"]);
    }

    #[test]
    fn append_incoming_follows_tail_only_when_at_latest() {
        let mut state = open_thread(vec![message("m1", "a"), message("m2", "b")]);

        state.append_incoming(message("m3", "c"));
        assert_eq!(state.selected_index(), Some(2));

        state.select_previous();
        state.select_previous();
        state.append_incoming(message("m4", "d"));
        assert_eq!(state.selected_index(), Some(0));
    }

    #[test]
    fn confirm_pending_replaces_in_place() {
        let mut state = open_thread(vec![message("m1", "a")]);
        let draft = pending("hello");
        let client_id = draft.client_id;
        state.push_pending(draft);

        let outcome = state.confirm_pending(client_id, message("m2", "hello"));

        assert_eq!(outcome, Reconciliation::Replaced);
        assert_eq!(ids(&state), vec!["m1", "m2"]);
        assert!(state.entries().iter().all(|entry| !entry.is_pending()));
    }

    #[test]
    fn confirm_pending_drops_copy_already_delivered_by_stream() {
        let mut state = open_thread(vec![]);
        let draft = pending("hello");
        let client_id = draft.client_id;
        state.push_pending(draft);
        state.append_incoming(message("m9", "hello"));

        let outcome = state.confirm_pending(client_id, message("m9", "hello"));

        assert_eq!(outcome, Reconciliation::AlreadyDelivered);
        assert_eq!(ids(&state), vec!["m9"]);
    }

    #[test]
    fn confirm_pending_for_unknown_client_id_is_missing() {
        let mut state = open_thread(vec![message("m1", "a")]);

        let outcome = state.confirm_pending(Uuid::new_v4(), message("m2", "b"));

        assert_eq!(outcome, Reconciliation::Missing);
        assert_eq!(ids(&state), vec!["m1"]);
    }

    #[test]
    fn discard_pending_removes_only_that_entry() {
        let mut state = open_thread(vec![message("m1", "a")]);
        let draft = pending("oops");
        let client_id = draft.client_id;
        state.push_pending(draft);

        let removed = state.discard_pending(client_id);

        assert_eq!(removed.map(|p| p.content), Some("oops".to_owned()));
        assert_eq!(ids(&state), vec!["m1"]);
        assert_eq!(state.selected_index(), Some(0));
        assert_eq!(state.discard_pending(client_id), None);
    }

    #[test]
    fn discard_last_pending_leaves_no_selection() {
        let mut state = open_thread(vec![]);
        let draft = pending("oops");
        let client_id = draft.client_id;
        state.push_pending(draft);

        state.discard_pending(client_id);

        assert_eq!(state.selected_index(), None);
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut state = open_thread(vec![message("m1", "a")]);

        state.clear();

        assert_eq!(state, ThreadState::default());
    }

    #[test]
    fn selection_stays_within_bounds() {
        let mut state = open_thread(vec![message("m1", "a"), message("m2", "b")]);

        state.select_next();
        assert_eq!(state.selected_index(), Some(1));

        state.select_previous();
        state.select_previous();
        assert_eq!(state.selected_index(), Some(0));
    }

    #[test]
    fn selection_on_empty_thread_does_nothing() {
        let mut state = open_thread(vec![]);

        state.select_next();
        state.select_previous();

        assert_eq!(state.selected_index(), None);
    }

    #[test]
    fn update_scroll_offset_scrolls_down_when_cursor_near_bottom() {
        let mut state = ThreadState::default();

        state.update_scroll_offset(18, 20);

        assert!(state.scroll_offset() > 0);
    }

    #[test]
    fn update_scroll_offset_scrolls_up_when_cursor_near_top() {
        let mut state = ThreadState {
            scroll_offset: 10,
            ..ThreadState::default()
        };

        state.update_scroll_offset(12, 20);

        assert!(state.scroll_offset() < 10);
    }

    #[test]
    fn update_scroll_offset_handles_zero_viewport() {
        let mut state = ThreadState {
            scroll_offset: 5,
            ..ThreadState::default()
        };

        state.update_scroll_offset(10, 0);

        assert_eq!(state.scroll_offset(), 5);
    }
}
