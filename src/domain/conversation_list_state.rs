use super::{
    conversation::{ConversationFilters, ConversationSummary},
    pagination::Pagination,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationListUiState {
    Loading,
    Ready,
    Empty,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationListState {
    ui_state: ConversationListUiState,
    conversations: Vec<ConversationSummary>,
    selected_index: Option<usize>,
    pagination: Option<Pagination>,
    filters: ConversationFilters,
}

impl Default for ConversationListState {
    fn default() -> Self {
        Self {
            ui_state: ConversationListUiState::Loading,
            conversations: Vec::new(),
            selected_index: None,
            pagination: None,
            filters: ConversationFilters::default(),
        }
    }
}

impl ConversationListState {
    pub fn ui_state(&self) -> ConversationListUiState {
        self.ui_state.clone()
    }

    pub fn conversations(&self) -> &[ConversationSummary] {
        &self.conversations
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&ConversationSummary> {
        self.selected_index
            .and_then(|index| self.conversations.get(index))
    }

    pub fn find(&self, partner_id: &str) -> Option<&ConversationSummary> {
        self.conversations
            .iter()
            .find(|conversation| conversation.partner_id == partner_id)
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    /// Page the list is on; 1 until the first page arrives.
    pub fn current_page(&self) -> u32 {
        self.pagination.map_or(1, |pagination| pagination.page)
    }

    pub fn filters(&self) -> &ConversationFilters {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut ConversationFilters {
        &mut self.filters
    }

    /// Marks the list as loading. Items stay visible so a background refresh
    /// does not blank the panel.
    pub fn set_loading(&mut self) {
        self.ui_state = ConversationListUiState::Loading;
    }

    pub fn set_ready(&mut self, conversations: Vec<ConversationSummary>, pagination: Pagination) {
        self.pagination = Some(pagination);

        if conversations.is_empty() {
            self.ui_state = ConversationListUiState::Empty;
            self.conversations.clear();
            self.selected_index = None;
            return;
        }

        let previous_partner_id = self
            .selected()
            .map(|conversation| conversation.partner_id.clone());
        self.ui_state = ConversationListUiState::Ready;
        self.conversations = conversations;
        self.selected_index =
            resolve_selection_index(&self.conversations, previous_partner_id.as_deref());
    }

    pub fn set_error(&mut self) {
        self.ui_state = ConversationListUiState::Error;
        self.conversations.clear();
        self.selected_index = None;
    }

    /// Locally zeroes the unread counter of a conversation that was opened.
    pub fn reset_unread(&mut self, partner_id: &str) {
        if let Some(conversation) = self
            .conversations
            .iter_mut()
            .find(|conversation| conversation.partner_id == partner_id)
        {
            conversation.unread_count = 0;
        }
    }

    pub fn select_next(&mut self) {
        let Some(index) = self.selected_index else {
            return;
        };

        let last_index = self.conversations.len().saturating_sub(1);
        self.selected_index = Some(std::cmp::min(index.saturating_add(1), last_index));
    }

    pub fn select_previous(&mut self) {
        let Some(index) = self.selected_index else {
            return;
        };

        self.selected_index = Some(index.saturating_sub(1));
    }

    pub fn select_partner(&mut self, partner_id: &str) {
        if let Some(index) = self
            .conversations
            .iter()
            .position(|conversation| conversation.partner_id == partner_id)
        {
            self.selected_index = Some(index);
        }
    }
}

fn resolve_selection_index(
    conversations: &[ConversationSummary],
    previous_partner_id: Option<&str>,
) -> Option<usize> {
    if conversations.is_empty() {
        return None;
    }

    previous_partner_id
        .and_then(|partner_id| {
            conversations
                .iter()
                .position(|conversation| conversation.partner_id == partner_id)
        })
        .or(Some(0))
}
