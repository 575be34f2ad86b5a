/// The other participant of a two-person conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partner {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub partner_id: String,
    pub partner_name: String,
    pub partner_avatar_url: Option<String>,
    pub last_message_preview: Option<String>,
    pub last_message_unix_ms: Option<i64>,
    /// Humanized time of the last message as rendered by the server ("5 minutes ago").
    pub last_message_label: Option<String>,
    pub unread_count: u32,
    pub created_at_unix_ms: Option<i64>,
}

impl ConversationSummary {
    pub fn partner(&self) -> Partner {
        Partner {
            id: self.partner_id.clone(),
            name: self.partner_name.clone(),
            avatar_url: self.partner_avatar_url.clone(),
        }
    }
}

/// Server-side filters for the conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationFilters {
    pub search: String,
    pub unread_only: bool,
}

impl ConversationFilters {
    /// Search text with surrounding whitespace removed, or `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        if term.is_empty() {
            None
        } else {
            Some(term)
        }
    }

    pub fn is_active(&self) -> bool {
        self.unread_only || self.search_term().is_some()
    }
}
