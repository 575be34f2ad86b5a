use crate::domain::{conversation::Partner, message::Message, pagination::Pagination};

const DEFAULT_MESSAGES_PAGE_SIZE: u32 = 50;
const MAX_MESSAGES_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMessagesQuery {
    pub partner_id: String,
    pub page: u32,
    pub limit: u32,
}

impl LoadMessagesQuery {
    pub fn new(partner_id: impl Into<String>) -> Self {
        Self {
            partner_id: partner_id.into(),
            page: 1,
            limit: DEFAULT_MESSAGES_PAGE_SIZE,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    fn normalized_limit(&self) -> u32 {
        match self.limit {
            0 => DEFAULT_MESSAGES_PAGE_SIZE,
            value if value > MAX_MESSAGES_PAGE_SIZE => MAX_MESSAGES_PAGE_SIZE,
            value => value,
        }
    }
}

/// One page of a conversation, oldest message first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPage {
    pub messages: Vec<Message>,
    pub partner: Option<Partner>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagesSourceError {
    Unauthorized,
    Unavailable,
    RequestFailed { status: u16 },
    InvalidData,
    ConversationNotFound,
}

pub trait MessagesSource {
    fn load_thread(
        &self,
        partner_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<ThreadPage, MessagesSourceError>;
}

impl<T> MessagesSource for &T
where
    T: MessagesSource + ?Sized,
{
    fn load_thread(
        &self,
        partner_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<ThreadPage, MessagesSourceError> {
        (*self).load_thread(partner_id, page, limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMessagesError {
    Unauthorized,
    TemporarilyUnavailable,
    RequestFailed { status: u16 },
    DataContractViolation,
    ConversationNotFound,
}

impl LoadMessagesError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Session expired. Update the session token and restart.".to_owned(),
            Self::TemporarilyUnavailable => {
                "Failed to load messages: server unreachable.".to_owned()
            }
            Self::RequestFailed { status } => format!("Failed to load messages (HTTP {status})."),
            Self::DataContractViolation => {
                "Failed to load messages: unexpected response.".to_owned()
            }
            Self::ConversationNotFound => "This conversation no longer exists.".to_owned(),
        }
    }
}

pub fn load_messages(
    source: &dyn MessagesSource,
    query: LoadMessagesQuery,
) -> Result<ThreadPage, LoadMessagesError> {
    let limit = query.normalized_limit();
    source
        .load_thread(&query.partner_id, query.page.max(1), limit)
        .map_err(map_source_error)
}

fn map_source_error(error: MessagesSourceError) -> LoadMessagesError {
    match error {
        MessagesSourceError::Unauthorized => LoadMessagesError::Unauthorized,
        MessagesSourceError::Unavailable => LoadMessagesError::TemporarilyUnavailable,
        MessagesSourceError::RequestFailed { status } => LoadMessagesError::RequestFailed { status },
        MessagesSourceError::InvalidData => LoadMessagesError::DataContractViolation,
        MessagesSourceError::ConversationNotFound => LoadMessagesError::ConversationNotFound,
    }
}
