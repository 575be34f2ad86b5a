use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSender {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub is_current_user: bool,
}

/// A message confirmed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub created_at_ms: i64,
    pub read: bool,
    pub sender: MessageSender,
    /// Recipient id, when the payload carries it (stream events do).
    pub receiver_id: Option<String>,
}

/// A locally composed message that the server has not confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    pub client_id: Uuid,
    pub receiver_id: String,
    pub content: String,
    pub created_at_ms: i64,
    pub sender: MessageSender,
}

/// Identity of a thread entry. Server and client ids never collide because
/// they live in separate variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryId<'a> {
    Server(&'a str),
    Client(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadEntry {
    Confirmed(Message),
    Pending(PendingMessage),
}

impl ThreadEntry {
    pub fn id(&self) -> EntryId<'_> {
        match self {
            Self::Confirmed(message) => EntryId::Server(&message.id),
            Self::Pending(pending) => EntryId::Client(pending.client_id),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Confirmed(message) => &message.content,
            Self::Pending(pending) => &pending.content,
        }
    }

    pub fn created_at_ms(&self) -> i64 {
        match self {
            Self::Confirmed(message) => message.created_at_ms,
            Self::Pending(pending) => pending.created_at_ms,
        }
    }

    pub fn sender(&self) -> &MessageSender {
        match self {
            Self::Confirmed(message) => &message.sender,
            Self::Pending(pending) => &pending.sender,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Name shown next to the entry: "You" for the session user.
    pub fn display_sender(&self) -> &str {
        let sender = self.sender();
        if sender.is_current_user {
            "You"
        } else {
            &sender.name
        }
    }
}
