use uuid::Uuid;

use super::{message::Message, stream_state::ConnectionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Tick,
    QuitRequested,
    InputKey(KeyInput),
    Stream(StreamEnvelope),
    SendFinished(SendCompletion),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, ctrl: bool) -> Self {
        Self {
            key: key.into(),
            ctrl,
        }
    }
}

/// An event read from one stream connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEnvelope {
    pub connection: ConnectionId,
    pub event: StreamEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Connected,
    NewMessage(Message),
    /// Transport failure or end of stream. The connection is unusable afterwards.
    Failed { reason: String },
}

/// Result of a background send, matched back to its pending entry by `client_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCompletion {
    pub client_id: Uuid,
    pub result: Result<Message, DeliveryError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    Unauthorized,
    RecipientNotFound,
    Rejected { status: u16 },
    Unavailable,
    InvalidData,
}
