//! Ports and rules for the live message stream.

use crate::domain::{
    message::Message,
    stream_state::{ConnectionId, StreamScope},
    thread_state::ThreadState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOpenError {
    /// The background runtime is gone.
    RuntimeUnavailable,
}

/// Opens stream connections. Dropping the returned handle closes the
/// connection; events it produced afterwards are tagged with its id and
/// ignored by the caller.
pub trait StreamConnector {
    type Handle;

    fn open(
        &self,
        connection: ConnectionId,
        scope: &StreamScope,
    ) -> Result<Self::Handle, StreamOpenError>;
}

impl<T: StreamConnector + ?Sized> StreamConnector for &T {
    type Handle = T::Handle;

    fn open(
        &self,
        connection: ConnectionId,
        scope: &StreamScope,
    ) -> Result<Self::Handle, StreamOpenError> {
        (*self).open(connection, scope)
    }
}

/// Whether a streamed message is part of the conversation the thread shows.
pub fn belongs_to_open_thread(thread: &ThreadState, message: &Message) -> bool {
    let Some(partner_id) = thread.partner_id() else {
        return false;
    };

    if message.sender.id == partner_id {
        return true;
    }

    message.sender.is_current_user
        && message
            .receiver_id
            .as_deref()
            .map_or(true, |receiver| receiver == partner_id)
}

/// Appends a streamed message to the open thread when it belongs there.
/// Returns `true` when a new entry was added.
pub fn apply_new_message(thread: &mut ThreadState, message: Message) -> bool {
    if !belongs_to_open_thread(thread, &message) {
        return false;
    }
    thread.append_incoming(message)
}
