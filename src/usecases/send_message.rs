//! Optimistic sending from the compose box.
//!
//! `submit_message` shows a pending entry right away and hands the send to a
//! [`MessageDispatcher`], which reports back later with a
//! [`SendCompletion`]. `complete_send` swaps the pending entry for the
//! confirmed message or rolls it back.

use uuid::Uuid;

use crate::domain::{
    events::{DeliveryError, SendCompletion},
    message::{MessageSender, PendingMessage},
    outbox::InFlightSend,
    shell_state::ShellState,
    thread_state::Reconciliation,
};

/// A message handed to the background sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub client_id: Uuid,
    pub receiver_id: String,
    pub content: String,
}

/// The dispatcher could not accept the message (its worker is gone).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchError;

/// Sends messages in the background. Implementations must eventually deliver
/// exactly one [`SendCompletion`] per accepted message.
pub trait MessageDispatcher {
    fn dispatch(&self, message: OutgoingMessage) -> Result<(), DispatchError>;
}

impl<T: MessageDispatcher + ?Sized> MessageDispatcher for &T {
    fn dispatch(&self, message: OutgoingMessage) -> Result<(), DispatchError> {
        (*self).dispatch(message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// No conversation is open.
    NoActiveConversation,
    /// Message text is empty after trimming whitespace.
    EmptyMessage,
    /// A previous send has not completed yet.
    SendInFlight,
    /// The background sender is not running.
    DispatcherUnavailable,
    Unauthorized,
    RecipientNotFound,
    Rejected { status: u16 },
    TemporarilyUnavailable,
    DataContractViolation,
}

impl SendMessageError {
    pub fn user_message(&self) -> String {
        match self {
            Self::NoActiveConversation => "Open a conversation first.".to_owned(),
            Self::EmptyMessage => "Message is empty.".to_owned(),
            Self::SendInFlight => "Still sending the previous message.".to_owned(),
            Self::DispatcherUnavailable => "Message sender stopped; restart to send.".to_owned(),
            Self::Unauthorized => "Message not sent: session expired.".to_owned(),
            Self::RecipientNotFound => "Message not sent: recipient not found.".to_owned(),
            Self::Rejected { status } => format!("Message not sent (HTTP {status})."),
            Self::TemporarilyUnavailable => "Message not sent: server unreachable.".to_owned(),
            Self::DataContractViolation => {
                "Message may not have been sent: unexpected response.".to_owned()
            }
        }
    }
}

/// How a completion settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendSettlement {
    Confirmed(Reconciliation),
    Failed {
        error: SendMessageError,
        /// Whether the typed content went back into the compose box.
        content_restored: bool,
    },
    /// The completion does not belong to the send in flight.
    Stale,
}

/// Validates the compose box and starts an optimistic send.
///
/// On success the pending entry is already in the thread, the compose box is
/// empty and the returned client id identifies the send.
pub fn submit_message(
    state: &mut ShellState,
    dispatcher: &dyn MessageDispatcher,
    author: &MessageSender,
    now_ms: i64,
) -> Result<Uuid, SendMessageError> {
    let receiver_id = state
        .thread()
        .partner_id()
        .map(ToOwned::to_owned)
        .ok_or(SendMessageError::NoActiveConversation)?;

    let content = state.compose().text().trim().to_owned();
    if content.is_empty() {
        return Err(SendMessageError::EmptyMessage);
    }

    let client_id = Uuid::new_v4();
    state
        .outbox_mut()
        .begin(InFlightSend {
            client_id,
            receiver_id: receiver_id.clone(),
            content: content.clone(),
        })
        .map_err(|_| SendMessageError::SendInFlight)?;

    state.thread_mut().push_pending(PendingMessage {
        client_id,
        receiver_id: receiver_id.clone(),
        content: content.clone(),
        created_at_ms: now_ms,
        sender: author.clone(),
    });
    state.compose_mut().clear();

    let outgoing = OutgoingMessage {
        client_id,
        receiver_id,
        content,
    };
    if dispatcher.dispatch(outgoing).is_err() {
        roll_back(state, client_id);
        return Err(SendMessageError::DispatcherUnavailable);
    }

    Ok(client_id)
}

/// Applies the server's answer to the pending entry identified by the completion.
pub fn complete_send(state: &mut ShellState, completion: SendCompletion) -> SendSettlement {
    let SendCompletion { client_id, result } = completion;

    match result {
        Ok(message) => {
            let Some(send) = state.outbox_mut().finish(client_id) else {
                return SendSettlement::Stale;
            };
            let thread = state.thread_mut();
            let outcome = thread.confirm_pending(client_id, message.clone());
            // A reload of the same thread while sending drops the pending copy.
            if outcome == Reconciliation::Missing && thread.is_showing(&send.receiver_id) {
                return SendSettlement::Confirmed(if thread.append_incoming(message) {
                    Reconciliation::Appended
                } else {
                    Reconciliation::AlreadyDelivered
                });
            }
            SendSettlement::Confirmed(outcome)
        }
        Err(error) => {
            if state.outbox().in_flight().map(|send| send.client_id) != Some(client_id) {
                return SendSettlement::Stale;
            }
            let content_restored = roll_back(state, client_id);
            SendSettlement::Failed {
                error: map_delivery_error(error),
                content_restored,
            }
        }
    }
}

/// Removes the pending entry and frees the outbox. The typed content goes back
/// into the compose box only while its recipient's thread is still open and
/// the user has not started a new draft.
fn roll_back(state: &mut ShellState, client_id: Uuid) -> bool {
    state.thread_mut().discard_pending(client_id);
    let Some(send) = state.outbox_mut().finish(client_id) else {
        return false;
    };

    if state.thread().is_showing(&send.receiver_id) && state.compose().is_blank() {
        state.compose_mut().restore(&send.content);
        true
    } else {
        false
    }
}

fn map_delivery_error(error: DeliveryError) -> SendMessageError {
    match error {
        DeliveryError::Unauthorized => SendMessageError::Unauthorized,
        DeliveryError::RecipientNotFound => SendMessageError::RecipientNotFound,
        DeliveryError::Rejected { status } => SendMessageError::Rejected { status },
        DeliveryError::Unavailable => SendMessageError::TemporarilyUnavailable,
        DeliveryError::InvalidData => SendMessageError::DataContractViolation,
    }
}
