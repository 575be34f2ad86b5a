//! Domain layer: core entities and state rules of the conversation view.

pub mod conversation;
pub mod conversation_list_state;
pub mod events;
pub mod message;
pub mod outbox;
pub mod pagination;
pub mod shell_state;
pub mod stream_state;
pub mod text_input;
pub mod thread_state;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
