use std::sync::{mpsc::Sender, Weak};

use tokio::runtime::Runtime;

use crate::{
    api::client::HttpSession,
    domain::events::{AppEvent, DeliveryError, SendCompletion},
    usecases::send_message::{DispatchError, MessageDispatcher, OutgoingMessage},
};

const SEND_DISPATCHED: &str = "API_SEND_DISPATCHED";
const SEND_FAILED: &str = "API_SEND_FAILED";
const SEND_COMPLETION_DROPPED: &str = "API_SEND_COMPLETION_DROPPED";

/// Posts messages on the API runtime and reports each outcome as
/// [`AppEvent::SendFinished`].
#[derive(Debug, Clone)]
pub struct ApiMessageDispatcher {
    runtime: Weak<Runtime>,
    session: HttpSession,
    events: Sender<AppEvent>,
}

impl ApiMessageDispatcher {
    pub fn new(runtime: Weak<Runtime>, session: HttpSession, events: Sender<AppEvent>) -> Self {
        Self {
            runtime,
            session,
            events,
        }
    }
}

impl MessageDispatcher for ApiMessageDispatcher {
    fn dispatch(&self, message: OutgoingMessage) -> Result<(), DispatchError> {
        let runtime = self.runtime.upgrade().ok_or(DispatchError)?;
        let session = self.session.clone();
        let events = self.events.clone();

        tracing::debug!(
            code = SEND_DISPATCHED,
            client_id = %message.client_id,
            receiver_id = %message.receiver_id,
            "dispatching message send"
        );

        runtime.spawn(async move {
            let result = session
                .send_message(&message.receiver_id, &message.content)
                .await
                .map_err(|error| {
                    tracing::warn!(
                        code = SEND_FAILED,
                        client_id = %message.client_id,
                        status = error.status(),
                        error = %error,
                        "message send failed"
                    );
                    DeliveryError::from(error)
                });

            let completion = SendCompletion {
                client_id: message.client_id,
                result,
            };
            if events.send(AppEvent::SendFinished(completion)).is_err() {
                tracing::debug!(
                    code = SEND_COMPLETION_DROPPED,
                    client_id = %message.client_id,
                    "send finished after the shell stopped"
                );
            }
        });

        Ok(())
    }
}
