use std::sync::{mpsc::Sender, Weak};

use futures::StreamExt;
use tokio::{runtime::Runtime, sync::watch};

use crate::{
    api::{client::HttpSession, dto, sse::SseDecoder},
    domain::{
        events::{AppEvent, StreamEnvelope, StreamEvent},
        stream_state::{ConnectionId, StreamScope},
    },
    usecases::live_updates::{StreamConnector, StreamOpenError},
};

const STREAM_MONITOR_STARTED: &str = "API_STREAM_MONITOR_STARTED";
const STREAM_MONITOR_STOPPED: &str = "API_STREAM_MONITOR_STOPPED";
const STREAM_MONITOR_STOP_SIGNALLED: &str = "API_STREAM_MONITOR_STOP_SIGNALLED";
const STREAM_OPEN_FAILED: &str = "API_STREAM_OPEN_FAILED";
const STREAM_READ_FAILED: &str = "API_STREAM_READ_FAILED";
const STREAM_PAYLOAD_INVALID: &str = "API_STREAM_PAYLOAD_INVALID";
const STREAM_LINE_TOO_LONG: &str = "API_STREAM_LINE_TOO_LONG";
const STREAM_EVENT_SEND_FAILED: &str = "API_STREAM_EVENT_SEND_FAILED";

const CONNECTED_EVENT: &str = "connected";
const NEW_MESSAGE_EVENT: &str = "new-message";

/// Handle of one running stream task. Dropping it stops the task and closes
/// the HTTP connection.
#[derive(Debug)]
pub struct EventStreamMonitor {
    connection: ConnectionId,
    stop_tx: Option<watch::Sender<bool>>,
}

impl EventStreamMonitor {
    pub fn connection(&self) -> ConnectionId {
        self.connection
    }
}

impl Drop for EventStreamMonitor {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
            tracing::debug!(
                code = STREAM_MONITOR_STOP_SIGNALLED,
                connection = self.connection.value(),
                "event stream stop signal sent"
            );
        }
    }
}

/// Opens `GET /events` connections on the API runtime.
#[derive(Debug, Clone)]
pub struct ApiStreamConnector {
    runtime: Weak<Runtime>,
    session: HttpSession,
    events: Sender<AppEvent>,
}

impl ApiStreamConnector {
    pub fn new(runtime: Weak<Runtime>, session: HttpSession, events: Sender<AppEvent>) -> Self {
        Self {
            runtime,
            session,
            events,
        }
    }
}

impl StreamConnector for ApiStreamConnector {
    type Handle = EventStreamMonitor;

    fn open(
        &self,
        connection: ConnectionId,
        scope: &StreamScope,
    ) -> Result<Self::Handle, StreamOpenError> {
        let runtime = self
            .runtime
            .upgrade()
            .ok_or(StreamOpenError::RuntimeUnavailable)?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = StreamTask {
            connection,
            scope: scope.clone(),
            session: self.session.clone(),
            events: self.events.clone(),
        };
        runtime.spawn(task.run(stop_rx));

        tracing::info!(
            code = STREAM_MONITOR_STARTED,
            connection = connection.value(),
            partner_id = scope.partner_id.as_deref(),
            "event stream monitor started"
        );

        Ok(EventStreamMonitor {
            connection,
            stop_tx: Some(stop_tx),
        })
    }
}

struct StreamTask {
    connection: ConnectionId,
    scope: StreamScope,
    session: HttpSession,
    events: Sender<AppEvent>,
}

impl StreamTask {
    async fn run(self, mut stop_rx: watch::Receiver<bool>) {
        let response = tokio::select! {
            _ = stop_rx.changed() => {
                self.log_stopped();
                return;
            }
            opened = self.session.open_events(&self.scope) => opened,
        };

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(
                    code = STREAM_OPEN_FAILED,
                    connection = self.connection.value(),
                    status = error.status(),
                    error = %error,
                    "event stream could not be opened"
                );
                self.emit(StreamEvent::Failed {
                    reason: error.to_string(),
                });
                return;
            }
        };

        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();

        loop {
            tokio::select! {
                _ = stop_rx.changed() => {
                    self.log_stopped();
                    return;
                }
                chunk = body.next() => {
                    let bytes = match chunk {
                        Some(Ok(bytes)) => bytes,
                        Some(Err(error)) => {
                            tracing::warn!(
                                code = STREAM_READ_FAILED,
                                connection = self.connection.value(),
                                error = %error,
                                "event stream read failed"
                            );
                            self.emit(StreamEvent::Failed { reason: error.to_string() });
                            return;
                        }
                        None => {
                            self.emit(StreamEvent::Failed {
                                reason: "event stream ended".to_owned(),
                            });
                            return;
                        }
                    };

                    let events = match decoder.push(&bytes) {
                        Ok(events) => events,
                        Err(error) => {
                            tracing::warn!(
                                code = STREAM_LINE_TOO_LONG,
                                connection = self.connection.value(),
                                error = %error,
                                "dropping event stream with oversized line"
                            );
                            self.emit(StreamEvent::Failed { reason: error.to_string() });
                            return;
                        }
                    };

                    for event in events {
                        let Some(mapped) = self.map_event(&event.event, &event.data) else {
                            continue;
                        };
                        if !self.emit(mapped) {
                            return;
                        }
                    }
                }
            }
        }
    }

    fn map_event(&self, name: &str, data: &str) -> Option<StreamEvent> {
        match name {
            CONNECTED_EVENT => Some(StreamEvent::Connected),
            NEW_MESSAGE_EVENT => {
                match dto::decode_message(data.as_bytes(), self.session.session_user_id()) {
                    Ok(message) => Some(StreamEvent::NewMessage(message)),
                    Err(error) => {
                        tracing::warn!(
                            code = STREAM_PAYLOAD_INVALID,
                            connection = self.connection.value(),
                            error = %error,
                            "skipping undecodable new-message event"
                        );
                        None
                    }
                }
            }
            other => {
                tracing::trace!(event = other, "ignoring unknown stream event");
                None
            }
        }
    }

    fn emit(&self, event: StreamEvent) -> bool {
        let envelope = StreamEnvelope {
            connection: self.connection,
            event,
        };
        if let Err(error) = self.events.send(AppEvent::Stream(envelope)) {
            tracing::debug!(
                code = STREAM_EVENT_SEND_FAILED,
                connection = self.connection.value(),
                error = %error,
                "event stream receiver is gone"
            );
            return false;
        }
        true
    }

    fn log_stopped(&self) {
        tracing::info!(
            code = STREAM_MONITOR_STOPPED,
            connection = self.connection.value(),
            "event stream monitor stopped"
        );
    }
}
