use uuid::Uuid;

/// A send that has been dispatched and not completed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlightSend {
    pub client_id: Uuid,
    pub receiver_id: String,
    pub content: String,
}

/// Single-flight guard for the compose box: at most one send is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outbox {
    in_flight: Option<InFlightSend>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboxBusy;

impl Outbox {
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&InFlightSend> {
        self.in_flight.as_ref()
    }

    pub fn begin(&mut self, send: InFlightSend) -> Result<(), OutboxBusy> {
        if self.in_flight.is_some() {
            return Err(OutboxBusy);
        }
        self.in_flight = Some(send);
        Ok(())
    }

    /// Releases the guard for `client_id`. Completions for any other id are ignored.
    pub fn finish(&mut self, client_id: Uuid) -> Option<InFlightSend> {
        match &self.in_flight {
            Some(send) if send.client_id == client_id => self.in_flight.take(),
            _ => None,
        }
    }
}
