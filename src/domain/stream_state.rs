//! Lifecycle of the live event stream.
//!
//! The state machine only decides; it never touches the network. Every
//! transition returns the [`StreamCommand`]s the caller must execute, and time
//! is passed in explicitly so reconnect timing can be driven by tests.

use std::time::{Duration, Instant};

/// Fixed delay between a transport error and the single reconnect attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Tag of one stream connection. Ids grow monotonically, so events carrying an
/// older id belong to a superseded connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// What a connection listens to: one partner or every conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamScope {
    pub partner_id: Option<String>,
}

impl StreamScope {
    pub fn global() -> Self {
        Self { partner_id: None }
    }

    pub fn partner(partner_id: impl Into<String>) -> Self {
        Self {
            partner_id: Some(partner_id.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Disconnected,
    Connecting,
    Connected,
}

impl StreamPhase {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Disconnected => "offline",
            Self::Connecting => "connecting",
            Self::Connected => "live",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamCommand {
    Open {
        connection: ConnectionId,
        scope: StreamScope,
    },
    Close {
        connection: ConnectionId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSubscription {
    phase: StreamPhase,
    current: Option<(ConnectionId, StreamScope)>,
    last_issued: u64,
    reconnect_at: Option<Instant>,
}

impl Default for StreamSubscription {
    fn default() -> Self {
        Self {
            phase: StreamPhase::Disconnected,
            current: None,
            last_issued: 0,
            reconnect_at: None,
        }
    }
}

impl StreamSubscription {
    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn current_connection(&self) -> Option<ConnectionId> {
        self.current.as_ref().map(|(connection, _)| *connection)
    }

    pub fn scope(&self) -> Option<&StreamScope> {
        self.current.as_ref().map(|(_, scope)| scope)
    }

    pub fn is_current(&self, connection: ConnectionId) -> bool {
        self.current_connection() == Some(connection)
    }

    /// Time left until the scheduled reconnect, if one is scheduled.
    pub fn reconnect_in(&self, now: Instant) -> Option<Duration> {
        self.reconnect_at
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Replaces whatever connection exists with a new one scoped to `scope`.
    /// Any scheduled reconnect is superseded.
    pub fn subscribe(&mut self, scope: StreamScope) -> Vec<StreamCommand> {
        let mut commands = Vec::with_capacity(2);
        if let Some(close) = self.close_current() {
            commands.push(close);
        }
        self.reconnect_at = None;
        commands.push(self.open(scope));
        commands
    }

    /// Handles the informational `connected` event. Returns `false` for stale connections.
    pub fn on_connected(&mut self, connection: ConnectionId) -> bool {
        if !self.is_current(connection) {
            return false;
        }
        self.phase = StreamPhase::Connected;
        true
    }

    /// Handles a transport error: closes the connection and schedules exactly
    /// one reconnect at `now + RECONNECT_DELAY`. Stale connections are ignored.
    pub fn on_error(&mut self, connection: ConnectionId, now: Instant) -> Option<StreamCommand> {
        if !self.is_current(connection) {
            return None;
        }
        let close = self.close_current();
        self.reconnect_at = Some(now + RECONNECT_DELAY);
        close
    }

    /// Fires the scheduled reconnect once its deadline has passed. `scope` is
    /// read by the caller at firing time, so the new connection follows the
    /// conversation that is active now rather than the one that failed.
    pub fn poll_reconnect(&mut self, now: Instant, scope: StreamScope) -> Option<StreamCommand> {
        let deadline = self.reconnect_at?;
        if now < deadline || self.current.is_some() {
            return None;
        }
        self.reconnect_at = None;
        Some(self.open(scope))
    }

    /// Tears the stream down for good (unmount).
    pub fn dispose(&mut self) -> Option<StreamCommand> {
        self.reconnect_at = None;
        self.close_current()
    }

    fn open(&mut self, scope: StreamScope) -> StreamCommand {
        self.last_issued += 1;
        let connection = ConnectionId(self.last_issued);
        self.current = Some((connection, scope.clone()));
        self.phase = StreamPhase::Connecting;
        StreamCommand::Open { connection, scope }
    }

    fn close_current(&mut self) -> Option<StreamCommand> {
        let (connection, _) = self.current.take()?;
        self.phase = StreamPhase::Disconnected;
        Some(StreamCommand::Close { connection })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened(commands: &[StreamCommand]) -> Vec<(u64, Option<String>)> {
        commands
            .iter()
            .filter_map(|command| match command {
                StreamCommand::Open { connection, scope } => {
                    Some((connection.value(), scope.partner_id.clone()))
                }
                StreamCommand::Close { .. } => None,
            })
            .collect()
    }

    #[test]
    fn starts_disconnected_without_connection() {
        let subscription = StreamSubscription::default();

        assert_eq!(subscription.phase(), StreamPhase::Disconnected);
        assert_eq!(subscription.current_connection(), None);
    }

    #[test]
    fn first_subscribe_only_opens() {
        let mut subscription = StreamSubscription::default();

        let commands = subscription.subscribe(StreamScope::global());

        assert_eq!(opened(&commands), vec![(1, None)]);
        assert_eq!(commands.len(), 1);
        assert_eq!(subscription.phase(), StreamPhase::Connecting);
    }

    #[test]
    fn resubscribe_closes_previous_before_opening() {
        let mut subscription = StreamSubscription::default();
        subscription.subscribe(StreamScope::partner("a"));

        let commands = subscription.subscribe(StreamScope::partner("b"));

        assert_eq!(
            commands,
            vec![
                StreamCommand::Close {
                    connection: ConnectionId(1)
                },
                StreamCommand::Open {
                    connection: ConnectionId(2),
                    scope: StreamScope::partner("b"),
                },
            ]
        );
        assert!(!subscription.is_current(ConnectionId(1)));
        assert!(subscription.is_current(ConnectionId(2)));
    }

    #[test]
    fn connected_event_only_counts_for_current_connection() {
        let mut subscription = StreamSubscription::default();
        subscription.subscribe(StreamScope::partner("a"));
        subscription.subscribe(StreamScope::partner("b"));

        assert!(!subscription.on_connected(ConnectionId(1)));
        assert_eq!(subscription.phase(), StreamPhase::Connecting);

        assert!(subscription.on_connected(ConnectionId(2)));
        assert_eq!(subscription.phase(), StreamPhase::Connected);
    }

    #[test]
    fn error_schedules_a_single_reconnect_after_fixed_delay() {
        let mut subscription = StreamSubscription::default();
        let t0 = Instant::now();
        subscription.subscribe(StreamScope::partner("a"));
        subscription.on_connected(ConnectionId(1));

        let close = subscription.on_error(ConnectionId(1), t0);

        assert_eq!(
            close,
            Some(StreamCommand::Close {
                connection: ConnectionId(1)
            })
        );
        assert_eq!(subscription.phase(), StreamPhase::Disconnected);
        assert_eq!(subscription.reconnect_in(t0), Some(RECONNECT_DELAY));

        let just_before = t0 + RECONNECT_DELAY - Duration::from_millis(1);
        assert_eq!(
            subscription.poll_reconnect(just_before, StreamScope::partner("a")),
            None
        );

        let reopened = subscription.poll_reconnect(t0 + RECONNECT_DELAY, StreamScope::partner("a"));
        assert_eq!(
            reopened,
            Some(StreamCommand::Open {
                connection: ConnectionId(2),
                scope: StreamScope::partner("a"),
            })
        );
        assert_eq!(
            subscription.poll_reconnect(t0 + RECONNECT_DELAY * 3, StreamScope::partner("a")),
            None
        );
    }

    #[test]
    fn reconnect_uses_scope_supplied_at_firing_time() {
        let mut subscription = StreamSubscription::default();
        let t0 = Instant::now();
        subscription.subscribe(StreamScope::partner("a"));
        subscription.on_error(ConnectionId(1), t0);

        let reopened = subscription.poll_reconnect(t0 + RECONNECT_DELAY, StreamScope::partner("b"));

        assert_eq!(
            reopened,
            Some(StreamCommand::Open {
                connection: ConnectionId(2),
                scope: StreamScope::partner("b"),
            })
        );
    }

    #[test]
    fn stale_error_is_ignored() {
        let mut subscription = StreamSubscription::default();
        let t0 = Instant::now();
        subscription.subscribe(StreamScope::partner("a"));
        subscription.subscribe(StreamScope::partner("b"));

        assert_eq!(subscription.on_error(ConnectionId(1), t0), None);
        assert_eq!(subscription.reconnect_in(t0), None);
        assert!(subscription.is_current(ConnectionId(2)));
    }

    #[test]
    fn subscribe_cancels_scheduled_reconnect() {
        let mut subscription = StreamSubscription::default();
        let t0 = Instant::now();
        subscription.subscribe(StreamScope::partner("a"));
        subscription.on_error(ConnectionId(1), t0);

        subscription.subscribe(StreamScope::partner("b"));

        assert_eq!(
            subscription.poll_reconnect(t0 + RECONNECT_DELAY, StreamScope::partner("b")),
            None
        );
        assert!(subscription.is_current(ConnectionId(2)));
    }

    #[test]
    fn dispose_closes_and_cancels_reconnect() {
        let mut subscription = StreamSubscription::default();
        let t0 = Instant::now();
        subscription.subscribe(StreamScope::global());

        assert_eq!(
            subscription.dispose(),
            Some(StreamCommand::Close {
                connection: ConnectionId(1)
            })
        );

        subscription.subscribe(StreamScope::global());
        subscription.on_error(ConnectionId(2), t0);
        assert_eq!(subscription.dispose(), None);
        assert_eq!(
            subscription.poll_reconnect(t0 + RECONNECT_DELAY, StreamScope::global()),
            None
        );
    }

    #[test]
    fn phase_labels_are_stable() {
        assert_eq!(StreamPhase::Connected.as_label(), "live");
        assert_eq!(StreamPhase::Connecting.as_label(), "connecting");
        assert_eq!(StreamPhase::Disconnected.as_label(), "offline");
    }
}
