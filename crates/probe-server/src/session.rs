//! Session lifecycle — drives one debugger connection from accept to
//! teardown.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::broadcaster::Broadcaster;
use crate::channel::{CloseReason, DebugChannel};
use crate::config::SessionConfig;
use crate::dispatch;
use crate::registry::EventRegistry;
use crate::shutdown::ShutdownRegistry;
use crate::subscriber::{Subscriber, SubscriberState, init_subscribers, shutdown_subscribers};

/// Lifecycle of one session; each instance traverses this path once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Channel handshake confirmed, loop not started.
    Accepted,
    /// Subscribers initialized, tick loop running.
    Open,
    /// Close handshake in flight.
    Closing,
    /// Torn down and deregistered. Terminal.
    Closed,
}

/// One debugger connection: channel, handler table, subscriber state, and
/// broadcasters, all exclusively owned by the task running [`Session::run`].
pub struct Session {
    id: Uuid,
    channel: Box<dyn DebugChannel>,
    registry: EventRegistry,
    subscribers: Vec<Box<dyn Subscriber>>,
    subscriber_states: Vec<Option<SubscriberState>>,
    broadcasters: Vec<Box<dyn Broadcaster>>,
    shutdown: Arc<ShutdownRegistry>,
    config: SessionConfig,
    state: SessionState,
}

impl Session {
    /// Create a session for an accepted channel.
    ///
    /// Subscribers and broadcasters are injected here; nothing runs until
    /// [`Session::run`].
    pub fn new(
        channel: Box<dyn DebugChannel>,
        subscribers: Vec<Box<dyn Subscriber>>,
        broadcasters: Vec<Box<dyn Broadcaster>>,
        shutdown: Arc<ShutdownRegistry>,
        config: SessionConfig,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            channel,
            registry: EventRegistry::new(),
            subscribers,
            subscriber_states: Vec::new(),
            broadcasters,
            shutdown,
            config,
            state: SessionState::Accepted,
        }
    }

    /// Unique session id, for logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handler table, populated once `run` has initialized subscribers.
    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Run the session to completion.
    ///
    /// Registers with the shutdown registry, initializes subscribers and
    /// broadcasters, then ticks: drain inbound frames, dispatch each,
    /// invoke broadcasters, observe the stop flag. On terminal close the
    /// subscribers are shut down in init order and the session deregisters.
    #[instrument(skip_all, fields(session_id = %self.id))]
    pub async fn run(&mut self) {
        if self.state != SessionState::Accepted {
            debug!(state = ?self.state, "run called on a spent session");
            return;
        }

        let started = Instant::now();
        self.shutdown.register();
        counter!("debugger_sessions_total").increment(1);
        gauge!("debugger_sessions_active").increment(1.0);
        info!("debugger client connected");

        self.subscriber_states = init_subscribers(&mut self.subscribers, &mut self.registry);
        self.state = SessionState::Open;
        debug!(events = self.registry.len(), "event handlers registered");

        while let Some(frames) = self.channel.process(self.config.tick_budget()).await {
            for frame in &frames {
                dispatch::handle_frame(frame, &mut self.registry, self.channel.as_mut());
            }
            for broadcaster in &mut self.broadcasters {
                broadcaster.broadcast(self.channel.as_mut());
            }
            if self.state == SessionState::Open && self.shutdown.stop_requested() {
                info!("stop requested, closing session");
                self.channel.close(CloseReason::GoingAway);
                self.state = SessionState::Closing;
            }
        }

        // Terminal close confirmed (peer or our own handshake).
        self.state = SessionState::Closing;
        shutdown_subscribers(
            &mut self.subscribers,
            std::mem::take(&mut self.subscriber_states),
        );
        self.shutdown.unregister();
        self.state = SessionState::Closed;

        gauge!("debugger_sessions_active").decrement(1.0);
        histogram!("debugger_session_duration_seconds").record(started.elapsed().as_secs_f64());
        info!("debugger client disconnected");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use serde_json::json;
    use tokio::time::timeout;

    use super::*;
    use crate::channel::Frame;
    use crate::channel::mock::{MockChannel, MockLog};
    use crate::request::DebuggerRequest;

    struct EchoSubscriber;

    impl Subscriber for EchoSubscriber {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn init(&mut self, registry: &mut EventRegistry) -> Option<SubscriberState> {
            registry.register("echo", |req: &mut DebuggerRequest<'_>| {
                let data = req.data().clone();
                req.respond(data);
            });
            registry.register("touch", |_req: &mut DebuggerRequest<'_>| {});
            None
        }
    }

    /// Emits a single `status` event on its first tick.
    struct OnceBroadcaster {
        sent: bool,
    }

    impl Broadcaster for OnceBroadcaster {
        fn name(&self) -> &'static str {
            "status"
        }

        fn broadcast(&mut self, channel: &mut dyn DebugChannel) {
            if !self.sent {
                channel.send(json!({"event": "status", "paused": false}));
                self.sent = true;
            }
        }
    }

    fn make_session(
        channel: MockChannel,
        broadcasters: Vec<Box<dyn Broadcaster>>,
        shutdown: Arc<ShutdownRegistry>,
    ) -> Session {
        Session::new(
            Box::new(channel),
            vec![Box::new(EchoSubscriber)],
            broadcasters,
            shutdown,
            SessionConfig::default(),
        )
    }

    #[tokio::test]
    async fn dispatches_frames_and_closes_on_peer_disconnect() {
        let (channel, log) = MockChannel::new(vec![vec![
            Frame::Text(r#"{"event": "echo", "ticket": 1, "x": 2}"#.into()),
            Frame::Text(r#"{"event": "touch", "ticket": 2}"#.into()),
        ]]);
        let shutdown = Arc::new(ShutdownRegistry::new());
        let mut session = make_session(channel, vec![], shutdown.clone());

        session.run().await;

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(shutdown.active_sessions(), 0);
        let sent = &log.lock().sent;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], json!({"event": "echo", "ticket": 1, "x": 2}));
        assert_eq!(sent[1], json!({"event": "touch", "ticket": 2}));
    }

    #[tokio::test]
    async fn broadcasters_run_after_inbound_frames() {
        let (channel, log) = MockChannel::new(vec![vec![Frame::Text(
            r#"{"event": "touch", "ticket": 9}"#.into(),
        )]]);
        let shutdown = Arc::new(ShutdownRegistry::new());
        let mut session = make_session(
            channel,
            vec![Box::new(OnceBroadcaster { sent: false })],
            shutdown,
        );

        session.run().await;

        let sent = &log.lock().sent;
        assert_eq!(sent.len(), 2);
        // Response first, then the same tick's broadcast.
        assert_eq!(sent[0], json!({"event": "touch", "ticket": 9}));
        assert_eq!(sent[1]["event"], "status");
    }

    #[tokio::test]
    async fn bad_frames_do_not_close_the_session() {
        let (channel, log) = MockChannel::new(vec![
            vec![Frame::Text("garbage".into())],
            vec![Frame::Binary(vec![1, 2, 3])],
            vec![Frame::Text(r#"{"event": "touch"}"#.into())],
        ]);
        let shutdown = Arc::new(ShutdownRegistry::new());
        let mut session = make_session(channel, vec![], shutdown);

        session.run().await;

        let sent = &log.lock().sent;
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0]["message"], "Bad message: invalid JSON");
        assert_eq!(sent[1]["message"], "Bad message");
        // The session kept going and handled the valid frame.
        assert_eq!(sent[2], json!({"event": "touch"}));
    }

    #[tokio::test]
    async fn stop_flag_closes_with_going_away() {
        let (channel, log) = MockChannel::new(vec![]);
        let channel = channel.hold_open();
        let shutdown = Arc::new(ShutdownRegistry::new());
        let mut session = make_session(channel, vec![], shutdown.clone());

        let handle = tokio::spawn(async move {
            session.run().await;
            session
        });
        // Let the session register before requesting the stop.
        tokio::task::yield_now().await;

        timeout(Duration::from_secs(5), shutdown.request_stop_and_wait())
            .await
            .expect("stop barrier should release");

        let session = timeout(Duration::from_secs(5), handle)
            .await
            .expect("session task")
            .unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(log.lock().closed, Some(CloseReason::GoingAway));
        assert!(!shutdown.stop_requested());
    }

    #[tokio::test]
    async fn barrier_waits_for_multiple_sessions() {
        let shutdown = Arc::new(ShutdownRegistry::new());
        let mut logs: Vec<Arc<Mutex<MockLog>>> = Vec::new();
        let mut handles = Vec::new();

        for _ in 0..3 {
            let (channel, log) = MockChannel::new(vec![]);
            let channel = channel.hold_open();
            logs.push(log);
            let mut session = make_session(channel, vec![], shutdown.clone());
            handles.push(tokio::spawn(async move {
                session.run().await;
                session
            }));
        }
        tokio::task::yield_now().await;
        assert_eq!(shutdown.active_sessions(), 3);

        timeout(Duration::from_secs(5), shutdown.request_stop_and_wait())
            .await
            .expect("stop barrier should release");

        assert_eq!(shutdown.active_sessions(), 0);
        for handle in handles {
            let session = handle.await.unwrap();
            assert_eq!(session.state(), SessionState::Closed);
        }
        for log in logs {
            assert_eq!(log.lock().closed, Some(CloseReason::GoingAway));
        }

        // A session accepted after the drain is unaffected.
        let (channel, _log) = MockChannel::new(vec![]);
        let mut late = make_session(channel, vec![], shutdown.clone());
        late.run().await;
        assert_eq!(late.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn run_is_single_shot() {
        let (channel, _log) = MockChannel::new(vec![]);
        let shutdown = Arc::new(ShutdownRegistry::new());
        let mut session = make_session(channel, vec![], shutdown.clone());

        session.run().await;
        assert_eq!(session.state(), SessionState::Closed);

        // A second run must not re-register or touch the channel.
        session.run().await;
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(shutdown.active_sessions(), 0);
    }

    #[tokio::test]
    async fn registry_is_populated_by_subscribers() {
        let (channel, _log) = MockChannel::new(vec![]);
        let shutdown = Arc::new(ShutdownRegistry::new());
        let mut session = make_session(channel, vec![], shutdown);

        assert!(session.registry().is_empty());
        session.run().await;
        assert_eq!(session.registry().events(), vec!["echo", "touch"]);
    }
}
