//! Engine - orchestration for one bridge context
//!
//! The Engine owns the bridge state, the message channel, and every task the
//! state machine starts or stops: the heartbeat beacon, the round poller, the
//! round and trigger listeners. Actions returned by `handler::update()` are
//! executed here.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use dartbridge_core::prelude::{Error, Result};
use dartbridge_core::Role;

use crate::beacon::{check_liveness, now_ms, HeartbeatBeacon};
use crate::channel::BridgeChannels;
use crate::config::Settings;
use crate::engine_event::EngineEvent;
use crate::entry::{ScoreEntry, NOTIFY_TITLE};
use crate::handler::{self, UpdateAction};
use crate::listener::{spawn_round_listener, spawn_trigger_listener, Listener};
use crate::message::{DisableReason, Message, TriggerKind};
use crate::poller::RoundPoller;
use crate::state::{BridgePhase, BridgeState};
use crate::store::SharedStoreRef;
use crate::surface::{
    ConsoleNotifier, Notification, Notifier, SharedSink, SharedSource, ToggleSurface,
};

const MESSAGE_CHANNEL_CAPACITY: usize = 256;
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Builds an [`Engine`] for one role
pub struct EngineBuilder {
    role: Role,
    store: SharedStoreRef,
    settings: Settings,
    source: Option<SharedSource>,
    sink: Option<SharedSink>,
    notifier: Option<Arc<dyn Notifier>>,
    toggle: Option<Box<dyn ToggleSurface>>,
}

impl EngineBuilder {
    pub fn new(role: Role, store: SharedStoreRef) -> Self {
        Self {
            role,
            store,
            settings: Settings::default(),
            source: None,
            sink: None,
            notifier: None,
            toggle: None,
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn source(mut self, source: SharedSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn sink(mut self, sink: SharedSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn toggle(mut self, toggle: Box<dyn ToggleSurface>) -> Self {
        self.toggle = Some(toggle);
        self
    }

    /// Create the engine and start role-independent tasks
    ///
    /// Must be called inside a Tokio runtime. The producer starts its heartbeat
    /// here; the consumer renders its toggle.
    pub fn build(self) -> Result<Engine> {
        let channels = BridgeChannels::new(self.store);
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(ConsoleNotifier::new(self.settings.notify.clone())));

        let (poller, entry, beacon) = match self.role {
            Role::Producer => {
                let source = self.source.ok_or_else(|| {
                    Error::config_invalid("producer role needs a source surface")
                })?;
                let poller = RoundPoller::new(
                    source,
                    channels.rounds.clone(),
                    self.settings.bridge.poll_interval(),
                );
                let beacon = HeartbeatBeacon::new(
                    channels.heartbeat.clone(),
                    self.settings.bridge.heartbeat_interval(),
                );
                (Some(poller), None, Some(beacon))
            }
            Role::Consumer => {
                let sink = self.sink.ok_or_else(|| {
                    Error::config_invalid("consumer role needs a sink surface")
                })?;
                let entry = ScoreEntry::new(channels.competitor.clone(), sink, notifier.clone());
                (None, Some(entry), None)
            }
        };

        let (msg_tx, msg_rx) = mpsc::channel::<Message>(MESSAGE_CHANNEL_CAPACITY);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let trigger_listener = spawn_trigger_listener(&channels, msg_tx.clone());

        let mut engine = Engine {
            state: BridgeState::new(self.role),
            msg_tx,
            msg_rx,
            settings: self.settings,
            channels,
            poller,
            entry,
            beacon,
            notifier,
            toggle: self.toggle,
            round_listener: None,
            trigger_listener: Some(trigger_listener),
            event_tx,
        };

        if let Some(beacon) = engine.beacon.as_mut() {
            if let Err(e) = beacon.start() {
                warn!("Failed to start heartbeat: {}", e);
            }
        }
        engine.render_toggle();

        info!("Engine ready ({})", engine.state.role);
        Ok(engine)
    }
}

/// Orchestration engine for one bridge context
pub struct Engine {
    /// TEA state (the Model)
    pub state: BridgeState,

    /// Sender half of the message channel. Clone for input sources
    /// (stdin reader, signal handler).
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the message channel
    pub msg_rx: mpsc::Receiver<Message>,

    pub settings: Settings,

    channels: BridgeChannels,

    /// Producer only
    poller: Option<RoundPoller>,
    beacon: Option<HeartbeatBeacon>,

    /// Consumer only
    entry: Option<ScoreEntry>,

    notifier: Arc<dyn Notifier>,
    toggle: Option<Box<dyn ToggleSurface>>,

    round_listener: Option<Listener>,
    trigger_listener: Option<Listener>,

    event_tx: broadcast::Sender<EngineEvent>,
}

impl Engine {
    pub fn builder(role: Role, store: SharedStoreRef) -> EngineBuilder {
        EngineBuilder::new(role, store)
    }

    /// Subscribe to engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    pub fn channels(&self) -> &BridgeChannels {
        &self.channels
    }

    pub fn phase(&self) -> BridgePhase {
        self.state.phase
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Process a message and every follow-up it produces
    pub fn process_message(&mut self, msg: Message) {
        let mut queue = VecDeque::from([msg]);

        while let Some(m) = queue.pop_front() {
            if let Message::RoundBroadcast(round) = &m {
                self.emit(EngineEvent::RoundBroadcast {
                    round: round.clone(),
                });
            }

            let old_phase = self.state.phase;
            let result = handler::update(&mut self.state, m);
            let new_phase = self.state.phase;

            if old_phase != new_phase {
                self.emit(EngineEvent::PhaseChanged {
                    old_phase,
                    new_phase,
                });
            }

            if let Some(action) = result.action {
                if let Some(follow_up) = self.handle_action(action) {
                    queue.push_back(follow_up);
                }
            }
            if let Some(next) = result.message {
                queue.push_back(next);
            }
        }
    }

    /// Drain and process all pending messages from the channel
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Process messages until quit is requested, then shut down
    pub async fn run(&mut self) {
        while !self.should_quit() {
            match self.msg_rx.recv().await {
                Some(msg) => self.process_message(msg),
                None => break,
            }
        }
        self.shutdown().await;
    }

    /// Stop every timer and listener
    pub async fn shutdown(&mut self) {
        self.emit(EngineEvent::Shutdown);

        if let Some(poller) = self.poller.as_mut() {
            poller.stop();
        }
        if let Some(beacon) = self.beacon.as_mut() {
            beacon.stop();
        }
        if let Some(mut listener) = self.round_listener.take() {
            listener.stop();
        }
        if let Some(mut listener) = self.trigger_listener.take() {
            listener.stop();
        }

        // Let stopped tasks observe their stop signal
        tokio::task::yield_now().await;
        info!("Engine stopped ({})", self.state.role);
    }

    fn handle_action(&mut self, action: UpdateAction) -> Option<Message> {
        match action {
            UpdateAction::PublishTrigger { kind, at } => {
                let channel = match kind {
                    TriggerKind::Enable => &self.channels.enable,
                    TriggerKind::Disable => &self.channels.disable,
                };
                match channel.publish(&at) {
                    Ok(()) => {
                        debug!("Published {} trigger {}", kind, at);
                        self.emit(EngineEvent::TriggerPublished { kind, at });
                    }
                    Err(e) => warn!("Failed to publish {} trigger: {}", kind, e),
                }
                None
            }

            UpdateAction::CheckLiveness => {
                let liveness = check_liveness(
                    &self.channels.heartbeat,
                    now_ms(),
                    self.settings.bridge.liveness_window(),
                );
                Some(Message::LivenessChecked(liveness))
            }

            UpdateAction::Activate => {
                self.activate();
                None
            }

            UpdateAction::Deactivate(reason) => {
                self.deactivate(reason);
                None
            }

            UpdateAction::EnterRound(round) => {
                let entry = self.entry.as_ref()?;
                match entry.process_round(&round) {
                    Ok(report) => {
                        self.emit(EngineEvent::ScoreEntered {
                            report: report.clone(),
                        });
                        Some(Message::RoundEntered(report))
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        self.emit(EngineEvent::EntryFailed {
                            reason: reason.clone(),
                        });
                        Some(Message::RoundEntryFailed { reason })
                    }
                }
            }

            UpdateAction::ConfirmEntry(report) => {
                if let Some(entry) = self.entry.clone() {
                    let delay = self.settings.bridge.confirm_delay();
                    let msg_tx = self.msg_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let after = entry.read_remaining();
                        let _ = msg_tx
                            .send(Message::EntryConfirmed {
                                before: report.remaining,
                                after,
                            })
                            .await;
                    });
                }
                None
            }

            UpdateAction::RenderToggle => {
                self.render_toggle();
                None
            }
        }
    }

    fn activate(&mut self) {
        match self.state.role {
            Role::Producer => {
                if let Some(poller) = self.poller.as_mut() {
                    if let Err(e) = poller.start(self.msg_tx.clone()) {
                        warn!("Failed to start round poller: {}", e);
                    }
                }
            }
            Role::Consumer => {
                if self.round_listener.is_none() {
                    self.round_listener =
                        Some(spawn_round_listener(&self.channels, self.msg_tx.clone()));
                }
                self.render_toggle();
                self.notify(Notification::normal(NOTIFY_TITLE, "ready - waiting for darts"));
            }
        }
    }

    fn deactivate(&mut self, reason: DisableReason) {
        if let Some(poller) = self.poller.as_mut() {
            poller.stop();
        }
        if let Some(mut listener) = self.round_listener.take() {
            listener.stop();
        }
        debug!("Bridge tasks stopped: {}", reason);

        self.render_toggle();
        match reason {
            DisableReason::RolledBack(liveness) => {
                let err = Error::producer_not_live(liveness.to_string());
                warn!("Enable rolled back: {}", err);
                self.notify(Notification::urgent(NOTIFY_TITLE, "producer not found"));
            }
            DisableReason::Requested | DisableReason::Remote => {
                self.notify(Notification::normal(NOTIFY_TITLE, "disabled"));
            }
        }
    }

    /// Only the consumer shows a toggle
    fn render_toggle(&mut self) {
        if !self.state.is_interactive() {
            return;
        }
        let enabled = self.state.phase.is_enabled();
        if let Some(toggle) = self.toggle.as_mut() {
            toggle.render(enabled);
        }
    }

    /// Only the consumer notifies
    fn notify(&self, notification: Notification) {
        if self.state.is_interactive() {
            self.notifier.notify(notification);
        }
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}
