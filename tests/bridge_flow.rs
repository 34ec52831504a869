//! End-to-end flow: a producer and a consumer engine sharing one store

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dartbridge_app::config::Settings;
use dartbridge_app::surface::{
    FileSink, FileSource, Notification, Notifier, Severity, ToggleSurface, ACTIVE_FILE,
    REMAINING_FILE, SCORE_INPUT_FILE,
};
use dartbridge_app::{BridgePhase, Engine, MemoryStore, Message};
use dartbridge_core::{Role, ScoreDecision};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn texts(&self) -> Vec<(Severity, String)> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|n| (n.severity, n.text.clone()))
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

struct RecordingToggle(Arc<Mutex<Vec<bool>>>);

impl ToggleSurface for RecordingToggle {
    fn render(&mut self, enabled: bool) {
        self.0.lock().unwrap().push(enabled);
    }
}

fn fast_settings() -> Settings {
    let mut settings = Settings::default();
    settings.bridge.poll_interval_ms = 50;
    settings.bridge.heartbeat_interval_ms = 500;
    settings.bridge.confirm_delay_ms = 50;
    settings
}

fn write_sink(dir: &Path, remaining: &str, active: &str, with_input: bool) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(REMAINING_FILE), remaining).unwrap();
    std::fs::write(dir.join(ACTIVE_FILE), active).unwrap();
    if with_input {
        std::fs::write(dir.join(SCORE_INPUT_FILE), "").unwrap();
    }
}

struct Rig {
    temp: TempDir,
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
    renders: Arc<Mutex<Vec<bool>>>,
}

impl Rig {
    fn new(with_input: bool) -> Self {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("source.txt"), "").unwrap();
        write_sink(&temp.path().join("sink"), "501 501", "0", with_input);

        Self {
            temp,
            store: Arc::new(MemoryStore::new()),
            notifier: Arc::new(RecordingNotifier::default()),
            renders: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn source_path(&self) -> std::path::PathBuf {
        self.temp.path().join("source.txt")
    }

    fn sink_dir(&self) -> std::path::PathBuf {
        self.temp.path().join("sink")
    }

    fn producer(&self) -> Engine {
        Engine::builder(Role::Producer, self.store.clone())
            .settings(fast_settings())
            .source(Arc::new(Mutex::new(FileSource::new(self.source_path()))))
            .notifier(self.notifier.clone())
            .build()
            .unwrap()
    }

    fn consumer(&self) -> Engine {
        Engine::builder(Role::Consumer, self.store.clone())
            .settings(fast_settings())
            .sink(Arc::new(Mutex::new(FileSink::new(self.sink_dir()))))
            .notifier(self.notifier.clone())
            .toggle(Box::new(RecordingToggle(self.renders.clone())))
            .build()
            .unwrap()
    }
}

/// Process messages for `engine` until `done` holds
async fn pump_until(engine: &mut Engine, done: impl Fn(&Engine) -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while !done(engine) {
        let msg = tokio::time::timeout_at(deadline, engine.msg_rx.recv())
            .await
            .expect("condition reached before deadline")
            .expect("message channel open");
        engine.process_message(msg);
    }
}

#[tokio::test]
async fn test_round_travels_from_source_to_scoreboard() {
    let rig = Rig::new(true);
    let mut producer = rig.producer();
    let mut consumer = rig.consumer();

    // Let the first heartbeat land
    tokio::time::sleep(Duration::from_millis(50)).await;

    consumer.process_message(Message::SetEnabled(true));
    assert_eq!(consumer.phase(), BridgePhase::Enabled);

    // The consumer's enable trigger reaches the producer
    pump_until(&mut producer, |e| e.phase() == BridgePhase::Enabled).await;

    std::fs::write(rig.source_path(), "T20").unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    std::fs::write(rig.source_path(), "T20 T20 T20").unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    std::fs::write(rig.source_path(), "").unwrap();

    pump_until(&mut producer, |e| e.state.rounds_published == 1).await;
    pump_until(&mut consumer, |e| e.state.rounds_entered == 1).await;

    let input = std::fs::read_to_string(rig.sink_dir().join(SCORE_INPUT_FILE)).unwrap();
    assert_eq!(input, "180\n");

    let report = consumer.state.last_entry.clone().unwrap();
    assert_eq!(report.decision, ScoreDecision::Normal(180));
    assert_eq!(
        consumer.channels().competitor.latest().unwrap(),
        Some(0)
    );

    assert!(rig
        .notifier
        .texts()
        .contains(&(Severity::Normal, "ready - waiting for darts".to_string())));
    assert_eq!(rig.renders.lock().unwrap().as_slice(), &[false, true]);

    // Disabling on the consumer side stops the producer too
    consumer.process_message(Message::SetEnabled(false));
    pump_until(&mut producer, |e| e.phase() == BridgePhase::Disabled).await;

    producer.shutdown().await;
    consumer.shutdown().await;
}

#[tokio::test]
async fn test_consumer_without_producer_rolls_back() {
    let rig = Rig::new(true);
    let mut consumer = rig.consumer();

    consumer.process_message(Message::SetEnabled(true));

    assert_eq!(consumer.phase(), BridgePhase::Disabled);
    assert_eq!(
        rig.notifier.texts(),
        vec![(Severity::Urgent, "producer not found".to_string())]
    );
    // Initial render, then the toggle re-armed to "enable"
    assert_eq!(rig.renders.lock().unwrap().as_slice(), &[false, false]);

    consumer.shutdown().await;
}

#[tokio::test]
async fn test_missing_score_input_keeps_bridge_enabled() {
    let rig = Rig::new(false);
    let mut producer = rig.producer();
    let mut consumer = rig.consumer();
    tokio::time::sleep(Duration::from_millis(50)).await;

    consumer.process_message(Message::SetEnabled(true));
    assert_eq!(consumer.phase(), BridgePhase::Enabled);

    let round = dartbridge_core::Round {
        darts: dartbridge_core::normalize_reading(&["S5", "S1", "-"]),
        ts: 1,
    };
    producer.channels().rounds.publish(&round).unwrap();

    pump_until(&mut consumer, |e| e.state.rounds_failed == 1).await;

    assert_eq!(consumer.phase(), BridgePhase::Enabled);
    assert!(rig
        .notifier
        .texts()
        .contains(&(Severity::Urgent, "score input not found".to_string())));

    producer.shutdown().await;
    consumer.shutdown().await;
}
