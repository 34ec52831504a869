//! Producer heartbeat and the consumer's liveness check

use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;

use dartbridge_core::prelude::*;
use dartbridge_core::Liveness;

use crate::channel::{Channel, Timestamp};

/// Current wall-clock time as unix milliseconds
pub fn now_ms() -> Timestamp {
    Utc::now().timestamp_millis()
}

/// Periodically publishes the producer heartbeat
///
/// Runs from producer startup regardless of enablement, so a consumer can
/// enable at any time.
pub struct HeartbeatBeacon {
    channel: Channel<Timestamp>,
    interval: Duration,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl HeartbeatBeacon {
    pub fn new(channel: Channel<Timestamp>, interval: Duration) -> Self {
        Self {
            channel,
            interval,
            stop_tx: None,
        }
    }

    /// Start beating; the first heartbeat is written immediately
    pub fn start(&mut self) -> std::result::Result<(), String> {
        if self.is_running() {
            return Err("Heartbeat is already running".to_string());
        }

        let (stop_tx, mut stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);

        let channel = self.channel.clone();
        let period = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            info!("Heartbeat started ({} ms)", period.as_millis());

            loop {
                tokio::select! {
                    biased;

                    _ = &mut stop_rx => {
                        info!("Heartbeat stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = beat(&channel) {
                            warn!("Failed to write heartbeat: {}", e);
                        }
                    }
                }
            }
        });

        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }
}

impl Drop for HeartbeatBeacon {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Write one heartbeat
pub fn beat(channel: &Channel<Timestamp>) -> Result<Timestamp> {
    let ts = now_ms();
    channel.publish(&ts)?;
    trace!("Heartbeat {}", ts);
    Ok(ts)
}

/// Classify the latest heartbeat; an unreadable one counts as absent
pub fn check_liveness(channel: &Channel<Timestamp>, now: Timestamp, window: Duration) -> Liveness {
    let heartbeat = match channel.latest() {
        Ok(ts) => ts,
        Err(e) => {
            warn!("Unreadable heartbeat: {}", e);
            None
        }
    };

    Liveness::classify(heartbeat, now, window)
}
