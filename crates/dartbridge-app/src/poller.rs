//! Producer-side polling of the source display

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};

use dartbridge_core::prelude::*;
use dartbridge_core::{Round, RoundDetector, TickOutcome};

use crate::channel::Channel;
use crate::message::Message;
use crate::surface::SharedSource;

/// Read the source once, feed the detector and publish a completed round
///
/// A failed read skips the tick and leaves the detector untouched.
pub fn poll_once(
    detector: &mut RoundDetector,
    source: &SharedSource,
    rounds: &Channel<Round>,
) -> Result<Option<Round>> {
    let reading = {
        let mut source = source
            .lock()
            .map_err(|_| Error::surface("source lock poisoned"))?;
        source.read_darts()?
    };
    trace!("Source reading: {:?}", reading);

    match detector.feed(&reading, Utc::now()) {
        TickOutcome::RoundComplete(round) => {
            rounds.publish(&round)?;
            info!("Round published: {}", round);
            Ok(Some(round))
        }
        TickOutcome::BlankWithoutSnapshot => {
            trace!("Blank display with no round in progress");
            Ok(None)
        }
        TickOutcome::Collecting => Ok(None),
    }
}

/// Polls the source while the bridge is enabled
pub struct RoundPoller {
    source: SharedSource,
    rounds: Channel<Round>,
    interval: Duration,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl RoundPoller {
    pub fn new(source: SharedSource, rounds: Channel<Round>, interval: Duration) -> Self {
        Self {
            source,
            rounds,
            interval,
            stop_tx: None,
        }
    }

    /// Start polling with a fresh detector
    ///
    /// Every published round is also reported to `msg_tx`.
    pub fn start(&mut self, msg_tx: mpsc::Sender<Message>) -> std::result::Result<(), String> {
        if self.is_running() {
            return Err("Round poller is already running".to_string());
        }

        let (stop_tx, mut stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);

        let source = self.source.clone();
        let rounds = self.rounds.clone();
        let period = self.interval;

        tokio::spawn(async move {
            let mut detector = RoundDetector::new();
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            debug!("Round poller started ({} ms)", period.as_millis());

            loop {
                tokio::select! {
                    biased;

                    _ = &mut stop_rx => {
                        debug!("Round poller stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        match poll_once(&mut detector, &source, &rounds) {
                            Ok(Some(round)) => {
                                let _ = msg_tx.send(Message::RoundBroadcast(round)).await;
                            }
                            Ok(None) => {}
                            Err(e) => debug!("Skipping poll tick: {}", e),
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

impl Drop for RoundPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
