//! Store subscriptions bridged into engine messages

use tokio::sync::{mpsc, oneshot};

use dartbridge_core::prelude::*;

use crate::channel::BridgeChannels;
use crate::message::{Message, TriggerKind};

/// Handle to a running listener task
pub struct Listener {
    name: &'static str,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl Listener {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            debug!("Stopping {} listener", self.name);
            let _ = tx.send(());
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Forward newly published rounds as [`Message::RoundPublished`]
///
/// The subscription is taken before returning, so nothing published after
/// this call is missed. Rounds published earlier are never delivered.
pub fn spawn_round_listener(channels: &BridgeChannels, msg_tx: mpsc::Sender<Message>) -> Listener {
    let mut rounds = channels.rounds.subscribe();
    let (stop_tx, mut stop_rx) = oneshot::channel();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                round = rounds.recv() => {
                    let Some(round) = round else {
                        warn!("Round subscription closed");
                        break;
                    };
                    if msg_tx.send(Message::RoundPublished(round)).await.is_err() {
                        break;
                    }
                }
                _ = &mut stop_rx => break,
            }
        }
    });

    Listener {
        name: "round",
        stop_tx: Some(stop_tx),
    }
}

/// Forward enable/disable trigger writes as [`Message::RemoteTrigger`]
pub fn spawn_trigger_listener(
    channels: &BridgeChannels,
    msg_tx: mpsc::Sender<Message>,
) -> Listener {
    let mut enable = channels.enable.subscribe();
    let mut disable = channels.disable.subscribe();
    let (stop_tx, mut stop_rx) = oneshot::channel();

    tokio::spawn(async move {
        loop {
            let (kind, at) = tokio::select! {
                at = enable.recv() => match at {
                    Some(at) => (TriggerKind::Enable, at),
                    None => break,
                },
                at = disable.recv() => match at {
                    Some(at) => (TriggerKind::Disable, at),
                    None => break,
                },
                _ = &mut stop_rx => break,
            };

            debug!("{} trigger observed at {}", kind, at);
            if msg_tx.send(Message::RemoteTrigger { kind, at }).await.is_err() {
                break;
            }
        }
    });

    Listener {
        name: "trigger",
        stop_tx: Some(stop_tx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use dartbridge_core::{normalize_reading, Round};
    use std::sync::Arc;
    use std::time::Duration;

    fn channels() -> BridgeChannels {
        BridgeChannels::new(Arc::new(MemoryStore::new()))
    }

    async fn next(rx: &mut mpsc::Receiver<Message>) -> Message {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("message in time")
            .expect("channel open")
    }

    #[tokio::test]
    async fn test_round_listener_only_sees_new_rounds() {
        let channels = channels();
        let old = Round {
            darts: normalize_reading(&["S1", "S1", "S1"]),
            ts: 1,
        };
        channels.rounds.publish(&old).unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let mut listener = spawn_round_listener(&channels, tx);

        let fresh = Round {
            darts: normalize_reading(&["T20", "T20", "T20"]),
            ts: 2,
        };
        channels.rounds.publish(&fresh).unwrap();

        match next(&mut rx).await {
            Message::RoundPublished(round) => assert_eq!(round, fresh),
            other => panic!("unexpected message: {:?}", other),
        }

        listener.stop();
        assert!(!listener.is_running());
    }

    #[tokio::test]
    async fn test_trigger_listener_forwards_both_kinds() {
        let channels = channels();
        let (tx, mut rx) = mpsc::channel(8);
        let _listener = spawn_trigger_listener(&channels, tx);

        channels.enable.publish(&10).unwrap();
        assert!(matches!(
            next(&mut rx).await,
            Message::RemoteTrigger {
                kind: TriggerKind::Enable,
                at: 10
            }
        ));

        channels.disable.publish(&20).unwrap();
        assert!(matches!(
            next(&mut rx).await,
            Message::RemoteTrigger {
                kind: TriggerKind::Disable,
                at: 20
            }
        ));
    }
}
