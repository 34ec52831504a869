//! Consumer-side scoring: resolve our slot, decide, type the score

use std::sync::{Arc, MutexGuard};

use dartbridge_core::prelude::*;
use dartbridge_core::{decide_round, CompetitorIndex, Round, ScoreDecision};

use crate::channel::Channel;
use crate::surface::{Notification, Notifier, SharedSink, SinkSurface};

pub const NOTIFY_TITLE: &str = "Dart Bridge";

/// What happened to one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub total: u32,
    pub index: CompetitorIndex,
    pub remaining: Vec<u32>,
    pub decision: ScoreDecision,
}

impl EntryReport {
    /// Our remaining score before this round, if known
    pub fn remaining_before(&self) -> Option<u32> {
        self.index.slot().and_then(|i| self.remaining.get(i).copied())
    }
}

/// Enters rounds into the sink on behalf of the local competitor
#[derive(Clone)]
pub struct ScoreEntry {
    competitor: Channel<usize>,
    sink: SharedSink,
    notifier: Arc<dyn Notifier>,
}

impl ScoreEntry {
    pub fn new(competitor: Channel<usize>, sink: SharedSink, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            competitor,
            sink,
            notifier,
        }
    }

    /// Our slot on the scoreboard
    ///
    /// A cached index is trusted as-is. Otherwise the active-turn cue is used,
    /// and a resolved slot is cached for later rounds. A failed cache write
    /// still resolves this round.
    pub fn resolve_competitor(&self) -> Result<CompetitorIndex> {
        match self.competitor.latest() {
            Ok(Some(slot)) => return Ok(CompetitorIndex::Resolved(slot)),
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable competitor index: {}", e),
        }

        let cue = self.lock_sink()?.active_turn_slot();
        let index = CompetitorIndex::from_slot(cue);

        if let CompetitorIndex::Resolved(slot) = index {
            match self.competitor.publish(&slot) {
                Ok(()) => info!("Own index set: {}", slot),
                Err(e) => warn!("Own index {} not cached: {}", slot, e),
            }
        }

        Ok(index)
    }

    /// Score one round into the sink
    pub fn process_round(&self, round: &Round) -> Result<EntryReport> {
        let total = round.total();

        let remaining = self.read_remaining();
        let index = self.resolve_competitor()?;
        let decision = decide_round(&round.darts, index, &remaining);

        debug!(
            "Round {} total {} index {} remaining {:?} -> {}",
            round, total, index, remaining, decision
        );

        let entered = self.lock_sink()?.enter_score(decision.score());
        if let Err(e) = entered {
            if matches!(e, Error::SurfaceNotFound { .. }) {
                self.notifier.notify(Notification::urgent(
                    NOTIFY_TITLE,
                    "score input not found",
                ));
            }
            return Err(e);
        }

        info!("Score entered: {}", decision);

        Ok(EntryReport {
            total,
            index,
            remaining,
            decision,
        })
    }

    /// Remaining scores as currently shown; empty when unreadable
    pub fn read_remaining(&self) -> Vec<u32> {
        let sink = match self.lock_sink() {
            Ok(sink) => sink,
            Err(e) => {
                warn!("{}", e);
                return Vec::new();
            }
        };

        match sink.remaining_scores() {
            Ok(remaining) => remaining,
            Err(e) => {
                warn!("Could not read remaining scores: {}", e);
                Vec::new()
            }
        }
    }

    fn lock_sink(&self) -> Result<MutexGuard<'_, dyn SinkSurface + 'static>> {
        self.sink
            .lock()
            .map_err(|_| Error::surface("sink lock poisoned"))
    }
}
