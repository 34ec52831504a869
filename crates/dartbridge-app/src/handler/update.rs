//! Main update function - bridge state transitions (TEA pattern)

use dartbridge_core::Liveness;
use tracing::{debug, info, trace, warn};

use crate::beacon::now_ms;
use crate::message::{DisableReason, Message, TriggerKind};
use crate::state::{BridgePhase, BridgeState};

use super::{UpdateAction, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut BridgeState, message: Message) -> UpdateResult {
    match message {
        Message::Quit => {
            state.request_quit();
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Local Control
        // ─────────────────────────────────────────────────────────
        Message::Toggle => UpdateResult::message(Message::SetEnabled(state.phase.is_disabled())),

        Message::SetEnabled(true) => {
            if !state.phase.is_disabled() {
                debug!("Enable requested while {}, ignoring", state.phase);
                return UpdateResult::none();
            }
            state.phase = BridgePhase::Enabling;
            info!("Bridge enabling ({})", state.role);

            publish_trigger(state, TriggerKind::Enable).with_message(Message::BeginEnable)
        }

        Message::SetEnabled(false) => {
            if state.phase.is_disabled() {
                debug!("Disable requested while disabled, ignoring");
                return UpdateResult::none();
            }
            state.phase = BridgePhase::Disabled;
            info!("Bridge disabled ({})", state.role);

            publish_trigger(state, TriggerKind::Disable)
                .with_message(Message::BridgeDisabled(DisableReason::Requested))
        }

        Message::RefreshToggle => UpdateResult::action(UpdateAction::RenderToggle),

        // ─────────────────────────────────────────────────────────
        // Cross-Context Events
        // ─────────────────────────────────────────────────────────
        Message::RemoteTrigger { kind, at } => handle_remote_trigger(state, kind, at),

        // ─────────────────────────────────────────────────────────
        // Lifecycle Steps
        // ─────────────────────────────────────────────────────────
        Message::BeginEnable => {
            if state.phase != BridgePhase::Enabling {
                return UpdateResult::none();
            }

            if state.role.is_producer() {
                state.phase = BridgePhase::Enabled;
                info!("Bridge enabled (producer)");
                UpdateResult::action(UpdateAction::Activate)
            } else {
                UpdateResult::action(UpdateAction::CheckLiveness)
            }
        }

        Message::LivenessChecked(liveness) => handle_liveness(state, liveness),

        Message::BridgeDisabled(reason) => {
            UpdateResult::action(UpdateAction::Deactivate(reason))
        }

        // ─────────────────────────────────────────────────────────
        // Rounds
        // ─────────────────────────────────────────────────────────
        Message::RoundBroadcast(_) => {
            state.rounds_published += 1;
            UpdateResult::none()
        }

        Message::RoundPublished(round) => {
            if !state.role.is_consumer() {
                return UpdateResult::none();
            }
            if !state.phase.is_enabled() {
                info!("Bridge disabled, ignoring round {}", round);
                return UpdateResult::none();
            }
            UpdateResult::action(UpdateAction::EnterRound(round))
        }

        Message::RoundEntered(report) => {
            state.rounds_entered += 1;
            state.last_entry = Some(report.clone());
            UpdateResult::action(UpdateAction::ConfirmEntry(report))
        }

        Message::RoundEntryFailed { reason } => {
            state.rounds_failed += 1;
            warn!("Round not entered: {}", reason);
            UpdateResult::none()
        }

        Message::EntryConfirmed { before, after } => {
            info!("Remaining before entry {:?}, after {:?}", before, after);
            UpdateResult::none()
        }
    }
}

/// Stamp, remember and request a trigger write
fn publish_trigger(state: &mut BridgeState, kind: TriggerKind) -> UpdateResult {
    let at = now_ms();
    state.record_trigger(kind, at);
    UpdateResult::action(UpdateAction::PublishTrigger { kind, at })
}

fn handle_remote_trigger(state: &mut BridgeState, kind: TriggerKind, at: i64) -> UpdateResult {
    if state.is_own_trigger(kind, at) {
        trace!("Ignoring echo of own {} trigger {}", kind, at);
        return UpdateResult::none();
    }

    match kind {
        TriggerKind::Enable => {
            if !state.phase.is_disabled() {
                return UpdateResult::none();
            }
            state.phase = BridgePhase::Enabling;
            info!("Bridge enabling from remote trigger ({})", state.role);
            UpdateResult::message(Message::BeginEnable)
        }
        TriggerKind::Disable => {
            if state.phase.is_disabled() {
                return UpdateResult::none();
            }
            state.phase = BridgePhase::Disabled;
            info!("Bridge disabled from remote trigger ({})", state.role);
            UpdateResult::message(Message::BridgeDisabled(DisableReason::Remote))
        }
    }
}

fn handle_liveness(state: &mut BridgeState, liveness: Liveness) -> UpdateResult {
    if state.phase != BridgePhase::Enabling {
        debug!("Stale liveness result ({}), ignoring", liveness);
        return UpdateResult::none();
    }

    if liveness.is_live() {
        state.phase = BridgePhase::Enabled;
        info!("Bridge enabled (consumer): {}", liveness);
        UpdateResult::action(UpdateAction::Activate)
    } else {
        state.phase = BridgePhase::Disabled;
        warn!("Producer not live, rolling back: {}", liveness);
        UpdateResult::message(Message::BridgeDisabled(DisableReason::RolledBack(liveness)))
    }
}
