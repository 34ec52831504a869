//! Tests for the bridge state machine

use super::*;
use crate::state::{BridgePhase, BridgeState};
use dartbridge_core::{normalize_reading, CompetitorIndex, Liveness, Role, ScoreDecision};

/// Run a message and all its follow-ups, collecting the requested actions
fn run(state: &mut BridgeState, msg: Message) -> Vec<UpdateAction> {
    let mut actions = Vec::new();
    let mut next = Some(msg);
    while let Some(m) = next {
        let result = update(state, m);
        actions.extend(result.action);
        next = result.message;
    }
    actions
}

fn enabled(role: Role) -> BridgeState {
    let mut state = BridgeState::new(role);
    state.phase = BridgePhase::Enabled;
    state
}

fn round() -> Round {
    Round {
        darts: normalize_reading(&["T20", "T20", "T20"]),
        ts: 1,
    }
}

// ─────────────────────────────────────────────────────────
// Enabling
// ─────────────────────────────────────────────────────────

#[test]
fn test_producer_enables_unconditionally() {
    let mut state = BridgeState::new(Role::Producer);
    let actions = run(&mut state, Message::SetEnabled(true));

    assert_eq!(state.phase, BridgePhase::Enabled);
    assert!(matches!(
        actions[0],
        UpdateAction::PublishTrigger {
            kind: TriggerKind::Enable,
            ..
        }
    ));
    assert_eq!(actions[1], UpdateAction::Activate);
    assert_eq!(actions.len(), 2);
}

#[test]
fn test_consumer_waits_for_liveness() {
    let mut state = BridgeState::new(Role::Consumer);
    let actions = run(&mut state, Message::SetEnabled(true));

    assert_eq!(state.phase, BridgePhase::Enabling);
    assert_eq!(actions.last(), Some(&UpdateAction::CheckLiveness));

    let actions = run(
        &mut state,
        Message::LivenessChecked(Liveness::Live { age_ms: 1_200 }),
    );
    assert_eq!(state.phase, BridgePhase::Enabled);
    assert_eq!(actions, vec![UpdateAction::Activate]);
}

#[test]
fn test_consumer_rolls_back_without_heartbeat() {
    let mut state = BridgeState::new(Role::Consumer);
    run(&mut state, Message::SetEnabled(true));

    let actions = run(&mut state, Message::LivenessChecked(Liveness::Absent));

    assert_eq!(state.phase, BridgePhase::Disabled);
    // Rollback writes no disable trigger
    assert_eq!(
        actions,
        vec![UpdateAction::Deactivate(DisableReason::RolledBack(
            Liveness::Absent
        ))]
    );
}

#[test]
fn test_consumer_rolls_back_on_stale_heartbeat() {
    let mut state = BridgeState::new(Role::Consumer);
    run(&mut state, Message::SetEnabled(true));

    let stale = Liveness::Stale { age_ms: 11_000 };
    run(&mut state, Message::LivenessChecked(stale));
    assert_eq!(state.phase, BridgePhase::Disabled);
}

#[test]
fn test_late_liveness_result_is_ignored() {
    let mut state = enabled(Role::Consumer);
    let actions = run(&mut state, Message::LivenessChecked(Liveness::Absent));

    assert!(actions.is_empty());
    assert_eq!(state.phase, BridgePhase::Enabled);
}

// ─────────────────────────────────────────────────────────
// Idempotence
// ─────────────────────────────────────────────────────────

#[test]
fn test_enable_when_enabled_is_noop() {
    let mut state = enabled(Role::Producer);
    assert!(run(&mut state, Message::SetEnabled(true)).is_empty());
    assert_eq!(state.phase, BridgePhase::Enabled);
}

#[test]
fn test_disable_when_disabled_is_noop() {
    let mut state = BridgeState::new(Role::Consumer);
    assert!(run(&mut state, Message::SetEnabled(false)).is_empty());
    assert_eq!(state.phase, BridgePhase::Disabled);
}

#[test]
fn test_enable_while_enabling_is_noop() {
    let mut state = BridgeState::new(Role::Consumer);
    run(&mut state, Message::SetEnabled(true));
    assert!(run(&mut state, Message::SetEnabled(true)).is_empty());
}

// ─────────────────────────────────────────────────────────
// Disabling
// ─────────────────────────────────────────────────────────

#[test]
fn test_local_disable_writes_trigger_and_stops() {
    let mut state = enabled(Role::Consumer);
    let actions = run(&mut state, Message::SetEnabled(false));

    assert_eq!(state.phase, BridgePhase::Disabled);
    assert!(matches!(
        actions[0],
        UpdateAction::PublishTrigger {
            kind: TriggerKind::Disable,
            ..
        }
    ));
    assert_eq!(
        actions[1],
        UpdateAction::Deactivate(DisableReason::Requested)
    );
}

#[test]
fn test_disable_while_enabling_cancels() {
    let mut state = BridgeState::new(Role::Consumer);
    run(&mut state, Message::SetEnabled(true));
    run(&mut state, Message::SetEnabled(false));
    assert_eq!(state.phase, BridgePhase::Disabled);

    // The pending check resolves afterwards and must not re-enable
    let actions = run(
        &mut state,
        Message::LivenessChecked(Liveness::Live { age_ms: 10 }),
    );
    assert!(actions.is_empty());
    assert_eq!(state.phase, BridgePhase::Disabled);
}

#[test]
fn test_toggle_flips_enablement() {
    let mut state = BridgeState::new(Role::Producer);
    run(&mut state, Message::Toggle);
    assert_eq!(state.phase, BridgePhase::Enabled);
    run(&mut state, Message::Toggle);
    assert_eq!(state.phase, BridgePhase::Disabled);
}

// ─────────────────────────────────────────────────────────
// Remote Triggers
// ─────────────────────────────────────────────────────────

#[test]
fn test_remote_enable_writes_no_trigger() {
    let mut state = BridgeState::new(Role::Producer);
    let actions = run(
        &mut state,
        Message::RemoteTrigger {
            kind: TriggerKind::Enable,
            at: 1,
        },
    );

    assert_eq!(state.phase, BridgePhase::Enabled);
    assert_eq!(actions, vec![UpdateAction::Activate]);
}

#[test]
fn test_remote_disable_stops_bridge() {
    let mut state = enabled(Role::Consumer);
    let actions = run(
        &mut state,
        Message::RemoteTrigger {
            kind: TriggerKind::Disable,
            at: 1,
        },
    );

    assert_eq!(state.phase, BridgePhase::Disabled);
    assert_eq!(actions, vec![UpdateAction::Deactivate(DisableReason::Remote)]);
}

#[test]
fn test_redundant_remote_triggers_are_noops() {
    let mut state = enabled(Role::Producer);
    let enable = Message::RemoteTrigger {
        kind: TriggerKind::Enable,
        at: 5,
    };
    assert!(run(&mut state, enable).is_empty());

    let mut state = BridgeState::new(Role::Producer);
    let disable = Message::RemoteTrigger {
        kind: TriggerKind::Disable,
        at: 5,
    };
    assert!(run(&mut state, disable).is_empty());
}

#[test]
fn test_echo_of_own_enable_after_rollback_is_ignored() {
    let mut state = BridgeState::new(Role::Consumer);
    let actions = run(&mut state, Message::SetEnabled(true));
    let at = match actions[0] {
        UpdateAction::PublishTrigger { at, .. } => at,
        ref other => panic!("unexpected action: {:?}", other),
    };
    run(&mut state, Message::LivenessChecked(Liveness::Absent));

    let actions = run(
        &mut state,
        Message::RemoteTrigger {
            kind: TriggerKind::Enable,
            at,
        },
    );
    assert!(actions.is_empty());
    assert_eq!(state.phase, BridgePhase::Disabled);
}

// ─────────────────────────────────────────────────────────
// Rounds
// ─────────────────────────────────────────────────────────

#[test]
fn test_enabled_consumer_enters_rounds() {
    let mut state = enabled(Role::Consumer);
    let actions = run(&mut state, Message::RoundPublished(round()));
    assert_eq!(actions, vec![UpdateAction::EnterRound(round())]);
}

#[test]
fn test_disabled_consumer_ignores_rounds() {
    let mut state = BridgeState::new(Role::Consumer);
    assert!(run(&mut state, Message::RoundPublished(round())).is_empty());
}

#[test]
fn test_producer_ignores_published_rounds() {
    let mut state = enabled(Role::Producer);
    assert!(run(&mut state, Message::RoundPublished(round())).is_empty());

    run(&mut state, Message::RoundBroadcast(round()));
    assert_eq!(state.rounds_published, 1);
}

#[test]
fn test_round_entered_requests_confirmation() {
    let mut state = enabled(Role::Consumer);
    let report = EntryReport {
        total: 180,
        index: CompetitorIndex::Resolved(0),
        remaining: vec![501, 501],
        decision: ScoreDecision::Normal(180),
    };

    let actions = run(&mut state, Message::RoundEntered(report.clone()));

    assert_eq!(state.rounds_entered, 1);
    assert_eq!(state.last_entry, Some(report.clone()));
    assert_eq!(actions, vec![UpdateAction::ConfirmEntry(report)]);
}

#[test]
fn test_failed_entry_keeps_bridge_enabled() {
    let mut state = enabled(Role::Consumer);
    run(
        &mut state,
        Message::RoundEntryFailed {
            reason: "score input not found".into(),
        },
    );

    assert_eq!(state.rounds_failed, 1);
    assert_eq!(state.phase, BridgePhase::Enabled);
}

#[test]
fn test_refresh_and_quit() {
    let mut state = BridgeState::new(Role::Consumer);
    assert_eq!(
        run(&mut state, Message::RefreshToggle),
        vec![UpdateAction::RenderToggle]
    );

    run(&mut state, Message::Quit);
    assert!(state.should_quit());
}
