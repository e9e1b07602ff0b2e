//! Integration test: pad override from wired mode.
//!
//! Holding both shoulder buttons for 10 s while the selector is on wired
//! hands control to the pad, provided the PWM driver is present and at most
//! one ADC is missing.

use axon_common::control_unit::error::MissingUnits;
use axon_common::control_unit::state::{ControlSource, FaultCode};
use axon_control_unit::command::arbitration::ArbiterEvent;
use axon_control_unit::cycle::StatusEvent;
use axon_control_unit::hal::{GamepadSnapshot, buttons, misc};

use super::harness::Rig;

// ── Helpers ─────────────────────────────────────────────────────────

fn combo() -> GamepadSnapshot {
    GamepadSnapshot {
        buttons: buttons::OVERRIDE_COMBO,
        ..Default::default()
    }
}

/// Wired rig with `missing` units and a connected pad holding the combo.
fn holding_combo(missing: MissingUnits) -> Rig {
    let mut rig = Rig::wired();
    rig.board.missing = missing;
    rig.board.pad = Some(combo());
    rig
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn single_adc_loss_grants_override() {
    let mut rig = holding_combo(MissingUnits::ADS_LEFT);
    rig.run_for(10_100);

    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::OverrideGranted)));
    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::ModeChanged(
        ControlSource::Pad
    ))));
    assert_eq!(rig.c.arbiter().source(), ControlSource::Pad);
    assert!(rig.c.arbiter().soft_override());
    assert_eq!(rig.c.fault(), FaultCode::AdsLeft);
}

#[test]
fn missing_pwm_denies_override() {
    let mut rig = holding_combo(MissingUnits::PWM);
    rig.run_for(10_100);

    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::OverrideDenied(
        FaultCode::Pca
    ))));
    assert_eq!(rig.c.arbiter().source(), ControlSource::Wired);
    assert!(!rig.c.arbiter().soft_override());
}

#[test]
fn two_missing_adcs_deny_override() {
    let mut rig = holding_combo(MissingUnits::ADS_LEFT | MissingUnits::ADS_RIGHT);
    rig.run_for(10_100);
    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::OverrideDenied(
        FaultCode::I2cGeneral
    ))));
    assert_eq!(rig.c.arbiter().source(), ControlSource::Wired);
}

#[test]
fn short_combo_does_nothing() {
    let mut rig = holding_combo(MissingUnits::empty());
    rig.run_for(9000);
    rig.board.pad = Some(GamepadSnapshot::default());
    rig.run_for(2000);
    assert_eq!(rig.c.arbiter().source(), ControlSource::Wired);
    assert!(!rig.saw(StatusEvent::Arbiter(ArbiterEvent::OverrideGranted)));
}

#[test]
fn mode_change_blocks_outputs_then_pad_drives() {
    let mut rig = holding_combo(MissingUnits::empty());
    rig.run_for(10_000);
    while !rig.saw(StatusEvent::Arbiter(ArbiterEvent::OverrideGranted)) {
        rig.step();
    }
    let switched_at = rig.now;

    // stick fully deflected during the settle window
    rig.board.pad = Some(GamepadSnapshot {
        rx: 512,
        ..Default::default()
    });
    rig.run_for(400);
    assert!(rig.c.arbiter().blocked(rig.now - 20));
    assert!(rig.outputs_neutral());
    assert!(!rig.board.enable);

    // arm with the sticks centred
    rig.board.pad = Some(GamepadSnapshot {
        misc: misc::SYSTEM,
        ..Default::default()
    });
    rig.run_for(5200);
    assert!(rig.now > switched_at + 500);
    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::Armed)));
    assert!(rig.board.enable);

    rig.board.pad = Some(GamepadSnapshot {
        rx: 512,
        ..Default::default()
    });
    rig.step();
    assert!((rig.board.duty[0] - 0.75).abs() < 1e-4);
    assert!(rig.board.digital[9]);
}

#[test]
fn selector_round_trip_cancels_override() {
    let mut rig = holding_combo(MissingUnits::empty());
    rig.run_for(10_100);
    assert_eq!(rig.c.arbiter().source(), ControlSource::Pad);
    rig.board.pad = Some(GamepadSnapshot::default());
    rig.run_for(600);

    rig.board.wired = false;
    rig.step();
    assert_eq!(rig.c.arbiter().source(), ControlSource::Pad);
    rig.board.wired = true;
    rig.step();
    assert_eq!(rig.c.arbiter().source(), ControlSource::Wired);
    assert!(!rig.c.arbiter().soft_override());
    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::ModeChanged(
        ControlSource::Wired
    ))));
}
