//! Integration test: wired boot with an axis held off centre.

use axon_common::control_unit::state::{CalibrationPhase, FaultCode};
use axon_control_unit::command::arbitration::{ArbiterEvent, NeutralCheck};
use axon_control_unit::cycle::StatusEvent;
use axon_control_unit::safety::display::Indicator;
use axon_control_unit::safety::faults::Portals;

use super::harness::Rig;

// ── Helpers ─────────────────────────────────────────────────────────

/// Wired rig with X pushed to 724 canonical from power-up.
fn deflected() -> Rig {
    let mut rig = Rig::wired();
    rig.board.raw[0] = 30000;
    rig
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn no_fault_before_the_wait_expires() {
    let mut rig = deflected();
    rig.run_for(9900);
    assert!(matches!(
        rig.c.arbiter().neutral_check(),
        NeutralCheck::Waiting { .. }
    ));
    assert_eq!(rig.c.fault(), FaultCode::None);
    assert!(!rig.board.enable);
    assert!(rig.outputs_neutral());
}

#[test]
fn timeout_raises_fault_and_requests_portals() {
    let mut rig = deflected();
    rig.run_for(10_100);

    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::NeutralTimeout)));
    assert_eq!(rig.c.fault(), FaultCode::NeutralTimeout);
    assert_eq!(rig.c.portals(), Portals::CONFIG | Portals::CALIBRATION);
    assert!(!rig.board.enable);
    assert!(rig.outputs_neutral());
    assert_ne!(rig.board.indicator, Indicator::GREEN);
}

#[test]
fn recentring_clears_the_fault() {
    let mut rig = deflected();
    rig.run_for(10_100);

    rig.board.raw[0] = 16000;
    rig.run_for(60);
    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::NeutralVerified)));
    assert_eq!(rig.c.fault(), FaultCode::None);
    assert!(rig.c.portals().is_empty());
    assert!(rig.board.enable);
    assert_eq!(rig.board.indicator, Indicator::GREEN);
}

#[test]
fn plain_hold_enters_calibration_after_timeout() {
    let mut rig = deflected();
    rig.run_for(10_100);

    // no release needed
    rig.board.cal_button = true;
    rig.run_for(5100);
    assert_eq!(rig.c.calibration().phase(), CalibrationPhase::NeutralInit);
    assert!(!rig.c.faults().neutral_timeout());
    assert_eq!(rig.c.fault(), FaultCode::None);
    assert_eq!(rig.c.portals(), Portals::CALIBRATION);
    assert_eq!(rig.board.indicator, Indicator::BOTH);
}

#[test]
fn hold_without_timeout_waits_for_release() {
    let mut rig = Rig::wired();
    rig.run_for(100);
    rig.board.cal_button = true;
    rig.run_for(5100);
    assert_eq!(rig.c.calibration().phase(), CalibrationPhase::Idle);

    rig.board.cal_button = false;
    rig.step();
    assert_eq!(rig.c.calibration().phase(), CalibrationPhase::NeutralInit);
}
