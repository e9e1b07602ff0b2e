//! Integration test: full calibration through the operator button.
//!
//! Boot wired with every axis resting at raw 16000, enter calibration with a
//! 5 s hold + release, capture 2000/30000 on every axis, recentre, and check
//! the learned table, the persisted record and the restored outputs.

use axon_common::consts::AXIS_COUNT;
use axon_common::control_unit::axis::AxisCalibration;
use axon_common::control_unit::state::CalibrationPhase;
use axon_common::persist::{self, CalibrationRecord, RecordKind};
use axon_control_unit::cycle::StatusEvent;
use axon_control_unit::safety::faults::Portals;
use axon_control_unit::state::calibration::Bound;

use super::harness::Rig;

// ── Helpers ─────────────────────────────────────────────────────────

fn resting_rig() -> Rig {
    let mut rig = Rig::wired();
    rig.board.raw = [16000; AXIS_COUNT];
    rig.run_for(100);
    assert!(rig.c.arbiter().neutral_verified());
    rig
}

fn enter_calibration(rig: &mut Rig) {
    rig.press_cal(5100);
    assert_eq!(rig.c.calibration().phase(), CalibrationPhase::NeutralInit);
}

/// Run the neutral phases with the sticks at rest.
fn settle_to_extremes(rig: &mut Rig) {
    rig.run_for(5000);
    assert_eq!(rig.c.calibration().phase(), CalibrationPhase::Extremes);
}

fn capture(rig: &mut Rig, axis: usize, raw: i16) -> Vec<StatusEvent> {
    rig.board.raw[axis] = raw;
    let ev = rig.press_cal(200);
    rig.board.raw[axis] = 16000;
    ev
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn full_calibration_learns_and_persists_bounds() {
    let mut rig = resting_rig();
    enter_calibration(&mut rig);
    assert!(!rig.board.enable);
    assert!(rig.c.portals().contains(Portals::CALIBRATION));

    settle_to_extremes(&mut rig);
    assert_eq!(
        rig.c.calibration().table()[0],
        AxisCalibration::new(8000, 16000, 24000)
    );

    for axis in 0..AXIS_COUNT {
        let ev = capture(&mut rig, axis, 2000);
        assert!(ev.contains(&StatusEvent::Captured {
            axis,
            bound: Bound::Min
        }));
        let ev = capture(&mut rig, axis, 30000);
        assert!(ev.contains(&StatusEvent::Captured {
            axis,
            bound: Bound::Max
        }));
    }

    assert!(rig.saw(StatusEvent::Persisted(RecordKind::Calibration)));
    let saved = persist::load::<CalibrationRecord, _>(rig.c.store());
    assert!(saved.valid);
    assert!(
        saved
            .data
            .0
            .iter()
            .all(|c| *c == AxisCalibration::new(2000, 16000, 30000))
    );

    // sticks at rest: finish completes and wired output comes back
    rig.run_for(100);
    assert_eq!(rig.c.calibration().phase(), CalibrationPhase::Idle);
    assert!(rig.saw(StatusEvent::CalibrationPhase(CalibrationPhase::Idle)));
    assert!(rig.c.arbiter().neutral_verified());
    assert!(rig.board.enable);
    assert_eq!(rig.c.wired_values(), &[512; AXIS_COUNT]);

    rig.board.raw[2] = 30000;
    rig.step();
    assert!((rig.board.duty[2] - 0.75).abs() < 1e-3);
}

#[test]
fn outputs_stay_neutral_throughout_calibration() {
    let mut rig = resting_rig();
    enter_calibration(&mut rig);
    settle_to_extremes(&mut rig);

    rig.board.raw[5] = 31000;
    rig.run_for(200);
    assert!(rig.outputs_neutral());
    assert!(!rig.board.enable);
}

#[test]
fn still_capture_press_is_rejected() {
    let mut rig = resting_rig();
    enter_calibration(&mut rig);
    settle_to_extremes(&mut rig);

    let ev = rig.press_cal(200);
    assert!(ev.contains(&StatusEvent::CaptureRejected));
    assert_eq!(rig.c.calibration().phase(), CalibrationPhase::Extremes);
}

#[test]
fn remote_finish_keeps_provisional_bounds() {
    let mut rig = resting_rig();
    enter_calibration(&mut rig);
    settle_to_extremes(&mut rig);
    capture(&mut rig, 0, 1000);

    rig.c.finish_calibration().unwrap();
    assert_eq!(rig.c.calibration().phase(), CalibrationPhase::Finish);
    let table = rig.c.calibration().table();
    assert_eq!(table[0], AxisCalibration::new(1000, 16000, 24000));
    assert_eq!(table[1], AxisCalibration::new(8000, 16000, 24000));
}

#[test]
fn movement_during_validation_delays_extremes() {
    let mut rig = resting_rig();
    enter_calibration(&mut rig);
    rig.run_for(1000);
    assert_eq!(
        rig.c.calibration().phase(),
        CalibrationPhase::NeutralValidate
    );

    // keep wiggling an axis: validation never completes
    for _ in 0..10 {
        rig.board.raw[1] = 26000;
        rig.run_for(300);
        rig.board.raw[1] = 16000;
        rig.run_for(300);
    }
    assert_eq!(
        rig.c.calibration().phase(),
        CalibrationPhase::NeutralValidate
    );
    rig.run_for(900);
    assert_eq!(rig.c.calibration().phase(), CalibrationPhase::NeutralDone);
}

#[test]
fn short_hold_does_not_enter_calibration() {
    let mut rig = resting_rig();
    rig.press_cal(3000);
    assert_eq!(rig.c.calibration().phase(), CalibrationPhase::Idle);
    assert!(rig.board.enable);
}
