//! Integration test: fault lamp sequences as seen on the board.

use axon_common::control_unit::error::MissingUnits;
use axon_common::control_unit::state::FaultCode;
use axon_control_unit::safety::display::Indicator;

use super::harness::{CYCLE_MS, Rig};

// ── Helpers ─────────────────────────────────────────────────────────

/// Dark time that separates two blink groups [ms].
const GROUP_GAP_MS: u64 = 3000;

/// Run until `groups` complete blink groups were shown; returns the red
/// blink count of each.
fn blink_groups(rig: &mut Rig, groups: usize) -> Vec<u32> {
    let mut out = Vec::new();
    let mut blinks = 0;
    let mut dark_ms = 0;
    let mut was_red = false;

    for _ in 0..10_000 {
        rig.step();
        let red = rig.board.indicator == Indicator::RED;
        if red && !was_red {
            blinks += 1;
        }
        if red {
            dark_ms = 0;
        } else {
            assert_eq!(rig.board.indicator, Indicator::OFF);
            dark_ms += CYCLE_MS;
            if dark_ms == GROUP_GAP_MS && blinks > 0 {
                out.push(blinks);
                blinks = 0;
                if out.len() == groups {
                    return out;
                }
            }
        }
        was_red = red;
    }
    out
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn general_fault_alternates_with_unit_codes() {
    let mut rig = Rig::wired();
    rig.board.missing = MissingUnits::ADS_LEFT | MissingUnits::PWM;
    assert_eq!(blink_groups(&mut rig, 5), vec![5, 3, 4, 3, 4]);
    assert_eq!(rig.c.fault(), FaultCode::I2cGeneral);
}

#[test]
fn single_unit_repeats_its_code() {
    let mut rig = Rig::wired();
    rig.board.missing = MissingUnits::ADS_RIGHT;
    assert_eq!(blink_groups(&mut rig, 3), vec![2, 2, 2]);
}

#[test]
fn recovered_unit_turns_lamp_green() {
    let mut rig = Rig::wired();
    rig.board.missing = MissingUnits::PWM;
    rig.run_for(1000);
    assert_eq!(rig.c.fault(), FaultCode::Pca);

    rig.board.missing = MissingUnits::empty();
    // next presence poll at 2500 ms
    rig.run_for(1400);
    assert_eq!(rig.c.fault(), FaultCode::Pca);
    rig.run_for(200);
    assert_eq!(rig.c.fault(), FaultCode::None);
    assert_eq!(rig.board.indicator, Indicator::GREEN);
}

#[test]
fn missing_gamepad_alternates_red_and_green() {
    let mut rig = Rig::pad();
    rig.step();
    assert_eq!(rig.c.fault(), FaultCode::NoGamepad);

    let mut seen = Vec::new();
    for _ in 0..200 {
        rig.step();
        if seen.last() != Some(&rig.board.indicator) {
            seen.push(rig.board.indicator);
        }
    }
    assert!(seen.len() >= 4);
    assert!(
        seen.iter()
            .all(|&i| i == Indicator::RED || i == Indicator::GREEN)
    );
}
