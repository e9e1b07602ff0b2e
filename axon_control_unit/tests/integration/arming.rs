//! Integration test: pad arming, disarming and LX inversion.

use axon_common::consts::AXIS_COUNT;
use axon_common::control_unit::axis::AxisRange;
use axon_common::control_unit::error::MissingUnits;
use axon_common::control_unit::state::{ControlSource, FaultCode};
use axon_control_unit::command::arbitration::{ArbiterEvent, DisarmReason};
use axon_control_unit::command::pad::{all_in_window, map_pad};
use axon_control_unit::cycle::StatusEvent;
use axon_control_unit::hal::{GamepadSnapshot, buttons, dpad, misc};
use proptest::prelude::*;

use super::harness::Rig;

// ── Helpers ─────────────────────────────────────────────────────────

fn sticks(lx: i32, ly: i32, rx: i32, ry: i32) -> GamepadSnapshot {
    GamepadSnapshot {
        lx,
        ly,
        rx,
        ry,
        ..Default::default()
    }
}

fn with_system(mut pad: GamepadSnapshot) -> GamepadSnapshot {
    pad.misc |= misc::SYSTEM;
    pad
}

fn pad_neutral(pad: &GamepadSnapshot) -> bool {
    let ranges = [AxisRange::DEFAULT; AXIS_COUNT];
    map_pad(pad, &ranges, false)
        .iter()
        .zip(&ranges)
        .all(|(&v, r)| r.in_window(v))
}

/// Pad rig armed with centred sticks.
fn armed_rig() -> Rig {
    let mut rig = Rig::pad();
    rig.board.pad = Some(with_system(GamepadSnapshot::default()));
    rig.run_for(5100);
    rig.board.pad = Some(GamepadSnapshot::default());
    rig.step();
    assert!(rig.c.arbiter().armed());
    rig
}

// ── Tests ───────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn armed_iff_sticks_centred_at_hold(
        lx in -512i32..=512,
        ly in -512i32..=512,
        rx in -512i32..=512,
        ry in -512i32..=512,
    ) {
        let pad = sticks(lx, ly, rx, ry);
        let mut rig = Rig::pad();
        rig.board.pad = Some(with_system(pad));
        rig.run_for(5100);

        prop_assert_eq!(rig.c.arbiter().armed(), pad_neutral(&pad));
        prop_assert_eq!(rig.board.enable, pad_neutral(&pad));
    }
}

fn any_range() -> impl Strategy<Value = (i32, i32)> {
    (0i32..=1023, 0i32..=1023)
}

fn any_pad() -> impl Strategy<Value = GamepadSnapshot> {
    let stick = -512i32..=512;
    let trigger = prop_oneof![Just(0i32), 0i32..=1023];
    let pad_dir = prop_oneof![Just(0u8), Just(dpad::UP), Just(dpad::DOWN)];
    let face = prop_oneof![
        Just(0u16),
        0u16..=(buttons::R1_MIN | buttons::R1_MAX | buttons::R2_MIN | buttons::R2_MAX)
    ];
    (
        (stick.clone(), stick.clone(), stick.clone(), stick),
        (trigger.clone(), trigger),
        pad_dir,
        face,
    )
        .prop_map(|((lx, ly, rx, ry), (throttle, brake), dpad, buttons)| GamepadSnapshot {
            lx,
            ly,
            rx,
            ry,
            throttle,
            brake,
            dpad,
            buttons,
            misc: 0,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arming_never_leaves_the_window(
        ranges in prop::array::uniform8(any_range()),
        offset in prop_oneof![Just(512i32), 0i32..=1023],
        pad in any_pad(),
    ) {
        let mut rig = Rig::pad();
        for (axis, &(min, max)) in ranges.iter().enumerate() {
            rig.c.set_range(axis, min, max).unwrap();
        }
        rig.c.apply_offset(offset, false).unwrap();
        let table = *rig.c.ranges();
        let expected = all_in_window(&map_pad(&pad, &table, false), &table);

        rig.board.pad = Some(with_system(pad));
        let end = rig.now + 5100;
        while rig.now < end {
            let ev = rig.step();
            if ev.contains(&StatusEvent::Arbiter(ArbiterEvent::Armed)) {
                let values = rig.c.pad_values().copied();
                prop_assert!(values.is_some_and(|v| all_in_window(&v, rig.c.ranges())));
            }
        }

        prop_assert_eq!(rig.c.arbiter().armed(), expected);
        prop_assert_eq!(rig.board.enable, expected);
    }
}

#[test]
fn refused_arm_is_retried_on_release() {
    let mut rig = Rig::pad();
    rig.board.pad = Some(with_system(sticks(0, 0, 400, 0)));
    rig.run_for(5100);
    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::ArmRefused)));
    assert!(!rig.c.arbiter().armed());

    // centre while still holding, then let go
    rig.board.pad = Some(with_system(GamepadSnapshot::default()));
    rig.step();
    rig.board.pad = Some(GamepadSnapshot::default());
    rig.step();
    assert!(rig.c.arbiter().armed());
}

#[test]
fn second_hold_disarms() {
    let mut rig = armed_rig();
    rig.board.pad = Some(with_system(GamepadSnapshot::default()));
    rig.run_for(5100);
    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::Disarmed(
        DisarmReason::Gesture
    ))));
    assert!(!rig.c.arbiter().armed());
    assert!(!rig.board.enable);
}

#[test]
fn short_press_disarms() {
    let mut rig = armed_rig();
    rig.board.pad = Some(with_system(GamepadSnapshot::default()));
    rig.run_for(200);
    rig.board.pad = Some(GamepadSnapshot::default());
    rig.step();
    assert!(!rig.c.arbiter().armed());
    assert!(rig.outputs_neutral());
}

#[test]
fn disconnect_disarms_and_raises_no_gamepad() {
    let mut rig = armed_rig();
    rig.board.pad = None;
    rig.step();
    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::Disarmed(
        DisarmReason::Disconnect
    ))));
    assert_eq!(rig.c.fault(), FaultCode::NoGamepad);
    assert!(!rig.board.enable);

    // reconnecting does not re-arm
    rig.board.pad = Some(GamepadSnapshot::default());
    rig.run_for(100);
    assert_eq!(rig.c.fault(), FaultCode::None);
    assert!(!rig.c.arbiter().armed());
}

#[test]
fn selector_change_disarms() {
    let mut rig = armed_rig();
    rig.board.wired = true;
    rig.step();
    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::Disarmed(
        DisarmReason::ModeChange
    ))));
    assert_eq!(rig.c.arbiter().source(), ControlSource::Wired);
    assert!(rig.outputs_neutral());
}

#[test]
fn driver_loss_disarms() {
    let mut rig = armed_rig();
    rig.board.missing = MissingUnits::PWM;
    rig.run_for(2600);
    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::Disarmed(
        DisarmReason::Fault
    ))));
    assert_eq!(rig.c.fault(), FaultCode::Pca);
    assert!(!rig.board.enable);
}

#[test]
fn fault_onset_cycle_outputs_neutral() {
    let mut rig = armed_rig();
    rig.board.pad = Some(sticks(0, 0, 512, 0));
    rig.step();
    assert!((rig.board.duty[0] - 0.75).abs() < 1e-4);

    rig.board.missing = MissingUnits::ADS_RIGHT;
    let mut guard = 0;
    while rig.c.fault() == FaultCode::None {
        rig.step();
        guard += 1;
        assert!(guard < 200, "presence poll never reported the loss");
    }

    assert_eq!(rig.c.fault(), FaultCode::AdsRight);
    assert!(!rig.c.arbiter().armed());
    assert!(!rig.board.enable);
    assert!(rig.outputs_neutral());
    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::Disarmed(
        DisarmReason::Fault
    ))));
}

#[test]
fn start_toggles_lx_inversion() {
    let mut rig = Rig::pad();
    rig.board.pad = Some(GamepadSnapshot {
        misc: misc::START,
        ..Default::default()
    });
    rig.step();
    rig.board.pad = Some(GamepadSnapshot::default());
    rig.step();
    assert!(rig.saw(StatusEvent::Arbiter(ArbiterEvent::LxInversion(true))));
    assert!(rig.c.arbiter().invert_lx());

    let full_left = sticks(-512, 0, 0, 0);
    rig.board.pad = Some(full_left);
    rig.step();
    assert_eq!(rig.c.pad_values().map(|v| v[3]), Some(768));
}
