//! Gamepad snapshot → canonical axis values.
//!
//! Sticks span the whole configured range of their axis. Triggers push Z
//! away from neutral (throttle toward min, brake toward max). The d-pad and
//! the face buttons drive LZ, R1 and R2 straight to a bound.

use axon_common::consts::AXIS_COUNT;
use axon_common::control_unit::axis::{AxisRange, RangeTable};

use crate::control::mapper::{CanonicalAxes, rescale};
use crate::hal::{GamepadSnapshot, buttons, dpad};

pub const STICK_MIN: i32 = -512;
pub const STICK_MAX: i32 = 512;
pub const TRIGGER_MAX: i32 = 1023;

// channel order: X, Y, Z, LX, LY, LZ, R1, R2
const X: usize = 0;
const Y: usize = 1;
const Z: usize = 2;
const LX: usize = 3;
const LY: usize = 4;
const LZ: usize = 5;
const R1: usize = 6;
const R2: usize = 7;

#[inline]
fn stick(value: i32, r: &AxisRange) -> i32 {
    rescale(value, STICK_MIN, STICK_MAX, r.min, r.max).clamp(r.min, r.max)
}

#[inline]
fn trigger(value: i32, toward: i32, r: &AxisRange) -> i32 {
    rescale(value, 0, TRIGGER_MAX, r.neutral(), toward).clamp(r.min, r.max)
}

/// Map the snapshot. `invert_lx` mirrors the left stick X.
pub fn map_pad(pad: &GamepadSnapshot, ranges: &RangeTable, invert_lx: bool) -> CanonicalAxes {
    let mut out: CanonicalAxes = [0; AXIS_COUNT];
    for (slot, r) in out.iter_mut().zip(ranges) {
        *slot = r.neutral();
    }

    let lx = if invert_lx { -pad.lx } else { pad.lx };
    out[X] = stick(pad.rx, &ranges[X]);
    out[Y] = stick(pad.ry, &ranges[Y]);
    out[LX] = stick(lx, &ranges[LX]);
    out[LY] = stick(pad.ly, &ranges[LY]);

    if pad.throttle > 0 {
        out[Z] = trigger(pad.throttle, ranges[Z].min, &ranges[Z]);
    } else if pad.brake > 0 {
        out[Z] = trigger(pad.brake, ranges[Z].max, &ranges[Z]);
    }

    match pad.dpad {
        dpad::UP => out[LZ] = ranges[LZ].max,
        dpad::DOWN => out[LZ] = ranges[LZ].min,
        _ => {}
    }

    if pad.buttons & buttons::R1_MIN != 0 {
        out[R1] = ranges[R1].min;
    } else if pad.buttons & buttons::R1_MAX != 0 {
        out[R1] = ranges[R1].max;
    }
    if pad.buttons & buttons::R2_MIN != 0 {
        out[R2] = ranges[R2].min;
    } else if pad.buttons & buttons::R2_MAX != 0 {
        out[R2] = ranges[R2].max;
    }

    out
}

/// True if every mapped value lies in its neutral window.
pub fn all_in_window(values: &CanonicalAxes, ranges: &RangeTable) -> bool {
    values.iter().zip(ranges).all(|(&v, r)| r.in_window(v))
}

// ─── Tests ──────────────────────────────────────────────────────────
