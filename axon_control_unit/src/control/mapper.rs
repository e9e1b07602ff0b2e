//! Raw sample → canonical value.
//!
//! The learned neutral always lands on 512; the lower half of the raw span
//! maps onto [255, 512] and the upper half onto [512, 768].

use axon_common::consts::{
    AXIS_COUNT, CANONICAL_MAX, CANONICAL_MIN, CANONICAL_NEUTRAL, RAW_MAX, RAW_MIN,
};
use axon_common::control_unit::axis::{AxisCalibration, CalibrationTable};

use crate::hal::RawAxes;

/// Canonical values of all axes.
pub type CanonicalAxes = [i32; AXIS_COUNT];

/// Integer linear interpolation, truncating toward zero.
///
/// Not clamped. A zero-width input span returns `out_min`.
#[inline]
pub fn rescale(x: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    if in_max == in_min {
        return out_min;
    }
    let num = i64::from(x - in_min) * i64::from(out_max - out_min);
    (num / i64::from(in_max - in_min)) as i32 + out_min
}

/// Map one raw sample through its calibration.
pub fn map_axis(raw: i16, cal: &AxisCalibration) -> i32 {
    let cal = cal.sanitized();
    let (min, mid, max) = (
        i32::from(cal.min_raw),
        i32::from(cal.mid_raw),
        i32::from(cal.max_raw),
    );
    let raw = i32::from(raw);
    let value = if raw <= mid {
        rescale(raw.max(min), min, mid, CANONICAL_MIN, CANONICAL_NEUTRAL)
    } else {
        rescale(raw.min(max), mid, max, CANONICAL_NEUTRAL, CANONICAL_MAX)
    };
    value.clamp(CANONICAL_MIN, CANONICAL_MAX)
}

/// Map with the factory calibration. Used to judge motion while the real
/// bounds are still being learned.
#[inline]
pub fn map_factory(raw: i16) -> i32 {
    map_axis(raw.clamp(RAW_MIN, RAW_MAX), &AxisCalibration::FACTORY)
}

pub fn map_all(raw: &RawAxes, table: &CalibrationTable) -> CanonicalAxes {
    std::array::from_fn(|i| map_axis(raw[i], &table[i]))
}

// ─── Tests ──────────────────────────────────────────────────────────
