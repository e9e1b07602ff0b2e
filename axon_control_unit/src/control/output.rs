//! Actuator output stage: canonical value → duty + "axis active" flag.
//!
//! Inside the neutral window the duty sits at the band midpoint. Outside it
//! scales linearly toward 25 % or 75 %. The neutral offset shifts the whole
//! duty band so a recentred coordinate system keeps the same physical neutral.

use axon_common::consts::{
    AXIS_COUNT, CANONICAL_NEUTRAL, DUTY_MAX, DUTY_MID, DUTY_MIN, PWM_FULL_SCALE, PWM_TO_DIGITAL,
};
use axon_common::control_unit::axis::{AxisRange, NeutralOffset, RangeTable};
use static_assertions::const_assert;

use crate::control::mapper::CanonicalAxes;
use crate::hal::ActuatorSink;

const_assert!(AXIS_COUNT <= u8::MAX as usize);

/// Drive state of one PWM channel and its digital companion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelOutput {
    pub duty: f32,
    pub active: bool,
}

impl ChannelOutput {
    pub const NEUTRAL: Self = Self {
        duty: DUTY_MID,
        active: false,
    };
}

pub type OutputFrame = [ChannelOutput; AXIS_COUNT];

/// Every channel at neutral duty, every digital line off.
pub const NEUTRAL_FRAME: OutputFrame = [ChannelOutput::NEUTRAL; AXIS_COUNT];

/// Float interpolation with the ratio clamped to [0, 1].
#[inline]
fn lerp_clamped(x: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if in_max == in_min {
        return out_min;
    }
    let r = ((x - in_min) / (in_max - in_min)).clamp(0.0, 1.0);
    out_min + r * (out_max - out_min)
}

/// Duty shift produced by the neutral offset.
#[inline]
pub fn offset_duty(offset: NeutralOffset) -> f32 {
    -((offset.get() - CANONICAL_NEUTRAL) as f32) / CANONICAL_NEUTRAL as f32 * (DUTY_MID - DUTY_MIN)
}

pub fn compute_duty(value: i32, range: &AxisRange, offset: NeutralOffset) -> ChannelOutput {
    let shift = offset_duty(offset);
    let (win_min, win_max) = (range.window_min(), range.window_max());

    let (duty, active) = if value < win_min {
        let d = lerp_clamped(
            value as f32,
            range.min as f32,
            win_min as f32,
            DUTY_MIN,
            DUTY_MID,
        );
        (d + shift, true)
    } else if value > win_max {
        let d = lerp_clamped(
            value as f32,
            win_max as f32,
            range.max as f32,
            DUTY_MID,
            DUTY_MAX,
        );
        (d + shift, true)
    } else {
        (DUTY_MID + shift, false)
    };

    ChannelOutput {
        duty: duty.clamp(0.0, 1.0),
        active,
    }
}

pub fn compute_frame(
    values: &CanonicalAxes,
    ranges: &RangeTable,
    offset: NeutralOffset,
) -> OutputFrame {
    std::array::from_fn(|i| compute_duty(values[i], &ranges[i], offset))
}

/// 12-bit driver count, rounded.
#[inline]
pub fn duty_to_count(duty: f32) -> u16 {
    (duty.clamp(0.0, 1.0) * f32::from(PWM_FULL_SCALE) + 0.5) as u16
}

pub fn write_frame<S: ActuatorSink + ?Sized>(sink: &mut S, frame: &OutputFrame) {
    for (ch, out) in frame.iter().enumerate() {
        let ch = ch as u8;
        sink.write_duty(ch, out.duty);
        sink.write_digital(PWM_TO_DIGITAL[usize::from(ch)], out.active);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
