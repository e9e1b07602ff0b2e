//! Per-axis data: raw calibration, canonical output range, global offset.

use serde::{Deserialize, Serialize};

use crate::consts::{
    AXIS_COUNT, CANONICAL_MAX, CANONICAL_MIN, CONFIG_MAX, CONFIG_MIN, DEFAULT_NEUTRAL_OFFSET,
    NEUTRAL_HALF_WINDOW, RAW_DEFAULT_MID, RAW_MAX, RAW_MIN,
};

// ─── Calibration ────────────────────────────────────────────────────

/// Learned raw bounds of one axis.
///
/// Invariant after [`sanitize`](Self::sanitize): `min_raw < mid_raw < max_raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisCalibration {
    pub min_raw: i16,
    pub mid_raw: i16,
    pub max_raw: i16,
}

impl AxisCalibration {
    /// Factory values used when no valid record exists.
    pub const FACTORY: Self = Self {
        min_raw: RAW_MIN,
        mid_raw: RAW_DEFAULT_MID,
        max_raw: RAW_MAX,
    };

    pub const fn new(min_raw: i16, mid_raw: i16, max_raw: i16) -> Self {
        Self {
            min_raw,
            mid_raw,
            max_raw,
        }
    }

    #[inline]
    pub const fn is_ordered(&self) -> bool {
        self.min_raw < self.mid_raw && self.mid_raw < self.max_raw
    }

    /// Nudge bounds by one count until `min < mid < max` holds.
    pub fn sanitize(&mut self) {
        self.mid_raw = self.mid_raw.clamp(i16::MIN + 1, i16::MAX - 1);
        if self.min_raw >= self.mid_raw {
            self.min_raw = self.mid_raw - 1;
        }
        if self.max_raw <= self.mid_raw {
            self.max_raw = self.mid_raw + 1;
        }
    }

    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }
}

impl Default for AxisCalibration {
    fn default() -> Self {
        Self::FACTORY
    }
}

/// Calibration of all axes.
pub type CalibrationTable = [AxisCalibration; AXIS_COUNT];

// ─── Range ("bridage") ──────────────────────────────────────────────

/// Operator-configured canonical output bounds of one axis.
///
/// `neutral` and the neutral window are derived on every read so they can
/// never go stale after `min`/`max` change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    pub const DEFAULT: Self = Self {
        min: CANONICAL_MIN,
        max: CANONICAL_MAX,
    };

    /// Clamp both bounds to the configurable band and swap if inverted.
    pub fn clamped(min: i32, max: i32) -> Self {
        let min = min.clamp(CONFIG_MIN, CONFIG_MAX);
        let max = max.clamp(CONFIG_MIN, CONFIG_MAX);
        if max < min {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    /// Swap bounds if inverted, without clamping.
    pub fn ordered(self) -> Self {
        if self.max < self.min {
            Self {
                min: self.max,
                max: self.min,
            }
        } else {
            self
        }
    }

    /// `round((min + max) / 2)`, halves rounded up.
    #[inline]
    pub const fn neutral(&self) -> i32 {
        (self.min + self.max + 1).div_euclid(2)
    }

    #[inline]
    pub const fn window_min(&self) -> i32 {
        self.neutral() - NEUTRAL_HALF_WINDOW
    }

    #[inline]
    pub const fn window_max(&self) -> i32 {
        self.neutral() + NEUTRAL_HALF_WINDOW
    }

    /// True if `value` lies inside the inclusive neutral window.
    #[inline]
    pub const fn in_window(&self, value: i32) -> bool {
        value >= self.window_min() && value <= self.window_max()
    }

    /// Translate both bounds by `delta`. Not clamped.
    #[inline]
    pub fn shift(&mut self, delta: i32) {
        self.min += delta;
        self.max += delta;
    }
}

impl Default for AxisRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub type RangeTable = [AxisRange; AXIS_COUNT];

// ─── Neutral offset ─────────────────────────────────────────────────

/// Global neutral offset in [0, 1023].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeutralOffset(u16);

impl NeutralOffset {
    pub const DEFAULT: Self = Self(DEFAULT_NEUTRAL_OFFSET as u16);

    /// Clamp into [0, 1023].
    pub fn clamped(value: i32) -> Self {
        Self(value.clamp(CONFIG_MIN, CONFIG_MAX) as u16)
    }

    /// `None` if `value` is outside [0, 1023].
    pub fn checked(value: u16) -> Option<Self> {
        (i32::from(value) <= CONFIG_MAX).then_some(Self(value))
    }

    #[inline]
    pub const fn get(self) -> i32 {
        self.0 as i32
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Signed change from `previous` to `self`.
    #[inline]
    pub const fn delta_from(self, previous: Self) -> i32 {
        self.get() - previous.get()
    }

    /// Shift from the default offset, used for display coordinates.
    #[inline]
    pub const fn display_shift(self) -> i32 {
        self.get() - DEFAULT_NEUTRAL_OFFSET
    }

    /// Global neutral window `offset ± 30`.
    #[inline]
    pub const fn window(self) -> (i32, i32) {
        (
            self.get() - NEUTRAL_HALF_WINDOW,
            self.get() + NEUTRAL_HALF_WINDOW,
        )
    }

    #[inline]
    pub const fn in_window(self, value: i32) -> bool {
        let (lo, hi) = self.window();
        value >= lo && value <= hi
    }
}

impl Default for NeutralOffset {
    fn default() -> Self {
        Self::DEFAULT
    }
}
