//! System-wide constants for the AXON workspace.
//!
//! Single source of truth for numeric limits, coordinate bands and default
//! timings. Imported by all crates.

use static_assertions::const_assert;

// ─── Axes ───────────────────────────────────────────────────────────

/// Number of operator axes (and actuator channel pairs).
pub const AXIS_COUNT: usize = 8;

/// Short axis labels, in channel order.
pub const AXIS_NAMES: [&str; AXIS_COUNT] = ["X", "Y", "Z", "LX", "LY", "LZ", "R1", "R2"];

// ─── Raw sensor band ────────────────────────────────────────────────

/// Lowest raw ADC reading accepted.
pub const RAW_MIN: i16 = 0;

/// Highest raw ADC reading accepted.
pub const RAW_MAX: i16 = 32767;

/// Factory-default neutral raw reading.
pub const RAW_DEFAULT_MID: i16 = 16384;

// ─── Canonical band ─────────────────────────────────────────────────

/// Lower edge of the canonical valid band.
pub const CANONICAL_MIN: i32 = 255;

/// Canonical neutral. The learned raw neutral always maps here.
pub const CANONICAL_NEUTRAL: i32 = 512;

/// Upper edge of the canonical valid band.
pub const CANONICAL_MAX: i32 = 768;

/// Lowest value an operator may configure (ranges, offset).
pub const CONFIG_MIN: i32 = 0;

/// Highest value an operator may configure (ranges, offset).
pub const CONFIG_MAX: i32 = 1023;

/// Half-width of every neutral window.
pub const NEUTRAL_HALF_WINDOW: i32 = 30;

/// Default global neutral offset.
pub const DEFAULT_NEUTRAL_OFFSET: i32 = 512;

// ─── Duty band ──────────────────────────────────────────────────────

/// Duty fraction at the low extreme of an axis.
pub const DUTY_MIN: f32 = 0.25;

/// Duty fraction at neutral.
pub const DUTY_MID: f32 = 0.50;

/// Duty fraction at the high extreme of an axis.
pub const DUTY_MAX: f32 = 0.75;

/// Full-scale PWM count of the actuator driver (12-bit).
pub const PWM_FULL_SCALE: u16 = 4095;

/// Digital "axis active" channel for each PWM channel.
pub const PWM_TO_DIGITAL: [u8; AXIS_COUNT] = [9, 8, 10, 11, 12, 13, 14, 15];

// ─── Calibration defaults ───────────────────────────────────────────

/// Raw span on each side of a freshly averaged neutral.
pub const PROVISIONAL_SPAN_DEFAULT: i16 = 8000;

/// Canonical deviation that counts as deliberate axis motion.
pub const MOVE_THRESHOLD_DEFAULT: i32 = 20;

// ─── Timing defaults [ms] ───────────────────────────────────────────

pub const CYCLE_MS_DEFAULT: u64 = 20;
pub const PRESENCE_POLL_MS_DEFAULT: u64 = 2500;
pub const PRESENCE_POLL_MS_MIN: u64 = 2000;
pub const NEUTRAL_WAIT_TIMEOUT_MS_DEFAULT: u64 = 10_000;
pub const MODE_CHANGE_BLOCK_MS_DEFAULT: u64 = 500;

pub const CAL_ENTRY_HOLD_MS_DEFAULT: u64 = 5000;
pub const SHORT_PRESS_MIN_MS_DEFAULT: u64 = 50;
pub const SHORT_PRESS_MAX_MS_DEFAULT: u64 = 800;
pub const NEUTRAL_AVERAGE_MS_DEFAULT: u64 = 1000;
pub const NEUTRAL_VALIDATE_MS_DEFAULT: u64 = 800;
pub const NEUTRAL_CONFIRM_MS_DEFAULT: u64 = 2000;

pub const ARM_HOLD_MS_DEFAULT: u64 = 5000;
pub const DISARM_MIN_MS_DEFAULT: u64 = 50;
pub const OVERRIDE_HOLD_MS_DEFAULT: u64 = 10_000;

pub const FAULT_BLINK_ON_MS_DEFAULT: u64 = 1000;
pub const FAULT_BLINK_OFF_MS_DEFAULT: u64 = 1000;
pub const FAULT_PAUSE_MS_DEFAULT: u64 = 4000;

/// Short presses needed to request the range portal.
pub const RANGE_PORTAL_PRESSES: u8 = 5;

/// Window in which the range-portal presses must land.
pub const RANGE_PORTAL_WINDOW_MS: u64 = 6000;

/// Default record store directory.
pub const DEFAULT_STORE_DIR: &str = "/var/lib/axon";

const_assert!(CANONICAL_MIN < CANONICAL_NEUTRAL && CANONICAL_NEUTRAL < CANONICAL_MAX);
const_assert!(CONFIG_MIN <= CANONICAL_MIN && CANONICAL_MAX <= CONFIG_MAX);
const_assert!(RAW_MIN < RAW_DEFAULT_MID && RAW_DEFAULT_MID < RAW_MAX);
const_assert!(PRESENCE_POLL_MS_DEFAULT >= PRESENCE_POLL_MS_MIN);
