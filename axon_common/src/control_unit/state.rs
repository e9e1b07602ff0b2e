//! State enums for the control unit.
//!
//! All enums use `#[repr(u8)]` so they can travel as single bytes on the
//! status feed and in persisted diagnostics.

use serde::{Deserialize, Serialize};

// ─── Calibration ────────────────────────────────────────────────────

/// Phase of the axis calibration sequence.
///
/// One process-wide instance, owned by the calibration state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CalibrationPhase {
    /// Not calibrating. Outputs follow normal arbitration.
    #[default]
    Idle = 0,
    /// Averaging raw samples to learn the neutral position.
    NeutralInit = 1,
    /// Waiting for every axis to hold still around its provisional mid.
    NeutralValidate = 2,
    /// Neutral confirmed; short visual hold before extremes capture.
    NeutralDone = 3,
    /// Capturing per-axis minimum and maximum with short presses.
    Extremes = 4,
    /// Calibration persisted; waiting for all axes to return to neutral.
    Finish = 5,
}

impl CalibrationPhase {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::NeutralInit),
            2 => Some(Self::NeutralValidate),
            3 => Some(Self::NeutralDone),
            4 => Some(Self::Extremes),
            5 => Some(Self::Finish),
            _ => None,
        }
    }
}

// ─── Control source ─────────────────────────────────────────────────

/// Which operator device drives the actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ControlSource {
    /// 8-axis analog joystick through the two ADC units.
    #[default]
    Wired = 0,
    /// Bluetooth gamepad snapshot.
    Pad = 1,
}

impl ControlSource {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Wired),
            1 => Some(Self::Pad),
            _ => None,
        }
    }
}

// ─── Faults ─────────────────────────────────────────────────────────

/// Single active fault code.
///
/// The discriminant is the blink count shown on the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum FaultCode {
    #[default]
    None = 0,
    /// Right-hand ADC unit not responding.
    AdsRight = 2,
    /// Left-hand ADC unit not responding.
    AdsLeft = 3,
    /// PWM driver not responding.
    Pca = 4,
    /// Two or more units missing.
    I2cGeneral = 5,
    /// Wired axes did not settle in neutral after entering wired mode.
    NeutralTimeout = 7,
    /// Pad mode selected with no controller connected.
    NoGamepad = 101,
}

impl FaultCode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            2 => Some(Self::AdsRight),
            3 => Some(Self::AdsLeft),
            4 => Some(Self::Pca),
            5 => Some(Self::I2cGeneral),
            7 => Some(Self::NeutralTimeout),
            101 => Some(Self::NoGamepad),
            _ => None,
        }
    }

    /// Blink count of the code.
    #[inline]
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Codes derived from hardware presence.
    #[inline]
    pub const fn is_hardware(self) -> bool {
        matches!(
            self,
            Self::AdsRight | Self::AdsLeft | Self::Pca | Self::I2cGeneral
        )
    }

    #[inline]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }
}
