//! Collaborator traits for the hardware around the control core.
//!
//! The controller never talks to a bus directly. A board implementation
//! provides raw axis samples, presence probes, operator inputs, the decoded
//! gamepad snapshot, and accepts duty/digital writes. [`LoopbackBoard`] is a
//! scriptable in-memory board used by the binary when no hardware is attached
//! and by the tests.

use axon_common::consts::{AXIS_COUNT, RAW_DEFAULT_MID};
use axon_common::control_unit::error::MissingUnits;

use crate::safety::display::Indicator;

/// Raw samples of all axes, in channel order.
pub type RawAxes = [i16; AXIS_COUNT];

/// Number of PWM driver channels (8 duty + 8 digital).
pub const DRIVER_CHANNELS: usize = 16;

// ─── Gamepad snapshot ───────────────────────────────────────────────

/// Button bits in [`GamepadSnapshot::buttons`].
pub mod buttons {
    pub const R1_MIN: u16 = 0x0001;
    pub const R1_MAX: u16 = 0x0002;
    pub const R2_MIN: u16 = 0x0004;
    pub const R2_MAX: u16 = 0x0008;
    pub const SHOULDER_R: u16 = 0x0010;
    pub const SHOULDER_L: u16 = 0x0020;
    /// Both shoulder buttons: the mode-override combo.
    pub const OVERRIDE_COMBO: u16 = SHOULDER_R | SHOULDER_L;
}

/// Bits in [`GamepadSnapshot::misc`].
pub mod misc {
    pub const SYSTEM: u8 = 0x01;
    pub const START: u8 = 0x04;
}

/// Bits in [`GamepadSnapshot::dpad`].
pub mod dpad {
    pub const UP: u8 = 0x01;
    pub const DOWN: u8 = 0x02;
}

/// Decoded state of the connected controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GamepadSnapshot {
    /// Left stick, [-512, 512].
    pub lx: i32,
    pub ly: i32,
    /// Right stick, [-512, 512].
    pub rx: i32,
    pub ry: i32,
    /// Analog triggers, [0, 1023].
    pub throttle: i32,
    pub brake: i32,
    pub dpad: u8,
    pub buttons: u16,
    pub misc: u8,
}

impl GamepadSnapshot {
    #[inline]
    pub const fn holds(&self, mask: u16) -> bool {
        self.buttons & mask == mask
    }

    #[inline]
    pub const fn system_pressed(&self) -> bool {
        self.misc & misc::SYSTEM != 0
    }

    #[inline]
    pub const fn start_pressed(&self) -> bool {
        self.misc & misc::START != 0
    }
}

// ─── Collaborator traits ────────────────────────────────────────────

pub trait AxisSource {
    /// Last converted value of every axis. Never blocks on conversion.
    fn read_raw_axes(&mut self) -> RawAxes;
}

pub trait ActuatorSink {
    /// Duty fraction in [0, 1] on PWM channel 0..8.
    fn write_duty(&mut self, channel: u8, duty: f32);
    /// Full on/off on digital channel 8..16.
    fn write_digital(&mut self, channel: u8, active: bool);
    /// Actuator enable line.
    fn set_enable(&mut self, asserted: bool);
}

pub trait PresenceProbe {
    fn probe(&mut self) -> MissingUnits;
}

pub trait OperatorPanel {
    /// Calibration push button.
    fn cal_button(&mut self) -> bool;
    /// Physical mode selector: true = wired.
    fn wired_selected(&mut self) -> bool;
    fn show_indicator(&mut self, _indicator: Indicator) {}
}

pub trait GamepadSource {
    /// `None` while no controller is connected.
    fn snapshot(&mut self) -> Option<GamepadSnapshot>;
}

/// Everything the controller needs from the hardware.
pub trait Board: AxisSource + ActuatorSink + PresenceProbe + OperatorPanel + GamepadSource {}

impl<T> Board for T where
    T: AxisSource + ActuatorSink + PresenceProbe + OperatorPanel + GamepadSource
{
}

// ─── Loopback board ─────────────────────────────────────────────────

/// In-memory board: inputs are plain fields, outputs are recorded.
#[derive(Debug, Clone)]
pub struct LoopbackBoard {
    pub raw: RawAxes,
    pub missing: MissingUnits,
    pub cal_button: bool,
    pub wired: bool,
    pub pad: Option<GamepadSnapshot>,

    pub duty: [f32; AXIS_COUNT],
    pub digital: [bool; DRIVER_CHANNELS],
    pub enable: bool,
    pub indicator: Indicator,
    /// Number of duty/digital writes received.
    pub writes: u64,
}

impl Default for LoopbackBoard {
    fn default() -> Self {
        Self {
            raw: [RAW_DEFAULT_MID; AXIS_COUNT],
            missing: MissingUnits::empty(),
            cal_button: false,
            wired: true,
            pad: None,
            duty: [0.5; AXIS_COUNT],
            digital: [false; DRIVER_CHANNELS],
            enable: false,
            indicator: Indicator::OFF,
            writes: 0,
        }
    }
}

impl LoopbackBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any digital "axis active" channel on.
    pub fn any_active(&self) -> bool {
        self.digital[AXIS_COUNT..].iter().any(|&d| d)
    }
}

impl AxisSource for LoopbackBoard {
    fn read_raw_axes(&mut self) -> RawAxes {
        self.raw
    }
}

impl ActuatorSink for LoopbackBoard {
    fn write_duty(&mut self, channel: u8, duty: f32) {
        if let Some(slot) = self.duty.get_mut(usize::from(channel)) {
            *slot = duty;
            self.writes += 1;
        }
    }

    fn write_digital(&mut self, channel: u8, active: bool) {
        if let Some(slot) = self.digital.get_mut(usize::from(channel)) {
            *slot = active;
            self.writes += 1;
        }
    }

    fn set_enable(&mut self, asserted: bool) {
        self.enable = asserted;
    }
}

impl PresenceProbe for LoopbackBoard {
    fn probe(&mut self) -> MissingUnits {
        self.missing
    }
}

impl OperatorPanel for LoopbackBoard {
    fn cal_button(&mut self) -> bool {
        self.cal_button
    }

    fn wired_selected(&mut self) -> bool {
        self.wired
    }

    fn show_indicator(&mut self, indicator: Indicator) {
        self.indicator = indicator;
    }
}

impl GamepadSource for LoopbackBoard {
    fn snapshot(&mut self) -> Option<GamepadSnapshot> {
        self.pad
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
