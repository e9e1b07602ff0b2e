//! Fault indication sequencer.
//!
//! A fault code of level N blinks red N times (`blink_on_ms` lit,
//! `blink_off_ms` dark), then pauses for `pause_ms`, forever.
//!
//! `I2cGeneral` first shows its own count once. After each pause it shows
//! the next missing unit's code, round-robin, so an operator watching only
//! the lamp can enumerate every failed unit. `NoGamepad` alternates red and
//! green every `blink_on_ms` instead of counting.

use axon_common::control_unit::config::FaultDisplayConfig;
use axon_common::control_unit::error::MissingUnits;
use axon_common::control_unit::state::FaultCode;
use serde::Serialize;

/// Two-colour status lamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Indicator {
    pub red: bool,
    pub green: bool,
}

impl Indicator {
    pub const OFF: Self = Self {
        red: false,
        green: false,
    };
    pub const RED: Self = Self {
        red: true,
        green: false,
    };
    pub const GREEN: Self = Self {
        red: false,
        green: true,
    };
    /// Calibration in progress.
    pub const BOTH: Self = Self {
        red: true,
        green: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Lit { blink: u8 },
    Dark { blink: u8 },
    Pause,
}

#[derive(Debug, Clone)]
pub struct FaultDisplay {
    cfg: FaultDisplayConfig,
    code: FaultCode,
    /// Code whose count is currently shown.
    shown: FaultCode,
    step: Step,
    step_since: u64,
    next_unit: usize,
}

impl FaultDisplay {
    pub fn new(cfg: FaultDisplayConfig) -> Self {
        Self {
            cfg,
            code: FaultCode::None,
            shown: FaultCode::None,
            step: Step::Pause,
            step_since: 0,
            next_unit: 0,
        }
    }

    /// Restart the sequence for a new code. Same code is a no-op.
    pub fn set_code(&mut self, code: FaultCode, now: u64) {
        if code == self.code {
            return;
        }
        self.code = code;
        self.shown = code;
        self.next_unit = 0;
        self.step = Step::Lit { blink: 1 };
        self.step_since = now;
    }

    /// Lamp state at `now`.
    pub fn service(&mut self, now: u64, missing: MissingUnits) -> Indicator {
        match self.code {
            FaultCode::None => Indicator::GREEN,
            FaultCode::NoGamepad => {
                let phase = now.saturating_sub(self.step_since) / self.cfg.blink_on_ms.max(1);
                if phase % 2 == 0 {
                    Indicator::RED
                } else {
                    Indicator::GREEN
                }
            }
            _ => {
                // catch up after a long gap between calls
                for _ in 0..16 {
                    if !self.advance(now, missing) {
                        break;
                    }
                }
                match self.step {
                    Step::Lit { .. } => Indicator::RED,
                    Step::Dark { .. } | Step::Pause => Indicator::OFF,
                }
            }
        }
    }

    /// Move one step forward if the current one is over.
    fn advance(&mut self, now: u64, missing: MissingUnits) -> bool {
        let elapsed = now.saturating_sub(self.step_since);
        let level = self.shown.level().max(1);
        let (next, duration) = match self.step {
            Step::Lit { blink } => (Step::Dark { blink }, self.cfg.blink_on_ms),
            Step::Dark { blink } if blink >= level => (Step::Pause, self.cfg.blink_off_ms),
            Step::Dark { blink } => (Step::Lit { blink: blink + 1 }, self.cfg.blink_off_ms),
            Step::Pause => (Step::Lit { blink: 1 }, self.cfg.pause_ms),
        };
        if elapsed < duration {
            return false;
        }
        if self.step == Step::Pause {
            self.shown = self.next_shown(missing);
        }
        self.step = next;
        self.step_since += duration;
        true
    }

    fn next_shown(&mut self, missing: MissingUnits) -> FaultCode {
        if self.code != FaultCode::I2cGeneral {
            return self.code;
        }
        let units = missing.unit_codes();
        match units.get(self.next_unit % units.len().max(1)) {
            Some(&unit) => {
                self.next_unit = self.next_unit.wrapping_add(1);
                unit
            }
            None => self.code,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
