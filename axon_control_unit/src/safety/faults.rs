//! Fault monitor: hardware presence polling and fault-code resolution.
//!
//! Presence is probed every `presence_poll_ms` (and once at boot), never
//! every cycle, so a single bus glitch does not flap the fault code.
//!
//! Priority: hardware presence code > `NeutralTimeout` > `NoGamepad`.
//! A transition is reported only when the resolved code changes.

use axon_common::control_unit::config::{ControlUnitConfig, FaultDisplayConfig};
use axon_common::control_unit::error::MissingUnits;
use axon_common::control_unit::state::FaultCode;
use bitflags::bitflags;
use serde::Serialize;
use tracing::{info, warn};

use crate::hal::PresenceProbe;
use crate::safety::display::{FaultDisplay, Indicator};
use crate::timer::Timer;

// ─── Portals ────────────────────────────────────────────────────────

bitflags! {
    /// Remote-configuration transports requested open.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct Portals: u8 {
        /// General configuration / diagnostics.
        const CONFIG      = 0x01;
        /// Calibration display.
        const CALIBRATION = 0x02;
        /// Range configuration.
        const RANGES      = 0x04;
    }
}

impl Portals {
    /// Transports implied by the current state.
    ///
    /// Any fault opens the config transport. A neutral timeout or a running
    /// calibration opens the calibration display.
    pub fn required(fault: FaultCode, calibrating: bool, ranges_requested: bool) -> Self {
        let mut p = Self::empty();
        p.set(Self::CONFIG, fault.is_active());
        p.set(
            Self::CALIBRATION,
            calibrating || fault == FaultCode::NeutralTimeout,
        );
        p.set(Self::RANGES, ranges_requested);
        p
    }
}

// ─── Monitor ────────────────────────────────────────────────────────

/// Resolved fault code changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultTransition {
    pub from: FaultCode,
    pub to: FaultCode,
}

#[derive(Debug, Clone)]
pub struct FaultMonitor {
    poll_ms: u64,
    polled: Timer,
    missing: MissingUnits,
    neutral_timeout: bool,
    no_gamepad: bool,
    code: FaultCode,
    display: FaultDisplay,
}

impl FaultMonitor {
    pub fn new(poll_ms: u64, display: FaultDisplayConfig) -> Self {
        Self {
            poll_ms,
            polled: Timer::new(),
            missing: MissingUnits::empty(),
            neutral_timeout: false,
            no_gamepad: false,
            code: FaultCode::None,
            display: FaultDisplay::new(display),
        }
    }

    pub fn from_config(cfg: &ControlUnitConfig) -> Self {
        Self::new(cfg.timing.presence_poll_ms, cfg.fault_display.clone())
    }

    #[inline]
    pub const fn code(&self) -> FaultCode {
        self.code
    }

    #[inline]
    pub const fn missing(&self) -> MissingUnits {
        self.missing
    }

    #[inline]
    pub fn pwm_present(&self) -> bool {
        !self.missing.contains(MissingUnits::PWM)
    }

    #[inline]
    pub const fn neutral_timeout(&self) -> bool {
        self.neutral_timeout
    }

    /// Probe presence if the poll interval has elapsed. Returns true when a
    /// probe ran.
    pub fn poll<P: PresenceProbe + ?Sized>(&mut self, now: u64, probe: &mut P) -> bool {
        if self.polled.is_armed() && !self.polled.expired(now, self.poll_ms) {
            return false;
        }
        self.polled.arm(now);
        let missing = probe.probe();
        if missing != self.missing {
            if missing.is_empty() {
                info!("All hardware units present");
            } else {
                warn!(?missing, "Hardware units missing");
            }
            self.missing = missing;
        }
        true
    }

    pub fn set_neutral_timeout(&mut self, active: bool) {
        self.neutral_timeout = active;
    }

    pub fn set_no_gamepad(&mut self, active: bool) {
        self.no_gamepad = active;
    }

    /// Code implied by the current inputs.
    pub fn derive(&self) -> FaultCode {
        if !self.missing.is_empty() {
            self.missing.fault_code()
        } else if self.neutral_timeout {
            FaultCode::NeutralTimeout
        } else if self.no_gamepad {
            FaultCode::NoGamepad
        } else {
            FaultCode::None
        }
    }

    /// Re-resolve the code. `Some` only when it changed.
    pub fn resolve(&mut self, now: u64) -> Option<FaultTransition> {
        let to = self.derive();
        if to == self.code {
            return None;
        }
        let from = self.code;
        self.code = to;
        self.display.set_code(to, now);
        if to.is_active() {
            warn!(?from, ?to, level = to.level(), "Fault raised");
        } else {
            info!(?from, "Fault cleared");
        }
        Some(FaultTransition { from, to })
    }

    /// Lamp state for the active code.
    pub fn indicator(&mut self, now: u64) -> Indicator {
        self.display.service(now, self.missing)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
