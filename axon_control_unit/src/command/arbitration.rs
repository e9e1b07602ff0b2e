//! Control-source arbitration: wired vs. pad, arming, mode override.
//!
//! Output may leave neutral only when
//! `(Wired && neutral verified && no fault) || (Pad && armed && pad connected)`.
//! [`ModeArbiter::output_enabled`] is the single place that rule is decided.
//!
//! - **Wired**: entering wired mode starts a neutral check. The check passes
//!   once every axis sits in its neutral window and times out after
//!   `neutral_wait_timeout_ms`, which raises `NeutralTimeout`.
//! - **Pad**: a long hold of the system button arms if every mapped pad value
//!   is neutral at the hold mark (or, after a refusal, at release). A short
//!   press disarms. Disconnect disarms.
//! - **Override**: in wired mode, holding both shoulder buttons on a connected
//!   pad migrates to pad mode, unless the PWM driver is absent or the fault is
//!   anything other than a single missing ADC.

use axon_common::control_unit::axis::RangeTable;
use axon_common::control_unit::config::ControlUnitConfig;
use axon_common::control_unit::error::MissingUnits;
use axon_common::control_unit::state::{ControlSource, FaultCode};
use tracing::{debug, info, warn};

use crate::command::gesture::{Gesture, GestureDetector, PressBounds};
use crate::command::pad::all_in_window;
use crate::control::mapper::CanonicalAxes;
use crate::hal::{GamepadSnapshot, buttons};
use crate::timer::Timer;

// ─── Types ──────────────────────────────────────────────────────────

/// Arbitration timing [ms].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbiterTiming {
    pub arm_hold_ms: u64,
    pub disarm_min_ms: u64,
    pub override_hold_ms: u64,
    pub neutral_wait_timeout_ms: u64,
    pub mode_change_block_ms: u64,
}

impl ArbiterTiming {
    pub fn from_config(cfg: &ControlUnitConfig) -> Self {
        Self {
            arm_hold_ms: cfg.arming.arm_hold_ms,
            disarm_min_ms: cfg.arming.disarm_min_ms,
            override_hold_ms: cfg.arming.override_hold_ms,
            neutral_wait_timeout_ms: cfg.timing.neutral_wait_timeout_ms,
            mode_change_block_ms: cfg.timing.mode_change_block_ms,
        }
    }
}

impl Default for ArbiterTiming {
    fn default() -> Self {
        Self::from_config(&ControlUnitConfig::default())
    }
}

/// Wired-mode neutral verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeutralCheck {
    /// Not started (pad mode, hardware fault, or calibration running).
    Idle,
    /// Waiting for every axis to come to neutral.
    Waiting { since: u64 },
    Verified,
    /// Timed out; still watching for the axes to be recentred.
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisarmReason {
    Gesture,
    Disconnect,
    ModeChange,
    Calibration,
    Fault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterEvent {
    ModeChanged(ControlSource),
    Armed,
    /// Arming gesture completed with an axis outside its neutral window.
    ArmRefused,
    Disarmed(DisarmReason),
    OverrideGranted,
    /// Override combo held but the fault state forbids migration.
    OverrideDenied(FaultCode),
    NeutralVerified,
    NeutralTimeout,
    LxInversion(bool),
}

pub type ArbiterEvents = heapless::Vec<ArbiterEvent, 8>;

/// Per-cycle inputs.
#[derive(Debug, Clone, Copy)]
pub struct ArbiterInputs<'a> {
    pub now: u64,
    pub wired_selected: bool,
    pub pad: Option<&'a GamepadSnapshot>,
    /// Pad values mapped with the current LX inversion; `None` when no pad.
    pub pad_values: Option<&'a CanonicalAxes>,
    pub wired_values: &'a CanonicalAxes,
    pub ranges: &'a RangeTable,
    pub fault: FaultCode,
    pub missing: MissingUnits,
    pub calibrating: bool,
}

/// Migration to pad mode is allowed with a healthy PWM driver and at most
/// one missing ADC.
pub fn override_permitted(fault: FaultCode, missing: MissingUnits) -> bool {
    if missing.contains(MissingUnits::PWM) {
        return false;
    }
    match fault {
        FaultCode::None => true,
        f if f.is_hardware() => missing.is_single_ads_loss(),
        _ => false,
    }
}

// ─── Arbiter ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ModeArbiter {
    timing: ArbiterTiming,
    source: ControlSource,
    switch_wired: bool,
    soft_override: bool,
    armed: bool,
    neutral: NeutralCheck,
    block: Timer,
    system_button: GestureDetector,
    combo: GestureDetector,
    arm_retry: bool,
    invert_lx: bool,
    start_was_pressed: bool,
    last_fault: FaultCode,
}

impl ModeArbiter {
    pub fn new(timing: ArbiterTiming, wired_selected: bool) -> Self {
        let arm_hold = timing.arm_hold_ms;
        Self {
            timing,
            source: if wired_selected {
                ControlSource::Wired
            } else {
                ControlSource::Pad
            },
            switch_wired: wired_selected,
            soft_override: false,
            armed: false,
            neutral: NeutralCheck::Idle,
            block: Timer::new(),
            system_button: GestureDetector::new(PressBounds::new(
                timing.disarm_min_ms,
                arm_hold.saturating_sub(1),
                arm_hold,
            )),
            combo: GestureDetector::new(PressBounds::new(0, 0, timing.override_hold_ms)),
            arm_retry: false,
            invert_lx: false,
            start_was_pressed: false,
            last_fault: FaultCode::None,
        }
    }

    #[inline]
    pub const fn source(&self) -> ControlSource {
        self.source
    }

    #[inline]
    pub const fn armed(&self) -> bool {
        self.armed
    }

    #[inline]
    pub const fn neutral_check(&self) -> NeutralCheck {
        self.neutral
    }

    #[inline]
    pub const fn neutral_verified(&self) -> bool {
        matches!(self.neutral, NeutralCheck::Verified)
    }

    #[inline]
    pub const fn soft_override(&self) -> bool {
        self.soft_override
    }

    #[inline]
    pub const fn invert_lx(&self) -> bool {
        self.invert_lx
    }

    /// Inside the post-mode-change settle window.
    #[inline]
    pub fn blocked(&self, now: u64) -> bool {
        self.block.running(now, self.timing.mode_change_block_ms)
    }

    /// Whether live values may reach the actuators this cycle.
    pub fn output_enabled(&self, now: u64, fault: FaultCode, pad_connected: bool) -> bool {
        if self.blocked(now) {
            return false;
        }
        match self.source {
            ControlSource::Wired => self.neutral_verified() && fault == FaultCode::None,
            ControlSource::Pad => self.armed && pad_connected,
        }
    }

    /// Level of the physical actuator enable line outside calibration.
    pub const fn enable_line(&self) -> bool {
        match self.source {
            ControlSource::Wired => self.neutral_verified(),
            ControlSource::Pad => self.armed,
        }
    }

    /// Advance one cycle.
    pub fn service(&mut self, inp: &ArbiterInputs<'_>) -> ArbiterEvents {
        let mut ev = ArbiterEvents::new();
        let now = inp.now;

        let fault_onset = inp.fault != self.last_fault && inp.fault.is_hardware();
        self.last_fault = inp.fault;

        if !self.blocked(now) {
            self.follow_switch(inp.wired_selected, now, &mut ev);
        }

        if inp.calibrating {
            self.disarm(DisarmReason::Calibration, &mut ev);
            self.neutral = NeutralCheck::Idle;
            self.system_button.reset();
            self.combo.reset();
            self.arm_retry = false;
            return ev;
        }

        if fault_onset {
            self.disarm(DisarmReason::Fault, &mut ev);
        }

        if self.blocked(now) {
            return ev;
        }

        match self.source {
            ControlSource::Wired => {
                self.system_button.reset();
                self.service_neutral_check(inp, &mut ev);
                self.service_override(inp, &mut ev);
            }
            ControlSource::Pad => {
                self.combo.reset();
                self.service_pad(inp, &mut ev);
            }
        }
        ev
    }

    /// Restart neutral verification (after calibration or a mode change).
    pub fn restart_neutral_check(&mut self) {
        self.neutral = NeutralCheck::Idle;
    }

    // ── Mode selection ──

    fn follow_switch(&mut self, wired_selected: bool, now: u64, ev: &mut ArbiterEvents) {
        if wired_selected != self.switch_wired {
            self.switch_wired = wired_selected;
            if wired_selected && self.soft_override {
                self.soft_override = false;
                info!("Mode selector back to wired, pad override cancelled");
            }
        }
        let effective = if self.switch_wired && !self.soft_override {
            ControlSource::Wired
        } else {
            ControlSource::Pad
        };
        if effective != self.source {
            self.change_mode(effective, now, ev);
        }
    }

    fn change_mode(&mut self, to: ControlSource, now: u64, ev: &mut ArbiterEvents) {
        self.disarm(DisarmReason::ModeChange, ev);
        self.source = to;
        self.neutral = NeutralCheck::Idle;
        self.block.arm(now);
        self.system_button.reset();
        self.combo.reset();
        self.arm_retry = false;
        info!(source = ?to, "Control source changed");
        let _ = ev.push(ArbiterEvent::ModeChanged(to));
    }

    fn disarm(&mut self, reason: DisarmReason, ev: &mut ArbiterEvents) {
        if self.armed {
            self.armed = false;
            info!(?reason, "Pad disarmed");
            let _ = ev.push(ArbiterEvent::Disarmed(reason));
        }
    }

    // ── Wired ──

    fn service_neutral_check(&mut self, inp: &ArbiterInputs<'_>, ev: &mut ArbiterEvents) {
        let neutral = all_in_window(inp.wired_values, inp.ranges);
        self.neutral = match self.neutral {
            NeutralCheck::Idle if !inp.fault.is_hardware() && neutral => {
                info!("Wired neutral verified");
                let _ = ev.push(ArbiterEvent::NeutralVerified);
                NeutralCheck::Verified
            }
            NeutralCheck::Idle if !inp.fault.is_hardware() => {
                debug!("Waiting for wired axes to reach neutral");
                NeutralCheck::Waiting { since: inp.now }
            }
            NeutralCheck::Waiting { .. } if inp.fault.is_hardware() => NeutralCheck::Idle,
            NeutralCheck::Waiting { .. } | NeutralCheck::TimedOut if neutral => {
                info!("Wired neutral verified");
                let _ = ev.push(ArbiterEvent::NeutralVerified);
                NeutralCheck::Verified
            }
            NeutralCheck::Waiting { since }
                if inp.now.saturating_sub(since) >= self.timing.neutral_wait_timeout_ms =>
            {
                warn!(
                    timeout_ms = self.timing.neutral_wait_timeout_ms,
                    "Wired axes not neutral in time"
                );
                let _ = ev.push(ArbiterEvent::NeutralTimeout);
                NeutralCheck::TimedOut
            }
            other => other,
        };
    }

    fn service_override(&mut self, inp: &ArbiterInputs<'_>, ev: &mut ArbiterEvents) {
        let eligible = !self.soft_override && !self.armed && inp.pad.is_some();
        let held = eligible
            && inp
                .pad
                .is_some_and(|p| p.holds(buttons::OVERRIDE_COMBO));

        match self.combo.update(held, inp.now) {
            Some(Gesture::Pressed) => debug!("Override combo held"),
            Some(Gesture::HoldReached) => {
                if override_permitted(inp.fault, inp.missing) {
                    info!("Override granted, switching to pad control");
                    self.soft_override = true;
                    let _ = ev.push(ArbiterEvent::OverrideGranted);
                    self.change_mode(ControlSource::Pad, inp.now, ev);
                } else {
                    warn!(fault = ?inp.fault, missing = ?inp.missing, "Override denied");
                    let _ = ev.push(ArbiterEvent::OverrideDenied(inp.fault));
                }
            }
            _ => {}
        }
    }

    // ── Pad ──

    fn service_pad(&mut self, inp: &ArbiterInputs<'_>, ev: &mut ArbiterEvents) {
        let Some(pad) = inp.pad else {
            self.disarm(DisarmReason::Disconnect, ev);
            self.system_button.reset();
            self.arm_retry = false;
            self.start_was_pressed = false;
            return;
        };

        let start = pad.start_pressed();
        if start && !self.start_was_pressed {
            if self.armed {
                debug!("LX inversion ignored while armed");
            } else {
                self.invert_lx = !self.invert_lx;
                info!(inverted = self.invert_lx, "LX inversion toggled");
                let _ = ev.push(ArbiterEvent::LxInversion(self.invert_lx));
            }
        }
        self.start_was_pressed = start;

        let neutral = inp
            .pad_values
            .is_some_and(|v| all_in_window(v, inp.ranges));

        match self.system_button.update(pad.system_pressed(), inp.now) {
            Some(Gesture::HoldReached) => {
                if self.armed {
                    self.disarm(DisarmReason::Gesture, ev);
                } else {
                    self.try_arm(neutral, ev);
                    self.arm_retry = !self.armed;
                }
            }
            Some(Gesture::LongRelease { .. }) => {
                if self.arm_retry && !self.armed {
                    self.try_arm(neutral, ev);
                }
                self.arm_retry = false;
            }
            Some(Gesture::ShortPress { held_ms }) => {
                debug!(held_ms, "System button short press");
                self.disarm(DisarmReason::Gesture, ev);
            }
            _ => {}
        }
    }

    fn try_arm(&mut self, neutral: bool, ev: &mut ArbiterEvents) {
        if neutral {
            self.armed = true;
            info!("Pad armed");
            let _ = ev.push(ArbiterEvent::Armed);
        } else {
            warn!("Arming refused: pad axes not neutral");
            let _ = ev.push(ArbiterEvent::ArmRefused);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
