//! Calibration state machine.
//!
//! Idle → NeutralInit → NeutralValidate → NeutralDone → Extremes → Finish → Idle
//!
//! - **NeutralInit**: averages every axis for `neutral_average_ms`. The mean
//!   becomes `mid_raw`; `min_raw`/`max_raw` get a provisional span around it.
//! - **NeutralValidate**: the sticks must stay still for a rolling
//!   `neutral_validate_ms` window. Any movement restarts the window.
//! - **NeutralDone**: a `neutral_confirm_ms` pause before capture starts.
//! - **Extremes**: each short press captures one bound of the axis moved
//!   furthest from its neutral. Below neutral sets `min_raw`, above sets
//!   `max_raw`. All 16 bounds captured → Finish.
//! - **Finish**: the table is sanitized and handed out for persistence.
//!   Returns to Idle once every axis, mapped through the new table, is back
//!   in the global neutral window.
//!
//! Motion is judged in factory mapping so it does not depend on the bounds
//! being learned.

use axon_common::consts::{AXIS_COUNT, RAW_MAX, RAW_MIN};
use axon_common::control_unit::axis::{AxisCalibration, CalibrationTable, NeutralOffset};
use axon_common::control_unit::config::CalibrationConfig;
use axon_common::control_unit::state::CalibrationPhase;
use serde::Serialize;

use crate::control::mapper::{map_all, map_factory};
use crate::hal::RawAxes;

const ALL_AXES: u8 = ((1u16 << AXIS_COUNT) - 1) as u8;

/// Which end of an axis was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Bound {
    Min,
    Max,
}

/// Result of a calibration event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    /// Event accepted; phase after handling.
    Ok(CalibrationPhase),
    /// A bound was captured.
    Captured { axis: usize, bound: Bound },
    /// Event not valid in the current phase, or no axis moved.
    Rejected(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationEvent {
    /// Operator entry gesture.
    Start { now: u64 },
    /// Periodic sample.
    Tick {
        now: u64,
        raw: RawAxes,
        offset: NeutralOffset,
    },
    /// Short press during extremes capture, with the sample at release.
    Capture { raw: RawAxes },
    /// Jump from extremes straight to finish.
    FinishRequested,
    /// Replace the whole table (remote import).
    Import(CalibrationTable),
    /// Leave calibration and restore the table in use before `Start`.
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    NeutralInit {
        started: u64,
        sum: [i64; AXIS_COUNT],
        samples: u32,
    },
    NeutralValidate {
        stable_since: u64,
    },
    NeutralDone {
        since: u64,
    },
    Extremes {
        have_min: u8,
        have_max: u8,
    },
    Finish,
}

impl Phase {
    const fn public(&self) -> CalibrationPhase {
        match self {
            Self::Idle => CalibrationPhase::Idle,
            Self::NeutralInit { .. } => CalibrationPhase::NeutralInit,
            Self::NeutralValidate { .. } => CalibrationPhase::NeutralValidate,
            Self::NeutralDone { .. } => CalibrationPhase::NeutralDone,
            Self::Extremes { .. } => CalibrationPhase::Extremes,
            Self::Finish => CalibrationPhase::Finish,
        }
    }
}

/// Axis with the largest deviation from its learned neutral, if that
/// deviation reaches `threshold` canonical counts.
pub fn detect_moved_axis(raw: &RawAxes, table: &CalibrationTable, threshold: i32) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for (axis, (&sample, cal)) in raw.iter().zip(table).enumerate() {
        let dev = (map_factory(sample) - map_factory(cal.mid_raw)).abs();
        if best.is_none_or(|(_, d)| dev > d) {
            best = Some((axis, dev));
        }
    }
    best.filter(|&(_, d)| d >= threshold).map(|(axis, _)| axis)
}

#[derive(Debug, Clone)]
pub struct CalibrationMachine {
    cfg: CalibrationConfig,
    phase: Phase,
    table: CalibrationTable,
    backup: CalibrationTable,
    pending_save: bool,
}

impl CalibrationMachine {
    pub fn new(cfg: CalibrationConfig, table: CalibrationTable) -> Self {
        let table = table.map(AxisCalibration::sanitized);
        Self {
            cfg,
            phase: Phase::Idle,
            table,
            backup: table,
            pending_save: false,
        }
    }

    #[inline]
    pub const fn phase(&self) -> CalibrationPhase {
        self.phase.public()
    }

    #[inline]
    pub const fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Table the mapper uses.
    #[inline]
    pub fn table(&self) -> &CalibrationTable {
        &self.table
    }

    /// Captured-bound masks `(min, max)`, bit N = axis N.
    pub const fn captured(&self) -> (u8, u8) {
        match self.phase {
            Phase::Extremes { have_min, have_max } => (have_min, have_max),
            Phase::Finish => (ALL_AXES, ALL_AXES),
            _ => (0, 0),
        }
    }

    /// Table waiting to be persisted, once.
    pub fn take_pending_save(&mut self) -> Option<CalibrationTable> {
        std::mem::take(&mut self.pending_save).then_some(self.table)
    }

    pub fn handle_event(&mut self, event: CalibrationEvent) -> TransitionResult {
        use CalibrationEvent::*;

        match (self.phase, event) {
            (Phase::Idle, Start { now }) => {
                self.backup = self.table;
                self.table = [AxisCalibration::FACTORY; AXIS_COUNT];
                self.phase = Phase::NeutralInit {
                    started: now,
                    sum: [0; AXIS_COUNT],
                    samples: 0,
                };
            }
            (_, Start { .. }) => return TransitionResult::Rejected("calibration already running"),

            (Phase::Idle, Import(table)) => {
                self.table = table.map(AxisCalibration::sanitized);
                self.pending_save = true;
            }
            (_, Import(_)) => return TransitionResult::Rejected("import only allowed when idle"),

            (Phase::Idle, Abort) => return TransitionResult::Rejected("calibration not running"),
            (_, Abort) => {
                self.table = self.backup;
                self.phase = Phase::Idle;
            }

            (Phase::Extremes { .. }, FinishRequested) => self.enter_finish(),
            (_, FinishRequested) => return TransitionResult::Rejected("not capturing extremes"),

            (Phase::Extremes { have_min, have_max }, Capture { raw }) => {
                return self.capture(&raw, have_min, have_max);
            }
            (_, Capture { .. }) => return TransitionResult::Rejected("not capturing extremes"),

            (_, Tick { now, raw, offset }) => self.tick(now, &raw, offset),
        }
        TransitionResult::Ok(self.phase())
    }

    fn tick(&mut self, now: u64, raw: &RawAxes, offset: NeutralOffset) {
        self.phase = match self.phase {
            Phase::NeutralInit {
                started,
                mut sum,
                samples,
            } => {
                for (acc, &r) in sum.iter_mut().zip(raw) {
                    *acc += i64::from(r);
                }
                let samples = samples + 1;
                if now.saturating_sub(started) >= self.cfg.neutral_average_ms {
                    self.learn_neutral(&sum, samples);
                    Phase::NeutralValidate { stable_since: now }
                } else {
                    Phase::NeutralInit {
                        started,
                        sum,
                        samples,
                    }
                }
            }
            Phase::NeutralValidate { stable_since } => {
                if detect_moved_axis(raw, &self.table, self.cfg.move_threshold).is_some() {
                    Phase::NeutralValidate { stable_since: now }
                } else if now.saturating_sub(stable_since) >= self.cfg.neutral_validate_ms {
                    Phase::NeutralDone { since: now }
                } else {
                    Phase::NeutralValidate { stable_since }
                }
            }
            Phase::NeutralDone { since }
                if now.saturating_sub(since) >= self.cfg.neutral_confirm_ms =>
            {
                Phase::Extremes {
                    have_min: 0,
                    have_max: 0,
                }
            }
            Phase::Finish => {
                let values = map_all(raw, &self.table);
                if values.iter().all(|&v| offset.in_window(v)) {
                    Phase::Idle
                } else {
                    Phase::Finish
                }
            }
            other => other,
        };
    }

    fn learn_neutral(&mut self, sum: &[i64; AXIS_COUNT], samples: u32) {
        let span = self.cfg.provisional_span;
        let n = i64::from(samples.max(1));
        for (cal, &total) in self.table.iter_mut().zip(sum) {
            let mid = (total / n).clamp(i64::from(RAW_MIN), i64::from(RAW_MAX)) as i16;
            *cal = AxisCalibration::new(
                mid.saturating_sub(span).max(RAW_MIN),
                mid,
                mid.saturating_add(span).min(RAW_MAX),
            );
        }
    }

    fn capture(&mut self, raw: &RawAxes, mut have_min: u8, mut have_max: u8) -> TransitionResult {
        let Some(axis) = detect_moved_axis(raw, &self.table, self.cfg.move_threshold) else {
            return TransitionResult::Rejected("no axis moved");
        };
        let sample = raw[axis];
        let cal = &mut self.table[axis];
        let bound = if map_factory(sample) < map_factory(cal.mid_raw) {
            cal.min_raw = sample;
            have_min |= 1 << axis;
            Bound::Min
        } else {
            cal.max_raw = sample;
            have_max |= 1 << axis;
            Bound::Max
        };

        if have_min == ALL_AXES && have_max == ALL_AXES {
            self.enter_finish();
        } else {
            self.phase = Phase::Extremes { have_min, have_max };
        }
        TransitionResult::Captured { axis, bound }
    }

    fn enter_finish(&mut self) {
        for cal in &mut self.table {
            cal.sanitize();
        }
        self.pending_save = true;
        self.phase = Phase::Finish;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
