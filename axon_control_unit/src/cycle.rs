//! Control cycle: read → arbitrate → write.
//!
//! [`Controller`] owns every state machine and is advanced by calling
//! [`Controller::service`] once per loop iteration with a monotonic
//! millisecond timestamp. One cycle:
//!
//! 1. Presence poll (on its own interval); a changed code resolves at once.
//! 2. Read raw axes, pad snapshot, mode selector, calibration button.
//! 3. Advance calibration and the calibration-button gestures.
//! 4. Advance mode arbitration; fold its outcome into the fault monitor.
//! 5. Resolve the fault code and the requested portals.
//! 6. Compute and write the output frame, the enable line and the lamp.
//!
//! Nothing here blocks and nothing here returns `Err`: every runtime
//! condition becomes a fault code, a refused gesture or a [`StatusEvent`].

use axon_common::consts::{
    AXIS_COUNT, AXIS_NAMES, CANONICAL_NEUTRAL, RANGE_PORTAL_PRESSES, RANGE_PORTAL_WINDOW_MS,
};
use axon_common::control_unit::config::ControlUnitConfig;
use axon_common::control_unit::state::{CalibrationPhase, ControlSource, FaultCode};
use axon_common::persist::{
    self, CalibrationRecord, OffsetRecord, RangeRecord, Record, RecordKind, RecordStore,
    StoreError,
};
use tracing::{debug, error, info, warn};

use crate::command::arbitration::{ArbiterEvent, ArbiterInputs, ArbiterTiming, ModeArbiter};
use crate::command::gesture::{Gesture, GestureDetector, PressBounds, PressCounter};
use crate::command::pad::map_pad;
use crate::control::mapper::{CanonicalAxes, map_all};
use crate::control::output::{NEUTRAL_FRAME, OutputFrame, compute_frame, write_frame};
use crate::control::range::RangeStore;
use crate::hal::{Board, GamepadSnapshot, RawAxes};
use crate::safety::display::Indicator;
use crate::safety::faults::{FaultMonitor, FaultTransition, Portals};
use crate::state::calibration::{Bound, CalibrationEvent, CalibrationMachine, TransitionResult};

// ─── Status events ──────────────────────────────────────────────────

/// Externally visible outcome of a cycle or a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    Fault(FaultTransition),
    Portals(Portals),
    CalibrationPhase(CalibrationPhase),
    Captured { axis: usize, bound: Bound },
    /// Capture press with no axis moved far enough.
    CaptureRejected,
    Arbiter(ArbiterEvent),
    RangePortalRequested,
    Persisted(RecordKind),
    PersistFailed(RecordKind),
}

pub type StatusEvents = heapless::Vec<StatusEvent, 24>;

#[inline]
pub(crate) fn push(events: &mut StatusEvents, event: StatusEvent) {
    if events.push(event).is_err() {
        debug!(?event, "status event dropped");
    }
}

// ─── Cycle statistics ───────────────────────────────────────────────

/// O(1) cycle timing statistics for the host loop.
#[derive(Debug, Clone, Default)]
pub struct CycleStats {
    pub cycle_count: u64,
    pub last_cycle_us: u64,
    pub max_cycle_us: u64,
    pub sum_cycle_us: u64,
    /// Cycles longer than the configured period.
    pub overruns: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_us: 0,
            max_cycle_us: 0,
            sum_cycle_us: 0,
            overruns: 0,
        }
    }

    #[inline]
    pub fn record(&mut self, duration_us: u64, period_us: u64) {
        self.cycle_count += 1;
        self.last_cycle_us = duration_us;
        self.max_cycle_us = self.max_cycle_us.max(duration_us);
        self.sum_cycle_us = self.sum_cycle_us.saturating_add(duration_us);
        if duration_us > period_us {
            self.overruns += 1;
        }
    }

    #[inline]
    pub fn avg_cycle_us(&self) -> u64 {
        self.sum_cycle_us.checked_div(self.cycle_count).unwrap_or(0)
    }
}

// ─── Controller ─────────────────────────────────────────────────────

/// Control-unit context. Owns the record store and every state machine.
#[derive(Debug)]
pub struct Controller<S: RecordStore> {
    pub(crate) cfg: ControlUnitConfig,
    pub(crate) store: S,
    pub(crate) calibration: CalibrationMachine,
    pub(crate) ranges: RangeStore,
    pub(crate) faults: FaultMonitor,
    pub(crate) arbiter: ModeArbiter,
    cal_button: GestureDetector,
    range_taps: PressCounter,
    pub(crate) ranges_requested: bool,
    portals: Portals,
    raw: RawAxes,
    wired_values: CanonicalAxes,
    pad_values: Option<CanonicalAxes>,
    frame: OutputFrame,
    enable: bool,
    indicator: Indicator,
    cycles: u64,
}

impl<S: RecordStore> Controller<S> {
    /// Load persisted records and build the context.
    ///
    /// Invalid or missing records fall back to defaults (factory
    /// calibration, default ranges, offset 512). Persisted ranges are
    /// brought to the persisted offset exactly once.
    pub fn new(cfg: ControlUnitConfig, store: S, wired_selected: bool) -> Self {
        let cal = persist::load::<CalibrationRecord, _>(&store);
        let ranges = persist::load::<RangeRecord, _>(&store);
        let offset = persist::load::<OffsetRecord, _>(&store);
        info!(
            calibration = cal.valid,
            ranges = ranges.valid,
            offset = offset.valid,
            "Persisted records loaded"
        );

        let ranges = RangeStore::restore(ranges.data, offset.data.0);
        let calibration = CalibrationMachine::new(cfg.calibration.clone(), cal.data.0);
        let faults = FaultMonitor::from_config(&cfg);
        let arbiter = ModeArbiter::new(ArbiterTiming::from_config(&cfg), wired_selected);
        let cal_button = GestureDetector::new(PressBounds::new(
            cfg.calibration.short_press_min_ms,
            cfg.calibration.short_press_max_ms,
            cfg.calibration.entry_hold_ms,
        ));

        Self {
            cfg,
            store,
            calibration,
            ranges,
            faults,
            arbiter,
            cal_button,
            range_taps: PressCounter::new(RANGE_PORTAL_PRESSES, RANGE_PORTAL_WINDOW_MS),
            ranges_requested: false,
            portals: Portals::empty(),
            raw: [0; AXIS_COUNT],
            wired_values: [CANONICAL_NEUTRAL; AXIS_COUNT],
            pad_values: None,
            frame: NEUTRAL_FRAME,
            enable: false,
            indicator: Indicator::OFF,
            cycles: 0,
        }
    }

    // ── Accessors ──

    #[inline]
    pub fn config(&self) -> &ControlUnitConfig {
        &self.cfg
    }

    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[inline]
    pub fn fault(&self) -> FaultCode {
        self.faults.code()
    }

    #[inline]
    pub fn faults(&self) -> &FaultMonitor {
        &self.faults
    }

    #[inline]
    pub fn arbiter(&self) -> &ModeArbiter {
        &self.arbiter
    }

    #[inline]
    pub fn calibration(&self) -> &CalibrationMachine {
        &self.calibration
    }

    #[inline]
    pub fn range_store(&self) -> &RangeStore {
        &self.ranges
    }

    #[inline]
    pub fn portals(&self) -> Portals {
        self.portals
    }

    /// Output frame computed by the last cycle.
    #[inline]
    pub fn frame(&self) -> &OutputFrame {
        &self.frame
    }

    #[inline]
    pub fn enable(&self) -> bool {
        self.enable
    }

    #[inline]
    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    #[inline]
    pub fn raw(&self) -> &RawAxes {
        &self.raw
    }

    /// Wired values mapped through the current calibration.
    #[inline]
    pub fn wired_values(&self) -> &CanonicalAxes {
        &self.wired_values
    }

    #[inline]
    pub fn pad_values(&self) -> Option<&CanonicalAxes> {
        self.pad_values.as_ref()
    }

    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    // ── Cycle ──

    /// Run one control cycle.
    pub fn service<B: Board + ?Sized>(&mut self, now: u64, board: &mut B) -> StatusEvents {
        let mut events = StatusEvents::new();
        self.cycles += 1;

        // hardware loss must reach the arbiter on the cycle it is probed
        if self.faults.poll(now, board) {
            if let Some(t) = self.faults.resolve(now) {
                push(&mut events, StatusEvent::Fault(t));
            }
        }

        self.raw = board.read_raw_axes();
        let pad = board.snapshot();
        let wired_selected = board.wired_selected();
        let cal_pressed = board.cal_button();

        self.service_calibration(now, &mut events);
        self.service_cal_button(now, cal_pressed, &mut events);

        self.wired_values = map_all(&self.raw, self.calibration.table());
        self.pad_values = pad
            .as_ref()
            .map(|p| map_pad(p, self.ranges.ranges(), self.arbiter.invert_lx()));

        self.service_arbiter(now, wired_selected, pad.as_ref(), &mut events);

        self.faults
            .set_no_gamepad(self.arbiter.source() == ControlSource::Pad && pad.is_none());
        if let Some(t) = self.faults.resolve(now) {
            push(&mut events, StatusEvent::Fault(t));
        }
        self.refresh_portals(&mut events);

        self.drive_outputs(now, pad.is_some(), board);
        events
    }

    fn service_calibration(&mut self, now: u64, events: &mut StatusEvents) {
        if !self.calibration.is_active() {
            return;
        }
        let before = self.calibration.phase();
        self.calibration.handle_event(CalibrationEvent::Tick {
            now,
            raw: self.raw,
            offset: self.ranges.offset(),
        });
        self.after_calibration_event(before, events);
    }

    /// Report a phase change and persist a finished table.
    pub(crate) fn after_calibration_event(
        &mut self,
        before: CalibrationPhase,
        events: &mut StatusEvents,
    ) {
        let after = self.calibration.phase();
        if after != before {
            info!(from = ?before, to = ?after, "Calibration phase changed");
            push(events, StatusEvent::CalibrationPhase(after));
            if after == CalibrationPhase::Idle {
                self.arbiter.restart_neutral_check();
            }
        }
        if let Some(table) = self.calibration.take_pending_save() {
            // failure is already reported as a status event
            let _ = self.persist(&CalibrationRecord(table), events);
        }
    }

    fn service_cal_button(&mut self, now: u64, pressed: bool, events: &mut StatusEvents) {
        let Some(gesture) = self.cal_button.update(pressed, now) else {
            return;
        };
        let wired = self.arbiter.source() == ControlSource::Wired;
        let phase = self.calibration.phase();

        match gesture {
            Gesture::ShortPress { held_ms } if phase == CalibrationPhase::Extremes => {
                debug!(held_ms, "Capture press");
                match self
                    .calibration
                    .handle_event(CalibrationEvent::Capture { raw: self.raw })
                {
                    TransitionResult::Captured { axis, bound } => {
                        info!(
                            axis = AXIS_NAMES[axis],
                            ?bound,
                            raw = self.raw[axis],
                            "Bound captured"
                        );
                        push(events, StatusEvent::Captured { axis, bound });
                        self.after_calibration_event(CalibrationPhase::Extremes, events);
                    }
                    TransitionResult::Rejected(reason) => {
                        warn!(reason, "Capture rejected");
                        push(events, StatusEvent::CaptureRejected);
                    }
                    TransitionResult::Ok(_) => {}
                }
            }
            Gesture::ShortPress { .. } if !wired && phase == CalibrationPhase::Idle => {
                if self.range_taps.record(now) {
                    info!("Range configuration requested");
                    self.ranges_requested = true;
                    push(events, StatusEvent::RangePortalRequested);
                }
            }
            // after a neutral timeout the hold alone enters calibration
            Gesture::HoldReached if wired && self.faults.neutral_timeout() => {
                self.start_calibration(now, events);
            }
            Gesture::LongRelease { held_ms } if wired => {
                debug!(held_ms, "Calibration entry gesture");
                self.start_calibration(now, events);
            }
            Gesture::HoldReached | Gesture::LongRelease { .. } if !wired => {
                debug!("Calibration entry ignored outside wired mode");
            }
            _ => {}
        }
    }

    fn start_calibration(&mut self, now: u64, events: &mut StatusEvents) {
        if self.calibration.is_active() {
            return;
        }
        let before = self.calibration.phase();
        if let TransitionResult::Rejected(reason) =
            self.calibration.handle_event(CalibrationEvent::Start { now })
        {
            warn!(reason, "Calibration start rejected");
            return;
        }
        self.faults.set_neutral_timeout(false);
        self.after_calibration_event(before, events);
    }

    fn service_arbiter(
        &mut self,
        now: u64,
        wired_selected: bool,
        pad: Option<&GamepadSnapshot>,
        events: &mut StatusEvents,
    ) {
        let arbiter_events = self.arbiter.service(&ArbiterInputs {
            now,
            wired_selected,
            pad,
            pad_values: self.pad_values.as_ref(),
            wired_values: &self.wired_values,
            ranges: self.ranges.ranges(),
            fault: self.faults.code(),
            missing: self.faults.missing(),
            calibrating: self.calibration.is_active(),
        });

        for ev in arbiter_events {
            match ev {
                ArbiterEvent::NeutralTimeout => self.faults.set_neutral_timeout(true),
                ArbiterEvent::NeutralVerified => self.faults.set_neutral_timeout(false),
                ArbiterEvent::ModeChanged(source) => {
                    self.faults.set_neutral_timeout(false);
                    self.range_taps.reset();
                    if source == ControlSource::Wired {
                        self.ranges_requested = false;
                    }
                    if self.calibration.is_active() {
                        let before = self.calibration.phase();
                        self.calibration.handle_event(CalibrationEvent::Abort);
                        warn!("Calibration aborted by mode change");
                        self.after_calibration_event(before, events);
                    }
                }
                _ => {}
            }
            push(events, StatusEvent::Arbiter(ev));
        }
    }

    pub(crate) fn refresh_portals(&mut self, events: &mut StatusEvents) {
        let portals = Portals::required(
            self.faults.code(),
            self.calibration.is_active(),
            self.ranges_requested,
        );
        if portals != self.portals {
            info!(?portals, "Portal request changed");
            self.portals = portals;
            push(events, StatusEvent::Portals(portals));
        }
    }

    fn drive_outputs<B: Board + ?Sized>(&mut self, now: u64, pad_connected: bool, board: &mut B) {
        let fault = self.faults.code();
        let calibrating = self.calibration.is_active();

        self.frame = if !calibrating && self.arbiter.output_enabled(now, fault, pad_connected) {
            let values = match self.arbiter.source() {
                ControlSource::Wired => Some(&self.wired_values),
                ControlSource::Pad => self.pad_values.as_ref(),
            };
            match values {
                Some(v) => compute_frame(v, self.ranges.ranges(), self.ranges.offset()),
                None => NEUTRAL_FRAME,
            }
        } else {
            NEUTRAL_FRAME
        };
        self.enable = !calibrating && self.arbiter.enable_line();

        if self.faults.pwm_present() {
            write_frame(board, &self.frame);
        }
        board.set_enable(self.enable);

        self.indicator = if calibrating {
            Indicator::BOTH
        } else {
            self.faults.indicator(now)
        };
        board.show_indicator(self.indicator);
    }

    /// Encode and save one record. A failure is logged and reported; the
    /// in-memory value stays authoritative.
    pub(crate) fn persist<T: Record>(
        &mut self,
        record: &T,
        events: &mut StatusEvents,
    ) -> Result<(), StoreError> {
        match persist::save(&mut self.store, record) {
            Ok(()) => {
                debug!(kind = %T::KIND, "Record saved");
                push(events, StatusEvent::Persisted(T::KIND));
                Ok(())
            }
            Err(e) => {
                error!(kind = %T::KIND, error = %e, "Record save failed");
                push(events, StatusEvent::PersistFailed(T::KIND));
                Err(e)
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
