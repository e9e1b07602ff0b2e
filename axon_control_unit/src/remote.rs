//! Remote configuration surface.
//!
//! Accessors used by whatever transport carries configuration (the
//! diagnostic portal, a serial console, tests). Every mutation goes through
//! the same contracts the cycle uses: range changes through [`RangeStore`],
//! calibration changes through the calibration machine.
//!
//! Range coordinates come in two flavours. *Absolute* values are what the
//! output stage uses. *Display* values hide the neutral offset
//! (`display = absolute - (offset - 512)`), so an operator sees the same
//! numbers whatever the offset.
//!
//! [`RangeStore`]: crate::control::range::RangeStore

use axon_common::control_unit::axis::{AxisRange, CalibrationTable, NeutralOffset, RangeTable};
use axon_common::control_unit::error::MissingUnits;
use axon_common::control_unit::state::{CalibrationPhase, ControlSource, FaultCode};
use axon_common::persist::{CalibrationRecord, OffsetRecord, RecordStore};
use serde::Serialize;
use tracing::info;

use crate::control::mapper::CanonicalAxes;
use crate::cycle::{Controller, StatusEvents};
use crate::error::RemoteError;
use crate::safety::display::Indicator;
use crate::safety::faults::Portals;
use crate::state::calibration::{CalibrationEvent, TransitionResult};

/// Point-in-time view of the controller for the status feed.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub service: String,
    pub cycles: u64,
    pub fault: FaultCode,
    pub fault_level: u8,
    pub missing: MissingUnits,
    pub portals: Portals,
    pub calibration: CalibrationPhase,
    pub captured_min: u8,
    pub captured_max: u8,
    pub calibration_table: CalibrationTable,
    pub values: CanonicalAxes,
    pub pad_values: Option<CanonicalAxes>,
    pub source: ControlSource,
    pub soft_override: bool,
    pub armed: bool,
    pub neutral_verified: bool,
    pub invert_lx: bool,
    pub enable: bool,
    pub indicator: Indicator,
    pub offset: NeutralOffset,
    pub ranges: RangeTable,
    pub display_ranges: RangeTable,
}

impl<S: RecordStore> Controller<S> {
    // ── Ranges ──

    pub fn ranges(&self) -> &RangeTable {
        self.ranges.ranges()
    }

    pub fn display_ranges(&self) -> RangeTable {
        std::array::from_fn(|axis| self.ranges.display_range(axis).unwrap_or_default())
    }

    /// Set absolute bounds in memory. Clamped to [0, 1023] and ordered.
    pub fn set_range(&mut self, axis: usize, min: i32, max: i32) -> Result<AxisRange, RemoteError> {
        self.ranges
            .set_range(axis, min, max)
            .ok_or(RemoteError::AxisOutOfRange(axis))
    }

    /// Set bounds in display coordinates in memory.
    pub fn set_display_range(
        &mut self,
        axis: usize,
        min: i32,
        max: i32,
    ) -> Result<AxisRange, RemoteError> {
        self.ranges
            .set_display_range(axis, min, max)
            .ok_or(RemoteError::AxisOutOfRange(axis))
    }

    /// Replace every range from display coordinates and persist.
    pub fn apply_display_ranges(
        &mut self,
        table: &RangeTable,
    ) -> Result<StatusEvents, RemoteError> {
        for (axis, r) in table.iter().enumerate() {
            self.set_display_range(axis, r.min, r.max)?;
        }
        self.apply_ranges()
    }

    /// Persist the current ranges.
    pub fn apply_ranges(&mut self) -> Result<StatusEvents, RemoteError> {
        let mut events = StatusEvents::new();
        let record = self.ranges.record();
        self.persist(&record, &mut events)?;
        info!("Ranges applied");
        Ok(events)
    }

    /// Close the range portal once the operator is done.
    pub fn close_range_portal(&mut self) -> StatusEvents {
        let mut events = StatusEvents::new();
        self.ranges_requested = false;
        self.refresh_portals(&mut events);
        events
    }

    // ── Offset ──

    pub fn offset(&self) -> NeutralOffset {
        self.ranges.offset()
    }

    /// Move the neutral offset. Ranges shift by the change since the last
    /// applied offset. With `save`, offset and ranges are persisted.
    pub fn apply_offset(&mut self, value: i32, save: bool) -> Result<StatusEvents, RemoteError> {
        let offset = NeutralOffset::clamped(value);
        let delta = self.ranges.set_offset(offset);
        info!(offset = offset.get(), delta, save, "Neutral offset set");

        let mut events = StatusEvents::new();
        if save {
            self.persist(&OffsetRecord(offset), &mut events)?;
            let record = self.ranges.record();
            self.persist(&record, &mut events)?;
        }
        Ok(events)
    }

    // ── Calibration ──

    pub fn calibration_table(&self) -> &CalibrationTable {
        self.calibration.table()
    }

    /// Replace the calibration table. Only while calibration is idle.
    pub fn import_calibration(
        &mut self,
        table: CalibrationTable,
    ) -> Result<StatusEvents, RemoteError> {
        match self.calibration.handle_event(CalibrationEvent::Import(table)) {
            TransitionResult::Rejected(reason) => Err(RemoteError::Rejected(reason)),
            _ => {
                info!("Calibration imported");
                let mut events = StatusEvents::new();
                if let Some(table) = self.calibration.take_pending_save() {
                    self.persist(&CalibrationRecord(table), &mut events)?;
                }
                self.arbiter.restart_neutral_check();
                Ok(events)
            }
        }
    }

    /// Stop capturing extremes and finish with the bounds captured so far.
    pub fn finish_calibration(&mut self) -> Result<StatusEvents, RemoteError> {
        let before = self.calibration.phase();
        if let TransitionResult::Rejected(reason) =
            self.calibration.handle_event(CalibrationEvent::FinishRequested)
        {
            return Err(RemoteError::Rejected(reason));
        }
        let mut events = StatusEvents::new();
        self.after_calibration_event(before, &mut events);
        Ok(events)
    }

    // ── Status ──

    pub fn snapshot(&self) -> StatusSnapshot {
        let (captured_min, captured_max) = self.calibration.captured();
        StatusSnapshot {
            service: self.cfg.shared.service_name.clone(),
            cycles: self.cycles(),
            fault: self.fault(),
            fault_level: self.fault().level(),
            missing: self.faults.missing(),
            portals: self.portals(),
            calibration: self.calibration.phase(),
            captured_min,
            captured_max,
            calibration_table: *self.calibration.table(),
            values: *self.wired_values(),
            pad_values: self.pad_values().copied(),
            source: self.arbiter.source(),
            soft_override: self.arbiter.soft_override(),
            armed: self.arbiter.armed(),
            neutral_verified: self.arbiter.neutral_verified(),
            invert_lx: self.arbiter.invert_lx(),
            enable: self.enable(),
            indicator: self.indicator(),
            offset: self.ranges.offset(),
            ranges: *self.ranges.ranges(),
            display_ranges: self.display_ranges(),
        }
    }

    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
