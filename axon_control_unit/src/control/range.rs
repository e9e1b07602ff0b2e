//! Per-axis output ranges and the global neutral offset.
//!
//! Ranges are stored in absolute canonical coordinates. Moving the offset by
//! Δ moves every bound by Δ. The store remembers the offset its ranges were
//! last shifted to, so a reload never shifts twice.

use axon_common::consts::AXIS_COUNT;
use axon_common::control_unit::axis::{AxisRange, NeutralOffset, RangeTable};
use axon_common::persist::RangeRecord;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeStore {
    ranges: RangeTable,
    offset: NeutralOffset,
}

impl Default for RangeStore {
    fn default() -> Self {
        Self {
            ranges: [AxisRange::DEFAULT; AXIS_COUNT],
            offset: NeutralOffset::DEFAULT,
        }
    }
}

impl RangeStore {
    /// Restore persisted ranges and bring them to `offset`.
    pub fn restore(record: RangeRecord, offset: NeutralOffset) -> Self {
        let mut store = Self {
            ranges: record.ranges.map(AxisRange::ordered),
            offset: record.applied_offset,
        };
        store.set_offset(offset);
        store
    }

    #[inline]
    pub fn ranges(&self) -> &RangeTable {
        &self.ranges
    }

    #[inline]
    pub fn range(&self, axis: usize) -> Option<&AxisRange> {
        self.ranges.get(axis)
    }

    #[inline]
    pub fn offset(&self) -> NeutralOffset {
        self.offset
    }

    /// Translate every bound by `delta`.
    pub fn apply_offset_delta(&mut self, delta: i32) {
        if delta == 0 {
            return;
        }
        for r in &mut self.ranges {
            r.shift(delta);
        }
    }

    /// Move to a new offset, shifting ranges by the change since the last
    /// applied offset. Returns the applied delta.
    pub fn set_offset(&mut self, offset: NeutralOffset) -> i32 {
        let delta = offset.delta_from(self.offset);
        self.apply_offset_delta(delta);
        self.offset = offset;
        if delta != 0 {
            debug!(offset = offset.get(), delta, "neutral offset applied");
        }
        delta
    }

    /// Set absolute bounds. Clamped to [0, 1023] and ordered.
    pub fn set_range(&mut self, axis: usize, min: i32, max: i32) -> Option<AxisRange> {
        let slot = self.ranges.get_mut(axis)?;
        *slot = AxisRange::clamped(min, max);
        Some(*slot)
    }

    /// Bounds as shown to the operator, relative to the default offset.
    pub fn display_range(&self, axis: usize) -> Option<AxisRange> {
        let shift = self.offset.display_shift();
        self.ranges.get(axis).map(|r| AxisRange {
            min: r.min - shift,
            max: r.max - shift,
        })
    }

    /// Set bounds given in display coordinates.
    pub fn set_display_range(&mut self, axis: usize, min: i32, max: i32) -> Option<AxisRange> {
        let shift = self.offset.display_shift();
        let slot = self.ranges.get_mut(axis)?;
        let mut r = AxisRange::clamped(min, max);
        r.shift(shift);
        *slot = r;
        Some(r)
    }

    /// Record for persistence, tagged with the current offset.
    pub fn record(&self) -> RangeRecord {
        RangeRecord {
            ranges: self.ranges,
            applied_offset: self.offset,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
