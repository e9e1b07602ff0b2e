//! Prelude module for common re-exports.
//!
//! `use axon_common::prelude::*;` brings in the types nearly every
//! control-unit module touches.

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::control_unit::config::ControlUnitConfig;

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{AXIS_COUNT, AXIS_NAMES, CANONICAL_MAX, CANONICAL_MIN, CANONICAL_NEUTRAL};

// ─── Control unit types ─────────────────────────────────────────────
pub use crate::control_unit::axis::{
    AxisCalibration, AxisRange, CalibrationTable, NeutralOffset, RangeTable,
};
pub use crate::control_unit::error::MissingUnits;
pub use crate::control_unit::state::{CalibrationPhase, ControlSource, FaultCode};

// ─── Persistence ────────────────────────────────────────────────────
pub use crate::persist::{
    CalibrationRecord, FileStore, Loaded, MemoryStore, OffsetRecord, RangeRecord, Record,
    RecordKind, RecordStore, StoreError,
};
