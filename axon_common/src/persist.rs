//! Persistence contract for calibration, range and offset records.
//!
//! Every record is `magic: u16 | version: u16 | payload`, little-endian.
//! A record whose magic, version or length does not match is treated as
//! absent: [`load`] returns `valid = false` with factory defaults.
//!
//! Storage I/O sits behind [`RecordStore`]. [`FileStore`] keeps one file per
//! record kind and replaces it by rename, so a torn write leaves either the
//! old record or a short temporary file that is never read.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::AXIS_COUNT;
use crate::control_unit::axis::{
    AxisCalibration, AxisRange, CalibrationTable, NeutralOffset, RangeTable,
};

/// Header length in bytes.
pub const HEADER_LEN: usize = 4;

// ─── Record kinds ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Calibration,
    Ranges,
    Offset,
}

impl RecordKind {
    pub const ALL: [Self; 3] = [Self::Calibration, Self::Ranges, Self::Offset];

    pub const fn magic(self) -> u16 {
        match self {
            Self::Calibration => 0xC0DE,
            Self::Ranges => 0xB1D6,
            Self::Offset => 0x0FF5,
        }
    }

    pub const fn version(self) -> u16 {
        match self {
            Self::Calibration | Self::Ranges => 2,
            Self::Offset => 1,
        }
    }

    /// Payload length in bytes, header excluded.
    pub const fn payload_len(self) -> usize {
        match self {
            Self::Calibration => AXIS_COUNT * 3 * 2,
            Self::Ranges => AXIS_COUNT * 2 * 2 + 2,
            Self::Offset => 2,
        }
    }

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Calibration => "calibration.bin",
            Self::Ranges => "ranges.bin",
            Self::Offset => "offset.bin",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Calibration => 0,
            Self::Ranges => 1,
            Self::Offset => 2,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Calibration => "calibration",
            Self::Ranges => "ranges",
            Self::Offset => "offset",
        };
        f.write_str(name)
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} record I/O failed at {path}: {source}")]
    Io {
        kind: RecordKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} record write rejected by store")]
    Rejected(RecordKind),
}

// ─── Store trait ────────────────────────────────────────────────────

/// Byte-level storage of whole records.
pub trait RecordStore {
    /// `Ok(None)` if nothing was ever written for `kind`.
    fn read(&self, kind: RecordKind) -> Result<Option<Vec<u8>>, StoreError>;

    fn write(&mut self, kind: RecordKind, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Volatile store. Used by tests and the loopback board.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: [Option<Vec<u8>>; 3],
    fail_writes: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write return [`StoreError::Rejected`].
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl RecordStore for MemoryStore {
    fn read(&self, kind: RecordKind) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.slots[kind.index()].clone())
    }

    fn write(&mut self, kind: RecordKind, bytes: &[u8]) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Rejected(kind));
        }
        self.slots[kind.index()] = Some(bytes.to_vec());
        self.writes += 1;
        Ok(())
    }
}

/// One file per record kind under `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, kind: RecordKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    fn io_err(kind: RecordKind, path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            kind,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl RecordStore for FileStore {
    fn read(&self, kind: RecordKind) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path(kind);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_err(kind, &path)(e)),
        }
    }

    fn write(&mut self, kind: RecordKind, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path(kind);
        let tmp = path.with_extension("tmp");
        fs::create_dir_all(&self.dir).map_err(Self::io_err(kind, &self.dir))?;
        let mut file = fs::File::create(&tmp).map_err(Self::io_err(kind, &tmp))?;
        file.write_all(bytes).map_err(Self::io_err(kind, &tmp))?;
        file.sync_all().map_err(Self::io_err(kind, &tmp))?;
        fs::rename(&tmp, &path).map_err(Self::io_err(kind, &path))?;
        debug!(record = %kind, path = %path.display(), "record written");
        Ok(())
    }
}

// ─── Record codec ───────────────────────────────────────────────────

/// A typed record with a fixed payload layout.
pub trait Record: Sized + Default {
    const KIND: RecordKind;

    fn encode_payload(&self, buf: &mut Vec<u8>);

    /// `None` if the payload is semantically invalid.
    fn decode_payload(payload: &[u8]) -> Option<Self>;

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + Self::KIND.payload_len());
        buf.extend_from_slice(&Self::KIND.magic().to_le_bytes());
        buf.extend_from_slice(&Self::KIND.version().to_le_bytes());
        self.encode_payload(&mut buf);
        buf
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != HEADER_LEN + Self::KIND.payload_len() {
            return None;
        }
        let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
        let version = u16::from_le_bytes([bytes[2], bytes[3]]);
        if magic != Self::KIND.magic() || version != Self::KIND.version() {
            return None;
        }
        Self::decode_payload(&bytes[HEADER_LEN..])
    }
}

/// Result of [`load`]: `data` holds defaults when `valid` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loaded<T> {
    pub valid: bool,
    pub data: T,
}

/// Read and decode a record. Any failure yields `valid = false` + defaults.
pub fn load<T: Record, S: RecordStore + ?Sized>(store: &S) -> Loaded<T> {
    let bytes = match store.read(T::KIND) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!(record = %T::KIND, "no stored record");
            return Loaded {
                valid: false,
                data: T::default(),
            };
        }
        Err(e) => {
            warn!(record = %T::KIND, error = %e, "record read failed");
            return Loaded {
                valid: false,
                data: T::default(),
            };
        }
    };
    match T::decode(&bytes) {
        Some(data) => Loaded { valid: true, data },
        None => {
            warn!(record = %T::KIND, len = bytes.len(), "record invalid, using defaults");
            Loaded {
                valid: false,
                data: T::default(),
            }
        }
    }
}

pub fn save<T: Record, S: RecordStore + ?Sized>(
    store: &mut S,
    record: &T,
) -> Result<(), StoreError> {
    store.write(T::KIND, &record.encode())
}

fn read_i16(payload: &[u8], index: usize) -> i16 {
    i16::from_le_bytes([payload[index * 2], payload[index * 2 + 1]])
}

fn saturate_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

// ─── Calibration record ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationRecord(pub CalibrationTable);

impl Default for CalibrationRecord {
    fn default() -> Self {
        Self([AxisCalibration::FACTORY; AXIS_COUNT])
    }
}

impl Record for CalibrationRecord {
    const KIND: RecordKind = RecordKind::Calibration;

    fn encode_payload(&self, buf: &mut Vec<u8>) {
        for cal in &self.0 {
            buf.extend_from_slice(&cal.min_raw.to_le_bytes());
            buf.extend_from_slice(&cal.mid_raw.to_le_bytes());
            buf.extend_from_slice(&cal.max_raw.to_le_bytes());
        }
    }

    fn decode_payload(payload: &[u8]) -> Option<Self> {
        let mut table = [AxisCalibration::FACTORY; AXIS_COUNT];
        for (i, cal) in table.iter_mut().enumerate() {
            *cal = AxisCalibration::new(
                read_i16(payload, i * 3),
                read_i16(payload, i * 3 + 1),
                read_i16(payload, i * 3 + 2),
            );
        }
        Some(Self(table))
    }
}

// ─── Range record ───────────────────────────────────────────────────

/// Ranges together with the offset they were last shifted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRecord {
    pub ranges: RangeTable,
    pub applied_offset: NeutralOffset,
}

impl Default for RangeRecord {
    fn default() -> Self {
        Self {
            ranges: [AxisRange::DEFAULT; AXIS_COUNT],
            applied_offset: NeutralOffset::DEFAULT,
        }
    }
}

impl Record for RangeRecord {
    const KIND: RecordKind = RecordKind::Ranges;

    fn encode_payload(&self, buf: &mut Vec<u8>) {
        for r in &self.ranges {
            buf.extend_from_slice(&saturate_i16(r.min).to_le_bytes());
        }
        for r in &self.ranges {
            buf.extend_from_slice(&saturate_i16(r.max).to_le_bytes());
        }
        buf.extend_from_slice(&self.applied_offset.raw().to_le_bytes());
    }

    fn decode_payload(payload: &[u8]) -> Option<Self> {
        let mut ranges = [AxisRange::DEFAULT; AXIS_COUNT];
        for (i, r) in ranges.iter_mut().enumerate() {
            *r = AxisRange {
                min: i32::from(read_i16(payload, i)),
                max: i32::from(read_i16(payload, AXIS_COUNT + i)),
            }
            .ordered();
        }
        let raw_offset = u16::from_le_bytes([payload[AXIS_COUNT * 4], payload[AXIS_COUNT * 4 + 1]]);
        let applied_offset = NeutralOffset::checked(raw_offset)?;
        Some(Self {
            ranges,
            applied_offset,
        })
    }
}

// ─── Offset record ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OffsetRecord(pub NeutralOffset);

impl Record for OffsetRecord {
    const KIND: RecordKind = RecordKind::Offset;

    fn encode_payload(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0.raw().to_le_bytes());
    }

    fn decode_payload(payload: &[u8]) -> Option<Self> {
        NeutralOffset::checked(u16::from_le_bytes([payload[0], payload[1]])).map(Self)
    }
}
