//! Integration test: records surviving a restart.

use axon_common::consts::AXIS_COUNT;
use axon_common::control_unit::axis::{AxisCalibration, AxisRange};
use axon_common::control_unit::state::CalibrationPhase;
use axon_common::persist::{FileStore, MemoryStore, RecordKind};
use axon_control_unit::cycle::StatusEvent;
use tempfile::TempDir;

use super::harness::Rig;

// ── Helpers ─────────────────────────────────────────────────────────

fn boot(dir: &TempDir) -> Rig<FileStore> {
    let mut rig = Rig::with_store(FileStore::new(dir.path()), true);
    rig.run_for(100);
    rig
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn offset_and_ranges_shift_once_across_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut rig = boot(&dir);
        rig.c.set_range(0, 200, 800).unwrap();
        let events = rig.c.apply_offset(550, true).unwrap();
        assert!(events.contains(&StatusEvent::Persisted(RecordKind::Offset)));
        assert!(events.contains(&StatusEvent::Persisted(RecordKind::Ranges)));
    }

    let rig = boot(&dir);
    assert_eq!(rig.c.offset().get(), 550);
    assert_eq!(rig.c.ranges()[0], AxisRange { min: 238, max: 838 });
    assert_eq!(rig.c.display_ranges()[0], AxisRange { min: 200, max: 800 });

    // and again: no drift
    drop(rig);
    let rig = boot(&dir);
    assert_eq!(rig.c.ranges()[0], AxisRange { min: 238, max: 838 });
}

#[test]
fn unsaved_offset_is_lost_on_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut rig = boot(&dir);
        rig.c.apply_offset(600, false).unwrap();
    }
    let rig = boot(&dir);
    assert_eq!(rig.c.offset().get(), 512);
    assert_eq!(rig.c.ranges()[0], AxisRange::DEFAULT);
}

#[test]
fn imported_calibration_is_loaded_at_boot() {
    let dir = TempDir::new().unwrap();
    let table = [AxisCalibration::new(1000, 15000, 31000); AXIS_COUNT];
    {
        let mut rig = boot(&dir);
        rig.c.import_calibration(table).unwrap();
    }
    let mut rig = boot(&dir);
    assert_eq!(rig.c.calibration_table(), &table);

    rig.board.raw[0] = 15000;
    rig.step();
    assert_eq!(rig.c.wired_values()[0], 512);
}

#[test]
fn corrupt_records_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    for kind in [RecordKind::Calibration, RecordKind::Ranges, RecordKind::Offset] {
        std::fs::write(store.path(kind), b"not a record").unwrap();
    }

    let mut rig = Rig::with_store(store, true);
    rig.run_for(100);
    assert!(
        rig.c
            .calibration_table()
            .iter()
            .all(|c| *c == AxisCalibration::FACTORY)
    );
    assert_eq!(rig.c.offset().get(), 512);
    assert!(rig.c.ranges().iter().all(|r| *r == AxisRange::DEFAULT));
    assert!(rig.board.enable);
}

#[test]
fn failed_write_keeps_learned_table_in_memory() {
    let mut store = MemoryStore::new();
    store.set_fail_writes(true);
    let mut rig = Rig::with_store(store, true);
    rig.run_for(100);

    rig.press_cal(5100);
    rig.run_for(5000);
    assert_eq!(rig.c.calibration().phase(), CalibrationPhase::Extremes);

    let events = rig.c.finish_calibration().unwrap();
    assert!(events.contains(&StatusEvent::PersistFailed(RecordKind::Calibration)));

    rig.run_for(100);
    assert_eq!(rig.c.calibration().phase(), CalibrationPhase::Idle);
    assert_eq!(rig.c.calibration_table()[0].mid_raw, 16384);
    assert_eq!(rig.c.store().write_count(), 0);
    assert!(rig.board.enable);
}
