//! Scripted board + controller rig shared by the integration tests.

use axon_common::control_unit::config::ControlUnitConfig;
use axon_common::persist::{MemoryStore, RecordStore};
use axon_control_unit::cycle::{Controller, StatusEvent};
use axon_control_unit::hal::LoopbackBoard;

/// Cycle period used by every rig [ms].
pub const CYCLE_MS: u64 = 20;

pub struct Rig<S: RecordStore = MemoryStore> {
    pub c: Controller<S>,
    pub board: LoopbackBoard,
    pub now: u64,
    /// Every event since the rig was created.
    pub events: Vec<StatusEvent>,
}

impl Rig<MemoryStore> {
    pub fn wired() -> Self {
        Self::with_store(MemoryStore::new(), true)
    }

    pub fn pad() -> Self {
        Self::with_store(MemoryStore::new(), false)
    }
}

impl<S: RecordStore> Rig<S> {
    pub fn with_store(store: S, wired: bool) -> Self {
        let mut board = LoopbackBoard::new();
        board.wired = wired;
        Self {
            c: Controller::new(ControlUnitConfig::default(), store, wired),
            board,
            now: 0,
            events: Vec::new(),
        }
    }

    /// One cycle. Returns that cycle's events.
    pub fn step(&mut self) -> Vec<StatusEvent> {
        let ev: Vec<StatusEvent> = self.c.service(self.now, &mut self.board).into_iter().collect();
        self.events.extend(ev.iter().copied());
        self.now += CYCLE_MS;
        ev
    }

    /// Cycle for `ms`. Returns the events of that span.
    pub fn run_for(&mut self, ms: u64) -> Vec<StatusEvent> {
        let end = self.now + ms;
        let mut out = Vec::new();
        while self.now < end {
            out.extend(self.step());
        }
        out
    }

    /// Hold the calibration button for `ms`, then release for one cycle.
    pub fn press_cal(&mut self, ms: u64) -> Vec<StatusEvent> {
        self.board.cal_button = true;
        let mut out = self.run_for(ms);
        self.board.cal_button = false;
        out.extend(self.step());
        out
    }

    pub fn saw(&self, event: StatusEvent) -> bool {
        self.events.contains(&event)
    }

    /// Every duty at neutral and every digital line off.
    pub fn outputs_neutral(&self) -> bool {
        self.board.duty.iter().all(|&d| (d - 0.5).abs() < 1e-4) && !self.board.any_active()
    }
}
