//! Safety module root.
//!
//! Hardware presence monitoring, fault-code resolution, portal requests,
//! and the fault indication sequencer.

pub mod display;
pub mod faults;
