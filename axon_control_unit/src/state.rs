//! State machine module root.

pub mod calibration;
