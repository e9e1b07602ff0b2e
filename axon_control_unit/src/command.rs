//! Operator command handling.
//!
//! Press/hold gesture detection, gamepad mapping, and control-source
//! arbitration (wired vs. pad, arming, mode override).

pub mod arbitration;
pub mod gesture;
pub mod pad;
