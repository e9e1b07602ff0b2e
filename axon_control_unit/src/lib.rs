//! # AXON Control Unit Library
//!
//! Control core of a remote-operated multi-axis actuator box. Eight operator
//! axes are read either from wired potentiometers (through two ADCs) or from
//! a wireless gamepad, mapped onto a canonical band, and driven onto a PWM
//! driver as duty cycle plus an "axis active" digital line.
//!
//! ## Layers
//!
//! 1. **hal**: collaborator traits (`Board`) and an in-memory loopback board
//! 2. **control**: axis mapper, range store, output stage
//! 3. **command**: gestures, gamepad mapping, control-source arbitration
//! 4. **state**: calibration state machine
//! 5. **safety**: fault monitor, portal requests, fault indication
//! 6. **cycle**: the per-cycle `Controller` context
//! 7. **remote**: configuration accessors and the status feed
//!
//! ## Fail-safe
//!
//! Outputs leave neutral only when
//! `(Wired && neutral verified && no fault) || (Pad && armed && pad connected)`.
//! Every other condition, including a running calibration and the settle
//! window after a mode change, writes neutral duty with every digital line off.

pub mod command;
pub mod config;
pub mod control;
pub mod cycle;
pub mod error;
pub mod hal;
pub mod remote;
pub mod safety;
pub mod state;
pub mod timer;
