//! Control unit shared types.
//!
//! Organized by domain: state enums, presence bitflags, per-axis data and
//! configuration structures.

pub mod axis;
pub mod config;
pub mod error;
pub mod state;
