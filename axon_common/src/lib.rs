//! AXON common library.
//!
//! Shared constants, configuration loading, control-unit types and the
//! record persistence contract used by every AXON crate.
//!
//! # Module Structure
//!
//! - [`consts`] - Numeric bands, channel maps and default timings
//! - [`config`] - Configuration loading traits and types
//! - [`control_unit`] - State enums, presence flags, axis data, unit config
//! - [`persist`] - Versioned record layouts and record stores
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use axon_common::prelude::*;
//!
//! let range = AxisRange::default();
//! assert!(range.in_window(CANONICAL_NEUTRAL));
//! ```

pub mod config;
pub mod consts;
pub mod control_unit;
pub mod persist;
pub mod prelude;
