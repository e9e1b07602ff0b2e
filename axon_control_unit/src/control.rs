//! Signal path: raw sample → canonical value → actuator duty.

pub mod mapper;
pub mod output;
pub mod range;
