mod arming;
mod calibration;
mod fault_display;
mod harness;
mod neutral_timeout;
mod override_mode;
mod persistence;
