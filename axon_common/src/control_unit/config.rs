//! Configuration structures for the control unit.
//!
//! Every section is optional in TOML; missing fields fall back to the
//! defaults in [`crate::consts`]. Bounds are checked by `validate()`.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig};
use crate::consts::*;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level control unit configuration.
///
/// ```toml
/// store_dir = "/var/lib/axon"
///
/// [shared]
/// service_name = "axon-cu"
///
/// [timing]
/// presence_poll_ms = 3000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlUnitConfig {
    #[serde(default)]
    pub shared: SharedConfig,

    /// Directory of the file-backed record store.
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub calibration: CalibrationConfig,

    #[serde(default)]
    pub arming: ArmingConfig,

    #[serde(default)]
    pub fault_display: FaultDisplayConfig,
}

fn default_store_dir() -> String {
    DEFAULT_STORE_DIR.to_string()
}

impl Default for ControlUnitConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            store_dir: default_store_dir(),
            timing: TimingConfig::default(),
            calibration: CalibrationConfig::default(),
            arming: ArmingConfig::default(),
            fault_display: FaultDisplayConfig::default(),
        }
    }
}

impl ControlUnitConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.store_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "store_dir cannot be empty".to_string(),
            ));
        }
        self.timing
            .validate()
            .and_then(|()| self.calibration.validate())
            .and_then(|()| self.arming.validate())
            .and_then(|()| self.fault_display.validate())
            .map_err(ConfigError::ValidationError)
    }
}

fn nonzero(name: &str, value: u64) -> Result<(), String> {
    if value == 0 {
        return Err(format!("{name} must be > 0"));
    }
    Ok(())
}

// ─── Timing ─────────────────────────────────────────────────────────

/// Loop cadence and arbitration timers [ms].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_cycle_ms")]
    pub cycle_ms: u64,
    /// Hardware presence poll interval (>= 2000).
    #[serde(default = "default_presence_poll_ms")]
    pub presence_poll_ms: u64,
    #[serde(default = "default_neutral_wait_timeout_ms")]
    pub neutral_wait_timeout_ms: u64,
    #[serde(default = "default_mode_change_block_ms")]
    pub mode_change_block_ms: u64,
}

fn default_cycle_ms() -> u64 {
    CYCLE_MS_DEFAULT
}
fn default_presence_poll_ms() -> u64 {
    PRESENCE_POLL_MS_DEFAULT
}
fn default_neutral_wait_timeout_ms() -> u64 {
    NEUTRAL_WAIT_TIMEOUT_MS_DEFAULT
}
fn default_mode_change_block_ms() -> u64 {
    MODE_CHANGE_BLOCK_MS_DEFAULT
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            cycle_ms: CYCLE_MS_DEFAULT,
            presence_poll_ms: PRESENCE_POLL_MS_DEFAULT,
            neutral_wait_timeout_ms: NEUTRAL_WAIT_TIMEOUT_MS_DEFAULT,
            mode_change_block_ms: MODE_CHANGE_BLOCK_MS_DEFAULT,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), String> {
        nonzero("timing.cycle_ms", self.cycle_ms)?;
        nonzero("timing.neutral_wait_timeout_ms", self.neutral_wait_timeout_ms)?;
        if self.presence_poll_ms < PRESENCE_POLL_MS_MIN {
            return Err(format!(
                "timing.presence_poll_ms {} below minimum {}",
                self.presence_poll_ms, PRESENCE_POLL_MS_MIN
            ));
        }
        Ok(())
    }
}

// ─── Calibration ────────────────────────────────────────────────────

/// Calibration gesture and phase timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Hold time of the calibration-entry gesture [ms].
    #[serde(default = "default_entry_hold_ms")]
    pub entry_hold_ms: u64,
    #[serde(default = "default_short_press_min_ms")]
    pub short_press_min_ms: u64,
    #[serde(default = "default_short_press_max_ms")]
    pub short_press_max_ms: u64,
    #[serde(default = "default_neutral_average_ms")]
    pub neutral_average_ms: u64,
    #[serde(default = "default_neutral_validate_ms")]
    pub neutral_validate_ms: u64,
    #[serde(default = "default_neutral_confirm_ms")]
    pub neutral_confirm_ms: u64,
    /// Canonical deviation counted as deliberate motion.
    #[serde(default = "default_move_threshold")]
    pub move_threshold: i32,
    /// Raw span around a fresh neutral before extremes are captured.
    #[serde(default = "default_provisional_span")]
    pub provisional_span: i16,
}

fn default_entry_hold_ms() -> u64 {
    CAL_ENTRY_HOLD_MS_DEFAULT
}
fn default_short_press_min_ms() -> u64 {
    SHORT_PRESS_MIN_MS_DEFAULT
}
fn default_short_press_max_ms() -> u64 {
    SHORT_PRESS_MAX_MS_DEFAULT
}
fn default_neutral_average_ms() -> u64 {
    NEUTRAL_AVERAGE_MS_DEFAULT
}
fn default_neutral_validate_ms() -> u64 {
    NEUTRAL_VALIDATE_MS_DEFAULT
}
fn default_neutral_confirm_ms() -> u64 {
    NEUTRAL_CONFIRM_MS_DEFAULT
}
fn default_move_threshold() -> i32 {
    MOVE_THRESHOLD_DEFAULT
}
fn default_provisional_span() -> i16 {
    PROVISIONAL_SPAN_DEFAULT
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            entry_hold_ms: CAL_ENTRY_HOLD_MS_DEFAULT,
            short_press_min_ms: SHORT_PRESS_MIN_MS_DEFAULT,
            short_press_max_ms: SHORT_PRESS_MAX_MS_DEFAULT,
            neutral_average_ms: NEUTRAL_AVERAGE_MS_DEFAULT,
            neutral_validate_ms: NEUTRAL_VALIDATE_MS_DEFAULT,
            neutral_confirm_ms: NEUTRAL_CONFIRM_MS_DEFAULT,
            move_threshold: MOVE_THRESHOLD_DEFAULT,
            provisional_span: PROVISIONAL_SPAN_DEFAULT,
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<(), String> {
        nonzero("calibration.entry_hold_ms", self.entry_hold_ms)?;
        nonzero("calibration.neutral_average_ms", self.neutral_average_ms)?;
        if self.short_press_min_ms >= self.short_press_max_ms {
            return Err(format!(
                "calibration.short_press_min_ms {} must be < short_press_max_ms {}",
                self.short_press_min_ms, self.short_press_max_ms
            ));
        }
        if self.short_press_max_ms >= self.entry_hold_ms {
            return Err(format!(
                "calibration.short_press_max_ms {} must be < entry_hold_ms {}",
                self.short_press_max_ms, self.entry_hold_ms
            ));
        }
        if self.move_threshold <= 0 || self.move_threshold >= NEUTRAL_HALF_WINDOW * 8 {
            return Err(format!(
                "calibration.move_threshold {} out of range [1, {}]",
                self.move_threshold,
                NEUTRAL_HALF_WINDOW * 8 - 1
            ));
        }
        if self.provisional_span <= 0 {
            return Err("calibration.provisional_span must be > 0".to_string());
        }
        Ok(())
    }
}

// ─── Arming ─────────────────────────────────────────────────────────

/// Pad arming and mode-override gestures [ms].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmingConfig {
    #[serde(default = "default_arm_hold_ms")]
    pub arm_hold_ms: u64,
    /// Shortest press that disarms; anything up to `arm_hold_ms` counts.
    #[serde(default = "default_disarm_min_ms")]
    pub disarm_min_ms: u64,
    #[serde(default = "default_override_hold_ms")]
    pub override_hold_ms: u64,
}

fn default_arm_hold_ms() -> u64 {
    ARM_HOLD_MS_DEFAULT
}
fn default_disarm_min_ms() -> u64 {
    DISARM_MIN_MS_DEFAULT
}
fn default_override_hold_ms() -> u64 {
    OVERRIDE_HOLD_MS_DEFAULT
}

impl Default for ArmingConfig {
    fn default() -> Self {
        Self {
            arm_hold_ms: ARM_HOLD_MS_DEFAULT,
            disarm_min_ms: DISARM_MIN_MS_DEFAULT,
            override_hold_ms: OVERRIDE_HOLD_MS_DEFAULT,
        }
    }
}

impl ArmingConfig {
    pub fn validate(&self) -> Result<(), String> {
        nonzero("arming.override_hold_ms", self.override_hold_ms)?;
        if self.disarm_min_ms >= self.arm_hold_ms {
            return Err(format!(
                "arming.disarm_min_ms {} must be < arm_hold_ms {}",
                self.disarm_min_ms, self.arm_hold_ms
            ));
        }
        Ok(())
    }
}

// ─── Fault display ──────────────────────────────────────────────────

/// Blink sequence timing [ms].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultDisplayConfig {
    #[serde(default = "default_blink_on_ms")]
    pub blink_on_ms: u64,
    #[serde(default = "default_blink_off_ms")]
    pub blink_off_ms: u64,
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

fn default_blink_on_ms() -> u64 {
    FAULT_BLINK_ON_MS_DEFAULT
}
fn default_blink_off_ms() -> u64 {
    FAULT_BLINK_OFF_MS_DEFAULT
}
fn default_pause_ms() -> u64 {
    FAULT_PAUSE_MS_DEFAULT
}

impl Default for FaultDisplayConfig {
    fn default() -> Self {
        Self {
            blink_on_ms: FAULT_BLINK_ON_MS_DEFAULT,
            blink_off_ms: FAULT_BLINK_OFF_MS_DEFAULT,
            pause_ms: FAULT_PAUSE_MS_DEFAULT,
        }
    }
}

impl FaultDisplayConfig {
    pub fn validate(&self) -> Result<(), String> {
        nonzero("fault_display.blink_on_ms", self.blink_on_ms)?;
        nonzero("fault_display.blink_off_ms", self.blink_off_ms)?;
        nonzero("fault_display.pause_ms", self.pause_ms)
    }
}
