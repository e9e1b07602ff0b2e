//! Press / hold / release detection for a single boolean input.
//!
//! One [`GestureDetector`] per physical input, parameterized by duration
//! bounds. Calibration entry, extremes capture, arming, the override combo
//! and the range-portal tap count all use it.

/// Duration bounds of a detector [ms].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressBounds {
    /// Shortest accepted short press.
    pub short_min_ms: u64,
    /// Longest accepted short press (inclusive).
    pub short_max_ms: u64,
    /// Hold duration that fires [`Gesture::HoldReached`].
    pub hold_ms: u64,
}

impl PressBounds {
    pub const fn new(short_min_ms: u64, short_max_ms: u64, hold_ms: u64) -> Self {
        Self {
            short_min_ms,
            short_max_ms,
            hold_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Rising edge.
    Pressed,
    /// Released after a duration inside the short-press bounds.
    ShortPress { held_ms: u64 },
    /// Still held and the hold duration just elapsed. Fires once per press.
    HoldReached,
    /// Released after `HoldReached` fired.
    LongRelease { held_ms: u64 },
    /// Released outside every accepted bound (bounce or abandoned hold).
    Released { held_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct GestureDetector {
    bounds: PressBounds,
    pressed_at: Option<u64>,
    hold_fired: bool,
}

impl GestureDetector {
    pub const fn new(bounds: PressBounds) -> Self {
        Self {
            bounds,
            pressed_at: None,
            hold_fired: false,
        }
    }

    /// Forget the current press. The next sample starts fresh.
    pub fn reset(&mut self) {
        self.pressed_at = None;
        self.hold_fired = false;
    }

    /// Feed one sample; at most one gesture per call.
    pub fn update(&mut self, pressed: bool, now: u64) -> Option<Gesture> {
        match (self.pressed_at, pressed) {
            (None, true) => {
                self.pressed_at = Some(now);
                self.hold_fired = false;
                Some(Gesture::Pressed)
            }
            (Some(t0), true) => {
                if !self.hold_fired && now.saturating_sub(t0) >= self.bounds.hold_ms {
                    self.hold_fired = true;
                    Some(Gesture::HoldReached)
                } else {
                    None
                }
            }
            (Some(t0), false) => {
                let held_ms = now.saturating_sub(t0);
                let fired = self.hold_fired;
                self.reset();
                Some(if fired {
                    Gesture::LongRelease { held_ms }
                } else if (self.bounds.short_min_ms..=self.bounds.short_max_ms).contains(&held_ms) {
                    Gesture::ShortPress { held_ms }
                } else {
                    Gesture::Released { held_ms }
                })
            }
            (None, false) => None,
        }
    }
}

/// Counts short presses landing inside a sliding window.
#[derive(Debug, Clone)]
pub struct PressCounter {
    target: u8,
    window_ms: u64,
    first_at: Option<u64>,
    count: u8,
}

impl PressCounter {
    pub const fn new(target: u8, window_ms: u64) -> Self {
        Self {
            target,
            window_ms,
            first_at: None,
            count: 0,
        }
    }

    /// Register a press; true when the target count is reached.
    pub fn record(&mut self, now: u64) -> bool {
        match self.first_at {
            Some(t0) if now.saturating_sub(t0) <= self.window_ms => self.count += 1,
            _ => {
                self.first_at = Some(now);
                self.count = 1;
            }
        }
        if self.count >= self.target {
            self.reset();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.first_at = None;
        self.count = 0;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
