//! Timers on a monotonic millisecond clock.
//!
//! The controller samples the clock once per cycle and passes `now` to every
//! operation. A timer only stores the instant it was armed; elapsed time is
//! always `now - armed_at`, so no timer needs servicing to stay correct.

/// A single armable timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    armed_at: Option<u64>,
}

impl Timer {
    pub const fn new() -> Self {
        Self { armed_at: None }
    }

    #[inline]
    pub fn arm(&mut self, now: u64) {
        self.armed_at = Some(now);
    }

    #[inline]
    pub const fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Milliseconds since arming, `None` when idle.
    #[inline]
    pub fn elapsed(&self, now: u64) -> Option<u64> {
        self.armed_at.map(|t| now.saturating_sub(t))
    }

    /// Armed and at least `duration_ms` old.
    #[inline]
    pub fn expired(&self, now: u64, duration_ms: u64) -> bool {
        self.elapsed(now).is_some_and(|e| e >= duration_ms)
    }

    /// Armed and younger than `duration_ms`.
    #[inline]
    pub fn running(&self, now: u64, duration_ms: u64) -> bool {
        self.elapsed(now).is_some_and(|e| e < duration_ms)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
