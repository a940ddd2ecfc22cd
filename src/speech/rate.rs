//! Speech rate bounds and clamping

use std::fmt;

/// Slowest allowed speech rate (roughly words per minute)
pub const MIN_RATE: i32 = 50;

/// Fastest allowed speech rate
pub const MAX_RATE: i32 = 500;

/// Rate used when no preference is stored
pub const DEFAULT_RATE: i32 = 120;

/// User-tunable speech rate, always within `[MIN_RATE, MAX_RATE]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpeechRate(i32);

impl SpeechRate {
    /// Create a rate, clamping out-of-range values
    pub fn new(rate: i32) -> Self {
        Self(rate.clamp(MIN_RATE, MAX_RATE))
    }

    pub fn get(self) -> i32 {
        self.0
    }

    /// Apply a signed delta and clamp the result
    ///
    /// Saturating so that extreme deltas cannot wrap around.
    pub fn adjusted(self, delta: i32) -> Self {
        Self::new(self.0.saturating_add(delta))
    }
}

impl Default for SpeechRate {
    fn default() -> Self {
        Self(DEFAULT_RATE)
    }
}

impl From<i32> for SpeechRate {
    fn from(rate: i32) -> Self {
        Self::new(rate)
    }
}

impl fmt::Display for SpeechRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
