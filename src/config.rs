//! Drag settings parsed from environment variables.
//!
//! Browser builds have an empty environment, so every field falls back to
//! the defaults in [`crate::consts`]. Native builds (tests, tooling) may
//! override them.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{DRAG_THRESHOLD_PX, REVERT_FADE_MS, SUCCESS_FADE_MS};

pub const THRESHOLD_ENV: &str = "LE_CHAT_PLUS_DRAG_THRESHOLD_PX";
pub const SUCCESS_FADE_ENV: &str = "LE_CHAT_PLUS_SUCCESS_FADE_MS";
pub const REVERT_FADE_ENV: &str = "LE_CHAT_PLUS_REVERT_FADE_MS";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfig {
    /// Cursor travel in CSS pixels separating a click from a drag.
    pub threshold_px: f64,
    /// Indicator fade duration after a committed drop.
    pub success_fade_ms: u32,
    /// Indicator shrink-and-fade duration after a failed drop.
    pub revert_fade_ms: u32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self { threshold_px: DRAG_THRESHOLD_PX, success_fade_ms: SUCCESS_FADE_MS, revert_fade_ms: REVERT_FADE_MS }
    }
}

impl DragConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `LE_CHAT_PLUS_DRAG_THRESHOLD_PX`: default 5
    /// - `LE_CHAT_PLUS_SUCCESS_FADE_MS`: default 150
    /// - `LE_CHAT_PLUS_REVERT_FADE_MS`: default 300
    ///
    /// A negative or non-finite threshold is ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let threshold = env_parse(THRESHOLD_ENV, DRAG_THRESHOLD_PX);
        Self {
            threshold_px: if threshold.is_finite() && threshold >= 0.0 { threshold } else { DRAG_THRESHOLD_PX },
            success_fade_ms: env_parse(SUCCESS_FADE_ENV, SUCCESS_FADE_MS),
            revert_fade_ms: env_parse(REVERT_FADE_ENV, REVERT_FADE_MS),
        }
    }

    /// Animation window for the given drop outcome.
    #[must_use]
    pub fn fade_ms(&self, success: bool) -> u32 {
        if success { self.success_fade_ms } else { self.revert_fade_ms }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
