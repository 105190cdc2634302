//! Tuning knobs for the falling-block scene
//!
//! Supplied by the hosting page as JSON; every field falls back to its default.

use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY;

/// How quickly blocks are released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReleasePace {
    /// A new block every 10 ticks
    #[default]
    Brisk,
    /// A new block every 30 ticks
    Relaxed,
    /// A new block every N ticks
    Custom(u32),
}

impl ReleasePace {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleasePace::Brisk => "Brisk",
            ReleasePace::Relaxed => "Relaxed",
            ReleasePace::Custom(_) => "Custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "brisk" | "fast" => Some(ReleasePace::Brisk),
            "relaxed" | "slow" => Some(ReleasePace::Relaxed),
            other => other.parse().ok().map(ReleasePace::Custom),
        }
    }

    /// Ticks between releases (never zero)
    pub fn interval_ticks(&self) -> u32 {
        match self {
            ReleasePace::Brisk => 10,
            ReleasePace::Relaxed => 30,
            ReleasePace::Custom(n) => (*n).max(1),
        }
    }
}

/// Scene tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Physics ===
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Release schedule
    pub release_pace: ReleasePace,

    // === Spawn ===
    /// Initial tilt magnitude range (degrees); sign is random
    pub tilt_min_deg: f32,
    pub tilt_max_deg: f32,
    /// Horizontal jitter either side of center, as a fraction of container width
    pub jitter_fraction: f32,
    /// Vertical start of the first block (px, negative is above the container)
    pub spawn_offset_y: f32,
    /// Extra height added per release index (px)
    pub spawn_stagger_y: f32,

    // === Presentation timing (ms) ===
    /// Hover-out debounce before a panel closes
    pub close_delay_ms: f64,
    /// Panel slide-out duration before removal
    pub panel_exit_ms: f64,
    /// Delay between panel creation and slide-in
    pub panel_enter_delay_ms: f64,
    /// Flatten animation once a block lands
    pub settle_transition_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            release_pace: ReleasePace::Brisk,

            tilt_min_deg: 10.0,
            tilt_max_deg: 30.0,
            jitter_fraction: 0.04,
            spawn_offset_y: -100.0,
            spawn_stagger_y: 50.0,

            close_delay_ms: 50.0,
            panel_exit_ms: 300.0,
            panel_enter_delay_ms: 10.0,
            settle_transition_ms: 200.0,
        }
    }
}

impl Settings {
    /// Defaults with a given release pace
    pub fn from_pace(pace: ReleasePace) -> Self {
        Self {
            release_pace: pace,
            ..Self::default()
        }
    }

    /// Parse settings, defaulting any missing field
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    #[inline]
    pub fn release_interval(&self) -> u32 {
        self.release_pace.interval_ticks()
    }

    /// Blocks spawn perfectly flat (no tilt draw needed)
    pub fn is_untilted(&self) -> bool {
        self.tilt_max_deg <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pace_intervals() {
        assert_eq!(ReleasePace::Brisk.interval_ticks(), 10);
        assert_eq!(ReleasePace::Relaxed.interval_ticks(), 30);
        assert_eq!(ReleasePace::Custom(0).interval_ticks(), 1);
    }

    #[test]
    fn test_pace_from_str() {
        assert_eq!(ReleasePace::from_str("SLOW"), Some(ReleasePace::Relaxed));
        assert_eq!(ReleasePace::from_str("brisk"), Some(ReleasePace::Brisk));
        assert_eq!(ReleasePace::from_str("15"), Some(ReleasePace::Custom(15)));
        assert_eq!(ReleasePace::from_str("sideways"), None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"gravity": 2.0, "release_pace": "Relaxed"}"#).unwrap();
        assert_eq!(settings.gravity, 2.0);
        assert_eq!(settings.release_interval(), 30);
        assert_eq!(settings.close_delay_ms, 50.0);
        assert_eq!(settings.panel_exit_ms, 300.0);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Settings::from_json("{\"gravity\": \"heavy\"}").is_err());
    }
}
