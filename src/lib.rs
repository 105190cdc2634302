//! Falling Blocks - labeled blocks that tumble into a stack
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, landing, release schedule, hover panels)
//! - `platform`: Host bindings (scene hosting, browser DOM)
//! - `settings`: Data-driven tuning

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{ReleasePace, Settings};

/// Layout and simulation constants
pub mod consts {
    /// Container width the baseline metrics were designed against
    pub const BASELINE_WIDTH: f32 = 500.0;
    /// Baseline block text-line height (px)
    pub const BASE_BLOCK_HEIGHT: f32 = 54.0;
    /// Baseline label font size (px)
    pub const BASE_FONT_SIZE: f32 = 54.0;
    /// Baseline vertical padding, applied above and below the label (px)
    pub const BASE_PADDING: f32 = 15.0;
    /// Baseline gap kept between stacked blocks and the floor (px)
    pub const BASE_MARGIN: f32 = 10.0;

    /// Downward acceleration per tick (px/tick²)
    pub const GRAVITY: f32 = 1.0;

    /// Share of the container width usable for spawning
    pub const SPAWN_WIDTH_FRACTION: f32 = 0.96;

    /// Link panel font size relative to the block font
    pub const PANEL_FONT_SCALE: f32 = 0.8;

    /// Viewport share taken by the container (width, height)
    pub const VIEWPORT_WIDTH_FRACTION: f32 = 0.9;
    pub const VIEWPORT_HEIGHT_FRACTION: f32 = 0.8;
}

/// Convert degrees to radians and return (sin, cos)
#[inline]
pub fn sin_cos_deg(degrees: f32) -> (f32, f32) {
    degrees.to_radians().sin_cos()
}
