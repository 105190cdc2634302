//! Deterministic simulation module
//!
//! Everything that decides where blocks go lives here. This module must stay
//! pure and deterministic:
//! - One integration step per tick, no wall-clock scaling
//! - Seeded RNG only
//! - Release order follows the configured block order
//! - No DOM or platform dependencies; timers run on a host-supplied clock

pub mod block;
pub mod config;
pub mod footprint;
pub mod geometry;
pub mod panel;
pub mod scene;
pub mod timers;

pub use block::{Block, BlockPhase, BlockTransform};
pub use config::{BlockConfig, ContainerDimensions, default_blocks, is_external_link};
pub use footprint::{LandedFootprint, LandedFootprints};
pub use geometry::{lowest_corner_offset_y, lowest_world_corner, rotated_corners, world_corner};
pub use panel::{HoverTarget, PanelCommand, PanelLayout, PanelPhase, SlideDirection};
pub use scene::{FrameTicket, Navigation, Scene, SceneEvent, TickOutcome};
pub use timers::TimerQueue;
