//! A single falling block
//!
//! Blocks integrate themselves once per tick until their lowest corner
//! reaches the landing surface, then snap flat around that corner and
//! freeze. Position is the layout anchor (left/top of the flat box); the
//! rotation math pivots about that anchor.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::{BlockConfig, ContainerDimensions};
use super::footprint::{LandedFootprint, LandedFootprints};
use super::geometry::{lowest_corner_offset_y, lowest_world_corner};
use crate::consts::SPAWN_WIDTH_FRACTION;
use crate::settings::Settings;

/// Block lifecycle (one-way)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockPhase {
    Falling,
    Landed,
}

/// Kinematic state of one block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Release index (position in the configured block list)
    pub index: usize,
    pub pos: Vec2,
    /// Degrees, positive is clockwise on screen
    pub rotation: f32,
    /// Vertical speed (px/tick)
    pub velocity: f32,
    pub width: f32,
    pub height: f32,
    pub phase: BlockPhase,
    /// Unrotated offset of the corner that touched down, set on landing
    pub contact: Option<Vec2>,
}

/// What the presentation layer needs to place a block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockTransform {
    pub left: f32,
    pub top: f32,
    pub rotation_deg: f32,
    /// Rotation origin inside the block box once landed (the contact corner)
    pub origin: Option<Vec2>,
}

impl Block {
    /// Build a block at its release position. Pure: nothing is attached
    /// to any surface here.
    pub fn spawn(
        index: usize,
        config: &BlockConfig,
        dims: &ContainerDimensions,
        settings: &Settings,
        rng: &mut impl Rng,
    ) -> Self {
        let width = config.relative_width * dims.width;
        let height = dims.block_outer_height();

        let rotation = if settings.is_untilted() {
            0.0
        } else {
            let span = settings.tilt_max_deg - settings.tilt_min_deg;
            let base = settings.tilt_min_deg + rng.random::<f32>() * span;
            if rng.random_bool(0.5) { base } else { -base }
        };

        let max_x = dims.width * SPAWN_WIDTH_FRACTION - width;
        let jitter = dims.width * settings.jitter_fraction;
        let x = max_x / 2.0 + rng.random::<f32>() * jitter * 2.0 - jitter;
        let y = settings.spawn_offset_y - index as f32 * settings.spawn_stagger_y;

        Self {
            index,
            pos: Vec2::new(x, y),
            rotation,
            velocity: 0.0,
            width,
            height,
            phase: BlockPhase::Falling,
            contact: None,
        }
    }

    #[inline]
    pub fn is_landed(&self) -> bool {
        self.phase == BlockPhase::Landed
    }

    /// Lowest point of the tilted block
    #[inline]
    pub fn bottom_y(&self) -> f32 {
        self.pos.y + lowest_corner_offset_y(self.width, self.height, self.rotation)
    }

    /// Resting Y this block would take at its current horizontal span
    pub fn landing_y(&self, footprints: &LandedFootprints, dims: &ContainerDimensions) -> f32 {
        footprints.landing_y(self.pos.x, self.width, self.height, dims.height, dims.margin)
    }

    /// Advance one tick. Returns true on the tick the block lands.
    pub fn integrate(
        &mut self,
        footprints: &mut LandedFootprints,
        dims: &ContainerDimensions,
        gravity: f32,
    ) -> bool {
        if self.is_landed() {
            return false;
        }

        self.velocity += gravity;
        self.pos.y += self.velocity;

        let landing_y = self.landing_y(footprints, dims);
        if self.bottom_y() >= landing_y {
            self.land(landing_y, footprints);
            return true;
        }
        false
    }

    /// Snap flat with the contact corner held in place, then record the footprint
    fn land(&mut self, landing_y: f32, footprints: &mut LandedFootprints) {
        let contact = lowest_world_corner(self.pos, self.width, self.height, self.rotation);
        let half_height = self.height / 2.0;

        let final_center = Vec2::new(contact.world.x - contact.local.x, landing_y + half_height);

        self.pos = Vec2::new(final_center.x, final_center.y - half_height);
        self.rotation = 0.0;
        self.velocity = 0.0;
        self.contact = Some(contact.local);
        self.phase = BlockPhase::Landed;

        footprints.record(self.footprint());
    }

    pub fn footprint(&self) -> LandedFootprint {
        LandedFootprint {
            x: self.pos.x,
            y: self.pos.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn transform(&self) -> BlockTransform {
        let half = Vec2::new(self.width / 2.0, self.height / 2.0);
        BlockTransform {
            left: self.pos.x,
            top: self.pos.y,
            rotation_deg: self.rotation,
            origin: self.contact.map(|c| half + c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn dims() -> ContainerDimensions {
        ContainerDimensions::from_container(500.0, 600.0)
    }

    fn spawn(index: usize, relative_width: f32, settings: &Settings, seed: u64) -> Block {
        let mut rng = Pcg32::seed_from_u64(seed);
        Block::spawn(index, &BlockConfig::new("X", relative_width), &dims(), settings, &mut rng)
    }

    fn fall(block: &mut Block, footprints: &mut LandedFootprints) -> u32 {
        let mut ticks = 0;
        while !block.integrate(footprints, &dims(), 1.0) {
            ticks += 1;
            assert!(ticks < 10_000, "block never landed");
        }
        ticks
    }

    #[test]
    fn test_spawn_geometry() {
        let settings = Settings::default();
        for seed in 0..20 {
            let block = spawn(2, 0.8, &settings, seed);
            assert!((block.width - 400.0).abs() < 1e-3);
            assert_eq!(block.height, 84.0);
            assert_eq!(block.pos.y, -200.0);
            let tilt = block.rotation.abs();
            assert!((10.0..=30.0).contains(&tilt), "tilt {tilt}");
            // Centered within ±4% of the container width
            let centered = (500.0 * 0.96 - 400.0) / 2.0;
            assert!((block.pos.x - centered).abs() <= 20.0 + 1e-3);
            assert_eq!(block.phase, BlockPhase::Falling);
        }
    }

    #[test]
    fn test_single_block_lands_on_floor() {
        let mut footprints = LandedFootprints::new();
        let mut block = spawn(0, 0.8, &Settings::default(), 7);
        fall(&mut block, &mut footprints);

        assert!(block.is_landed());
        assert_eq!(block.rotation, 0.0);
        assert!((block.pos.y + block.height - 590.0).abs() < 1e-3);
        assert_eq!(footprints.len(), 1);
        assert_eq!(footprints.as_slice()[0], block.footprint());
    }

    #[test]
    fn test_landed_block_is_frozen() {
        let mut footprints = LandedFootprints::new();
        let mut block = spawn(0, 0.5, &Settings::default(), 3);
        fall(&mut block, &mut footprints);

        let before = block.clone();
        for _ in 0..10 {
            assert!(!block.integrate(&mut footprints, &dims(), 1.0));
        }
        assert_eq!(block.pos, before.pos);
        assert_eq!(block.rotation, 0.0);
        assert_eq!(footprints.len(), 1);
    }

    #[test]
    fn test_stacks_on_overlapping_footprint() {
        let mut footprints = LandedFootprints::new();
        footprints.record(LandedFootprint {
            x: 0.0,
            y: 500.0,
            width: 500.0,
            height: 84.0,
        });
        let mut block = spawn(0, 0.8, &Settings::default(), 11);
        fall(&mut block, &mut footprints);
        assert!((block.pos.y - 406.0).abs() < 1e-3);
        assert!(block.pos.y + block.height <= 500.0 - 10.0 + 1e-3);
    }

    #[test]
    fn test_landing_pivots_on_contact_corner() {
        let settings = Settings {
            tilt_min_deg: 20.0,
            tilt_max_deg: 20.0,
            jitter_fraction: 0.0,
            ..Settings::default()
        };
        let mut block = spawn(0, 0.8, &settings, 5);
        let mut footprints = LandedFootprints::new();

        // Step until the tick before landing, then predict the snap
        loop {
            let mut ahead = block.clone();
            let mut scratch = footprints.clone();
            if ahead.integrate(&mut scratch, &dims(), 1.0) {
                break;
            }
            block.integrate(&mut footprints, &dims(), 1.0);
        }
        let mut moved = block.clone();
        moved.velocity += 1.0;
        moved.pos.y += moved.velocity;
        let contact = lowest_world_corner(moved.pos, moved.width, moved.height, moved.rotation);

        assert!(block.integrate(&mut footprints, &dims(), 1.0));
        assert!((block.pos.x - (contact.world.x - contact.local.x)).abs() < 1e-3);
        assert_eq!(block.contact, Some(contact.local));

        let t = block.transform();
        assert_eq!(t.rotation_deg, 0.0);
        let origin = t.origin.unwrap();
        assert!(origin.y > block.height - 1e-3, "contact is a bottom corner");
    }

    #[test]
    fn test_flat_block_keeps_its_column() {
        let settings = Settings {
            tilt_min_deg: 0.0,
            tilt_max_deg: 0.0,
            ..Settings::default()
        };
        let mut block = spawn(0, 0.4, &settings, 9);
        let x = block.pos.x;
        fall(&mut block, &mut LandedFootprints::new());
        assert!((block.pos.x - x).abs() < 1e-3);
    }
}
