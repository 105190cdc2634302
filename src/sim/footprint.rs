//! Rectangles left behind by landed blocks

use serde::{Deserialize, Serialize};

/// Resting rectangle of a landed block, in container pixels.
/// `x`/`y` is the block's layout anchor (left/top of the flat box).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandedFootprint {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LandedFootprint {
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Spans overlap unless one lies strictly left or right of the other;
    /// touching edges count as overlapping.
    #[inline]
    pub fn overlaps_span(&self, left: f32, right: f32) -> bool {
        !(right < self.x || left > self.right())
    }
}

/// Append-only list of footprints for one scene
#[derive(Debug, Clone, Default)]
pub struct LandedFootprints {
    items: Vec<LandedFootprint>,
}

impl LandedFootprints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LandedFootprint> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[LandedFootprint] {
        &self.items
    }

    /// Only a block at its landing instant records itself
    pub(crate) fn record(&mut self, footprint: LandedFootprint) {
        self.items.push(footprint);
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    /// Highest resting Y (smallest value) for a block occupying
    /// `[left, left + width]`: the floor, raised by every overlapping footprint.
    pub fn landing_y(&self, left: f32, width: f32, height: f32, floor: f32, margin: f32) -> f32 {
        let right = left + width;
        self.items
            .iter()
            .filter(|fp| fp.overlaps_span(left, right))
            .map(|fp| fp.y - height - margin)
            .fold(floor - height - margin, f32::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(x: f32, y: f32, width: f32) -> LandedFootprint {
        LandedFootprint {
            x,
            y,
            width,
            height: 84.0,
        }
    }

    #[test]
    fn test_empty_lands_on_floor() {
        let footprints = LandedFootprints::new();
        assert_eq!(footprints.landing_y(50.0, 400.0, 84.0, 600.0, 10.0), 506.0);
    }

    #[test]
    fn test_overlapping_footprint_raises_surface() {
        let mut footprints = LandedFootprints::new();
        footprints.record(fp(50.0, 500.0, 400.0));
        assert_eq!(footprints.landing_y(50.0, 400.0, 84.0, 600.0, 10.0), 406.0);
    }

    #[test]
    fn test_touching_edges_overlap() {
        let a = fp(100.0, 500.0, 100.0);
        assert!(a.overlaps_span(200.0, 300.0));
        assert!(a.overlaps_span(0.0, 100.0));
        assert!(!a.overlaps_span(200.5, 300.0));
        assert!(!a.overlaps_span(0.0, 99.5));
    }

    #[test]
    fn test_highest_overlap_wins() {
        let mut footprints = LandedFootprints::new();
        footprints.record(fp(0.0, 506.0, 200.0));
        footprints.record(fp(0.0, 412.0, 200.0));
        // Not overlapping: ignored even though it is higher
        footprints.record(fp(400.0, 100.0, 50.0));
        assert_eq!(footprints.landing_y(50.0, 100.0, 84.0, 600.0, 10.0), 318.0);
        assert_eq!(footprints.len(), 3);
    }
}
