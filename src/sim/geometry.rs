//! Rotation math for tilted rectangles
//!
//! Screen space: +x right, +y down, positive rotation is clockwise on screen.
//! Corner offsets are relative to the block's pivot and built from the
//! unrotated half-extents.

use glam::Vec2;

use crate::sin_cos_deg;

/// Corner offsets of an unrotated `width` x `height` box around its pivot,
/// in order: top-left, top-right, bottom-right, bottom-left.
#[inline]
pub fn local_corners(width: f32, height: f32) -> [Vec2; 4] {
    let hw = width / 2.0;
    let hh = height / 2.0;
    [
        Vec2::new(-hw, -hh),
        Vec2::new(hw, -hh),
        Vec2::new(hw, hh),
        Vec2::new(-hw, hh),
    ]
}

/// Rotate a local offset by `rotation_deg`
#[inline]
pub fn rotate_offset(offset: Vec2, rotation_deg: f32) -> Vec2 {
    let (sin, cos) = sin_cos_deg(rotation_deg);
    Vec2::new(
        offset.x * cos - offset.y * sin,
        offset.x * sin + offset.y * cos,
    )
}

/// The four corner offsets after rotation
pub fn rotated_corners(width: f32, height: f32, rotation_deg: f32) -> [Vec2; 4] {
    local_corners(width, height).map(|c| rotate_offset(c, rotation_deg))
}

/// Largest rotated Y offset among the corners (the lowest point on screen).
///
/// Landing tests add this to the block's vertical position. Landing targets
/// are computed against this exact quantity, so keep it as is.
pub fn lowest_corner_offset_y(width: f32, height: f32, rotation_deg: f32) -> f32 {
    rotated_corners(width, height, rotation_deg)
        .iter()
        .fold(f32::NEG_INFINITY, |lowest, c| lowest.max(c.y))
}

/// Project one local corner into container space
#[inline]
pub fn world_corner(pivot: Vec2, rotation_deg: f32, corner_local: Vec2) -> Vec2 {
    pivot + rotate_offset(corner_local, rotation_deg)
}

/// A corner resolved in both frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Unrotated offset from the pivot
    pub local: Vec2,
    /// Container-space position at the current rotation
    pub world: Vec2,
}

/// Corner with the greatest world Y; ties keep the earliest corner
pub fn lowest_world_corner(pivot: Vec2, width: f32, height: f32, rotation_deg: f32) -> Corner {
    let mut lowest = Corner {
        local: Vec2::ZERO,
        world: Vec2::new(0.0, f32::NEG_INFINITY),
    };
    for local in local_corners(width, height) {
        let world = world_corner(pivot, rotation_deg, local);
        if world.y > lowest.world.y {
            lowest = Corner { local, world };
        }
    }
    lowest
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_unrotated_corners_are_half_extents() {
        let corners = rotated_corners(400.0, 84.0, 0.0);
        assert_eq!(corners[0], Vec2::new(-200.0, -42.0));
        assert_eq!(corners[2], Vec2::new(200.0, 42.0));
    }

    #[test]
    fn test_lowest_offset_flat_is_half_height() {
        assert!((lowest_corner_offset_y(400.0, 84.0, 0.0) - 42.0).abs() < EPS);
    }

    #[test]
    fn test_lowest_offset_quarter_turn_is_half_width() {
        assert!((lowest_corner_offset_y(400.0, 84.0, 90.0) - 200.0).abs() < EPS);
        assert!((lowest_corner_offset_y(400.0, 84.0, -90.0) - 200.0).abs() < EPS);
    }

    #[test]
    fn test_lowest_offset_tilted() {
        // 30° clockwise: bottom-right corner drops to hw*sin + hh*cos
        let expected = 200.0 * 0.5 + 42.0 * 3f32.sqrt() / 2.0;
        assert!((lowest_corner_offset_y(400.0, 84.0, 30.0) - expected).abs() < EPS);
    }

    #[test]
    fn test_world_corner_translates_and_rotates() {
        let pivot = Vec2::new(100.0, 50.0);
        let p = world_corner(pivot, 90.0, Vec2::new(10.0, 0.0));
        assert!((p - Vec2::new(100.0, 60.0)).length() < EPS);
    }

    #[test]
    fn test_lowest_world_corner_tilt_direction() {
        let pivot = Vec2::new(0.0, 0.0);
        // Clockwise tilt drops the right side
        let c = lowest_world_corner(pivot, 400.0, 84.0, 20.0);
        assert_eq!(c.local, Vec2::new(200.0, 42.0));
        // Counter-clockwise tilt drops the left side
        let c = lowest_world_corner(pivot, 400.0, 84.0, -20.0);
        assert_eq!(c.local, Vec2::new(-200.0, 42.0));
        assert!((c.world.y - lowest_corner_offset_y(400.0, 84.0, -20.0)).abs() < EPS);
    }
}
