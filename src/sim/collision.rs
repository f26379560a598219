//! Collision detection for circular entities
//!
//! Every entity is a circle; contact means the centre distance is strictly
//! less than the sum of the radii.

use glam::Vec2;

/// Whether two circles overlap
#[inline]
pub fn circles_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a_pos.distance_squared(b_pos) < reach * reach
}

/// Whether `point` lies strictly within `radius` of `center` (splash checks)
#[inline]
pub fn within_radius(center: Vec2, point: Vec2, radius: f32) -> bool {
    center.distance_squared(point) < radius * radius
}

/// Whether `pos` is outside the arena `[0, bounds]` extended by `margin`
#[inline]
pub fn is_out_of_bounds(pos: Vec2, bounds: Vec2, margin: f32) -> bool {
    pos.x < -margin || pos.x > bounds.x + margin || pos.y < -margin || pos.y > bounds.y + margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circles_overlap() {
        let a = Vec2::new(0.0, 0.0);
        assert!(circles_overlap(a, 4.0, Vec2::new(20.0, 0.0), 20.0));
        // Touching exactly is not contact
        assert!(!circles_overlap(a, 4.0, Vec2::new(24.0, 0.0), 20.0));
        assert!(!circles_overlap(a, 4.0, Vec2::new(30.0, 0.0), 20.0));
    }

    #[test]
    fn test_within_radius() {
        assert!(within_radius(Vec2::ZERO, Vec2::new(99.0, 0.0), 100.0));
        assert!(!within_radius(Vec2::ZERO, Vec2::new(100.0, 0.0), 100.0));
    }

    #[test]
    fn test_out_of_bounds() {
        let bounds = Vec2::new(800.0, 600.0);
        assert!(!is_out_of_bounds(Vec2::new(-49.0, 10.0), bounds, 50.0));
        assert!(is_out_of_bounds(Vec2::new(-51.0, 10.0), bounds, 50.0));
        assert!(is_out_of_bounds(Vec2::new(10.0, 651.0), bounds, 50.0));
        assert!(!is_out_of_bounds(Vec2::new(850.0, 650.0), bounds, 50.0));
    }
}
