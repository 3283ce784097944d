//! Circular orbit updates.

use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

/// Wraps an angle in radians into `[0, 2π)`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Moves `position` along a circle around `center`.
///
/// The angle is re-derived from the two positions every call and the radius is
/// the current distance between them in the XZ plane, so drift corrects
/// itself. The height of `position` is kept.
pub fn orbit(position: Vec3, center: Vec3, angular_speed: f32, dt: f32) -> Vec3 {
    let angle = position.z.atan2(position.x) - center.z.atan2(center.x);
    let angle = wrap_angle(angle + angular_speed * dt);
    let radius = Vec2::new(position.x - center.x, position.z - center.z).length();

    Vec3::new(
        center.x + angle.cos() * radius,
        position.y,
        center.z + angle.sin() * radius,
    )
}

/// Orbit with a caller-owned angle accumulator and a fixed radius.
///
/// Used for bodies whose center moves itself, where re-deriving the angle from
/// positions would pick up the parent's own motion.
pub fn orbit_tethered(
    position: Vec3,
    center: Vec3,
    angular_speed: f32,
    dt: f32,
    radius: f32,
    angle: &mut f32,
) -> Vec3 {
    *angle = wrap_angle(*angle + angular_speed * dt);

    Vec3::new(
        center.x + angle.cos() * radius,
        position.y,
        center.z + angle.sin() * radius,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wrap_stays_in_range() {
        for raw in [-7.0_f32, -TAU, -0.1, 0.0, 1.0, TAU, TAU + 0.5, 100.0] {
            let w = wrap_angle(raw);
            assert!((0.0..TAU).contains(&w), "{raw} wrapped to {w}");
        }
        assert_relative_eq!(wrap_angle(TAU + 0.5), 0.5, epsilon = 1e-5);
    }

    #[test]
    fn orbit_keeps_radius_around_origin() {
        let mut pos = Vec3::new(0.0, 0.0, -40.0);
        for _ in 0..500 {
            pos = orbit(pos, Vec3::ZERO, 1.1, 0.016);
            assert_relative_eq!(pos.length(), 40.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn full_period_returns_to_start() {
        let start = Vec3::new(0.0, 2.0, -20.0);
        let speed = 1.5;
        let steps = 1000;
        let dt = TAU / speed / steps as f32;

        let mut pos = start;
        for _ in 0..steps {
            pos = orbit(pos, Vec3::ZERO, speed, dt);
        }
        assert_relative_eq!(pos.x, start.x, epsilon = 0.05);
        assert_relative_eq!(pos.y, start.y);
        assert_relative_eq!(pos.z, start.z, epsilon = 0.05);
    }

    #[test]
    fn height_offset_keeps_planar_radius() {
        let center = Vec3::new(0.0, -3.0, 0.0);
        let mut pos = Vec3::new(6.0, 4.0, 8.0);
        for _ in 0..200 {
            pos = orbit(pos, center, 0.7, 0.05);
        }
        let planar = Vec2::new(pos.x - center.x, pos.z - center.z).length();
        assert_relative_eq!(planar, 10.0, epsilon = 1e-3);
        assert_relative_eq!(pos.y, 4.0);
    }

    #[test]
    fn zero_dt_leaves_position_unchanged() {
        let start = Vec3::new(3.0, 0.0, 4.0);
        let pos = orbit(start, Vec3::ZERO, 2.0, 0.0);
        assert_relative_eq!(pos.x, 3.0, epsilon = 1e-5);
        assert_relative_eq!(pos.z, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn tethered_follows_moving_center() {
        let mut angle = 0.0;
        let center = Vec3::new(10.0, 0.0, 10.0);
        let pos = orbit_tethered(Vec3::ZERO, center, 0.0, 1.0, 8.0, &mut angle);
        assert_relative_eq!(pos.x, 18.0);
        assert_relative_eq!(pos.z, 10.0);

        let moved = Vec3::new(-5.0, 0.0, 0.0);
        let pos = orbit_tethered(pos, moved, 0.0, 1.0, 8.0, &mut angle);
        assert_relative_eq!(pos.x, 3.0);
        assert_relative_eq!(pos.distance(moved), 8.0, epsilon = 1e-5);
    }

    #[test]
    fn tethered_angle_accumulates_and_wraps() {
        let mut angle = TAU - 0.1;
        orbit_tethered(Vec3::ZERO, Vec3::ZERO, 4.0, 0.05, 8.0, &mut angle);
        assert_relative_eq!(angle, 0.1, epsilon = 1e-4);
    }
}
