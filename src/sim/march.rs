//! Sphere tracing over any distance field
//!
//! Generic over `Fn(Vec3) -> f32` so the same loop runs against the full
//! scene or a single test primitive.

use glam::Vec3;

use crate::consts::{
    MARCH_HIT_DISTANCE, MARCH_MAX_DISTANCE, MARCH_MAX_STEPS, MARCH_STEP_SCALE, NORMAL_EPSILON,
};

/// Outcome of one marched ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchResult {
    /// Last sampled position along the ray
    pub point: Vec3,
    pub hit: bool,
    /// Iteration progress (`i / 100`), may exceed 1.0 for late hits
    pub step_fraction: f32,
}

/// March from `origin` along unit `dir` until the field reports a surface
///
/// Fails when the travelled distance exceeds [`MARCH_MAX_DISTANCE`] or the
/// iteration budget runs out.
pub fn march<F>(scene: F, origin: Vec3, dir: Vec3) -> MarchResult
where
    F: Fn(Vec3) -> f32,
{
    let mut point = origin;
    let mut travelled = 0.0;
    let mut step_fraction = 0.0;

    for i in 0..MARCH_MAX_STEPS {
        let d = scene(point);
        travelled += d;
        point = origin + dir * travelled;
        step_fraction = i as f32 / MARCH_STEP_SCALE;

        if d < MARCH_HIT_DISTANCE {
            return MarchResult {
                point,
                hit: true,
                step_fraction,
            };
        }
        if travelled > MARCH_MAX_DISTANCE {
            break;
        }
    }

    MarchResult {
        point,
        hit: false,
        step_fraction,
    }
}

/// Surface normal from one-sided differences of the field
///
/// An approximation: near primitive seams the field is not smooth.
pub fn normal<F>(scene: F, p: Vec3) -> Vec3
where
    F: Fn(Vec3) -> f32,
{
    let d = scene(p);
    let e = NORMAL_EPSILON;
    Vec3::new(
        d - scene(p - Vec3::new(e, 0.0, 0.0)),
        d - scene(p - Vec3::new(0.0, e, 0.0)),
        d - scene(p - Vec3::new(0.0, 0.0, e)),
    )
    .normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::sdf::sphere;

    fn unit_sphere(p: Vec3) -> f32 {
        sphere(p, 1.0)
    }

    #[test]
    fn test_march_hits_unit_sphere() {
        let result = march(unit_sphere, Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(result.hit);
        assert!((result.point - Vec3::new(0.0, 0.0, 1.0)).length() < 0.01);
    }

    #[test]
    fn test_march_misses_past_max_distance() {
        let origin = Vec3::new(0.0, 5.0, 0.0);
        let result = march(unit_sphere, origin, Vec3::Y);
        assert!(!result.hit);
        assert!((result.point - origin).length() > MARCH_MAX_DISTANCE);
        assert!(result.step_fraction < MARCH_MAX_STEPS as f32 / MARCH_STEP_SCALE);
    }

    #[test]
    fn test_march_grazing_ray_uses_more_steps() {
        let direct = march(unit_sphere, Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let grazing = march(unit_sphere, Vec3::new(0.0, 0.995, 5.0), Vec3::NEG_Z);
        assert!(grazing.hit);
        assert!(grazing.step_fraction > direct.step_fraction);
    }

    #[test]
    fn test_march_exhausts_budget_on_flat_field() {
        // A field that never shrinks below the hit distance but never moves far
        let result = march(|_| 0.05, Vec3::ZERO, Vec3::X);
        assert!(!result.hit);
        assert!((result.point.x - MARCH_MAX_STEPS as f32 * 0.05).abs() < 1e-3);
        assert!(
            (result.step_fraction - (MARCH_MAX_STEPS - 1) as f32 / MARCH_STEP_SCALE).abs() < 1e-6
        );
    }

    #[test]
    fn test_normal_on_unit_sphere() {
        let n = normal(unit_sphere, Vec3::X);
        assert!((n - Vec3::X).length() < 1e-2);

        let n = normal(unit_sphere, Vec3::NEG_Y);
        assert!((n - Vec3::NEG_Y).length() < 1e-2);
    }
}
