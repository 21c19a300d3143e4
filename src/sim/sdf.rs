//! Signed distance primitives
//!
//! Standard Euclidean SDFs (negative inside) so shapes combine with plain
//! `min`/`max`/negation. `shaders/march.wgsl` carries the same formulas.

use glam::{Mat2, Mat3, Vec2, Vec3, Vec4};

/// Signed distance to a sphere of radius `r` at the origin
#[inline]
pub fn sphere(p: Vec3, r: f32) -> f32 {
    p.length() - r
}

/// Signed distance to a box with per-axis half extents and rounded corners
///
/// `corner` is carved out of the extents, so the outer size stays `half`.
#[inline]
pub fn round_box(p: Vec3, half: Vec3, corner: f32) -> f32 {
    (p.abs() - (half - corner)).max(Vec3::ZERO).length() - corner
}

/// Rounded box packed as `(half.x, half.y, half.z, corner)`
#[inline]
pub fn round_box4(p: Vec3, r: Vec4) -> f32 {
    round_box(p, r.truncate(), r.w)
}

/// Rounded cube with uniform half extent
#[inline]
pub fn round_cube(p: Vec3, half: f32, corner: f32) -> f32 {
    round_box(p, Vec3::splat(half), corner)
}

/// Cube with sharp corners
#[inline]
pub fn cube(p: Vec3, half: f32) -> f32 {
    round_cube(p, half, 0.0)
}

/// Box with sharp corners
#[inline]
pub fn box3(p: Vec3, half: Vec3) -> f32 {
    round_box(p, half, 0.0)
}

/// Fast uniform box: exact inside, a lower bound outside
#[inline]
pub fn quick_cube(p: Vec3, half: f32) -> f32 {
    p.abs().max_element() - half
}

/// Fast axis-aligned box (Chebyshev distance to the faces)
#[inline]
pub fn quick_box(p: Vec3, half: Vec3) -> f32 {
    (p.abs() - half).max_element()
}

/// Signed distance to the plane `dot(p, n) = offset` (n must be unit length)
#[inline]
pub fn plane(p: Vec3, n: Vec3, offset: f32) -> f32 {
    p.dot(n) - offset
}

/// Capsule around the segment `a..b`
pub fn line(p: Vec3, a: Vec3, b: Vec3, r: f32) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let h = (ap.dot(ab) / ab.dot(ab)).clamp(0.0, 1.0);
    (ap - ab * h).length() - r
}

/// Torus lying in the XY plane, `radii = (major, minor)`
pub fn torus(p: Vec3, radii: Vec2) -> f32 {
    let ring = Vec3::new(p.x, p.y, 0.0).normalize_or_zero() * radii.x;
    (ring - p).length() - radii.y
}

/// Turn a solid distance into a shell of the given thickness
#[inline]
pub fn onion(d: f32, thickness: f32) -> f32 {
    (d + thickness).abs() - thickness
}

/// Stretch space between `a` and `b` (apply before evaluating a primitive)
#[inline]
pub fn elongate(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    p.min(a).max(p - b)
}

/// Right vector of a facing direction (not normalized)
#[inline]
pub fn right(dir: Vec3) -> Vec3 {
    dir.cross(Vec3::Y)
}

/// Reflect `v` off a surface with unit normal `n`
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Orthonormal basis with columns (right, up, dir) for a unit facing vector
///
/// `dir` must not be parallel to +Y.
pub fn look_at(dir: Vec3) -> Mat3 {
    let r = dir.cross(Vec3::Y).normalize();
    let u = r.cross(dir).normalize();
    Mat3::from_cols(r, u, dir)
}

/// 2D rotation by `angle` radians
pub fn rotate_xy(angle: f32) -> Mat2 {
    let (s, c) = angle.sin_cos();
    Mat2::from_cols_array(&[c, -s, s, c])
}
