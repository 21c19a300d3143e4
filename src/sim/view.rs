//! Per-pixel kernel for one player's viewport
//!
//! A [`ViewSnapshot`] is everything a lane needs to shade one pixel. The
//! CPU dispatcher calls [`ViewSnapshot::shade_pixel`] directly; the compute
//! shader is a line-for-line port of it.

use glam::{IVec2, Vec2, Vec3, Vec4};

use super::march::{march, normal};
use super::scene::{SceneSnapshot, enclosure};
use super::sdf::look_at;

/// Colour written where a ray escapes (also the clear colour)
pub const BACKGROUND: Vec3 = Vec3::new(0.2, 0.1, 0.0);
/// Colour far hits fade into
pub const FOG: Vec3 = Vec3::new(0.2, 0.1, 0.0);
const AVATAR_ALBEDO: Vec3 = Vec3::new(0.9, 0.35, 0.2);
const GROUND_ALBEDO: Vec3 = Vec3::new(0.55, 0.6, 0.65);
const AMBIENT: f32 = 0.15;
const LIGHT_DIR: Vec3 = Vec3::new(0.3, 1.0, 0.5);

/// Frame-wide values shared by every viewport of one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameGlobals {
    /// Size of one grid cell in pixels
    pub render_size: IVec2,
    /// Seconds since start
    pub elapsed_time: f32,
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Pointer position with a bottom-left origin
    pub mouse_coord: IVec2,
}

/// Immutable inputs of one viewport dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSnapshot {
    pub frame: FrameGlobals,
    pub scene: SceneSnapshot,
    pub camera_pos: Vec3,
    /// Unit view direction
    pub camera_dir: Vec3,
    /// Top-left pixel of the viewport in the output image
    pub render_translation: IVec2,
}

impl ViewSnapshot {
    /// Camera ray through the centre of `local` (viewport-relative pixel)
    pub fn primary_ray(&self, local: IVec2) -> (Vec3, Vec3) {
        let size = self.frame.render_size.as_vec2().max(Vec2::ONE);
        let mut uv = (local.as_vec2() + 0.5 - size * 0.5) / size.y;
        // Image rows grow downward, world up is +Y
        uv.y = -uv.y;
        let dir = (look_at(self.camera_dir) * uv.extend(1.0)).normalize();
        (self.camera_pos, dir)
    }

    /// Shade one viewport-relative pixel, alpha is always 1
    pub fn shade_pixel(&self, local: IVec2) -> Vec4 {
        let (origin, dir) = self.primary_ray(local);
        let scene = |p: Vec3| self.scene.distance(p);
        let result = march(scene, origin, dir);
        if !result.hit {
            return BACKGROUND.extend(1.0);
        }

        let n = normal(scene, result.point);
        let albedo = if self.scene.avatars(result.point) <= enclosure(result.point) {
            AVATAR_ALBEDO
        } else {
            GROUND_ALBEDO
        };
        let diffuse = n.dot(LIGHT_DIR.normalize()).max(0.0);
        let lit = albedo * (AMBIENT + diffuse);
        lit.lerp(FOG, result.step_fraction.clamp(0.0, 1.0)).extend(1.0)
    }
}
