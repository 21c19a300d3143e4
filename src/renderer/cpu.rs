//! Headless CPU dispatcher
//!
//! Shades viewports with [`ViewSnapshot::shade_pixel`](crate::sim::ViewSnapshot::shade_pixel),
//! one rayon task per scanline. Each dispatch joins before returning, which
//! is the barrier between views.

use glam::{IVec2, UVec2, Vec4};
use rayon::prelude::*;

use super::dispatch::{FramePlan, RayDispatcher, ViewDispatch};
use crate::error::Result;

/// RGBA float image, row-major with a top-left origin
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameImage {
    size: UVec2,
    pixels: Vec<Vec4>,
}

impl FrameImage {
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            pixels: vec![Vec4::ZERO; (size.x * size.y) as usize],
        }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec4> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        self.pixels.get((y * self.size.x + x) as usize).copied()
    }

    fn clear(&mut self) {
        self.pixels.fill(Vec4::ZERO);
    }
}

/// Reference dispatcher rendering into a [`FrameImage`]
#[derive(Debug, Default)]
pub struct CpuDispatcher {
    image: FrameImage,
}

impl CpuDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last finished image
    pub fn image(&self) -> &FrameImage {
        &self.image
    }
}

impl RayDispatcher for CpuDispatcher {
    fn begin_frame(&mut self, plan: &FramePlan) -> Result<()> {
        if self.image.size != plan.image_size {
            log::debug!("cpu image resized to {}x{}", plan.image_size.x, plan.image_size.y);
            self.image = FrameImage::new(plan.image_size);
        } else {
            self.image.clear();
        }
        Ok(())
    }

    fn dispatch(&mut self, view: &ViewDispatch) -> Result<()> {
        let width = self.image.size.x as usize;
        if width == 0 {
            return Ok(());
        }
        let origin = view.viewport.translation;
        let size = view.viewport.size;
        let columns = origin.x as usize..(origin.x + size.x) as usize;
        let snapshot = &view.snapshot;

        self.image
            .pixels
            .par_chunks_mut(width)
            .enumerate()
            .skip(origin.y as usize)
            .take(size.y as usize)
            .for_each(|(y, row)| {
                let local_y = y as i32 - origin.y;
                for x in columns.clone() {
                    let local = IVec2::new(x as i32 - origin.x, local_y);
                    row[x] = snapshot.shade_pixel(local);
                }
            });
        Ok(())
    }

    fn finish_frame(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::dispatch::{FrameTiming, plan_frame, run_frame};
    use crate::renderer::layout::GridRule;
    use crate::sim::GameState;
    use crate::sim::view::BACKGROUND;

    fn render(players: usize, window: UVec2, rule: GridRule) -> FrameImage {
        let state = GameState::new(players);
        let plan = plan_frame(&state, window, FrameTiming::default(), rule);
        let mut dispatcher = CpuDispatcher::new();
        run_frame(&mut dispatcher, &plan).unwrap();
        dispatcher.image().clone()
    }

    #[test]
    fn test_every_viewport_pixel_is_written() {
        let image = render(2, UVec2::new(16, 8), GridRule::Balanced);
        assert_eq!(image.size(), UVec2::new(16, 8));
        assert!(image.pixels().iter().all(|p| p.w == 1.0));
    }

    #[test]
    fn test_uncovered_cell_stays_clear() {
        let image = render(3, UVec2::new(8, 8), GridRule::Balanced);
        // The fourth cell has no player
        assert_eq!(image.pixel(6, 6), Some(Vec4::ZERO));
        assert_eq!(image.pixel(1, 1).map(|p| p.w), Some(1.0));
        assert_eq!(image.pixel(6, 1).map(|p| p.w), Some(1.0));
        assert_eq!(image.pixel(1, 6).map(|p| p.w), Some(1.0));
        assert_eq!(image.pixel(8, 0), None);
    }

    #[test]
    fn test_degenerate_grid_renders_nothing() {
        let image = render(2, UVec2::new(8, 8), GridRule::Observed);
        assert!(image.pixels().iter().all(|p| *p == Vec4::ZERO));
    }

    #[test]
    fn test_players_see_each_other() {
        // Each half shows the opponent in the centre and sky at the top
        let image = render(2, UVec2::new(32, 16), GridRule::Balanced);
        for left in [0, 16] {
            let centre = image.pixel(left + 8, 8).unwrap();
            assert_ne!(centre.truncate(), BACKGROUND);
            let sky = image.pixel(left + 8, 0).unwrap();
            assert_eq!(sky.truncate(), BACKGROUND);
        }
    }

    #[test]
    fn test_resize_reallocates() {
        let state = GameState::new(1);
        let mut dispatcher = CpuDispatcher::new();
        for size in [UVec2::new(4, 4), UVec2::new(6, 2)] {
            let plan = plan_frame(&state, size, FrameTiming::default(), GridRule::Balanced);
            run_frame(&mut dispatcher, &plan).unwrap();
            assert_eq!(dispatcher.image().pixels().len(), (size.x * size.y) as usize);
        }
    }
}
