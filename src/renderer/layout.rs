//! Split-screen viewport layout

use glam::{IVec2, UVec2};
use serde::{Deserialize, Serialize};

/// Formula mapping a player count to a grid of viewports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GridRule {
    /// `columns = n % 2`, `rows = n / 2 + 1`; even counts have no columns
    /// and render nothing, odd counts above one overlap
    Observed,
    /// Two columns at most, as many rows as needed
    #[default]
    Balanced,
}

impl GridRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            GridRule::Observed => "Observed",
            GridRule::Balanced => "Balanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "observed" => Some(GridRule::Observed),
            "balanced" => Some(GridRule::Balanced),
            _ => None,
        }
    }

    /// (columns, rows) for `count` players
    pub fn grid_dims(&self, count: usize) -> UVec2 {
        let n = count as u32;
        match self {
            GridRule::Observed => UVec2::new(n % 2, n / 2 + 1),
            GridRule::Balanced => UVec2::new(n.min(2), n.div_ceil(2)),
        }
    }
}

/// Pixel rectangle of one player's view inside the output image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Player rendered into this rectangle
    pub player: usize,
    /// Top-left corner
    pub translation: IVec2,
    /// Clipped size, never zero on either axis
    pub size: IVec2,
}

impl Viewport {
    pub fn area(&self) -> i64 {
        self.size.x as i64 * self.size.y as i64
    }
}

/// Grid cell size plus the surviving viewports of one frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Layout {
    /// Unclipped cell size, the render size every view projects with
    pub cell: IVec2,
    pub viewports: Vec<Viewport>,
}

/// Lay out `count` viewports over an image of `window` pixels
///
/// A degenerate grid yields an empty layout; rectangles are clipped to the
/// image and dropped when nothing is left of them.
pub fn layout(window: UVec2, count: usize, rule: GridRule) -> Layout {
    let grid = rule.grid_dims(count);
    if grid.x == 0 || grid.y == 0 || window.x == 0 || window.y == 0 {
        return Layout::default();
    }

    let cell = UVec2::new(window.x.div_ceil(grid.x), window.y.div_ceil(grid.y)).as_ivec2();
    let image = window.as_ivec2();
    let stride = match rule {
        GridRule::Observed => {
            UVec2::new(window.x.div_ceil(2), window.y.div_ceil(2)).as_ivec2()
        }
        GridRule::Balanced => cell,
    };
    let columns = match rule {
        GridRule::Observed => 2,
        GridRule::Balanced => grid.x as usize,
    };

    let viewports = (0..count)
        .filter_map(|player| {
            let slot = IVec2::new((player % columns) as i32, (player / columns) as i32);
            let translation = slot * stride;
            let size = cell.min(image - translation).max(IVec2::ZERO);
            (size.x > 0 && size.y > 0).then_some(Viewport {
                player,
                translation,
                size,
            })
        })
        .collect();

    Layout { cell, viewports }
}
