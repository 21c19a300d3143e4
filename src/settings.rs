//! Demo settings
//!
//! Read from a JSON file next to the binary; every field has a default, so
//! partial files are fine.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_PLAYERS;
use crate::error::{Error, Result};
use crate::renderer::layout::GridRule;

/// File read when no path is given on the command line
pub const DEFAULT_SETTINGS_FILE: &str = "split-march.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Window ===
    pub window_width: u32,
    pub window_height: u32,
    pub title: String,
    /// Present without waiting for vblank when false
    pub vsync: bool,

    // === Players ===
    /// Players spawned at start (clamped to 1..=4)
    pub player_count: usize,
    /// Slot driven by keyboard and mouse; the others read gamepads in order
    pub keyboard_player: usize,
    /// Viewport grid formula
    pub grid_rule: GridRule,

    // === Shaders ===
    pub compute_shader: String,
    pub display_shader: String,
    /// Rebuild the compute shader when its file changes
    pub hot_reload: bool,

    // === HUD ===
    /// Print frames per second once a second
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            title: "split-march".to_string(),
            vsync: false,

            player_count: 2,
            keyboard_player: 1,
            grid_rule: GridRule::Balanced,

            compute_shader: "shaders/march.wgsl".to_string(),
            display_shader: "shaders/display.wgsl".to_string(),
            hot_reload: true,

            show_fps: true,
        }
    }
}

impl Settings {
    /// Player count after clamping to the supported range
    pub fn effective_player_count(&self) -> usize {
        self.player_count.clamp(1, MAX_PLAYERS)
    }

    /// Load settings from `path`; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(json) => {
                let settings = serde_json::from_str(&json)?;
                log::info!("Loaded settings from {:?}", path);
                Ok(settings)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("{:?} not found, using default settings", path);
                Ok(Self::default())
            }
            Err(source) => Err(Error::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Save settings to `path` as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {:?}", path);
        Ok(())
    }
}
