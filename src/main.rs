//! Split March entry point
//!
//! Usage: `split-march [settings.json]`
//!
//! `SPLIT_MARCH_GRID=observed|balanced` overrides the viewport grid rule.

use std::path::PathBuf;

use anyhow::Context;
use split_march::Settings;
use split_march::renderer::GridRule;
use split_march::settings::DEFAULT_SETTINGS_FILE;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let first_run = !path.exists();
    let mut settings = Settings::load(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    if first_run {
        if let Err(e) = settings.save(&path) {
            log::warn!("could not write default settings: {e}");
        }
    }

    if let Ok(rule) = std::env::var("SPLIT_MARCH_GRID") {
        match GridRule::from_str(&rule) {
            Some(rule) => settings.grid_rule = rule,
            None => {
                let current = settings.grid_rule.as_str();
                log::warn!("unknown grid rule {rule:?}, keeping {current}");
            }
        }
    }

    log::info!(
        "Split March starting with {} players ({} grid)",
        settings.effective_player_count(),
        settings.grid_rule.as_str()
    );

    split_march::platform::run(settings).context("split-march stopped with a fatal error")
}
