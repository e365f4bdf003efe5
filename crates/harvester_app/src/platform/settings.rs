use std::path::{Path, PathBuf};

use anyhow::Context;
use engine_logging::engine_info;
use harvester_engine::HarvestSettings;

const DEFAULT_SETTINGS_FILE: &str = "./harvester.ron";

/// Load settings from `explicit`, else from `./harvester.ron` when it exists,
/// else fall back to built-in defaults.
pub(crate) fn load_settings(explicit: Option<&Path>) -> anyhow::Result<HarvestSettings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_SETTINGS_FILE);
            if !fallback.is_file() {
                engine_info!("no settings file; using defaults");
                return Ok(HarvestSettings::default());
            }
            fallback
        }
    };

    let settings = HarvestSettings::load(&path)
        .with_context(|| format!("loading settings from {}", path.display()))?;
    engine_info!("loaded settings from {}", path.display());
    Ok(settings)
}
