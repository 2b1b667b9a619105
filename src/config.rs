use crate::game_logic::errors::{TownError, TownResult};
use crate::resources::SimConfig;
use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub mod range_types;

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().and_then(|mut path| {
        path.push("townsim");
        fs::create_dir_all(&path).ok()?;
        path.push("config.toml");
        Some(path)
    })
}

/// Load the user config, falling back to defaults when it is missing or unreadable
pub fn load_config() -> SimConfig {
    let Some(config_path) = get_config_path() else {
        warn!("{}; using default settings", TownError::ConfigDirNotFound);
        return SimConfig::default();
    };
    match load_config_from(&config_path) {
        Ok(config) => config,
        Err(TownError::Io(_)) => {
            // First run: write the defaults out so they can be edited
            let config = SimConfig::default();
            if let Err(err) = save_config_to(&config, &config_path) {
                warn!("Could not write default config: {err}");
            }
            config
        }
        Err(err) => {
            warn!("Ignoring config at {}: {err}", config_path.display());
            SimConfig::default()
        }
    }
}

pub fn load_config_from(path: &Path) -> TownResult<SimConfig> {
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str::<SimConfig>(&contents)?)
}

pub fn save_config_to(config: &SimConfig, path: &Path) -> TownResult<()> {
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
