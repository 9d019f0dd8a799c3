//! Demo settings loaded from `glade.toml` in the working directory.

use std::fs;
use std::path::Path;

use anyhow::{bail, Result};
use glade_core::TimeConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Settings for the headless simulation demo.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimSettings {
    pub time: TimeConfig,
    pub world: WorldSettings,
    pub run: RunSettings,
}

/// Arena layout and population.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Arena size in tiles; the outermost ring is solid wall.
    pub width: i32,
    pub height: i32,
    /// Number of solid movers to scatter inside the walls.
    pub entity_count: u32,
    pub seed: u64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: 32,
            height: 24,
            entity_count: 50,
            seed: 7,
        }
    }
}

impl WorldSettings {
    /// Movers spawn at least two tiles in from each wall, so a populated
    /// arena needs room for that margin on both axes.
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            bail!("arena {}x{} has non-positive dimensions", self.width, self.height);
        }
        if self.entity_count > 0 && (self.width < 5 || self.height < 5) {
            bail!(
                "arena {}x{} is too small to spawn movers (minimum 5x5)",
                self.width,
                self.height
            );
        }
        Ok(())
    }
}

/// How long the demo runs and at what synthetic frame rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub frames: u32,
    /// Raw delta fed to the clock per frame, in seconds.
    pub frame_delta: f32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_delta: 1.0 / 60.0,
        }
    }
}

impl SimSettings {
    /// Load from `path`, falling back to defaults if the file is missing or
    /// malformed.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("no settings file at {path:?}, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("loaded settings from {path:?}");
                    settings
                }
                Err(e) => {
                    warn!("failed to parse {path:?}: {e}, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!("failed to read {path:?}: {e}, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = SimSettings::default();
        assert!(settings.time.validate().is_ok());
        assert!(settings.world.width > 2 && settings.world.height > 2);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let settings: SimSettings = toml::from_str(
            r#"
            [world]
            entity_count = 3
            "#,
        )
        .unwrap();
        assert_eq!(settings.world.entity_count, 3);
        assert_eq!(settings.world.width, WorldSettings::default().width);
        assert_eq!(settings.run.frames, RunSettings::default().frames);
    }

    #[test]
    fn tiny_arena_with_movers_is_rejected() {
        let mut world = WorldSettings {
            width: 4,
            height: 24,
            ..WorldSettings::default()
        };
        assert!(world.validate().is_err());

        // An empty arena has no spawn range to satisfy.
        world.entity_count = 0;
        assert!(world.validate().is_ok());

        world.height = 0;
        assert!(world.validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = SimSettings::load("/definitely/not/here/glade.toml");
        assert_eq!(settings.world.seed, WorldSettings::default().seed);
    }
}
