#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Fear the Water level.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use fear_the_water_core::{GameConfig, LevelDocument, WELCOME_BANNER};
use fear_the_water_world::{default_level_document, Level};

/// Resolves configuration and level documents into a ready [`Level`].
#[derive(Clone, Debug, Default)]
pub struct Bootstrap {
    config: GameConfig,
}

impl Bootstrap {
    /// Creates a bootstrap around an already resolved configuration.
    #[must_use]
    pub const fn new(config: GameConfig) -> Self {
        Self { config }
    }

    /// Parses a TOML configuration. Missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(text).context("failed to parse game configuration")?;
        config.validate().context("game configuration is invalid")?;
        Ok(Self::new(config))
    }

    /// Reads and parses a TOML configuration file.
    pub fn from_config_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        let bootstrap = Self::from_toml(&text)
            .with_context(|| format!("failed to load configuration {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(bootstrap)
    }

    /// Banner shown when the experience starts.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        WELCOME_BANNER
    }

    /// Configuration handed to every level built by this bootstrap.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Mutable access for command-line overrides.
    pub fn config_mut(&mut self) -> &mut GameConfig {
        &mut self.config
    }

    /// Builds a level from an in-memory document.
    pub fn level(&self, document: &LevelDocument) -> Result<Level> {
        Level::new(self.config.clone(), document).context("failed to build level")
    }

    /// Builds a level from JSON text.
    pub fn level_from_json(&self, text: &str) -> Result<Level> {
        let document = LevelDocument::from_json(text).context("failed to parse level document")?;
        self.level(&document)
    }

    /// Reads a JSON level file and builds it.
    pub fn level_from_path(&self, path: &Path) -> Result<Level> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read level {}", path.display()))?;
        self.level_from_json(&text)
            .with_context(|| format!("failed to load level {}", path.display()))
    }

    /// Builds the level embedded in the game.
    pub fn default_level(&self) -> Result<Level> {
        let document = default_level_document().context("embedded level is malformed")?;
        self.level(&document)
    }
}
