//! Run configuration file
//!
//! JSON file holding the global defaults and the ordered list of collection
//! directories, each with optional render overrides.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::collection::Collection;
use crate::config::resolve::{CollectionOverride, GlobalDefaults};
use crate::constants;
use crate::types::{Alignment, Opacity, ProfileTarget, Stretch};

/// Top-level run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_profile")]
    pub profile: ProfileTarget,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    /// Shuffle collection order and images at startup
    #[serde(default)]
    pub random: bool,
    #[serde(default = "default_alignment")]
    pub alignment: Alignment,
    #[serde(default = "default_stretch")]
    pub stretch: Stretch,
    #[serde(default = "default_opacity")]
    pub opacity: Opacity,
    /// Explicit host settings file; skips probing when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_path: Option<PathBuf>,
    #[serde(default)]
    pub collections: Vec<CollectionEntry>,
}

/// One configured collection directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub path: PathBuf,
    #[serde(flatten)]
    pub overrides: CollectionOverride,
}

// Default value functions
fn default_profile() -> ProfileTarget {
    ProfileTarget::Defaults
}

fn default_interval_minutes() -> u32 {
    constants::defaults::INTERVAL_MINUTES
}

fn default_alignment() -> Alignment {
    Alignment::Center
}

fn default_stretch() -> Stretch {
    Stretch::UniformToFill
}

fn default_opacity() -> Opacity {
    Opacity::new(constants::defaults::OPACITY).unwrap_or(Opacity::OPAQUE)
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            interval_minutes: default_interval_minutes(),
            random: false,
            alignment: default_alignment(),
            stretch: default_stretch(),
            opacity: default_opacity(),
            settings_path: None,
            collections: Vec::new(),
        }
    }
}

impl RunConfig {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(constants::config::APP_DIR);
        path.push(constants::config::FILENAME);
        path
    }

    /// Load and validate the run config at `path`
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "Config file not found at {}. Create it with at least one entry under \"collections\".",
                path.display()
            );
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Invalid config in {}", path.display()))?;

        info!(
            path = %path.display(),
            collections = config.collections.len(),
            "Loaded run config"
        );
        Ok(config)
    }

    /// Parse and validate config text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: RunConfig =
            serde_json::from_str(contents).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.collections.is_empty() {
            bail!("No collections configured");
        }
        if self.interval_minutes == 0 {
            bail!("interval_minutes must be at least 1");
        }
        for entry in &self.collections {
            if entry.path.as_os_str().is_empty() {
                bail!("Collection entry with an empty path");
            }
        }
        Ok(())
    }

    pub fn global_defaults(&self) -> GlobalDefaults {
        GlobalDefaults {
            profile: self.profile,
            interval_minutes: self.interval_minutes,
            alignment: self.alignment,
            stretch: self.stretch,
            opacity: self.opacity,
        }
    }

    pub fn collections(&self) -> Vec<Collection> {
        self.collections
            .iter()
            .map(|entry| Collection::new(entry.path.clone(), entry.overrides))
            .collect()
    }
}
