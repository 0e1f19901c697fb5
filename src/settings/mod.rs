use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::convolver::EngineKind;

const SETTINGS_FILENAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Samples per processed block, a power of two
    pub block_size: usize,
    pub engine: EngineKind,
    /// Peak-normalise impulse responses on load
    pub normalize_ir: bool,
    /// Longest impulse response accepted, in seconds
    pub max_ir_seconds: u64,
    pub output_gain: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            block_size: 512,
            engine: EngineKind::Partitioned,
            normalize_ir: true,
            max_ir_seconds: 5,
            output_gain: 1.0,
        }
    }
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Block Size: {}", self.block_size)?;
        writeln!(f, "Engine: {}", self.engine)?;
        writeln!(f, "Normalize IR: {}", self.normalize_ir)?;
        writeln!(f, "Max IR Length: {} s", self.max_ir_seconds)?;
        writeln!(f, "Output Gain: {}", self.output_gain)?;
        Ok(())
    }
}

impl Settings {
    /// Loads settings from `path`, or from the user config directory when no
    /// path is given. A missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => Self::read(path)?,
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::read(&default_path)?
                } else {
                    info!("No settings file found, using defaults");
                    Settings::default()
                }
            }
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json).context("Failed to write settings file")?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.block_size.is_power_of_two() {
            bail!("block_size must be a power of two, got {}", self.block_size);
        }
        if self.max_ir_seconds == 0 {
            bail!("max_ir_seconds must be at least 1");
        }
        if !self.output_gain.is_finite() {
            bail!("output_gain must be finite");
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Settings =
            serde_json::from_str(&contents).context("Failed to parse settings")?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn default_path() -> PathBuf {
        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(config_dir)
                .join("upols")
                .join(SETTINGS_FILENAME)
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("upols")
                .join(SETTINGS_FILENAME)
        } else {
            PathBuf::from(".").join(SETTINGS_FILENAME)
        }
    }
}
