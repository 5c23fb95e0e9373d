//! Optional TOML configuration merged with command-line flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use light_bulbs_rendering::TileGridPresentation;
use light_bulbs_system_level::ScramblePolicy;
use serde::Deserialize;

/// Configuration file consulted when `--config` is not supplied.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "light-bulbs.toml";

/// Log filter used when no other source provides one.
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

/// Scramble policy as spelled on the command line and in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ScrambleSetting {
    /// Keep every tile at orientation zero.
    Disabled,
    /// Scramble wire pieces only.
    WiresOnly,
    /// Scramble every piece, batteries and lights included.
    Everything,
}

impl From<ScrambleSetting> for ScramblePolicy {
    fn from(setting: ScrambleSetting) -> Self {
        match setting {
            ScrambleSetting::Disabled => Self::Disabled,
            ScrambleSetting::WiresOnly => Self::WiresOnly,
            ScrambleSetting::Everything => Self::Everything,
        }
    }
}

/// Values read from the configuration file. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct CliConfig {
    pub(crate) level: Option<PathBuf>,
    pub(crate) seed: Option<u64>,
    pub(crate) tile_length: Option<f32>,
    pub(crate) scramble: Option<ScrambleSetting>,
    pub(crate) log_level: Option<String>,
}

impl CliConfig {
    /// Loads the configuration from `path`, or from [`DEFAULT_CONFIG_PATH`] when
    /// it exists. An explicitly requested file must exist.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_PATH);
                if fallback.is_file() {
                    Self::read(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse configuration toml contents")
    }
}

/// Flag values that take precedence over the configuration file.
#[derive(Clone, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) level: Option<PathBuf>,
    pub(crate) seed: Option<u64>,
    pub(crate) tile_length: Option<f32>,
    pub(crate) scramble: Option<ScrambleSetting>,
    pub(crate) log_level: Option<String>,
}

/// Fully resolved launch settings.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) level: Option<PathBuf>,
    pub(crate) seed: Option<u64>,
    pub(crate) tile_length: f32,
    pub(crate) scramble: ScramblePolicy,
    pub(crate) log_level: Option<String>,
}

impl Settings {
    /// Merges flags over file values and validates the result.
    pub(crate) fn resolve(overrides: Overrides, config: CliConfig) -> Result<Self> {
        let tile_length = overrides
            .tile_length
            .or(config.tile_length)
            .unwrap_or(TileGridPresentation::DEFAULT_TILE_LENGTH);
        if !tile_length.is_finite() || tile_length <= 0.0 {
            bail!("tile length must be positive and finite (received {tile_length})");
        }

        Ok(Self {
            level: overrides.level.or(config.level),
            seed: overrides.seed.or(config.seed),
            tile_length,
            scramble: overrides
                .scramble
                .or(config.scramble)
                .map(ScramblePolicy::from)
                .unwrap_or_default(),
            log_level: overrides.log_level.or(config.log_level),
        })
    }
}
