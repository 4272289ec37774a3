//! metagrade configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::grading::GradingConfig;

/// Top-level metagrade configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetagradeConfig {
    /// Grading thresholds.
    #[serde(default)]
    pub grading: GradingConfig,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./metagrade-results")
}

impl Default for MetagradeConfig {
    fn default() -> Self {
        Self {
            grading: GradingConfig::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl MetagradeConfig {
    /// Reject thresholds that would make every keyword answer pass or fail.
    pub fn validate(&self) -> Result<()> {
        let ratio = self.grading.keyword_ratio;
        anyhow::ensure!(
            ratio > 0.0 && ratio <= 1.0,
            "grading.keyword_ratio must be in (0, 1], got {ratio}"
        );
        Ok(())
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `metagrade.toml` in the current directory
/// 2. `~/.config/metagrade/config.toml`
///
/// Environment variable override: `METAGRADE_MIN_ANSWER_CHARS`.
pub fn load_config_from(path: Option<&Path>) -> Result<MetagradeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("metagrade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            parse_config_str(
                &std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config: {}", path.display()))?,
            )
            .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MetagradeConfig::default(),
    };

    if let Ok(value) = std::env::var("METAGRADE_MIN_ANSWER_CHARS") {
        config.grading.min_answer_chars = value
            .trim()
            .parse()
            .with_context(|| format!("invalid METAGRADE_MIN_ANSWER_CHARS: {value:?}"))?;
    }

    config.validate()?;
    Ok(config)
}

/// Parse a config from TOML text.
pub fn parse_config_str(content: &str) -> Result<MetagradeConfig> {
    Ok(toml::from_str(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("metagrade"))
}
