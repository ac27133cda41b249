//! Configuration file support for blinkcheck.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/blinkcheck/config.toml` (lowest priority)
//! - Project-local: `.blinkcheck.toml` (searched up the directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Detector threshold settings.
    pub detector: DetectorConfig,
    /// Model storage settings.
    pub models: ModelsConfig,
    /// Overlay rendering settings.
    pub render: RenderConfig,
    /// Report output settings.
    pub output: OutputConfig,
}

/// Detector threshold configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Non-maximum-suppression IoU threshold (0.0-1.0).
    pub iou_threshold: Option<f32>,
    /// Detection confidence threshold (0.0-1.0).
    pub confidence_threshold: Option<f32>,
}

/// Model storage configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Custom models directory path.
    pub dir: Option<PathBuf>,
}

/// Overlay rendering configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Font file for score labels on annotated images.
    pub font: Option<PathBuf>,
}

/// Report output configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print the JSON report.
    pub pretty: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/blinkcheck/config.toml`
    /// 2. Project-local: `.blinkcheck.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are reported as
    /// warnings and the run continues with the remaining settings.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if let Some(t) = self.detector.iou_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(format!("detector.iou_threshold must be 0.0-1.0, got {t}"));
            }
        }
        if let Some(t) = self.detector.confidence_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(format!(
                    "detector.confidence_threshold must be 0.0-1.0, got {t}"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.detector.iou_threshold = other
            .detector
            .iou_threshold
            .or(self.detector.iou_threshold);
        self.detector.confidence_threshold = other
            .detector
            .confidence_threshold
            .or(self.detector.confidence_threshold);

        self.models.dir = other.models.dir.or_else(|| self.models.dir.take());
        self.render.font = other.render.font.or_else(|| self.render.font.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("blinkcheck").join("config.toml"))
}

/// Find the project-local config by searching up from the current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.blinkcheck.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".blinkcheck.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
