use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::graph::layout::{Direction, LayoutConfig};
use crate::graph::timeline::{MAX_RANGE_DAYS, MIN_RANGE_DAYS, SLIDER_MAX};
use crate::query::SearchMode;

pub const ENV_API_URL: &str = "IMPACTGRAPH_API_URL";
pub const ENV_CONTEXT: &str = "IMPACTGRAPH_CONTEXT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Without an origin every action is a silent no-op.
    pub base_url: Option<String>,
    pub context_id: Option<String>,
    pub impact_path: String,
    pub ask_path: String,
    pub raw_path: String,
    pub require_context: bool,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            context_id: None,
            impact_path: "/brum-proxy/graph/impact".to_string(),
            ask_path: "/brum-proxy/graph/ask".to_string(),
            raw_path: "/brum-proxy/graph/raw".to_string(),
            require_context: false,
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn base(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn context(&self) -> Option<&str> {
        self.context_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn url_for(&self, path: &str) -> Option<String> {
        let base = self.base()?.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Some(format!("{base}/{path}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub direction: Direction,
    pub default_mode: SearchMode,
    pub timeline_slider: u8,
    pub timeline_min_range_days: i64,
    /// Read on every request, never cached.
    pub token_env: String,
    pub api: ApiConfig,
    pub layout: LayoutConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            direction: Direction::LeftRight,
            default_mode: SearchMode::Standard,
            timeline_slider: SLIDER_MAX,
            timeline_min_range_days: MIN_RANGE_DAYS,
            token_env: "IMPACTGRAPH_TOKEN".to_string(),
            api: ApiConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Pulls hand-edited timeline values back into range.
    pub fn clamped(mut self) -> Self {
        self.timeline_slider = self.timeline_slider.min(SLIDER_MAX);
        self.timeline_min_range_days = self.timeline_min_range_days.clamp(1, MAX_RANGE_DAYS);
        self
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = get(ENV_API_URL).filter(|s| !s.trim().is_empty()) {
            self.api.base_url = Some(url);
        }
        if let Some(ctx) = get(ENV_CONTEXT).filter(|s| !s.trim().is_empty()) {
            self.api.context_id = Some(ctx);
        }
    }
}

pub fn config_file_path() -> anyhow::Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "impactgraph")
        .context("no home directory to hold the viewer config")?;
    Ok(dirs.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    match config_file_path() {
        Ok(path) => load_or_default_from_path(&path),
        Err(e) => {
            tracing::debug!(error = %e, "using default viewer config");
            ViewerConfig::default()
        }
    }
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let cfg = match fs::read_to_string(path) {
        Ok(text) => toml::from_str::<ViewerConfig>(&text).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "invalid viewer config; using defaults");
            ViewerConfig::default()
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => ViewerConfig::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable viewer config; using defaults");
            ViewerConfig::default()
        }
    };
    cfg.clamped()
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<()> {
    save_to_path(cfg, &config_file_path()?)
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    let text = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }
    fs::write(path, text).with_context(|| format!("failed to write viewer config {}", path.display()))
}
