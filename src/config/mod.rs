pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Locations searched, in order, when no config file is given.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "./vcompress.toml",
    "~/.config/vcompress/config.toml",
    "/etc/vcompress/config.toml",
];

/// File written by `output-dir --set` when no config file exists yet.
pub const USER_CONFIG_PATH: &str = "~/.config/vcompress/config.toml";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    match find_config_file() {
        Some(path) => load_config(&path),
        None => Ok(Config::default()),
    }
}

/// First default location that exists.
pub fn find_config_file() -> Option<PathBuf> {
    DEFAULT_CONFIG_PATHS
        .iter()
        .map(|p| expand_path(p))
        .find(|p| p.exists())
}

/// The file settings should be persisted to: the given one, else the first
/// existing default, else the per-user location.
pub fn writable_config_path(custom_path: Option<&Path>) -> PathBuf {
    custom_path
        .map(Path::to_path_buf)
        .or_else(find_config_file)
        .unwrap_or_else(|| expand_path(USER_CONFIG_PATH))
}

fn expand_paths(config: &mut Config) {
    let expand = |p: &Path| expand_path(&p.to_string_lossy());
    config.storage.output_dir = expand(&config.storage.output_dir);
    config.storage.upload_dir = expand(&config.storage.upload_dir);
    config.tools.ffmpeg_path = config.tools.ffmpeg_path.as_deref().map(expand);
    config.tools.ffprobe_path = config.tools.ffprobe_path.as_deref().map(expand);
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.storage.output_dir.as_os_str().is_empty() {
        anyhow::bail!("storage.output_dir cannot be empty");
    }

    if config.storage.upload_dir.as_os_str().is_empty() {
        anyhow::bail!("storage.upload_dir cannot be empty");
    }

    if config.pipeline.max_parallel_plans == 0 {
        anyhow::bail!("pipeline.max_parallel_plans must be at least 1");
    }

    if config.tools.encode_timeout_secs == 0 || config.tools.probe_timeout_secs == 0 {
        anyhow::bail!("tool timeouts must be greater than 0");
    }

    for selector in config.defaults.effective_resolutions() {
        selector
            .parse::<vc_pipeline::ResolutionSelector>()
            .context("Invalid resolution in [defaults]")?;
    }

    config
        .defaults
        .validate()
        .context("Invalid [defaults] section")?;

    for (name, path) in [
        ("ffmpeg", &config.tools.ffmpeg_path),
        ("ffprobe", &config.tools.ffprobe_path),
    ] {
        if let Some(p) = path {
            if !p.exists() {
                tracing::warn!("Configured {} path does not exist: {:?}", name, p);
            }
        }
    }

    Ok(())
}
