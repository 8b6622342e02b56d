mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./artforge.toml",
        "~/.config/artforge/config.toml",
        "/etc/artforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.artwork.preferred_width == 0 || config.artwork.preferred_height == 0 {
        anyhow::bail!("Preferred artwork size cannot be 0");
    }

    if !(0.0..=10.0).contains(&config.artwork.minimum_rating) {
        anyhow::bail!(
            "Minimum rating must be between 0 and 10, got {}",
            config.artwork.minimum_rating
        );
    }

    if config.providers.tmdb.enabled
        && config.providers.tmdb.api_key.is_empty()
        && !config.artwork.only_filesystem
    {
        anyhow::bail!("TMDB is enabled but no API key is configured");
    }

    if let Some(dir) = &config.movie_sets.central_directory {
        if !dir.exists() {
            tracing::warn!("Central set-artwork directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}
