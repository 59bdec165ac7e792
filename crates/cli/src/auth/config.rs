//! Login configuration file management

use super::profile::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the per-user config directory
pub const CONFIG_DIR_ENV: &str = "SDKGEN_CONFIG_DIR";

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    let dir = directories::ProjectDirs::from("dev", "sdkgen", "sdkgen")
        .context("Could not determine config directory")?
        .config_dir()
        .to_path_buf();

    Ok(dir)
}

/// Get the config file path
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Ensure the config directory exists, readable by the owner only
fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
    }
    restrict_permissions(dir, 0o700)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(mode);
    fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to set permissions on {:?}", path))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Load the configuration from `path`, or the default if it does not exist
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// Save the configuration to `path`
pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        ensure_dir(dir)?;
    }

    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, contents)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    restrict_permissions(path, 0o600)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_file_path()?)
}

pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(config, &config_file_path()?)
}
