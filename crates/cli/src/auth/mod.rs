//! Login profiles and token storage

pub mod config;
pub mod keyring;
pub mod profile;

pub use self::config::{config_file_path, load_config, save_config};
pub use self::keyring::{delete_tokens, get_tokens, store_tokens};
pub use self::profile::{Config, Profile};

use anyhow::{Context, Result};
use sdkgen_auth::TokenResponse;

/// Get a profile by name, falling back to the active profile
pub fn resolve_profile(config: &Config, name: Option<&str>) -> Result<(String, Profile)> {
    let name = name.unwrap_or(&config.settings.active_profile).to_string();
    let profile = config
        .get_profile(&name)
        .with_context(|| format!("Profile '{}' not found", name))?
        .clone();
    Ok((name, profile))
}

/// Save a profile and its freshly issued tokens, and make it active
pub fn save_login(profile_name: &str, profile: &Profile, tokens: &TokenResponse) -> Result<()> {
    store_tokens(
        &profile.keyring_service(),
        &profile.keyring_username(profile_name),
        tokens,
    )
    .context("Failed to store tokens in keyring")?;

    let mut config = load_config()?;
    config.set_profile(profile_name.to_string(), profile.clone());
    config.set_active(profile_name.to_string());
    save_config(&config)?;

    Ok(())
}

/// Tokens stored for a profile, or for the active one
pub fn load_tokens(profile_name: Option<&str>) -> Result<TokenResponse> {
    let config = load_config()?;
    let (name, profile) = resolve_profile(&config, profile_name)?;

    get_tokens(&profile.keyring_service(), &profile.keyring_username(&name))
        .context("No stored tokens. Try logging in again with 'sdkgen login'")
}

/// Delete a profile and its tokens
pub fn delete_profile(profile_name: &str) -> Result<()> {
    let mut config = load_config()?;
    let (name, profile) = resolve_profile(&config, Some(profile_name))?;

    // Tokens may already be gone
    let _ = delete_tokens(&profile.keyring_service(), &profile.keyring_username(&name));

    config.remove_profile(&name);
    save_config(&config)?;

    Ok(())
}
