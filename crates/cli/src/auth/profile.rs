//! Login profile data structures and operations

use anyhow::{bail, Context, Result};
use sdkgen_auth::Endpoints;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// An identity provider registration used by `sdkgen login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// OAuth client id registered with the provider
    pub client_id: String,
    /// Issuer URL used for OpenID discovery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    /// Explicit authorization endpoint (skips discovery together with `token_endpoint`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,
    /// Explicit token endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,
    /// Requested scopes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

impl Profile {
    /// Get the keyring service name for this profile
    pub fn keyring_service(&self) -> String {
        "sdkgen-cli".to_string()
    }

    /// Get the keyring username (profile-specific identifier)
    pub fn keyring_username(&self, profile_name: &str) -> String {
        format!("{}@{}", profile_name, self.client_id)
    }

    /// Throwaway keyring username for checking the keyring works before login
    pub fn keyring_check_username(&self, profile_name: &str) -> String {
        format!("{}@{}#check", profile_name, self.client_id)
    }

    /// Resolve where the authorization and token endpoints come from
    pub fn endpoints(&self) -> Result<Endpoints> {
        match (
            &self.authority,
            &self.authorization_endpoint,
            &self.token_endpoint,
        ) {
            (_, Some(authorize), Some(token)) => Ok(Endpoints::Explicit {
                authorization_endpoint: Url::parse(authorize)
                    .with_context(|| format!("Invalid authorization endpoint: {}", authorize))?,
                token_endpoint: Url::parse(token)
                    .with_context(|| format!("Invalid token endpoint: {}", token))?,
            }),
            (Some(authority), _, _) => Ok(Endpoints::Discover(
                Url::parse(authority)
                    .with_context(|| format!("Invalid authority URL: {}", authority))?,
            )),
            _ => bail!(
                "Profile needs either an authority or both authorization and token endpoints"
            ),
        }
    }
}

/// Configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// The currently active profile name
    pub active_profile: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_profile: "default".to_string(),
        }
    }
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,
    /// Named profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Config {
    /// Get a specific profile by name
    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Add or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        self.profiles.remove(name)
    }

    /// Set the active profile
    pub fn set_active(&mut self, name: String) {
        self.settings.active_profile = name;
    }
}
