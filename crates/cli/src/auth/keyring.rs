//! Keyring integration for token storage

use anyhow::{Context, Result};
use keyring::Entry;
use sdkgen_auth::TokenResponse;

/// Store tokens in the system keyring as JSON
pub fn store_tokens(service: &str, username: &str, tokens: &TokenResponse) -> Result<()> {
    let entry = Entry::new(service, username).context("Failed to create keyring entry")?;
    let secret = serde_json::to_string(tokens).context("Failed to serialize tokens")?;

    entry
        .set_password(&secret)
        .context("Failed to store tokens in keyring")?;

    Ok(())
}

/// Retrieve tokens from the system keyring
pub fn get_tokens(service: &str, username: &str) -> Result<TokenResponse> {
    let entry = Entry::new(service, username).context("Failed to create keyring entry")?;

    let secret = entry
        .get_password()
        .context("Failed to retrieve tokens from keyring")?;

    serde_json::from_str(&secret).context("Stored tokens are not valid JSON")
}

/// Delete tokens from the system keyring
pub fn delete_tokens(service: &str, username: &str) -> Result<()> {
    let entry = Entry::new(service, username).context("Failed to create keyring entry")?;

    entry
        .delete_credential()
        .context("Failed to delete tokens from keyring")?;

    Ok(())
}

/// Value written by the availability check
const CHECK_SECRET: &str = "sdkgen-keyring-check";

/// Check if keyring is available and working
///
/// Writes, reads back and deletes `username`, so it must not name an entry
/// that holds real tokens.
pub fn is_keyring_available(service: &str, username: &str) -> bool {
    let Ok(entry) = Entry::new(service, username) else {
        return false;
    };
    if entry.set_password(CHECK_SECRET).is_err() {
        return false;
    }
    let ok = matches!(entry.get_password(), Ok(value) if value == CHECK_SECRET);
    let _ = entry.delete_credential();
    ok
}
