//! Proof Key for Code Exchange (RFC 7636), S256 method only.

use oauth2::{PkceCodeChallenge, PkceCodeVerifier};

use crate::error::{AuthError, AuthResult};

/// Length of generated code verifiers.
pub const VERIFIER_LEN: usize = 64;

/// Random bytes behind a verifier; base64url turns 48 bytes into 64 characters.
const VERIFIER_BYTES: u32 = 48;

/// A code verifier and the challenge derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    verifier: String,
    challenge: String,
}

impl PkcePair {
    pub fn generate() -> Self {
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256_len(VERIFIER_BYTES);
        Self {
            verifier: verifier.secret().clone(),
            challenge: challenge.as_str().to_string(),
        }
    }

    /// Pair for a known verifier. Fails unless the verifier is 43-128
    /// characters from the unreserved set.
    pub fn from_verifier(verifier: impl Into<String>) -> AuthResult<Self> {
        let verifier = verifier.into();
        let challenge = challenge_for(&verifier)?;
        Ok(Self {
            verifier,
            challenge,
        })
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    pub fn method(&self) -> &'static str {
        "S256"
    }

    pub(crate) fn code_verifier(&self) -> PkceCodeVerifier {
        PkceCodeVerifier::new(self.verifier.clone())
    }

    pub(crate) fn code_challenge(&self) -> PkceCodeChallenge {
        PkceCodeChallenge::from_code_verifier_sha256(&self.code_verifier())
    }
}

/// `BASE64URL(SHA256(verifier))` without padding.
pub fn challenge_for(verifier: &str) -> AuthResult<String> {
    let valid_len = (43..=128).contains(&verifier.len());
    let valid_chars = verifier
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b"-._~".contains(&b));
    if !valid_len || !valid_chars {
        return Err(AuthError::InvalidVerifier);
    }

    let verifier = PkceCodeVerifier::new(verifier.to_string());
    Ok(PkceCodeChallenge::from_code_verifier_sha256(&verifier)
        .as_str()
        .to_string())
}
