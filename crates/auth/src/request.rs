//! Authorization request construction and callback validation.

use oauth2::{CsrfToken, Scope};
use serde::Deserialize;
use url::Url;

use crate::error::{AuthError, AuthResult};
use crate::pkce::PkcePair;
use crate::token::OAuthClient;

/// The URL the user is sent to, plus what is needed to check the callback.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: Url,
    pub state: String,
    pub pkce: PkcePair,
}

impl AuthorizationRequest {
    /// New request with a fresh state value and PKCE pair.
    pub fn new(client: &OAuthClient, scopes: &[String]) -> Self {
        let pkce = PkcePair::generate();
        let (url, state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(scopes.iter().cloned().map(Scope::new))
            .set_pkce_challenge(pkce.code_challenge())
            .url();

        Self {
            url,
            state: state.secret().clone(),
            pkce,
        }
    }
}

/// Query parameters delivered to the redirect URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Check the callback against the state sent in the request and return
    /// the authorization code.
    ///
    /// An `error` parameter wins over everything else; a state mismatch is
    /// rejected before the code is looked at.
    pub fn into_code(self, expected_state: &str) -> AuthResult<String> {
        if let Some(error) = self.error {
            return Err(AuthError::Authorization {
                error,
                description: self.error_description,
            });
        }

        if self.state.as_deref() != Some(expected_state) {
            return Err(AuthError::StateMismatch);
        }

        self.code.ok_or(AuthError::MissingCode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::oauth_client;
    use axum::extract::Query;
    use axum::http::Uri;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// Decode a redirect the way the callback handler does.
    fn callback(uri: &'static str) -> CallbackParams {
        let Query(params) = Query::<CallbackParams>::try_from_uri(&Uri::from_static(uri)).unwrap();
        params
    }

    #[test]
    fn test_authorization_url() {
        let client = oauth_client(
            "sdkgen",
            Url::parse("https://auth.example.com/authorize").unwrap(),
            Url::parse("https://auth.example.com/token").unwrap(),
            "http://localhost:3000",
        )
        .unwrap();
        let req = AuthorizationRequest::new(
            &client,
            &["openid".to_string(), "offline_access".to_string()],
        );
        let pairs: HashMap<_, _> = req.url.query_pairs().into_owned().collect();

        assert_eq!(req.url.host_str(), Some("auth.example.com"));
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["client_id"], "sdkgen");
        assert!(pairs["redirect_uri"].starts_with("http://localhost:3000"));
        assert_eq!(pairs["state"], req.state);
        assert_eq!(pairs["code_challenge"], req.pkce.challenge());
        assert_eq!(pairs["code_challenge_method"], "S256");
        assert_eq!(pairs["scope"], "openid offline_access");
    }

    #[test]
    fn test_callback_decoding() {
        let params = callback("/?code=abc%20123&state=xyz&extra=1");
        assert_eq!(params.code.as_deref(), Some("abc 123"));
        assert_eq!(params.state.as_deref(), Some("xyz"));
        assert_eq!(params.error, None);
    }

    #[test]
    fn test_valid_callback_yields_code() {
        assert_eq!(callback("/?code=abc&state=xyz").into_code("xyz").unwrap(), "abc");
    }

    #[test]
    fn test_state_mismatch_is_rejected() {
        let params = callback("/?code=abc&state=forged");
        assert!(matches!(params.into_code("xyz"), Err(AuthError::StateMismatch)));

        let params = callback("/?code=abc");
        assert!(matches!(params.into_code("xyz"), Err(AuthError::StateMismatch)));
    }

    #[test]
    fn test_error_parameter_is_rejected() {
        let params = callback("/?error=access_denied&error_description=User+cancelled&state=xyz");
        let err = params.into_code("xyz").unwrap_err();
        assert_eq!(err.to_string(), "Authorization failed: access_denied (User cancelled)");
    }

    #[test]
    fn test_missing_code_is_rejected() {
        let params = callback("/?state=xyz");
        assert!(matches!(params.into_code("xyz"), Err(AuthError::MissingCode)));
    }
}
