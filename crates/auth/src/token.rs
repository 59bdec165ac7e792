//! Provider discovery and authorization-code exchange.

use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, EndpointNotSet, EndpointSet, RedirectUrl,
    RequestTokenError, TokenResponse as _, TokenUrl,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{AuthError, AuthResult};
use crate::pkce::PkcePair;

/// OAuth client with authorization and token endpoints configured.
pub type OAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// The subset of OpenID provider metadata the login flow needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderMetadata {
    pub authorization_endpoint: Url,
    pub token_endpoint: Url,
}

/// Fetch `{authority}/.well-known/openid-configuration`.
pub async fn discover(http: &reqwest::Client, authority: &Url) -> AuthResult<ProviderMetadata> {
    let mut base = authority.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let url = base.join(".well-known/openid-configuration")?;
    debug!("Discovering provider metadata at {}", url);

    let response = http.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AuthError::Discovery(format!("{} returned {}", url, status)));
    }

    response
        .json()
        .await
        .map_err(|e| AuthError::Discovery(format!("invalid metadata from {}: {}", url, e)))
}

/// Public client (no secret) for the given endpoints and redirect URI.
pub fn oauth_client(
    client_id: &str,
    authorization_endpoint: Url,
    token_endpoint: Url,
    redirect_uri: &str,
) -> AuthResult<OAuthClient> {
    Ok(BasicClient::new(ClientId::new(client_id.to_string()))
        .set_auth_uri(AuthUrl::from_url(authorization_endpoint))
        .set_token_uri(TokenUrl::from_url(token_endpoint))
        .set_redirect_uri(RedirectUrl::new(redirect_uri.to_string())?))
}

/// HTTP client for token requests. Redirects are not followed.
pub fn http_client() -> AuthResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}

/// Tokens returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// POST the authorization code and PKCE verifier to the token endpoint.
///
/// An OAuth error response fails with [`AuthError::TokenRejected`]; anything
/// else that is not a token response fails with [`AuthError::TokenExchange`]
/// carrying the response body.
pub async fn exchange_code(
    client: &OAuthClient,
    http: &reqwest::Client,
    code: String,
    pkce: &PkcePair,
) -> AuthResult<TokenResponse> {
    let tokens = client
        .exchange_code(AuthorizationCode::new(code))
        .set_pkce_verifier(pkce.code_verifier())
        .request_async(http)
        .await
        .map_err(|e| match e {
            RequestTokenError::ServerResponse(response) => AuthError::TokenRejected {
                error: response.error().to_string(),
                description: response.error_description().cloned(),
            },
            RequestTokenError::Parse(_, body) => AuthError::TokenExchange(format!(
                "unexpected response: {}",
                String::from_utf8_lossy(&body)
            )),
            other => AuthError::TokenExchange(other.to_string()),
        })?;

    info!("Exchanged authorization code for tokens");
    Ok(TokenResponse {
        access_token: tokens.access_token().secret().clone(),
        token_type: Some(AsRef::<str>::as_ref(tokens.token_type()).to_string()),
        expires_in: tokens.expires_in().map(|d| d.as_secs()),
        refresh_token: tokens.refresh_token().map(|t| t.secret().clone()),
        scope: tokens.scopes().map(|scopes| {
            scopes
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        }),
    })
}
