//! The interactive login: authorize, wait for the redirect, exchange the code.

use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::callback::{CallbackServer, DEFAULT_CALLBACK_ADDR, DEFAULT_LOGIN_TIMEOUT};
use crate::error::AuthResult;
use crate::request::AuthorizationRequest;
use crate::token::{discover, exchange_code, http_client, oauth_client, TokenResponse};

/// Progress of a [`LoginFlow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    NotStarted,
    WaitingForCallback,
    CodeReceived,
    ErrorReceived,
    TokensExchanged,
    Failed,
}

/// Where the authorization and token endpoints come from.
#[derive(Debug, Clone)]
pub enum Endpoints {
    /// Resolve both through OpenID discovery on this authority.
    Discover(Url),
    Explicit {
        authorization_endpoint: Url,
        token_endpoint: Url,
    },
}

#[derive(Debug, Clone)]
pub struct LoginConfig {
    pub endpoints: Endpoints,
    pub client_id: String,
    pub scopes: Vec<String>,
    /// Address the loopback listener binds to.
    pub callback_addr: String,
    pub timeout: Duration,
}

impl LoginConfig {
    pub fn new(endpoints: Endpoints, client_id: impl Into<String>) -> Self {
        Self {
            endpoints,
            client_id: client_id.into(),
            scopes: Vec::new(),
            callback_addr: DEFAULT_CALLBACK_ADDR.to_string(),
            timeout: DEFAULT_LOGIN_TIMEOUT,
        }
    }
}

/// A single-shot authorization-code + PKCE login.
pub struct LoginFlow {
    config: LoginConfig,
    http: reqwest::Client,
    state: LoginState,
}

impl LoginFlow {
    pub fn new(config: LoginConfig) -> AuthResult<Self> {
        Ok(Self::with_http_client(config, http_client()?))
    }

    pub fn with_http_client(config: LoginConfig, http: reqwest::Client) -> Self {
        Self {
            config,
            http,
            state: LoginState::NotStarted,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    /// Run the flow. `on_authorize` receives the URL the user has to open.
    pub async fn run<F>(&mut self, on_authorize: F) -> AuthResult<TokenResponse>
    where
        F: FnOnce(&Url),
    {
        let result = self.run_inner(on_authorize).await;
        match &result {
            Ok(_) => self.transition(LoginState::TokensExchanged),
            Err(e) => {
                warn!("Login failed: {}", e);
                self.transition(LoginState::Failed);
            }
        }
        result
    }

    async fn run_inner<F>(&mut self, on_authorize: F) -> AuthResult<TokenResponse>
    where
        F: FnOnce(&Url),
    {
        let (authorization_endpoint, token_endpoint) = match &self.config.endpoints {
            Endpoints::Discover(authority) => {
                let metadata = discover(&self.http, authority).await?;
                (metadata.authorization_endpoint, metadata.token_endpoint)
            }
            Endpoints::Explicit {
                authorization_endpoint,
                token_endpoint,
            } => (authorization_endpoint.clone(), token_endpoint.clone()),
        };

        let server = CallbackServer::bind(self.config.callback_addr.as_str()).await?;
        let client = oauth_client(
            &self.config.client_id,
            authorization_endpoint,
            token_endpoint,
            &server.redirect_uri(),
        )?;
        let request = AuthorizationRequest::new(&client, &self.config.scopes);

        on_authorize(&request.url);
        self.transition(LoginState::WaitingForCallback);

        let params = server.wait(self.config.timeout).await?;
        if params.error.is_some() {
            self.transition(LoginState::ErrorReceived);
        } else {
            self.transition(LoginState::CodeReceived);
        }

        let code = params.into_code(&request.state)?;
        exchange_code(&client, &self.http, code, &request.pkce).await
    }

    fn transition(&mut self, next: LoginState) {
        debug!("Login state {:?} -> {:?}", self.state, next);
        if next == LoginState::WaitingForCallback {
            info!("Waiting for the browser to complete login");
        }
        self.state = next;
    }
}
