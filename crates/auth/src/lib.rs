//! Interactive OAuth2 login with PKCE.
//!
//! [`LoginFlow`] strings the pieces together: it builds an
//! [`AuthorizationRequest`], waits on a loopback [`CallbackServer`] for the
//! redirect (bounded by a timeout, five minutes by default), validates the
//! returned `state`, and exchanges the code at the token endpoint.

pub mod callback;
mod error;
pub mod flow;
pub mod pkce;
pub mod request;
pub mod token;

pub use callback::{
    wait_for_callback, CallbackServer, DEFAULT_CALLBACK_ADDR, DEFAULT_LOGIN_TIMEOUT,
};
pub use error::{AuthError, AuthResult};
pub use flow::{Endpoints, LoginConfig, LoginFlow, LoginState};
pub use pkce::{challenge_for, PkcePair};
pub use request::{AuthorizationRequest, CallbackParams};
pub use token::{
    discover, exchange_code, http_client, oauth_client, OAuthClient, ProviderMetadata,
    TokenResponse,
};
