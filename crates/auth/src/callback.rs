//! Loopback listener that receives the single OAuth redirect.
//!
//! The handler gets a one-shot sender through its router state; the waiting
//! caller owns the receiver. Nothing is shared between two listeners, and the
//! wait is bounded by a real timer.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::error::{AuthError, AuthResult};
use crate::request::CallbackParams;

/// Where the redirect lands unless configured otherwise.
pub const DEFAULT_CALLBACK_ADDR: &str = "127.0.0.1:3000";

/// How long a login waits for the browser to come back.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Upper bound on draining the listener once the callback has arrived.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const SUCCESS_PAGE: &str =
    "<html><body><h1>Login complete</h1><p>You can close this window.</p></body></html>";
const FAILURE_PAGE: &str =
    "<html><body><h1>Login failed</h1><p>Return to the terminal for details.</p></body></html>";

#[derive(Clone)]
struct CallbackState {
    slot: Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>,
}

/// A bound but not yet serving callback listener.
pub struct CallbackServer {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl CallbackServer {
    pub async fn bind(addr: impl ToSocketAddrs) -> AuthResult<Self> {
        let listener = TcpListener::bind(addr).await.map_err(AuthError::Bind)?;
        let local_addr = listener.local_addr().map_err(AuthError::Bind)?;
        debug!("Callback listener bound to {}", local_addr);
        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Redirect URI to register with the authorization request.
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}", self.local_addr.port())
    }

    /// Serve until the first callback arrives or `timeout` elapses.
    pub async fn wait(self, timeout: Duration) -> AuthResult<CallbackParams> {
        let Self {
            listener,
            local_addr,
        } = self;
        let (result_tx, result_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new()
            .route("/", get(handle_callback))
            .with_state(CallbackState {
                slot: Arc::new(Mutex::new(Some(result_tx))),
            });

        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(
            "Waiting up to {}s for the login callback on {}",
            timeout.as_secs(),
            local_addr
        );
        let outcome = tokio::time::timeout(timeout, result_rx).await;

        let _ = shutdown_tx.send(());
        let abort = server.abort_handle();
        match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
            Ok(Ok(Err(e))) => warn!("Callback listener exited with error: {}", e),
            Ok(_) => {}
            Err(_) => abort.abort(),
        }

        match outcome {
            Ok(Ok(params)) => Ok(params),
            Ok(Err(_)) => Err(AuthError::CallbackClosed),
            Err(_) => Err(AuthError::Timeout(timeout)),
        }
    }
}

/// Bind `addr` and wait for one callback.
pub async fn wait_for_callback(
    addr: impl ToSocketAddrs,
    timeout: Duration,
) -> AuthResult<CallbackParams> {
    CallbackServer::bind(addr).await?.wait(timeout).await
}

async fn handle_callback(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> impl IntoResponse {
    let page = if params.error.is_some() {
        FAILURE_PAGE
    } else {
        SUCCESS_PAGE
    };

    match state.slot.lock().await.take() {
        Some(tx) => {
            debug!("Callback received");
            let _ = tx.send(params);
        }
        None => debug!("Ignoring repeated callback"),
    }

    ([(header::CONNECTION, "close")], Html(page))
}
