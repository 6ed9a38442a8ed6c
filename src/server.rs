use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::sync::{Mutex, oneshot};
use tracing::debug;

use crate::{
    api,
    error::{Error, Result},
};

/// Outcome of the browser redirect: the authorization code, or why there is none.
pub type CallbackOutcome = std::result::Result<String, String>;

/// An authorization request waiting for its redirect.
pub struct PendingAuthorization {
    state: String,
    sender: Mutex<Option<oneshot::Sender<CallbackOutcome>>>,
}

impl PendingAuthorization {
    pub fn new(state: impl Into<String>) -> (Arc<Self>, oneshot::Receiver<CallbackOutcome>) {
        let (tx, rx) = oneshot::channel();
        let pending = Arc::new(Self {
            state: state.into(),
            sender: Mutex::new(Some(tx)),
        });
        (pending, rx)
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// True until a callback has been handled.
    pub async fn is_waiting(&self) -> bool {
        self.sender.lock().await.is_some()
    }

    /// Hands the outcome to the waiting command. Only the first call counts.
    pub async fn complete(&self, outcome: CallbackOutcome) -> bool {
        match self.sender.lock().await.take() {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }
}

pub async fn start_api_server(addr: &str, pending: Arc<PendingAuthorization>) -> Result<()> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(pending));

    let addr = SocketAddr::from_str(addr)
        .map_err(|e| Error::Config(format!("invalid server address '{addr}': {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    debug!(%addr, "callback server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
