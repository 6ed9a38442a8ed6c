use std::{sync::Arc, time::Duration};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    auth::TokenStore,
    error::{Error, Result, classify, error_message},
    http::{
        request::Request,
        transport::{RawResponse, Transport},
    },
};

const SERVER_RETRY_PAUSE: Duration = Duration::from_millis(500);

/// Sends requests with a valid bearer token attached.
///
/// A 401 answer triggers one token refresh and one retry; a second 401 is
/// returned as [`Error::Auth`]. Other failures are classified by
/// [`crate::error::classify`] and returned as they are.
pub struct Executor {
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenStore>,
    api_url: String,
    retry_on_server_error: bool,
}

impl Executor {
    pub fn new(
        transport: Arc<dyn Transport>,
        tokens: Arc<TokenStore>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            tokens,
            api_url: api_url.into(),
            retry_on_server_error: false,
        }
    }

    pub fn with_server_retry(mut self, enabled: bool) -> Self {
        self.retry_on_server_error = enabled;
        self
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Sends `request` and returns the successful response.
    pub async fn execute(&self, request: &Request) -> Result<RawResponse> {
        let url = request.url(&self.api_url);
        let token = self.tokens.access_token().await?;

        let response = self.attempt(request, &url, &token).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return into_result(response);
        }

        warn!(method = %request.method, url = %url, "access token rejected, refreshing");
        let fresh = self.tokens.refresh_rejected(&token).await?;

        let retried = self.attempt(request, &url, &fresh.access_token).await?;
        if retried.status == StatusCode::UNAUTHORIZED {
            return Err(Error::Auth(format!(
                "still unauthorized after token refresh: {}",
                error_message(retried.status, &retried.body)
            )));
        }
        into_result(retried)
    }

    /// Sends `request` and decodes the body as `T`.
    pub async fn json<T: DeserializeOwned>(&self, request: &Request) -> Result<T> {
        self.execute(request).await?.json()
    }

    /// Like [`Executor::json`], but an empty answer is `None`.
    pub async fn json_opt<T: DeserializeOwned>(&self, request: &Request) -> Result<Option<T>> {
        let response = self.execute(request).await?;
        if response.is_empty() {
            return Ok(None);
        }
        response.json().map(Some)
    }

    /// Sends `request` and decodes the value under `key` of the returned object,
    /// e.g. the list in `{"artists": [...]}`.
    pub async fn json_field<T: DeserializeOwned>(
        &self,
        request: &Request,
        key: &'static str,
    ) -> Result<T> {
        let mut body: Value = self.json(request).await?;
        let field = body.get_mut(key).map(Value::take).ok_or_else(|| {
            Error::Decode(<serde_json::Error as serde::de::Error>::missing_field(key))
        })?;
        Ok(serde_json::from_value(field)?)
    }

    /// Sends `request` and discards the body.
    pub async fn command(&self, request: &Request) -> Result<()> {
        self.execute(request).await.map(|_| ())
    }

    async fn attempt(&self, request: &Request, url: &str, token: &str) -> Result<RawResponse> {
        debug!(method = %request.method, url = %url, "sending request");
        let response = self.transport.send(request, url, token).await?;

        if response.status.is_server_error() && self.retry_on_server_error {
            warn!(url = %url, status = %response.status, "server error, retrying once");
            tokio::time::sleep(SERVER_RETRY_PAUSE).await;
            return self.transport.send(request, url, token).await;
        }
        Ok(response)
    }
}

fn into_result(response: RawResponse) -> Result<RawResponse> {
    match classify(response.status, &response.headers, &response.body) {
        Some(err) => Err(err),
        None => Ok(response),
    }
}
