//! The client handle and its builder.

use std::{collections::BTreeSet, future::Future, sync::Arc, time::Duration};

use chrono::Duration as ChronoDuration;
use serde::{Serialize, de::DeserializeOwned};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info, warn};

use crate::{
    action::{Action, default_handle},
    auth::{Authorizer, Grant, OAuthClient, Token, TokenCache, TokenStore},
    config::{ClientConfig, Credentials},
    error::{Error, Result},
    http::{Executor, Request, ReqwestTransport, Transport},
    paging::Paginator,
    platform::{Clock, StandardCodec, SystemClock, UrlCodec},
    spotify::{
        Albums, Artists, Following, Personalization, Player, Playlists, Search, Tracks, Users,
    },
};

/// Lifetime assumed for an access token string handed in without an expiry.
const SUPPLIED_TOKEN_LIFETIME: i64 = 3600;

/// Handle to the Web API.
///
/// Cheap to clone; clones share the token, so a refresh done by one is seen
/// by all.
#[derive(Clone)]
pub struct Spotify {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    oauth: Arc<OAuthClient>,
    executor: Arc<Executor>,
    codec: Arc<dyn UrlCodec>,
    runtime: Handle,
}

impl Spotify {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn executor(&self) -> Arc<Executor> {
        Arc::clone(&self.inner.executor)
    }

    pub fn runtime(&self) -> &Handle {
        &self.inner.runtime
    }

    pub(crate) fn encode(&self, component: &str) -> String {
        self.inner.codec.encode_component(component)
    }

    pub fn artists(&self) -> Artists<'_> {
        Artists::new(self)
    }

    pub fn albums(&self) -> Albums<'_> {
        Albums::new(self)
    }

    pub fn tracks(&self) -> Tracks<'_> {
        Tracks::new(self)
    }

    pub fn playlists(&self) -> Playlists<'_> {
        Playlists::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn search(&self) -> Search<'_> {
        Search::new(self)
    }

    pub fn personalization(&self) -> Personalization<'_> {
        Personalization::new(self)
    }

    pub fn following(&self) -> Following<'_> {
        Following::new(self)
    }

    pub fn player(&self) -> Player<'_> {
        Player::new(self)
    }

    /// The stored token, whether or not it is still valid.
    pub fn token(&self) -> Action<Token> {
        self.action(|executor| async move { Ok(executor.tokens().snapshot().await) })
    }

    /// Forces a token refresh.
    pub fn refresh_token(&self) -> Action<Token> {
        self.action(|executor| async move { executor.tokens().refresh().await })
    }

    /// URL to send the user to for the authorization code flow.
    pub fn authorize_url(&self, state: &str, code_challenge: &str) -> Result<String> {
        self.inner.oauth.authorize_url(state, code_challenge)
    }

    /// Exchanges an authorization code and makes the result the client's token.
    pub fn exchange_code(&self, code: &str, verifier: &str) -> Action<Token> {
        let oauth = Arc::clone(&self.inner.oauth);
        let code = code.to_string();
        let verifier = verifier.to_string();
        self.action(move |executor| {
            let oauth = Arc::clone(&oauth);
            let code = code.clone();
            let verifier = verifier.clone();
            async move {
                let token = oauth.exchange_code(&code, &verifier).await?;
                executor.tokens().replace(token.clone()).await;
                Ok(token)
            }
        })
    }

    pub(crate) fn action<T, F, Fut>(&self, f: F) -> Action<T>
    where
        T: Send + 'static,
        F: Fn(Arc<Executor>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let executor = self.executor();
        Action::new(self.runtime().clone(), move || f(Arc::clone(&executor)))
    }

    pub(crate) fn json<T>(&self, request: Request) -> Action<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.action(move |executor| {
            let request = request.clone();
            async move { executor.json(&request).await }
        })
    }

    pub(crate) fn json_opt<T>(&self, request: Request) -> Action<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.action(move |executor| {
            let request = request.clone();
            async move { executor.json_opt(&request).await }
        })
    }

    pub(crate) fn json_field<T>(&self, request: Request, key: &'static str) -> Action<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.action(move |executor| {
            let request = request.clone();
            async move { executor.json_field(&request, key).await }
        })
    }

    pub(crate) fn command(&self, request: Request) -> Action<()> {
        self.action(move |executor| {
            let request = request.clone();
            async move { executor.command(&request).await }
        })
    }

    /// Like [`Spotify::json`] with `body` serialized as the JSON payload.
    pub(crate) fn json_body<T, B>(&self, request: Request, body: B) -> Action<T>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + Send + Sync + 'static,
    {
        let body = Arc::new(body);
        self.action(move |executor| {
            let request = request.clone().json(body.as_ref());
            async move { executor.json(&request?).await }
        })
    }

    /// Like [`Spotify::command`] with `body` serialized as the JSON payload.
    pub(crate) fn command_body<B>(&self, request: Request, body: B) -> Action<()>
    where
        B: Serialize + Send + Sync + 'static,
    {
        let body = Arc::new(body);
        self.action(move |executor| {
            let request = request.clone().json(body.as_ref());
            async move { executor.command(&request?).await }
        })
    }

    pub(crate) fn paged<T>(
        &self,
        request: Request,
        envelope: Option<&'static str>,
    ) -> Action<Paginator<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.action(move |executor| Paginator::fetch(executor, request.clone(), envelope))
    }
}

/// Configures and builds a [`Spotify`] client.
///
/// The initial token is, in order of preference: a token passed with
/// [`ClientBuilder::token`], an access token string from the credentials or
/// [`ClientBuilder::access_token`], the cached token when `use_cache` is set,
/// or a fresh client credentials grant.
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    credentials: Credentials,
    scopes: BTreeSet<String>,
    token: Option<Token>,
    clock: Option<Arc<dyn Clock>>,
    codec: Option<Arc<dyn UrlCodec>>,
    transport: Option<Arc<dyn Transport>>,
    authorizer: Option<Arc<dyn Authorizer>>,
    runtime: Option<Handle>,
}

impl ClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.credentials.access_token = Some(token.into());
        self
    }

    pub fn automatic_refresh(mut self, enabled: bool) -> Self {
        self.config.automatic_refresh = enabled;
        self
    }

    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.config.use_cache = enabled;
        self
    }

    pub fn cache_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.config.cache_path = Some(path.into());
        self
    }

    pub fn retry_on_server_error(mut self, enabled: bool) -> Self {
        self.config.retry_on_server_error = enabled;
        self
    }

    pub fn expiry_leeway(mut self, leeway: Duration) -> Self {
        self.config.expiry_leeway = leeway;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn accounts_url(mut self, url: impl Into<String>) -> Self {
        self.config.accounts_url = url.into();
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn codec(mut self, codec: Arc<dyn UrlCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replaces the token endpoint client as the source of refreshed tokens.
    pub fn authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    /// Worker pool for queued actions.
    ///
    /// The handle must belong to a multi-threaded runtime. A current-thread
    /// runtime only makes progress inside its own `block_on`, so
    /// [`ClientBuilder::build`] rejects it with [`Error::Config`].
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Builds the client, blocking the calling thread while the initial token
    /// is obtained. Must not be called from inside an async task.
    pub fn build(mut self) -> Result<Spotify> {
        let runtime = worker_pool(self.runtime.take())?;
        self.runtime = Some(runtime.clone());
        runtime.block_on(self.build_async())
    }

    pub async fn build_async(self) -> Result<Spotify> {
        let runtime = worker_pool(self.runtime)?;
        let config = self.config;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let codec = self.codec.unwrap_or_else(|| Arc::new(StandardCodec));

        let default_transport = ReqwestTransport::new(config.timeout)?;
        let http = default_transport.client().clone();
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(default_transport),
        };

        let cache = config
            .use_cache
            .then(|| TokenCache::new(config.token_cache_path()));

        let (token, grant) = initial_token(
            self.token,
            &self.credentials,
            &self.scopes,
            cache.as_ref(),
            clock.as_ref(),
        )
        .await?;

        let oauth = Arc::new(OAuthClient::new(
            http,
            config.accounts_url.clone(),
            self.credentials,
            self.scopes,
            grant.unwrap_or(Grant::ClientCredentials),
            Arc::clone(&codec),
            Arc::clone(&clock),
        ));

        let token = match token {
            Some(token) => token,
            None => {
                let token = oauth.client_credentials().await?;
                info!("obtained client credentials token");
                if let Some(cache) = &cache {
                    if let Err(e) = cache.persist(&token).await {
                        warn!(error = %e, "failed to cache token");
                    }
                }
                token
            }
        };

        let authorizer = self
            .authorizer
            .unwrap_or_else(|| Arc::clone(&oauth) as Arc<dyn Authorizer>);
        let store = TokenStore::new(token, authorizer, clock)
            .with_leeway(config.expiry_leeway)
            .with_automatic_refresh(config.automatic_refresh)
            .with_cache(cache);

        let executor = Executor::new(transport, Arc::new(store), config.api_url.clone())
            .with_server_retry(config.retry_on_server_error);

        debug!(api_url = %config.api_url, "client ready");
        Ok(Spotify {
            inner: Arc::new(Inner {
                config,
                oauth,
                executor: Arc::new(executor),
                codec,
                runtime,
            }),
        })
    }
}

fn worker_pool(supplied: Option<Handle>) -> Result<Handle> {
    match supplied {
        Some(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => Err(
            Error::Config("queued actions need a multi-threaded runtime handle".to_string()),
        ),
        Some(handle) => Ok(handle),
        None => default_handle(),
    }
}

/// Picks the starting token. `None` means a client credentials grant is needed.
async fn initial_token(
    explicit: Option<Token>,
    credentials: &Credentials,
    scopes: &BTreeSet<String>,
    cache: Option<&TokenCache>,
    clock: &dyn Clock,
) -> Result<(Option<Token>, Option<Grant>)> {
    if let Some(token) = explicit {
        let grant = if token.is_refreshable() {
            Grant::AuthorizationCode
        } else {
            Grant::Supplied
        };
        return Ok((Some(token), Some(grant)));
    }

    if let Some(access_token) = &credentials.access_token {
        let token = Token::new(
            access_token.clone(),
            clock.now() + ChronoDuration::seconds(SUPPLIED_TOKEN_LIFETIME),
            None,
            scopes.iter().cloned(),
        );
        return Ok((Some(token), Some(Grant::Supplied)));
    }

    if let Some(cache) = cache {
        if let Some(token) = cache.load().await? {
            debug!(path = %cache.path().display(), "using cached token");
            let grant = if token.is_refreshable() {
                Grant::AuthorizationCode
            } else if credentials.client_secret.is_some() {
                Grant::ClientCredentials
            } else {
                Grant::Supplied
            };
            return Ok((Some(token), Some(grant)));
        }
    }

    if credentials.client_id.is_empty() {
        return Err(Error::Config(
            "a client id is required to obtain a token".to_string(),
        ));
    }
    Ok((None, None))
}
