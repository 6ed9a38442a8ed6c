use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::{
    auth::{cache::TokenCache, oauth::Authorizer, token::Token},
    error::{Error, Result},
    platform::Clock,
};

/// Outcome of [`TokenStore::current_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Valid(Token),
    NeedsRefresh,
}

/// The held token and the leeway its expiry is judged with.
struct Current {
    token: Token,
    leeway: chrono::Duration,
}

/// Owns the client's token and renews it.
///
/// At most one refresh runs at a time. Callers that find the token stale while a
/// refresh is in flight wait for it and reuse its result.
///
/// A token obtained through the store is judged with at most half its lifetime
/// as leeway, so a short-lived token is not considered stale on arrival.
pub struct TokenStore {
    current: RwLock<Current>,
    refresh_lock: Mutex<()>,
    authorizer: Arc<dyn Authorizer>,
    clock: Arc<dyn Clock>,
    leeway: chrono::Duration,
    automatic_refresh: bool,
    cache: Option<TokenCache>,
    refreshes: AtomicU64,
}

impl TokenStore {
    pub fn new(token: Token, authorizer: Arc<dyn Authorizer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            current: RwLock::new(Current {
                token,
                leeway: chrono::Duration::zero(),
            }),
            refresh_lock: Mutex::new(()),
            authorizer,
            clock,
            leeway: chrono::Duration::zero(),
            automatic_refresh: true,
            cache: None,
            refreshes: AtomicU64::new(0),
        }
    }

    /// Treats tokens as expired `leeway` before their real expiry.
    ///
    /// Applies in full to the token the store starts with.
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        let leeway = chrono::Duration::from_std(leeway).unwrap_or(chrono::Duration::MAX);
        self.leeway = leeway;
        self.current.get_mut().leeway = leeway;
        self
    }

    pub fn with_automatic_refresh(mut self, enabled: bool) -> Self {
        self.automatic_refresh = enabled;
        self
    }

    pub fn with_cache(mut self, cache: Option<TokenCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The stored token if it is still usable.
    pub async fn current_token(&self) -> TokenState {
        let current = self.current.read().await;
        if current.token.is_expired(self.clock.now(), current.leeway) {
            TokenState::NeedsRefresh
        } else {
            TokenState::Valid(current.token.clone())
        }
    }

    /// Snapshot of the stored token, expired or not.
    pub async fn snapshot(&self) -> Token {
        self.current.read().await.token.clone()
    }

    /// A valid access token, refreshing first when the stored one is stale.
    pub async fn access_token(&self) -> Result<String> {
        let stale = {
            let current = self.current.read().await;
            if !current.token.is_expired(self.clock.now(), current.leeway) {
                return Ok(current.token.access_token.clone());
            }
            current.token.access_token.clone()
        };

        if !self.automatic_refresh {
            return Err(Error::Auth(
                "access token expired and automatic refresh is disabled".to_string(),
            ));
        }

        // whoever held the lock first may already have replaced `stale`
        let token = self.refresh_when(move |t| t.access_token == stale).await?;
        Ok(token.access_token)
    }

    /// Unconditionally renews the token.
    pub async fn refresh(&self) -> Result<Token> {
        self.refresh_when(|_| true).await
    }

    /// Renews the token after the server refused `rejected`.
    ///
    /// If another caller already replaced that token, the replacement is
    /// returned without a second refresh.
    pub async fn refresh_rejected(&self, rejected: &str) -> Result<Token> {
        if !self.automatic_refresh {
            return Err(Error::Auth(
                "access token rejected and automatic refresh is disabled".to_string(),
            ));
        }
        let rejected = rejected.to_string();
        self.refresh_when(move |t| t.access_token == rejected).await
    }

    /// Stores a token obtained outside the store (e.g. a code exchange).
    pub async fn replace(&self, token: Token) {
        let _guard = self.refresh_lock.lock().await;
        self.install(token).await;
    }

    /// Number of refreshes performed by this store.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    async fn refresh_when<F>(&self, stale: F) -> Result<Token>
    where
        F: Fn(&Token) -> bool,
    {
        let _guard = self.refresh_lock.lock().await;

        let held = self.snapshot().await;
        if !stale(&held) {
            debug!("token already refreshed by a concurrent caller");
            return Ok(held);
        }

        let fresh = self.authorizer.refresh(&held).await?;
        if fresh.is_expired(self.clock.now(), chrono::Duration::zero()) {
            return Err(Error::Auth(
                "authorization server returned an already expired token".to_string(),
            ));
        }

        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.install(fresh.clone()).await;
        Ok(fresh)
    }

    async fn install(&self, token: Token) {
        self.persist(&token).await;
        let lifetime = token.expires_at - self.clock.now();
        let leeway = self.leeway.min(lifetime / 2).max(chrono::Duration::zero());
        *self.current.write().await = Current { token, leeway };
    }

    async fn persist(&self, token: &Token) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.persist(token).await {
                warn!(path = %cache.path().display(), error = %e, "failed to persist token");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::platform::ManualClock;

    struct CountingAuthorizer {
        calls: AtomicUsize,
        clock: Arc<ManualClock>,
        delay: Duration,
        lifetime: chrono::Duration,
    }

    #[async_trait]
    impl Authorizer for CountingAuthorizer {
        async fn refresh(&self, current: &Token) -> Result<Token> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.delay).await;
            Ok(Token::new(
                format!("access-{n}"),
                self.clock.now() + self.lifetime,
                current.refresh_token.clone(),
                Vec::new(),
            ))
        }
    }

    struct RejectingAuthorizer;

    #[async_trait]
    impl Authorizer for RejectingAuthorizer {
        async fn refresh(&self, _current: &Token) -> Result<Token> {
            Err(Error::Auth("invalid_grant".to_string()))
        }
    }

    fn expired_token(clock: &ManualClock) -> Token {
        Token::new(
            "stale",
            clock.now() - chrono::Duration::seconds(1),
            Some("refresh".to_string()),
            Vec::new(),
        )
    }

    fn counting(clock: &Arc<ManualClock>, delay: Duration) -> Arc<CountingAuthorizer> {
        Arc::new(CountingAuthorizer {
            calls: AtomicUsize::new(0),
            clock: Arc::clone(clock),
            delay,
            lifetime: chrono::Duration::seconds(3600),
        })
    }

    #[tokio::test]
    async fn test_expired_token_is_never_returned() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let authorizer = counting(&clock, Duration::ZERO);
        let store = TokenStore::new(expired_token(&clock), authorizer.clone(), clock.clone());

        assert_eq!(store.current_token().await, TokenState::NeedsRefresh);
        assert_eq!(store.access_token().await.unwrap(), "access-1");
        assert!(matches!(store.current_token().await, TokenState::Valid(_)));
    }

    #[tokio::test]
    async fn test_leeway_triggers_proactive_refresh() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let token = Token::new(
            "soon",
            clock.now() + chrono::Duration::seconds(60),
            Some("refresh".to_string()),
            Vec::new(),
        );
        let store = TokenStore::new(token, counting(&clock, Duration::ZERO), clock.clone())
            .with_leeway(Duration::from_secs(240));

        assert_eq!(store.access_token().await.unwrap(), "access-1");
        assert_eq!(store.refresh_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_refresh() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let authorizer = counting(&clock, Duration::from_millis(50));
        let store = Arc::new(TokenStore::new(
            expired_token(&clock),
            authorizer.clone(),
            clock.clone(),
        ));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.access_token().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "access-1");
        }
        assert_eq!(authorizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_token_refreshes_once() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let authorizer = counting(&clock, Duration::ZERO);
        let valid = Token::new(
            "revoked",
            clock.now() + chrono::Duration::seconds(3600),
            Some("refresh".to_string()),
            Vec::new(),
        );
        let store = TokenStore::new(valid, authorizer.clone(), clock.clone());

        let first = store.refresh_rejected("revoked").await.unwrap();
        let second = store.refresh_rejected("revoked").await.unwrap();

        assert_eq!(first.access_token, "access-1");
        assert_eq!(second.access_token, "access-1");
        assert_eq!(authorizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_is_auth_error() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = TokenStore::new(
            expired_token(&clock),
            Arc::new(RejectingAuthorizer),
            clock.clone(),
        );

        assert!(store.access_token().await.unwrap_err().is_auth());
        assert_eq!(store.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_automatic_refresh() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let authorizer = counting(&clock, Duration::ZERO);
        let store = TokenStore::new(expired_token(&clock), authorizer.clone(), clock.clone())
            .with_automatic_refresh(false);

        assert!(store.access_token().await.unwrap_err().is_auth());
        assert_eq!(authorizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_short_lived_tokens_still_share_one_refresh() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let authorizer = Arc::new(CountingAuthorizer {
            calls: AtomicUsize::new(0),
            clock: Arc::clone(&clock),
            delay: Duration::from_millis(50),
            lifetime: chrono::Duration::seconds(120),
        });
        let store = Arc::new(
            TokenStore::new(expired_token(&clock), authorizer.clone(), clock.clone())
                .with_leeway(Duration::from_secs(240)),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.access_token().await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "access-1");
        }
        assert_eq!(authorizer.calls.load(Ordering::SeqCst), 1);

        // 120s token, leeway capped at 60s
        assert_eq!(store.access_token().await.unwrap(), "access-1");
        assert_eq!(store.access_token().await.unwrap(), "access-1");
        assert_eq!(authorizer.calls.load(Ordering::SeqCst), 1);

        clock.advance(chrono::Duration::seconds(61));
        assert_eq!(store.access_token().await.unwrap(), "access-2");
        assert_eq!(store.refresh_count(), 2);
    }
}
