use std::{sync::Arc, time::Duration};

use tokio::time::timeout;

use crate::{
    auth::{Grant, OAuthClient, TokenCache},
    config::{self, ClientConfig, Credentials},
    error,
    platform::{ProcessEnvironment, StandardCodec, SystemClock},
    server::{PendingAuthorization, start_api_server},
    success, utils, warning,
};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Authorization code flow with PKCE. The resulting token goes to the cache
/// the other commands read.
pub async fn auth() {
    let env = ProcessEnvironment;
    let credentials = match Credentials::from_env(&env) {
        Ok(credentials) => credentials,
        Err(e) => error!("{}", e),
    };
    let client_config = ClientConfig::from_env(&env);

    let oauth = OAuthClient::new(
        reqwest::Client::new(),
        client_config.accounts_url.clone(),
        credentials,
        config::scopes_from_env(&env),
        Grant::AuthorizationCode,
        Arc::new(StandardCodec),
        Arc::new(SystemClock),
    );

    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();

    let auth_url = match oauth.authorize_url(&state, &code_challenge) {
        Ok(url) => url,
        Err(e) => error!("{}", e),
    };

    let (pending, outcome) = PendingAuthorization::new(state);
    let addr = config::server_addr(&env);
    let server = tokio::spawn(async move {
        if let Err(e) = start_api_server(&addr, pending).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let pb = super::spinner("Waiting for authorization...");
    let received = timeout(CALLBACK_TIMEOUT, outcome).await;
    pb.finish_and_clear();
    server.abort();

    let code = match received {
        Ok(Ok(Ok(code))) => code,
        Ok(Ok(Err(reason))) => error!("Authorization failed: {}", reason),
        Ok(Err(_)) => error!("Callback server stopped before authorization completed"),
        Err(_) => error!("Timed out waiting for authorization"),
    };

    let token = match oauth.exchange_code(&code, &code_verifier).await {
        Ok(token) => token,
        Err(e) => error!("Token exchange failed: {}", e),
    };

    let cache = TokenCache::new(client_config.token_cache_path());
    if let Err(e) = cache.persist(&token).await {
        error!("Failed to save token to cache: {}", e);
    }

    success!("Authentication completed successfully");
}
