use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;
use reqwest::{Client, header::AUTHORIZATION};
use tracing::{debug, info};

use crate::{
    auth::token::{Token, TokenResponse},
    config::Credentials,
    error::{Error, Result, error_message},
    platform::{Clock, UrlCodec},
};

/// How the current token was obtained, which decides how it can be renewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    ClientCredentials,
    AuthorizationCode,
    /// Token string handed to the builder.
    Supplied,
}

/// Renews tokens. The seam the token store refreshes through.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Obtains a replacement for `current`.
    ///
    /// Fails with [`Error::Auth`] when there is nothing to refresh with or the
    /// authorization server rejects the request.
    async fn refresh(&self, current: &Token) -> Result<Token>;
}

/// Client for the OAuth2 token endpoint.
pub struct OAuthClient {
    http: Client,
    accounts_url: String,
    credentials: Credentials,
    scopes: BTreeSet<String>,
    grant: Grant,
    codec: Arc<dyn UrlCodec>,
    clock: Arc<dyn Clock>,
}

impl OAuthClient {
    pub fn new(
        http: Client,
        accounts_url: impl Into<String>,
        credentials: Credentials,
        scopes: BTreeSet<String>,
        grant: Grant,
        codec: Arc<dyn UrlCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http,
            accounts_url: accounts_url.into().trim_end_matches('/').to_string(),
            credentials,
            scopes,
            grant,
            codec,
            clock,
        }
    }

    /// URL the user opens to grant access (authorization code flow with PKCE).
    pub fn authorize_url(&self, state: &str, code_challenge: &str) -> Result<String> {
        let redirect_uri = self.redirect_uri()?;
        let scope = self.scopes.iter().cloned().collect::<Vec<_>>().join(" ");
        let c = &self.codec;

        Ok(format!(
            "{base}/authorize?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge_method=S256&code_challenge={code_challenge}&scope={scope}&state={state}",
            base = self.accounts_url,
            client_id = c.encode_component(&self.credentials.client_id),
            redirect_uri = c.encode_component(redirect_uri),
            code_challenge = c.encode_component(code_challenge),
            scope = c.encode_component(&scope),
            state = c.encode_component(state),
        ))
    }

    /// Client credentials grant. Requires a client secret.
    pub async fn client_credentials(&self) -> Result<Token> {
        if self.credentials.client_secret.is_none() {
            return Err(Error::Auth(
                "client credentials flow needs a client secret".to_string(),
            ));
        }
        self.request_token(&[("grant_type", "client_credentials")], None)
            .await
    }

    /// Exchanges an authorization code and its PKCE verifier for a token.
    pub async fn exchange_code(&self, code: &str, verifier: &str) -> Result<Token> {
        let redirect_uri = self.redirect_uri()?;
        self.request_token(
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("code_verifier", verifier),
                ("redirect_uri", redirect_uri),
            ],
            None,
        )
        .await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Token> {
        self.request_token(
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
            Some(refresh_token.to_string()),
        )
        .await
    }

    fn redirect_uri(&self) -> Result<&str> {
        self.credentials
            .redirect_uri
            .as_deref()
            .ok_or_else(|| Error::Config("a redirect URI is required for this flow".to_string()))
    }

    async fn request_token(
        &self,
        form: &[(&str, &str)],
        previous_refresh: Option<String>,
    ) -> Result<Token> {
        let url = format!("{}/api/token", self.accounts_url);
        let mut fields: Vec<(&str, &str)> = form.to_vec();

        let mut request = self.http.post(&url);
        match &self.credentials.client_secret {
            Some(secret) => {
                request = request.header(
                    AUTHORIZATION,
                    self.codec
                        .basic_credentials(&self.credentials.client_id, secret),
                );
            }
            // public clients identify themselves in the body
            None => fields.push(("client_id", &self.credentials.client_id)),
        }

        let grant = form.first().map(|(_, v)| *v).unwrap_or_default();
        debug!(url = %url, grant, "requesting token");
        let response = request.form(&fields).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(Error::Auth(format!(
                "token endpoint answered {status}: {}",
                error_message(status, &body)
            )));
        }

        let parsed: TokenResponse = serde_json::from_slice(&body)?;
        Token::from_response(parsed, self.clock.now(), previous_refresh)
    }
}

#[async_trait]
impl Authorizer for OAuthClient {
    async fn refresh(&self, current: &Token) -> Result<Token> {
        if let Some(refresh_token) = &current.refresh_token {
            let token = self.refresh_token(refresh_token).await?;
            info!("access token refreshed");
            return Ok(token);
        }

        match self.grant {
            Grant::ClientCredentials => {
                let token = self.client_credentials().await?;
                info!("client credentials token renewed");
                Ok(token)
            }
            Grant::AuthorizationCode | Grant::Supplied => Err(Error::Auth(
                "token expired and no refresh token is available".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::platform::{StandardCodec, SystemClock};

    fn oauth(credentials: Credentials, grant: Grant) -> OAuthClient {
        OAuthClient::new(
            Client::new(),
            "https://accounts.example.com/",
            credentials,
            ["user-read-private".to_string(), "user-top-read".to_string()]
                .into_iter()
                .collect(),
            grant,
            Arc::new(StandardCodec),
            Arc::new(SystemClock),
        )
    }

    #[test]
    fn test_authorize_url() {
        let client = oauth(
            Credentials::new("cid").with_redirect_uri("http://127.0.0.1:8888/callback"),
            Grant::AuthorizationCode,
        );

        let url = client.authorize_url("xyz", "challenge").unwrap();

        assert!(url.starts_with("https://accounts.example.com/authorize?client_id=cid"));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8888%2Fcallback"));
        assert!(url.contains("scope=user-read-private%20user-top-read"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.ends_with("state=xyz"));
    }

    #[test]
    fn test_authorize_url_requires_redirect() {
        let client = oauth(Credentials::new("cid"), Grant::AuthorizationCode);
        assert!(matches!(
            client.authorize_url("s", "c"),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_supplied_token_without_refresh_cannot_renew() {
        let client = oauth(Credentials::new("cid"), Grant::Supplied);
        let token = Token::new("a", Utc::now(), None, Vec::new());

        let err = client.refresh(&token).await.unwrap_err();
        assert!(err.is_auth());
    }
}
