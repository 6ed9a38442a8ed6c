use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Access token plus what is needed to renew it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub refresh_token: Option<String>,
    pub scopes: BTreeSet<String>,
}

/// Body returned by the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl Token {
    pub fn new(
        access_token: impl Into<String>,
        expires_at: DateTime<Utc>,
        refresh_token: Option<String>,
        scopes: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
            refresh_token,
            scopes: scopes.into_iter().collect(),
        }
    }

    /// Builds a token from a token endpoint response received at `now`.
    ///
    /// `previous_refresh` is kept when the server does not rotate the refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when `expires_in` does not fit a timestamp.
    pub fn from_response(
        response: TokenResponse,
        now: DateTime<Utc>,
        previous_refresh: Option<String>,
    ) -> Result<Self> {
        let expires_at = Duration::try_seconds(response.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                Error::Decode(<serde_json::Error as serde::de::Error>::custom(format!(
                    "expires_in out of range: {}",
                    response.expires_in
                )))
            })?;

        Ok(Self {
            access_token: response.access_token,
            expires_at,
            refresh_token: response.refresh_token.or(previous_refresh),
            scopes: parse_scopes(response.scope.as_deref().unwrap_or_default()),
        })
    }

    /// True once `now` is within `leeway` of the expiry.
    pub fn is_expired(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        now + leeway >= self.expires_at
    }

    pub fn is_refreshable(&self) -> bool {
        self.refresh_token.is_some()
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    pub fn scope_string(&self) -> String {
        self.scopes.iter().cloned().collect::<Vec<_>>().join(" ")
    }
}

/// Splits a scope string on whitespace or commas.
pub fn parse_scopes(raw: &str) -> BTreeSet<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
