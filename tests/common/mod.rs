#![allow(dead_code)]

use chrono::{Duration, Utc};
use serde_json::{Value, json};
use spotapi::{ClientBuilder, Spotify, auth::Token, config::Credentials};
use wiremock::MockServer;

pub fn token(access: &str, expires_in_secs: i64, refresh: Option<&str>) -> Token {
    Token::new(
        access,
        Utc::now() + Duration::seconds(expires_in_secs),
        refresh.map(str::to_string),
        Vec::new(),
    )
}

/// Builder pointed at `server` for both the API and the accounts service.
pub fn builder(server: &MockServer) -> ClientBuilder {
    Spotify::builder()
        .credentials(Credentials::new("id").with_secret("secret"))
        .api_url(format!("{}/v1", server.uri()))
        .accounts_url(server.uri())
}

/// Client holding a valid `initial` token with refresh token `refresh`.
pub async fn client(server: &MockServer) -> Spotify {
    builder(server)
        .token(token("initial", 3600, Some("refresh")))
        .build_async()
        .await
        .unwrap()
}

pub fn token_response(access: &str) -> Value {
    json!({
        "access_token": access,
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": "user-read-private user-follow-read"
    })
}

pub fn artist(id: &str) -> Value {
    json!({ "id": id, "name": id.to_uppercase(), "genres": ["rock"] })
}
