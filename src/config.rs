//! Configuration management for the client.
//!
//! Values come from three places, highest priority first:
//! 1. Explicit builder calls
//! 2. Environment variables (optionally loaded from a `.env` file in the local
//!    data directory, see [`load_env`])
//! 3. The defaults in [`ClientConfig::default`]

use std::{collections::BTreeSet, path::PathBuf, time::Duration};

use crate::{
    auth::token::parse_scopes,
    error::{Error, Result},
    platform::Environment,
};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

/// Tunables for a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Refresh expired tokens and retry once on 401.
    pub automatic_refresh: bool,
    /// Load and persist the token in [`ClientConfig::cache_path`].
    pub use_cache: bool,
    /// Retry a request once after a 5xx response.
    pub retry_on_server_error: bool,
    /// Tokens are treated as expired this long before their real expiry.
    pub expiry_leeway: Duration,
    pub api_url: String,
    pub accounts_url: String,
    pub timeout: Duration,
    pub cache_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            automatic_refresh: true,
            use_cache: false,
            retry_on_server_error: false,
            expiry_leeway: Duration::from_secs(240),
            api_url: DEFAULT_API_URL.to_string(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            timeout: Duration::from_secs(30),
            cache_path: None,
        }
    }
}

impl ClientConfig {
    /// Builds a configuration from the defaults and the environment.
    ///
    /// # Arguments
    ///
    /// * `env` - Source of variables, usually [`crate::platform::ProcessEnvironment`]
    ///
    /// # Environment Variables
    ///
    /// - `SPOTIFY_API_URL` - Overrides [`DEFAULT_API_URL`]
    /// - `SPOTIFY_ACCOUNTS_URL` - Overrides [`DEFAULT_ACCOUNTS_URL`]
    ///
    /// Everything else keeps its default and can be changed on the builder.
    pub fn from_env(env: &impl Environment) -> Self {
        let mut config = Self::default();
        if let Some(url) = env.var("SPOTIFY_API_URL") {
            config.api_url = url;
        }
        if let Some(url) = env.var("SPOTIFY_ACCOUNTS_URL") {
            config.accounts_url = url;
        }
        config
    }

    /// Returns the path of the token cache file.
    ///
    /// Uses [`ClientConfig::cache_path`] when set, otherwise
    /// `cache/token.json` below the local data directory:
    /// - Linux: `~/.local/share/spotapi/cache/token.json`
    /// - macOS: `~/Library/Application Support/spotapi/cache/token.json`
    /// - Windows: `%LOCALAPPDATA%/spotapi/cache/token.json`
    pub fn token_cache_path(&self) -> PathBuf {
        self.cache_path.clone().unwrap_or_else(|| {
            let mut path = data_dir();
            path.push("cache/token.json");
            path
        })
    }
}

/// Application credentials. Immutable once a client is built.
#[derive(Clone, Default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub access_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("redirect_uri", &self.redirect_uri)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Reads application credentials from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `SPOTIFY_CLIENT_ID` - Required
    /// - `SPOTIFY_CLIENT_SECRET` - Needed for the client credentials grant
    /// - `SPOTIFY_REDIRECT_URI` - Needed for the authorization code flow
    /// - `SPOTIFY_ACCESS_TOKEN` - Used as is, without refresh
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `SPOTIFY_CLIENT_ID` is missing.
    pub fn from_env(env: &impl Environment) -> Result<Self> {
        let client_id = env
            .var("SPOTIFY_CLIENT_ID")
            .ok_or_else(|| Error::Config("SPOTIFY_CLIENT_ID must be set".to_string()))?;

        Ok(Self {
            client_id,
            client_secret: env.var("SPOTIFY_CLIENT_SECRET"),
            redirect_uri: env.var("SPOTIFY_REDIRECT_URI"),
            access_token: env.var("SPOTIFY_ACCESS_TOKEN"),
        })
    }
}

/// Scopes from `SPOTIFY_SCOPE`, space or comma separated.
pub fn scopes_from_env(env: &impl Environment) -> BTreeSet<String> {
    env.var("SPOTIFY_SCOPE")
        .map(|raw| parse_scopes(&raw))
        .unwrap_or_default()
}

/// Address of the local OAuth callback server.
pub fn server_addr(env: &impl Environment) -> String {
    env.var("SERVER_ADDRESS")
        .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory if needed, then reads `spotapi/.env` below the
/// platform's local data directory:
/// - Linux: `~/.local/share/spotapi/.env`
/// - macOS: `~/Library/Application Support/spotapi/.env`
/// - Windows: `%LOCALAPPDATA%/spotapi/.env`
///
/// A missing file is not an error. Variables already set in the process win.
///
/// # Errors
///
/// Returns [`Error::Io`] when the directory cannot be created and
/// [`Error::Config`] when the file exists but cannot be parsed.
///
/// # Example
///
/// ```no_run
/// # async fn setup() -> spotapi::Result<()> {
/// spotapi::config::load_env().await?;
/// # Ok(())
/// # }
/// ```
pub async fn load_env() -> Result<()> {
    let mut path = data_dir();
    path.push(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Config(format!("cannot load {}: {e}", path.display()))),
    }
}

fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotapi");
    path
}
