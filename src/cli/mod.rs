//! Implementations of the `spotapi` subcommands.
//!
//! Commands print through the crate's colored output macros and exit the
//! process on unrecoverable errors.

mod artists;
mod auth;
mod me;
mod player;
mod playlists;
mod search;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use artists::{followed_artists, show_artist};
pub use auth::auth;
pub use me::me;
pub use player::{PlayerCommand, player};
pub use playlists::playlists;
pub use search::search;

use crate::{
    Spotify,
    config::{self, ClientConfig, Credentials},
    error,
    platform::ProcessEnvironment,
};

/// Client for the remaining commands, using the token cached by `spotapi auth`.
pub(crate) async fn connect() -> Spotify {
    let env = ProcessEnvironment;
    let credentials = match Credentials::from_env(&env) {
        Ok(credentials) => credentials,
        Err(e) => error!("{}", e),
    };

    let config = ClientConfig {
        use_cache: true,
        ..ClientConfig::from_env(&env)
    };

    match Spotify::builder()
        .config(config)
        .credentials(credentials)
        .scopes(config::scopes_from_env(&env))
        .build_async()
        .await
    {
        Ok(client) => client,
        Err(e) => error!("Failed to set up client. Please run spotapi auth\n Error: {}", e),
    }
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
