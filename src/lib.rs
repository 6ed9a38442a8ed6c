//! Typed client for the Spotify Web API.
//!
//! Endpoint groups (artists, albums, playlists, users, search,
//! personalization, following, player) are façades on a [`Spotify`] client.
//! Every endpoint method returns an [`Action`] that can be completed
//! synchronously, queued with callbacks, or awaited from async code. Access
//! tokens are refreshed transparently, and list endpoints come back as
//! [`Paginator`]s.
//!
//! # Modules
//!
//! - `action` - deferred, re-runnable units of work
//! - `auth` - tokens, the OAuth2 token endpoint and the refreshing token store
//! - `client` - the client handle and its builder
//! - `config` - configuration, credentials and `.env` loading
//! - `error` - the error taxonomy
//! - `http` - request description, transport and the authenticated executor
//! - `paging` - result pages and the paginator
//! - `platform` - clock, URL codec and environment capabilities
//! - `spotify` - endpoint façades
//! - `types` - response models
//! - `cli`, `server`, `api` - the `spotapi` command line and its OAuth callback server
//! - `utils` - PKCE helpers and small utilities
//!
//! # Example
//!
//! ```no_run
//! use spotapi::{Spotify, config::Credentials};
//!
//! fn main() -> spotapi::Result<()> {
//!     let client = Spotify::builder()
//!         .credentials(Credentials::new("client-id").with_secret("client-secret"))
//!         .build()?;
//!
//!     let artist = client.artists().get("0OdUWJ0sBjDrqHygGUXeCF").complete()?;
//!     println!("{}", artist.name);
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod paging;
pub mod platform;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use action::Action;
pub use client::{ClientBuilder, Spotify};
pub use error::{Error, Result};
pub use paging::{CursorState, Page, Paginator};

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// info!("Starting authentication process...");
/// info!("Found {} playlists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations. Used to provide positive feedback
/// when operations complete successfully.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// success!("Followed {} artists", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program termination.
/// Used for recoverable issues or important information that users should notice.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// warning!("Token cache not found, run spotapi auth");
/// warning!("Rate limit approaching: {} requests remaining", remaining);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
