//! HTTP endpoints of the local server that receives the OAuth redirect during
//! `spotapi auth`.
//!
//! - [`callback`] - receives the authorization code (or the refusal) from the
//!   accounts service and hands it to the waiting command
//! - [`health`] - status, version and whether the redirect is still awaited

mod callback;
mod health;

pub use callback::{CallbackParams, callback};
pub use health::health;
