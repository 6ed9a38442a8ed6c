//! Token lifecycle: the token model, the OAuth2 token endpoint, the on-disk
//! cache and the store that coordinates renewal.

pub mod cache;
pub mod oauth;
pub mod store;
pub mod token;

pub use cache::TokenCache;
pub use oauth::{Authorizer, Grant, OAuthClient};
pub use store::{TokenState, TokenStore};
pub use token::{Token, TokenResponse};
